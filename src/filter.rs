use crate::data::{CustomerRfm, Transaction};
use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Inclusive day range, always `start <= end`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Which customer segments to keep
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentSelection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl SegmentSelection {
    pub fn only<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SegmentSelection::Only(labels.into_iter().map(Into::into).collect())
    }

    /// Empty multi-select
    pub fn none() -> Self {
        SegmentSelection::Only(BTreeSet::new())
    }

    /// Build from command-line values; no values or `all` means everything
    pub fn from_args(values: &[String]) -> Self {
        if values.is_empty() || values.iter().any(|v| v.eq_ignore_ascii_case("all")) {
            SegmentSelection::All
        } else {
            SegmentSelection::only(values.iter().map(|v| v.trim()))
        }
    }

    pub fn matches(&self, segment: &str) -> bool {
        match self {
            SegmentSelection::All => true,
            SegmentSelection::Only(labels) => labels.contains(segment),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            SegmentSelection::All => "all segments".to_string(),
            SegmentSelection::Only(labels) if labels.is_empty() => "no segments".to_string(),
            SegmentSelection::Only(labels) if labels.len() == 1 => {
                labels.iter().next().cloned().unwrap_or_default()
            }
            SegmentSelection::Only(labels) => format!("{} segments", labels.len()),
        }
    }
}

/// Keep transactions purchased within `[start, end]`, compared by day.
///
/// Fails with [`Error::InvalidRange`] when `start > end`.
pub fn filter_transactions(
    rows: &[Transaction],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<&Transaction>> {
    let range = DateRange::new(start, end)?;
    Ok(filter_in_range(rows, &range))
}

pub fn filter_in_range<'a>(rows: &'a [Transaction], range: &DateRange) -> Vec<&'a Transaction> {
    rows.iter()
        .filter(|t| range.contains(t.purchase_date()))
        .collect()
}

pub fn filter_segments<'a>(
    rows: &'a [CustomerRfm],
    selection: &SegmentSelection,
) -> Vec<&'a CustomerRfm> {
    rows.iter().filter(|c| selection.matches(&c.segment)).collect()
}

/// Distinct segment labels in first-encountered order
pub fn segment_labels(rows: &[CustomerRfm]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|&c| seen.insert(c.segment.as_str()))
        .map(|c| c.segment.clone())
        .collect()
}
