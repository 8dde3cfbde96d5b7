//! One render pass: filter the loaded tables and aggregate them into the
//! view model both the TUI and the `report` command draw from.

use crate::aggregate::{
    self, SegmentCount, SegmentRevenue, StateCustomers, StateRevenue, SummaryMetrics,
};
use crate::data::{Dataset, DateBounds};
use crate::error::Error;
use crate::filter::{self, DateRange, SegmentSelection};
use chrono::NaiveDate;
use serde::Serialize;

/// User-chosen filter state; unset dates fall back to the data bounds
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub segments: SegmentSelection,
}

#[derive(Clone, Debug, Serialize)]
pub struct ViewModel {
    /// Range actually applied; `None` when there are no transactions
    pub range: Option<DateRange>,
    pub bounds: Option<DateBounds>,
    pub segments: SegmentSelection,
    pub warning: Option<String>,
    pub transactions_in_range: usize,
    pub summary: SummaryMetrics,
    pub segment_counts: Vec<SegmentCount>,
    pub segment_revenue: Vec<SegmentRevenue>,
    pub top_states_by_customers: Vec<StateCustomers>,
    pub top_states_by_revenue: Vec<StateRevenue>,
}

/// Resolve the requested dates against the data bounds.
///
/// A range that overlaps the data is clamped into the bounds. A range wholly
/// outside the data is kept as requested and selects no rows. An inverted
/// range is answered with the full range plus a warning for the user.
pub fn resolve_range(
    bounds: Option<DateBounds>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> (Option<DateRange>, Option<String>) {
    let Some(bounds) = bounds else {
        return (None, None);
    };
    let full = DateRange {
        start: bounds.min,
        end: bounds.max,
    };

    let start = start.unwrap_or(bounds.min);
    let end = end.unwrap_or(bounds.max);
    match DateRange::new(start, end) {
        Ok(range) if range.end < bounds.min || range.start > bounds.max => {
            tracing::debug!(%start, %end, "date range outside the data");
            (Some(range), None)
        }
        Ok(_) => {
            let range = DateRange {
                start: bounds.clamp(start),
                end: bounds.clamp(end),
            };
            (Some(range), None)
        }
        Err(err @ Error::InvalidRange { .. }) => {
            tracing::warn!(%start, %end, "inverted date range, using full range");
            (Some(full), Some(format!("{err}; showing the full range")))
        }
        Err(err) => (Some(full), Some(err.to_string())),
    }
}

pub fn render(dataset: &Dataset, params: &FilterParams, top_n: usize) -> ViewModel {
    let (range, warning) = resolve_range(dataset.bounds, params.start, params.end);

    let transactions = match &range {
        Some(r) => filter::filter_in_range(&dataset.transactions, r),
        None => Vec::new(),
    };
    let customers = filter::filter_segments(&dataset.customers, &params.segments);

    tracing::debug!(
        transactions = transactions.len(),
        customers = customers.len(),
        segments = %params.segments.describe(),
        "render pass"
    );

    ViewModel {
        range,
        bounds: dataset.bounds,
        segments: params.segments.clone(),
        warning,
        transactions_in_range: transactions.len(),
        summary: aggregate::summary_metrics(&customers),
        segment_counts: aggregate::segment_counts(&customers),
        segment_revenue: aggregate::segment_revenue(&customers),
        top_states_by_customers: aggregate::top_states_by_customers(&transactions, top_n),
        top_states_by_revenue: aggregate::top_states_by_revenue(&transactions, top_n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn bounds() -> Option<DateBounds> {
        Some(DateBounds {
            min: date("2017-01-01"),
            max: date("2018-08-31"),
        })
    }

    #[test]
    fn test_unset_dates_use_bounds() {
        let (range, warning) = resolve_range(bounds(), None, None);
        let range = range.unwrap();
        assert_eq!(range.start, date("2017-01-01"));
        assert_eq!(range.end, date("2018-08-31"));
        assert!(warning.is_none());
    }

    #[test]
    fn test_dates_clamped_into_bounds() {
        let (range, warning) = resolve_range(bounds(), Some(date("2010-01-01")), Some(date("2030-01-01")));
        let range = range.unwrap();
        assert_eq!(range.start, date("2017-01-01"));
        assert_eq!(range.end, date("2018-08-31"));
        assert!(warning.is_none());
    }

    #[test]
    fn test_range_outside_data_selects_nothing() {
        let day = date("2030-01-01");
        let (range, warning) = resolve_range(bounds(), Some(day), Some(day));
        let range = range.unwrap();
        assert_eq!((range.start, range.end), (day, day));
        assert!(warning.is_none());

        let (range, _) = resolve_range(bounds(), Some(date("2010-01-01")), Some(date("2010-12-31")));
        assert_eq!(range.unwrap().end, date("2010-12-31"));
    }

    #[test]
    fn test_render_outside_data_is_empty() {
        use crate::config::DataPaths;
        use crate::data::{CustomerRfm, Dataset, Transaction};
        use chrono::NaiveDateTime;

        let dataset = Dataset::from_rows(
            DataPaths::default(),
            vec![Transaction {
                customer_id: "1".to_string(),
                customer_state: "SP".to_string(),
                purchased_at: NaiveDateTime::parse_from_str(
                    "2018-08-29 15:00:37",
                    "%Y-%m-%d %H:%M:%S",
                )
                .unwrap(),
                payment_value: 100.0,
            }],
            vec![CustomerRfm {
                customer_id: "1".to_string(),
                recency: 1.0,
                frequency: 1.0,
                monetary: 100.0,
                segment: "Champions".to_string(),
            }],
        );
        let day = date("2030-01-01");
        let params = FilterParams {
            start: Some(day),
            end: Some(day),
            segments: SegmentSelection::All,
        };
        let view = render(&dataset, &params, 10);

        assert_eq!(view.transactions_in_range, 0);
        assert!(view.top_states_by_customers.is_empty());
        assert!(view.top_states_by_revenue.is_empty());
        assert!(view.warning.is_none());
    }

    #[test]
    fn test_inverted_range_falls_back_with_warning() {
        let (range, warning) =
            resolve_range(bounds(), Some(date("2018-05-01")), Some(date("2018-02-01")));
        let range = range.unwrap();
        assert_eq!(range.start, date("2017-01-01"));
        assert_eq!(range.end, date("2018-08-31"));
        let warning = warning.unwrap();
        assert!(warning.contains("2018-05-01"), "{warning}");
    }

    #[test]
    fn test_no_bounds_no_range() {
        let (range, warning) = resolve_range(None, Some(date("2018-05-01")), None);
        assert!(range.is_none());
        assert!(warning.is_none());
    }
}
