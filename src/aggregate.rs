//! Grouped aggregates over filtered subsets.
//!
//! Every function here is pure: the result depends only on the rows passed
//! in, and empty input gives empty lists or zeroed metrics.

use crate::data::{CustomerRfm, Transaction};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub distinct_customers: usize,
    pub total_monetary: f64,
    pub distinct_segments: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SegmentCount {
    pub segment: String,
    pub customers: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SegmentRevenue {
    pub segment: String,
    pub revenue: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateCustomers {
    pub state: String,
    pub customers: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateRevenue {
    pub state: String,
    pub revenue: f64,
}

pub fn summary_metrics(rows: &[&CustomerRfm]) -> SummaryMetrics {
    let customers: HashSet<&str> = rows.iter().map(|c| c.customer_id.as_str()).collect();
    let segments: HashSet<&str> = rows.iter().map(|c| c.segment.as_str()).collect();
    SummaryMetrics {
        distinct_customers: customers.len(),
        total_monetary: rows.iter().map(|c| c.monetary).sum(),
        distinct_segments: segments.len(),
    }
}

/// Rows per segment, largest first; ties keep first-seen order
pub fn segment_counts(rows: &[&CustomerRfm]) -> Vec<SegmentCount> {
    let mut counts = group_in_order(rows, |c| &c.segment, |_| 1usize);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(segment, customers)| SegmentCount {
            segment: segment.to_string(),
            customers,
        })
        .collect()
}

/// Monetary total per segment, largest first; ties keep first-seen order
pub fn segment_revenue(rows: &[&CustomerRfm]) -> Vec<SegmentRevenue> {
    let mut sums = group_in_order(rows, |c| &c.segment, |c| c.monetary);
    sums.sort_by(|a, b| b.1.total_cmp(&a.1));
    sums.into_iter()
        .map(|(segment, revenue)| SegmentRevenue {
            segment: segment.to_string(),
            revenue,
        })
        .collect()
}

/// States with the most distinct customers; ties by ascending state code
pub fn top_states_by_customers(rows: &[&Transaction], n: usize) -> Vec<StateCustomers> {
    let mut by_state: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    for t in rows {
        by_state
            .entry(t.customer_state.as_str())
            .or_default()
            .insert(t.customer_id.as_str());
    }

    let mut ranked: Vec<(&str, usize)> = by_state
        .into_iter()
        .map(|(state, ids)| (state, ids.len()))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);

    ranked
        .into_iter()
        .map(|(state, customers)| StateCustomers {
            state: state.to_string(),
            customers,
        })
        .collect()
}

/// States with the highest payment total; ties by ascending state code
pub fn top_states_by_revenue(rows: &[&Transaction], n: usize) -> Vec<StateRevenue> {
    let mut by_state: BTreeMap<&str, f64> = BTreeMap::new();
    for t in rows {
        *by_state.entry(t.customer_state.as_str()).or_default() += t.payment_value;
    }

    // BTreeMap yields states ascending, so the stable sort keeps that for ties
    let mut ranked: Vec<(&str, f64)> = by_state.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);

    ranked
        .into_iter()
        .map(|(state, revenue)| StateRevenue {
            state: state.to_string(),
            revenue,
        })
        .collect()
}

/// Fold rows into (key, accumulator) pairs, keys in first-encountered order
fn group_in_order<'a, T, V>(
    rows: &[&'a T],
    key: impl Fn(&'a T) -> &'a String,
    value: impl Fn(&'a T) -> V,
) -> Vec<(&'a str, V)>
where
    V: std::ops::AddAssign + Default,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, V)> = Vec::new();
    for &row in rows {
        let k = key(row).as_str();
        let slot = *index.entry(k).or_insert_with(|| {
            groups.push((k, V::default()));
            groups.len() - 1
        });
        groups[slot].1 += value(row);
    }
    groups
}
