use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// One order line from the transaction table (`full_df`)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transaction {
    pub customer_id: String,
    pub customer_state: String,
    pub purchased_at: NaiveDateTime,
    pub payment_value: f64,
}

impl Transaction {
    /// Purchase timestamp truncated to the day
    pub fn purchase_date(&self) -> NaiveDate {
        self.purchased_at.date()
    }
}

/// One customer from the RFM table, keyed by `customer_id`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CustomerRfm {
    pub customer_id: String,
    pub recency: f64,
    pub frequency: f64,
    pub monetary: f64,
    pub segment: String,
}

/// Earliest and latest purchase dates observed in the transaction table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateBounds {
    pub fn from_transactions(rows: &[Transaction]) -> Option<Self> {
        let mut dates = rows.iter().map(Transaction::purchase_date);
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(DateBounds { min, max })
    }

    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.min, self.max)
    }
}
