mod schema;

use crate::data::Dataset;
use crate::error::Result;
use rusqlite::Connection;

pub use schema::get_meta;

/// Copy both tables into a fresh in-memory SQLite database.
///
/// Tables: `transactions`, `rfm` and `meta` (source paths and date bounds).
pub fn open_in_memory(dataset: &Dataset) -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    schema::create_tables(&conn)?;

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO transactions
                (customer_id, customer_state, order_purchase_timestamp, purchase_date, payment_value)
             VALUES (?, ?, ?, ?, ?)",
        )?;
        for t in &dataset.transactions {
            stmt.execute(rusqlite::params![
                t.customer_id,
                t.customer_state,
                t.purchased_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                t.purchase_date().format("%Y-%m-%d").to_string(),
                t.payment_value,
            ])?;
        }
    }
    {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO rfm (customer_id, recency, frequency, monetary, segment)
             VALUES (?, ?, ?, ?, ?)",
        )?;
        for c in &dataset.customers {
            stmt.execute(rusqlite::params![
                c.customer_id,
                c.recency,
                c.frequency,
                c.monetary,
                c.segment,
            ])?;
        }
    }

    schema::set_meta(
        &tx,
        "transactions_path",
        &dataset.paths.transactions.display().to_string(),
    )?;
    schema::set_meta(&tx, "rfm_path", &dataset.paths.rfm.display().to_string())?;
    if let Some(bounds) = dataset.bounds {
        schema::set_meta(&tx, "min_date", &bounds.min.to_string())?;
        schema::set_meta(&tx, "max_date", &bounds.max.to_string())?;
    }
    tx.commit()?;

    tracing::debug!(
        transactions = dataset.transactions.len(),
        customers = dataset.customers.len(),
        "tables copied into SQLite"
    );
    Ok(conn)
}
