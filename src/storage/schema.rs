use rusqlite::{Connection, OptionalExtension};

/// Create all tables (drops existing tables first to ensure clean state)
pub fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        DROP TABLE IF EXISTS transactions;
        DROP TABLE IF EXISTS rfm;
        DROP TABLE IF EXISTS meta;

        -- Metadata table
        CREATE TABLE meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- One row per order line; purchase_date is the day-truncated timestamp
        CREATE TABLE transactions (
            id INTEGER PRIMARY KEY,
            customer_id TEXT NOT NULL,
            customer_state TEXT NOT NULL,
            order_purchase_timestamp TEXT NOT NULL,
            purchase_date TEXT NOT NULL,
            payment_value REAL NOT NULL
        );

        CREATE INDEX idx_transactions_date ON transactions(purchase_date);
        CREATE INDEX idx_transactions_state ON transactions(customer_state);

        -- One row per customer
        CREATE TABLE rfm (
            customer_id TEXT NOT NULL,
            recency REAL NOT NULL,
            frequency REAL NOT NULL,
            monetary REAL NOT NULL,
            segment TEXT NOT NULL
        );

        CREATE INDEX idx_rfm_customer ON rfm(customer_id);
        CREATE INDEX idx_rfm_segment ON rfm(segment);
        "#,
    )
}

/// Set a metadata key
pub fn set_meta(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES (?, ?)",
        [key, value],
    )?;
    Ok(())
}

/// Get a metadata key
pub fn get_meta(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row("SELECT value FROM meta WHERE key = ?", [key], |row| {
        row.get(0)
    })
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_round_trip_and_missing_key() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        set_meta(&conn, "min_date", "2017-01-01").unwrap();
        set_meta(&conn, "min_date", "2016-09-04").unwrap();

        assert_eq!(get_meta(&conn, "min_date").unwrap().as_deref(), Some("2016-09-04"));
        assert_eq!(get_meta(&conn, "max_date").unwrap(), None);
    }
}
