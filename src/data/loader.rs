use super::model::{CustomerRfm, DateBounds, Transaction};
use crate::config::DataPaths;
use crate::error::{Error, LoadErrorKind, Result};
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const TRANSACTION_COLUMNS: [&str; 4] = [
    "customer_id",
    "customer_state",
    "order_purchase_timestamp",
    "payment_value",
];

const RFM_COLUMNS: [&str; 5] = ["customer_id", "recency", "frequency", "monetary", "segment"];

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Both tables plus the purchase date bounds, immutable once loaded
#[derive(Debug)]
pub struct Dataset {
    pub paths: DataPaths,
    pub transactions: Vec<Transaction>,
    pub customers: Vec<CustomerRfm>,
    pub bounds: Option<DateBounds>,
}

impl Dataset {
    pub fn load(paths: &DataPaths) -> Result<Self> {
        let transactions = load_transactions(&paths.transactions)?;
        let customers = load_rfm(&paths.rfm)?;
        Ok(Dataset::from_rows(paths.clone(), transactions, customers))
    }

    pub fn from_rows(
        paths: DataPaths,
        transactions: Vec<Transaction>,
        customers: Vec<CustomerRfm>,
    ) -> Self {
        let bounds = DateBounds::from_transactions(&transactions);
        match bounds {
            Some(b) => tracing::info!(
                transactions = transactions.len(),
                customers = customers.len(),
                min_date = %b.min,
                max_date = %b.max,
                "dataset loaded"
            ),
            None => tracing::warn!(
                customers = customers.len(),
                "transaction table is empty, state charts will be blank"
            ),
        }
        Dataset {
            paths,
            transactions,
            customers,
            bounds,
        }
    }
}

pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let file = open(path)?;
    parse_transactions(file, path)
}

pub fn load_rfm(path: &Path) -> Result<Vec<CustomerRfm>> {
    let file = open(path)?;
    parse_rfm(file, path)
}

/// Parse the transaction table; `source` only labels errors
pub fn parse_transactions<R: Read>(reader: R, source: &Path) -> Result<Vec<Transaction>> {
    let mut reader = csv_reader(reader);
    let [id, state, ts, payment] = locate_columns(&mut reader, TRANSACTION_COLUMNS, source)?;

    let mut rows = Vec::new();
    let mut blank_payments = 0usize;
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| unreadable(source, e))?;
        let row = row_number(&record, idx);

        let raw_ts = field(&record, ts);
        let purchased_at = parse_timestamp(raw_ts)
            .ok_or_else(|| invalid(source, row, TRANSACTION_COLUMNS[2], raw_ts))?;

        let raw_payment = field(&record, payment);
        if raw_payment.is_empty() {
            blank_payments += 1;
        }
        let payment_value = parse_amount(raw_payment)
            .ok_or_else(|| invalid(source, row, TRANSACTION_COLUMNS[3], raw_payment))?;

        rows.push(Transaction {
            customer_id: field(&record, id).to_string(),
            customer_state: field(&record, state).to_string(),
            purchased_at,
            payment_value,
        });
    }

    if blank_payments > 0 {
        tracing::debug!(
            file = %source.display(),
            blank_payments,
            "blank payment_value cells counted as zero"
        );
    }
    Ok(rows)
}

/// Parse the customer RFM table; `source` only labels errors
pub fn parse_rfm<R: Read>(reader: R, source: &Path) -> Result<Vec<CustomerRfm>> {
    let mut reader = csv_reader(reader);
    let [id, recency, frequency, monetary, segment] =
        locate_columns(&mut reader, RFM_COLUMNS, source)?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| unreadable(source, e))?;
        let row = row_number(&record, idx);
        let number = |col: usize, name: &'static str| {
            let raw = field(&record, col);
            parse_amount(raw).ok_or_else(|| invalid(source, row, name, raw))
        };

        rows.push(CustomerRfm {
            customer_id: field(&record, id).to_string(),
            recency: number(recency, RFM_COLUMNS[1])?,
            frequency: number(frequency, RFM_COLUMNS[2])?,
            monetary: number(monetary, RFM_COLUMNS[3])?,
            segment: field(&record, segment).to_string(),
        });
    }
    Ok(rows)
}

/// Parse a purchase timestamp; a bare date is read as midnight
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Blank cells are missing values and count as zero in sums
fn parse_amount(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return Some(0.0);
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::data_load(path, LoadErrorKind::MissingFile),
        _ => Error::data_load(path, LoadErrorKind::Unreadable(e.to_string())),
    })
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

fn locate_columns<R: Read, const N: usize>(
    reader: &mut csv::Reader<R>,
    names: [&'static str; N],
    source: &Path,
) -> Result<[usize; N]> {
    let headers = reader.headers().map_err(|e| unreadable(source, e))?.clone();
    let mut positions = [0usize; N];
    for (slot, name) in positions.iter_mut().zip(names) {
        *slot = headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
            .ok_or_else(|| Error::data_load(source, LoadErrorKind::MissingColumn(name)))?;
    }
    Ok(positions)
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

fn row_number(record: &StringRecord, idx: usize) -> u64 {
    record
        .position()
        .map(|p| p.line())
        .unwrap_or(idx as u64 + 2)
}

fn unreadable(source: &Path, err: csv::Error) -> Error {
    Error::data_load(source, LoadErrorKind::Unreadable(err.to_string()))
}

fn invalid(source: &Path, row: u64, column: &'static str, value: &str) -> Error {
    Error::data_load(
        source,
        LoadErrorKind::InvalidValue {
            row,
            column,
            value: value.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn src() -> &'static Path {
        Path::new("test.csv")
    }

    #[test]
    fn test_parse_transactions_ignores_extra_columns() {
        let csv = "order_id,customer_id,customer_state,order_purchase_timestamp,payment_value,product_category\n\
                   o1,c1,SP,2017-10-02 10:56:33,18.12,housewares\n\
                   o2,c2,RJ,2018-07-24 20:41:37,141.46,perfumery\n";
        let rows = parse_transactions(Cursor::new(csv), src()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].customer_id, "c1");
        assert_eq!(rows[1].customer_state, "RJ");
        assert_eq!(
            rows[1].purchase_date(),
            NaiveDate::from_ymd_opt(2018, 7, 24).unwrap()
        );
        assert!((rows[1].payment_value - 141.46).abs() < 1e-9);
    }

    #[test]
    fn test_parse_transactions_missing_column() {
        let csv = "customer_id,customer_state,payment_value\nc1,SP,10\n";
        let err = parse_transactions(Cursor::new(csv), src()).unwrap_err();
        assert!(matches!(
            err,
            Error::DataLoad {
                kind: LoadErrorKind::MissingColumn("order_purchase_timestamp"),
                ..
            }
        ));
    }

    #[test]
    fn test_parse_transactions_bad_timestamp_reports_row() {
        let csv = "customer_id,customer_state,order_purchase_timestamp,payment_value\n\
                   c1,SP,2017-10-02 10:56:33,1\n\
                   c2,SP,yesterday,2\n";
        let err = parse_transactions(Cursor::new(csv), src()).unwrap_err();
        match err {
            Error::DataLoad {
                kind: LoadErrorKind::InvalidValue { row, column, value },
                ..
            } => {
                assert_eq!(row, 3);
                assert_eq!(column, "order_purchase_timestamp");
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_payment_counts_as_zero() {
        let csv = "customer_id,customer_state,order_purchase_timestamp,payment_value\n\
                   c1,SP,2017-10-02,\n";
        let rows = parse_transactions(Cursor::new(csv), src()).unwrap();
        assert_eq!(rows[0].payment_value, 0.0);
    }

    #[test]
    fn test_parse_rfm() {
        let csv = "customer_id,recency,frequency,monetary,R_score,segment\n\
                   c1, 12, 1, 300.5,4, Champions\n\
                   c2,400,2,700,1,At Risk\n";
        let rows = parse_rfm(Cursor::new(csv), src()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].segment, "Champions");
        assert_eq!(rows[0].recency, 12.0);
        assert_eq!(rows[1].monetary, 700.0);
        assert_eq!(rows[1].segment, "At Risk");
    }

    #[test]
    fn test_parse_rfm_non_numeric_monetary() {
        let csv = "customer_id,recency,frequency,monetary,segment\nc1,1,1,lots,A\n";
        let err = parse_rfm(Cursor::new(csv), src()).unwrap_err();
        assert!(err.to_string().contains("invalid monetary value 'lots'"));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2018, 1, 5).unwrap();
        for raw in [
            "2018-01-05 08:30:00",
            "2018-01-05T08:30:00",
            "2018-01-05 08:30:00.250",
            "2018-01-05 08:30",
            "2018-01-05",
        ] {
            let parsed = parse_timestamp(raw).unwrap_or_else(|| panic!("failed on {raw}"));
            assert_eq!(parsed.date(), expected);
        }
        assert!(parse_timestamp("05/01/2018").is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_rfm(Path::new("/definitely/not/here/rfm.csv")).unwrap_err();
        assert!(matches!(
            err,
            Error::DataLoad {
                kind: LoadErrorKind::MissingFile,
                ..
            }
        ));
    }
}
