use chrono::NaiveDate;
use shopdash::cli::ReportPage;
use shopdash::commands::query::{QueryOptions, write_query};
use shopdash::commands::report::{OutputFormat, write_report};
use shopdash::commands::segments::write_segments;
use shopdash::config::DataPaths;
use shopdash::data::{DataCache, Dataset};
use shopdash::error::{Error, LoadErrorKind};
use shopdash::filter::SegmentSelection;
use shopdash::pipeline::{self, FilterParams};
use shopdash::storage;
use std::fs;
use tempfile::TempDir;

const TRANSACTIONS: &str = "\
order_id,customer_id,customer_state,order_purchase_timestamp,payment_value
o1,c1,SP,2017-03-01 10:00:00,100.00
o2,c2,SP,2017-06-15 12:30:00,250.50
o3,c3,RJ,2018-01-20 09:00:00,80.00
o4,c4,MG,2018-08-29 18:45:00,40.00
";

const RFM: &str = "\
customer_id,recency,frequency,monetary,segment
c1,10,3,600,Champions
c2,120,1,250.5,At Risk
c3,30,2,160,Champions
c4,5,1,40,New Customers
";

fn write_fixture(transactions: &str, rfm: &str) -> (TempDir, DataPaths) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("full_df.csv"), transactions).unwrap();
    fs::write(dir.path().join("rfm.csv"), rfm).unwrap();
    let paths = DataPaths::in_dir(dir.path());
    (dir, paths)
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_load_from_directory() {
    let (_dir, paths) = write_fixture(TRANSACTIONS, RFM);
    let dataset = Dataset::load(&paths).unwrap();

    assert_eq!(dataset.transactions.len(), 4);
    assert_eq!(dataset.customers.len(), 4);
    let bounds = dataset.bounds.unwrap();
    assert_eq!(bounds.min, date("2017-03-01"));
    assert_eq!(bounds.max, date("2018-08-29"));
}

#[test]
fn test_cache_reads_disk_once() {
    let (dir, paths) = write_fixture(TRANSACTIONS, RFM);
    let mut cache = DataCache::new();
    let first = cache.get_or_load(&paths).unwrap();

    // A second load must not touch the files again
    fs::remove_file(dir.path().join("full_df.csv")).unwrap();
    let second = cache.get_or_load(&paths).unwrap();

    assert!(std::rc::Rc::ptr_eq(&first, &second));
    assert_eq!(cache.disk_loads(), 1);
}

#[test]
fn test_full_range_dashboard() {
    let (_dir, paths) = write_fixture(TRANSACTIONS, RFM);
    let dataset = Dataset::load(&paths).unwrap();
    let view = pipeline::render(&dataset, &FilterParams::default(), 10);

    assert_eq!(view.summary.distinct_customers, 4);
    assert_eq!(view.summary.total_monetary, 1050.5);
    assert_eq!(view.summary.distinct_segments, 3);

    assert_eq!(view.segment_counts[0].segment, "Champions");
    assert_eq!(view.segment_counts[0].customers, 2);

    let states: Vec<_> = view
        .top_states_by_customers
        .iter()
        .map(|s| (s.state.as_str(), s.customers))
        .collect();
    assert_eq!(states, [("SP", 2), ("MG", 1), ("RJ", 1)]);

    let revenue: Vec<_> = view
        .top_states_by_revenue
        .iter()
        .map(|s| s.state.as_str())
        .collect();
    assert_eq!(revenue, ["SP", "RJ", "MG"]);
}

#[test]
fn test_date_range_limits_state_charts_only() {
    let (_dir, paths) = write_fixture(TRANSACTIONS, RFM);
    let dataset = Dataset::load(&paths).unwrap();
    let params = FilterParams {
        start: Some(date("2018-01-01")),
        end: Some(date("2018-12-31")),
        segments: SegmentSelection::All,
    };
    let view = pipeline::render(&dataset, &params, 10);

    let range = view.range.unwrap();
    assert_eq!(range.end, date("2018-08-29"));
    assert_eq!(view.transactions_in_range, 2);
    assert_eq!(view.top_states_by_revenue.len(), 2);
    // Customer metrics come from the RFM table, not the date filter
    assert_eq!(view.summary.distinct_customers, 4);
}

#[test]
fn test_segment_filter_and_top_n() {
    let (_dir, paths) = write_fixture(TRANSACTIONS, RFM);
    let dataset = Dataset::load(&paths).unwrap();
    let params = FilterParams {
        segments: SegmentSelection::only(["Champions"]),
        ..FilterParams::default()
    };
    let view = pipeline::render(&dataset, &params, 1);

    assert_eq!(view.summary.distinct_customers, 2);
    assert_eq!(view.summary.total_monetary, 760.0);
    assert_eq!(view.segment_counts.len(), 1);
    assert_eq!(view.top_states_by_customers.len(), 1);
    assert_eq!(view.top_states_by_customers[0].state, "SP");
}

#[test]
fn test_range_after_last_purchase_is_empty() {
    let (_dir, paths) = write_fixture(TRANSACTIONS, RFM);
    let dataset = Dataset::load(&paths).unwrap();
    let params = FilterParams {
        start: Some(date("2030-01-01")),
        end: Some(date("2030-01-01")),
        segments: SegmentSelection::All,
    };
    let view = pipeline::render(&dataset, &params, 10);

    assert_eq!(view.transactions_in_range, 0);
    assert!(view.top_states_by_customers.is_empty());
    assert!(view.top_states_by_revenue.is_empty());
}

#[test]
fn test_inverted_range_warns() {
    let (_dir, paths) = write_fixture(TRANSACTIONS, RFM);
    let dataset = Dataset::load(&paths).unwrap();
    let params = FilterParams {
        start: Some(date("2018-06-01")),
        end: Some(date("2017-06-01")),
        segments: SegmentSelection::All,
    };
    let view = pipeline::render(&dataset, &params, 10);

    assert!(view.warning.is_some());
    assert_eq!(view.transactions_in_range, 4);
}

#[test]
fn test_missing_column_reported() {
    let transactions = "customer_id,customer_state,order_purchase_timestamp\n\
                        c1,SP,2017-03-01 10:00:00\n";
    let (_dir, paths) = write_fixture(transactions, RFM);
    let err = Dataset::load(&paths).unwrap_err();

    assert!(matches!(
        err,
        Error::DataLoad {
            kind: LoadErrorKind::MissingColumn("payment_value"),
            ..
        }
    ));
    assert_eq!(err.exit_code(), shopdash::error::exit_code::DATA_LOAD_ERROR);
}

#[test]
fn test_missing_file_reported() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::in_dir(dir.path());
    let err = Dataset::load(&paths).unwrap_err();

    assert!(matches!(
        err,
        Error::DataLoad {
            kind: LoadErrorKind::MissingFile,
            ..
        }
    ));
    assert!(err.to_string().contains("full_df.csv"));
}

#[test]
fn test_sql_agrees_with_aggregator() {
    let (_dir, paths) = write_fixture(TRANSACTIONS, RFM);
    let dataset = Dataset::load(&paths).unwrap();
    let conn = storage::open_in_memory(&dataset).unwrap();

    let mut out = Vec::new();
    write_query(
        &conn,
        "SELECT customer_state, SUM(payment_value) AS revenue
         FROM transactions GROUP BY customer_state ORDER BY revenue DESC",
        QueryOptions::default(),
        &mut out,
    )
    .unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        "customer_state\trevenue\nSP\t350.50\nRJ\t80.00\nMG\t40.00\n"
    );

    assert_eq!(
        storage::get_meta(&conn, "min_date").unwrap().as_deref(),
        Some("2017-03-01")
    );
}

#[test]
fn test_bad_sql_is_database_error() {
    let (_dir, paths) = write_fixture(TRANSACTIONS, RFM);
    let dataset = Dataset::load(&paths).unwrap();
    let conn = storage::open_in_memory(&dataset).unwrap();

    let err = write_query(
        &conn,
        "SELECT * FROM orders",
        QueryOptions::default(),
        &mut Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Database(_)));
}

#[test]
fn test_segments_listing() {
    let (_dir, paths) = write_fixture(TRANSACTIONS, RFM);
    let dataset = Dataset::load(&paths).unwrap();

    let mut out = Vec::new();
    write_segments(&dataset, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("2017-03-01 .. 2018-08-29"));
    assert!(text.contains("Champions"));
    assert!(text.contains("New Customers"));
}

#[test]
fn test_report_json_round_trips_through_serde() {
    let (_dir, paths) = write_fixture(TRANSACTIONS, RFM);
    let dataset = Dataset::load(&paths).unwrap();
    let view = pipeline::render(&dataset, &FilterParams::default(), 10);

    let mut out = Vec::new();
    write_report(&mut out, &view, ReportPage::Customers, OutputFormat::Json).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(json["summary"]["distinct_customers"], 4);
}
