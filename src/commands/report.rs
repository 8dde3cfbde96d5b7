use crate::aggregate::{
    SegmentCount, SegmentRevenue, StateCustomers, StateRevenue, SummaryMetrics,
};
use crate::cli::ReportPage;
use crate::data::Dataset;
use crate::error::Result;
use crate::filter::{DateRange, SegmentSelection};
use crate::format::{format_amount, group_thousands};
use crate::pipeline::{self, FilterParams, ViewModel};
use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

pub fn run(
    dataset: &Dataset,
    params: &FilterParams,
    top_n: usize,
    page: ReportPage,
    format: OutputFormat,
) -> Result<()> {
    let view = pipeline::render(dataset, params, top_n);
    if let Some(warning) = &view.warning {
        eprintln!("Warning: {warning}");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, &view, page, format)
}

pub fn write_report<W: Write>(
    out: &mut W,
    view: &ViewModel,
    page: ReportPage,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => write_tables(out, view, page),
        OutputFormat::Json => write_json(out, view, page),
        OutputFormat::Csv => write_csv(out, view, page),
    }
}

fn shows_customers(page: ReportPage) -> bool {
    matches!(page, ReportPage::All | ReportPage::Customers)
}

fn shows_states(page: ReportPage) -> bool {
    matches!(page, ReportPage::All | ReportPage::States)
}

fn write_tables<W: Write>(out: &mut W, view: &ViewModel, page: ReportPage) -> Result<()> {
    // Header comment
    match view.range {
        Some(r) => writeln!(out, "# Range: {} .. {} ({} days)", r.start, r.end, r.days())?,
        None => writeln!(out, "# Range: no transactions")?,
    }
    writeln!(out, "# Segments: {}", view.segments.describe())?;
    writeln!(out)?;

    if shows_customers(page) {
        let s = &view.summary;
        writeln!(
            out,
            "Customers: {} | Revenue: {} | Segments: {}",
            group_thousands(s.distinct_customers as u64),
            format_amount(s.total_monetary),
            s.distinct_segments
        )?;
        writeln!(out)?;

        let mut table = new_table(&["Segment", "Customers"]);
        for c in &view.segment_counts {
            table.add_row(vec![
                Cell::new(&c.segment),
                right(group_thousands(c.customers as u64)),
            ]);
        }
        writeln!(out, "Customers per segment\n{table}\n")?;

        let mut table = new_table(&["Segment", "Revenue"]);
        for r in &view.segment_revenue {
            table.add_row(vec![Cell::new(&r.segment), right(format_amount(r.revenue))]);
        }
        writeln!(out, "Revenue per segment\n{table}\n")?;
    }

    if shows_states(page) {
        writeln!(
            out,
            "Transactions in range: {}",
            group_thousands(view.transactions_in_range as u64)
        )?;
        writeln!(out)?;

        let mut table = new_table(&["State", "Customers"]);
        for s in &view.top_states_by_customers {
            table.add_row(vec![
                Cell::new(&s.state),
                right(group_thousands(s.customers as u64)),
            ]);
        }
        writeln!(out, "Top states by customers\n{table}\n")?;

        let mut table = new_table(&["State", "Revenue"]);
        for s in &view.top_states_by_revenue {
            table.add_row(vec![Cell::new(&s.state), right(format_amount(s.revenue))]);
        }
        writeln!(out, "Top states by revenue\n{table}")?;
    }

    Ok(())
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED).set_header(headers.to_vec());
    table
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    range: Option<DateRange>,
    segments: &'a SegmentSelection,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a SummaryMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    segment_counts: Option<&'a [SegmentCount]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    segment_revenue: Option<&'a [SegmentRevenue]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transactions_in_range: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_states_by_customers: Option<&'a [StateCustomers]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_states_by_revenue: Option<&'a [StateRevenue]>,
}

fn write_json<W: Write>(out: &mut W, view: &ViewModel, page: ReportPage) -> Result<()> {
    let customers = shows_customers(page);
    let states = shows_states(page);
    let report = JsonReport {
        range: view.range,
        segments: &view.segments,
        warning: view.warning.as_deref(),
        summary: customers.then_some(&view.summary),
        segment_counts: customers.then_some(view.segment_counts.as_slice()),
        segment_revenue: customers.then_some(view.segment_revenue.as_slice()),
        transactions_in_range: states.then_some(view.transactions_in_range),
        top_states_by_customers: states.then_some(view.top_states_by_customers.as_slice()),
        top_states_by_revenue: states.then_some(view.top_states_by_revenue.as_slice()),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

/// Long format: one `table,label,value` line per result row
#[derive(Serialize)]
struct CsvRow<'a> {
    table: &'static str,
    label: &'a str,
    value: String,
}

fn write_csv<W: Write>(out: &mut W, view: &ViewModel, page: ReportPage) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    let mut row = |table: &'static str, label: &str, value: String| {
        writer.serialize(CsvRow {
            table,
            label,
            value,
        })
    };

    if shows_customers(page) {
        let s = &view.summary;
        row("summary", "distinct_customers", s.distinct_customers.to_string())?;
        row("summary", "total_monetary", format!("{:.2}", s.total_monetary))?;
        row("summary", "distinct_segments", s.distinct_segments.to_string())?;
        for c in &view.segment_counts {
            row("segment_counts", &c.segment, c.customers.to_string())?;
        }
        for r in &view.segment_revenue {
            row("segment_revenue", &r.segment, format!("{:.2}", r.revenue))?;
        }
    }
    if shows_states(page) {
        for s in &view.top_states_by_customers {
            row("top_states_by_customers", &s.state, s.customers.to_string())?;
        }
        for s in &view.top_states_by_revenue {
            row("top_states_by_revenue", &s.state, format!("{:.2}", s.revenue))?;
        }
    }

    writer.flush()?;
    Ok(())
}
