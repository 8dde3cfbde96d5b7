use crate::aggregate;
use crate::data::Dataset;
use crate::error::Result;
use crate::filter::{SegmentSelection, filter_segments};
use crate::format::{format_amount, group_thousands};
use std::io::{self, Write};

/// Run the segments command - what the filters can choose from
pub fn run(dataset: &Dataset) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_segments(dataset, &mut out)
}

pub fn write_segments<W: Write>(dataset: &Dataset, out: &mut W) -> Result<()> {
    match dataset.bounds {
        Some(b) => writeln!(out, "# Purchase dates: {} .. {}", b.min, b.max)?,
        None => writeln!(out, "# Purchase dates: none")?,
    }
    writeln!(
        out,
        "# {} transactions | {} customers",
        group_thousands(dataset.transactions.len() as u64),
        group_thousands(dataset.customers.len() as u64)
    )?;
    writeln!(out)?;

    let customers = filter_segments(&dataset.customers, &SegmentSelection::All);
    let counts = aggregate::segment_counts(&customers);
    if counts.is_empty() {
        writeln!(out, "No segments found in {}", dataset.paths.rfm.display())?;
        return Ok(());
    }

    let revenue = aggregate::segment_revenue(&customers);
    writeln!(out, "{:<28} {:>10} {:>16}", "SEGMENT", "CUSTOMERS", "REVENUE")?;
    writeln!(out, "{}", "-".repeat(56))?;
    for c in counts {
        let total = revenue
            .iter()
            .find(|r| r.segment == c.segment)
            .map(|r| r.revenue)
            .unwrap_or(0.0);
        writeln!(
            out,
            "{:<28} {:>10} {:>16}",
            c.segment,
            group_thousands(c.customers as u64),
            format_amount(total)
        )?;
    }

    Ok(())
}
