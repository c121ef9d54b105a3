use crate::expense::Expense;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

const CSV_HEADER: [&str; 3] = ["name", "amount", "type"];

/// Write expenses as CSV with a `name,amount,type` header. Returns rows written.
pub fn write_csv<W: Write>(expenses: &[Expense], writer: W) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);

    // Header goes out even when there are no rows
    wtr.write_record(CSV_HEADER).context("Failed to write CSV header")?;

    for expense in expenses {
        wtr.serialize(expense).context("Failed to serialize expense")?;
    }
    wtr.flush().context("Failed to flush CSV writer")?;

    Ok(expenses.len())
}

pub fn export_csv(expenses: &[Expense], path: &Path) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file: {:?}", path))?;
    write_csv(expenses, file)
}
