use std::error::Error;
use std::io::Write;
use std::path::Path;

use super::{write_report, Report};
use crate::{
    csv_utils::read_csv,
    dto::{StatusRow, Transaction},
    Engine,
};

/// Loads the transactions of the given input file in file order and writes
/// the selected report to the provided writer.
///
/// # Arguments
/// * `input_path` - Path to the input CSV file containing transactions
/// * `report` - Which report to write
/// * `writer` - Where to write the report (e.g. stdout)
///
/// # Errors
/// Returns an error if:
/// * The input file cannot be read
/// * The CSV is malformed
/// * Writing to the output fails
pub fn run<P, W>(input_path: P, report: Report, writer: W) -> Result<(), Box<dyn Error>>
where
    P: AsRef<Path>,
    W: Write,
{
    let engine = Engine::new();
    let mut statuses = Vec::new();

    for (index, transaction) in read_csv::<Transaction, _>(input_path)?.enumerate() {
        // CSV parsing errors are critical - propagate them
        let transaction = transaction?;
        let id = transaction.id;
        // Rejected transactions are logged by the engine and skipped
        statuses.push(StatusRow::new(index + 1, id, engine.insert(transaction)));
    }

    write_report(&engine, statuses, report, writer)?;
    Ok(())
}
