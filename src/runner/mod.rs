//! The runner is responsible for setting up a file stream for reading from CSV,
//! inserting the transactions into an [`Engine`](crate::Engine), and writing
//! the selected [`Report`] to a writer.
//!
//! This module provides both a synchronous and an asynchronous runner implementations.
//!
mod async_runner;
mod sync_runner;

use std::io::Write;
use std::str::FromStr;
use tracing::info;

pub use async_runner::run as run_async;
pub use sync_runner::run;

use crate::{csv_utils::write_csv, dto::StatusRow, Engine};

/// Which report a run writes once all rows are loaded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// `id,amount,type,parent_id,sum` per stored transaction, ordered by id.
    #[default]
    Sums,
    /// `type,ids` per type label, ordered by label.
    Types,
    /// `row,id,status,reason` per input row, in input order.
    Statuses,
}

impl FromStr for Report {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sums" => Ok(Report::Sums),
            "types" => Ok(Report::Types),
            "status" | "statuses" => Ok(Report::Statuses),
            other => Err(format!("unknown report: {}", other)),
        }
    }
}

/// Logs the run summary and writes the requested report.
/// `statuses` must be in input order.
fn write_report<W: Write>(
    engine: &Engine,
    statuses: Vec<StatusRow>,
    report: Report,
    writer: W,
) -> csv::Result<()> {
    let inserted = statuses.iter().filter(|status| status.is_ok()).count();
    info!(
        inserted,
        rejected = statuses.len() - inserted,
        "loaded transactions"
    );

    match report {
        Report::Sums => write_csv(writer, engine.sums()),
        Report::Types => write_csv(writer, engine.type_rows()),
        Report::Statuses => write_csv(writer, statuses.into_iter()),
    }
}
