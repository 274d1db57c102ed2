use std::error::Error;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use super::{write_report, Report};
use crate::{
    dto::{StatusRow, Transaction},
    Engine,
};

use csv_async::{AsyncReaderBuilder, Error as CsvError, Trim};
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_stream::StreamExt;

/// Channel capacity and the cap on inserts in flight at once.
const BUFFER_SIZE: usize = 1024;

type Result<T, E = Box<dyn Error + Send + Sync>> = std::result::Result<T, E>;

/// Loads the transactions of the given input file concurrently and writes the
/// selected report to the provided writer.
/// Spawns two tasks:
/// * CSV reader - streams transactions from the input file, deserializes them and sends them to the dispatcher via channel.
/// * Dispatcher - receives transactions from the channel and inserts each one on the blocking pool, so inserts race freely.
///   At most `BUFFER_SIZE` inserts run at once; past that the dispatcher stops reading the channel until one finishes.
///
/// Inserts may land in any order. For input without duplicate ids or cycles the
/// report is the same as the one of the sync runner.
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
/// * An insert task panics
/// * Writing to the output fails
pub async fn run<P, W>(input_path: P, report: Report, writer: W) -> Result<()>
where
    P: AsRef<Path>,
    W: Write,
{
    // Create channel for passing transactions from reader to dispatcher
    let (tx, rx) = mpsc::channel(BUFFER_SIZE);
    let input_path = input_path.as_ref().to_owned();
    let engine = Arc::new(Engine::new());

    let reader_handle = tokio::spawn(read_transactions(input_path, tx));
    let dispatcher_handle = tokio::spawn(insert_transactions(
        Arc::clone(&engine),
        rx,
        BUFFER_SIZE,
    ));

    // Wait for reader to finish and propagate any errors
    reader_handle.await??;

    let statuses = dispatcher_handle.await??;
    write_report(&engine, statuses, report, writer)?;
    Ok(())
}

/// Reads and deserializes transactions from a CSV file.
/// Returns them, numbered from 1 in file order, through the provided channel.
async fn read_transactions(
    input_path: impl AsRef<Path> + Send,
    tx: mpsc::Sender<(usize, Transaction)>,
) -> Result<(), CsvError> {
    let file = File::open(input_path).await?;
    let mut csv_reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .create_deserializer(file);

    let mut records = csv_reader.deserialize::<Transaction>();
    let mut row = 0;
    while let Some(result) = records.next().await {
        match result {
            Ok(transaction) => {
                row += 1;
                if tx.send((row, transaction)).await.is_err() {
                    // Receiver dropped, exit gracefully
                    break;
                }
            }
            // CSV parsing errors are critical - propagate them
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Inserts every transaction received through the channel on its own blocking
/// task, keeping at most `max_in_flight` of them running. Returns one status
/// per row in input order once the reader closes the channel.
async fn insert_transactions(
    engine: Arc<Engine>,
    mut rx: mpsc::Receiver<(usize, Transaction)>,
    max_in_flight: usize,
) -> Result<Vec<StatusRow>, JoinError> {
    let mut inserts = JoinSet::new();
    let mut statuses = Vec::new();

    while let Some((row, transaction)) = rx.recv().await {
        if inserts.len() >= max_in_flight {
            if let Some(status) = inserts.join_next().await {
                statuses.push(status?);
            }
        }
        let engine = Arc::clone(&engine);
        inserts.spawn_blocking(move || {
            let id = transaction.id;
            StatusRow::new(row, id, engine.insert(transaction))
        });
    }

    while let Some(status) = inserts.join_next().await {
        statuses.push(status?);
    }
    statuses.sort_unstable_by_key(|status| status.row);
    Ok(statuses)
}
