use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use super::RequestProcessor;
use crate::csv_utils::{write_csv, COMMENT};
use crate::dto::{Request, ResultRow};

use csv_async::{AsyncReaderBuilder, Error as CsvError, Trim};
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

const BUFFER_SIZE: usize = 1024;

/// Runs the ledger engine async on the given request log and writes results to the provided writer.
/// Spawns two tasks:
/// * CSV reader - streams records from the input file, turns them into requests and sends them to the processor via channel.
/// * Processor - receives requests from the channel and executes them until the channel is closed.
///
/// Produces exactly the same output as the synchronous [`run`](super::run).
///
/// # Arguments
/// * `input_path` - Path to the input CSV file containing requests
/// * `writer` - Where to write the per-request results (e.g. stdout)
///
/// # Errors
/// Returns an error if:
/// * The input file cannot be read
/// * The CSV is malformed
/// * Writing to the output fails
pub async fn run<P, W>(input_path: P, writer: W) -> Result<()>
where
    P: AsRef<Path>,
    W: Write,
{
    // Create channel for passing requests from reader to processor
    let (tx, rx) = mpsc::channel(BUFFER_SIZE);
    let input_path = input_path.as_ref().to_owned();

    let reader_handle = tokio::spawn(read_requests(input_path, tx));
    let processor_handle = tokio::spawn(process_requests(rx));

    // Wait for reader to finish and propagate any errors
    reader_handle
        .await
        .context("request reader task failed")?
        .context("failed to read request log")?;

    let rows = processor_handle
        .await
        .context("request processor task failed")?;

    write_csv(writer, &ResultRow::HEADER, rows.into_iter())?;
    Ok(())
}

/// Reads request records from a CSV file.
/// Returns them through the provided channel.
async fn read_requests(
    input_path: impl AsRef<Path> + Send,
    tx: mpsc::Sender<Request>,
) -> Result<(), CsvError> {
    let file = File::open(input_path).await?;
    let mut csv_reader = AsyncReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(COMMENT))
        .trim(Trim::All)
        .create_reader(file);

    let mut records = csv_reader.records();
    while let Some(result) = records.next().await {
        // CSV parsing errors are critical - propagate them
        let record = result?;
        let Some(request) = Request::from_fields(record.iter()) else {
            continue;
        };
        if tx.send(request).await.is_err() {
            // Receiver dropped, exit gracefully
            break;
        }
    }
    Ok(())
}

/// Executes requests received through the channel.
/// Returns the result rows once the channel is closed by the reader.
async fn process_requests(mut rx: mpsc::Receiver<Request>) -> Vec<ResultRow> {
    let mut processor = RequestProcessor::new();
    let mut rows = Vec::new();
    while let Some(request) = rx.recv().await {
        rows.push(processor.process(&request));
    }
    rows
}
