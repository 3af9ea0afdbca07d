// src/process/chunk.rs

use anyhow::{Context, Result};
use arrow::csv::ReaderBuilder;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use flate2::read::GzDecoder;
use std::io::Read;

use crate::schema::trip_schema;

/// Build a chunking reader over a gzip-compressed trip record CSV.
///
/// Decompression and parsing are incremental: nothing is pulled from
/// `input` until the iterator is advanced, and each step yields one
/// `RecordBatch` of at most `chunk_size` rows, coerced to the declared
/// trip schema. A cell that cannot be coerced (or a malformed line)
/// surfaces as an `Err` item and ends the run.
pub fn trip_chunks<R: Read>(
    input: R,
    chunk_size: usize,
) -> Result<impl Iterator<Item = Result<RecordBatch, ArrowError>>> {
    let reader = ReaderBuilder::new(trip_schema())
        .with_header(true)
        .with_batch_size(chunk_size)
        .build(GzDecoder::new(input))
        .context("building CSV reader")?;
    Ok(reader)
}
