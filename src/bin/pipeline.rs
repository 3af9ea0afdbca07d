// src/bin/pipeline.rs
//
// Toy pipeline: stamp a month onto a fixed two-row table and write it
// out as `output_{month}.parquet` in the current directory.

use anyhow::{Context, Result};
use arrow::array::Int64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::print_batches;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Parse the optional positional month: absent means 0, anything
/// present must be an integer.
fn parse_month(arg: Option<String>) -> Result<i64> {
    match arg {
        Some(raw) => raw
            .parse::<i64>()
            .with_context(|| format!("month argument `{raw}` is not an integer")),
        None => Ok(0),
    }
}

/// Two fixed rows with a constant `month` column stamped on.
fn month_table(month: i64) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("A", DataType::Int64, false),
        Field::new("B", DataType::Int64, false),
        Field::new("month", DataType::Int64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(vec![1, 2])),
            Arc::new(Int64Array::from(vec![3, 4])),
            Arc::new(Int64Array::from(vec![month, month])),
        ],
    )?;
    Ok(batch)
}

fn write_table(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let month = parse_month(std::env::args().nth(1))?;

    let batch = month_table(month)?;
    print_batches(&[batch.clone()])?;

    let path = format!("output_{month}.parquet");
    write_table(&batch, Path::new(&path))?;
    println!("wrote {} rows to {}", batch.num_rows(), path);
    Ok(())
}
