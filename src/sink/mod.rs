// src/sink/mod.rs

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDateTime};
use futures::pin_mut;
use tokio_postgres::binary_copy::BinaryCopyInWriter;
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use tokio_postgres::Client;
use tracing::debug;

use crate::schema::pg;

/// One cell of a chunk, in the representation handed to the COPY writer.
#[derive(Debug, Clone, PartialEq)]
pub enum PgValue {
    Int(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
    Timestamp(Option<NaiveDateTime>),
}

impl ToSql for PgValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            PgValue::Int(v) => v.to_sql(ty, out),
            PgValue::Float(v) => v.to_sql(ty, out),
            PgValue::Text(v) => v.to_sql(ty, out),
            PgValue::Timestamp(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        ty == &Type::INT8 || ty == &Type::FLOAT8 || ty == &Type::TEXT || ty == &Type::TIMESTAMP
    }

    to_sql_checked!();
}

/// Flatten a `RecordBatch` into per-row COPY values, column order preserved.
pub fn batch_rows(batch: &RecordBatch) -> Result<Vec<Vec<PgValue>>> {
    let mut rows: Vec<Vec<PgValue>> = (0..batch.num_rows())
        .map(|_| Vec::with_capacity(batch.num_columns()))
        .collect();

    for (idx, field) in batch.schema().fields().iter().enumerate() {
        let column = batch.column(idx);
        match field.data_type() {
            DataType::Int64 => {
                let array = column
                    .as_any()
                    .downcast_ref::<Int64Array>()
                    .ok_or_else(|| anyhow!("column {} is not Int64", field.name()))?;
                for (row, value) in rows.iter_mut().zip(array.iter()) {
                    row.push(PgValue::Int(value));
                }
            }
            DataType::Float64 => {
                let array = column
                    .as_any()
                    .downcast_ref::<Float64Array>()
                    .ok_or_else(|| anyhow!("column {} is not Float64", field.name()))?;
                for (row, value) in rows.iter_mut().zip(array.iter()) {
                    row.push(PgValue::Float(value));
                }
            }
            DataType::Utf8 => {
                let array = column
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| anyhow!("column {} is not Utf8", field.name()))?;
                for (row, value) in rows.iter_mut().zip(array.iter()) {
                    row.push(PgValue::Text(value.map(str::to_string)));
                }
            }
            DataType::Timestamp(TimeUnit::Microsecond, None) => {
                let array = column
                    .as_any()
                    .downcast_ref::<TimestampMicrosecondArray>()
                    .ok_or_else(|| anyhow!("column {} is not Timestamp(µs)", field.name()))?;
                for (row, value) in rows.iter_mut().zip(array.iter()) {
                    let ts = match value {
                        Some(micros) => Some(
                            DateTime::from_timestamp_micros(micros)
                                .with_context(|| {
                                    format!("timestamp out of range in {}", field.name())
                                })?
                                .naive_utc(),
                        ),
                        None => None,
                    };
                    row.push(PgValue::Timestamp(ts));
                }
            }
            other => bail!("unsupported column type {other} in {}", field.name()),
        }
    }

    Ok(rows)
}

/// Whether the destination table has been established yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    Uninitialized,
    Initialized,
}

/// Append-only loader for one Postgres table.
///
/// The first chunk written replaces the table: any previous table of the
/// same name is dropped and an empty one is created from the chunk's
/// column layout. That chunk's rows, and every chunk after it, are then
/// appended via binary COPY. One COPY per chunk; there is no transaction
/// spanning chunks, so a failed run leaves the rows of the chunks that
/// already completed.
pub struct TableSink {
    client: Client,
    table: String,
    state: SinkState,
    total_rows: u64,
}

impl TableSink {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            state: SinkState::Uninitialized,
            total_rows: 0,
        }
    }

    pub fn state(&self) -> SinkState {
        self.state
    }

    /// Rows appended so far across all chunks.
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    /// Write one chunk, establishing the table first if this is the
    /// initial chunk. Returns the number of rows appended.
    pub async fn write(&mut self, batch: &RecordBatch) -> Result<u64> {
        if self.state == SinkState::Uninitialized {
            self.replace_table(&batch.schema()).await?;
            self.state = SinkState::Initialized;
        }
        let appended = self.append(batch).await?;
        self.total_rows += appended;
        Ok(appended)
    }

    /// Drop any previous table of this name and create a fresh, empty one
    /// with the chunk's column layout. Writes zero data rows.
    async fn replace_table(&self, schema: &Schema) -> Result<()> {
        let drop = pg::drop_table_sql(&self.table);
        self.client
            .execute(drop.as_str(), &[])
            .await
            .with_context(|| format!("dropping table {}", self.table))?;

        let create = pg::create_table_sql(&self.table, schema)?;
        self.client
            .execute(create.as_str(), &[])
            .await
            .with_context(|| format!("creating table {}", self.table))?;

        debug!(table = %self.table, "table replaced");
        Ok(())
    }

    async fn append(&self, batch: &RecordBatch) -> Result<u64> {
        let schema = batch.schema();
        let types = pg::copy_types(&schema)?;
        let sql = pg::copy_sql(&self.table, &schema);

        let copy = self
            .client
            .copy_in(sql.as_str())
            .await
            .with_context(|| format!("starting COPY into {}", self.table))?;
        let writer = BinaryCopyInWriter::new(copy, &types);
        pin_mut!(writer);

        for row in batch_rows(batch)? {
            let values: Vec<&(dyn ToSql + Sync)> =
                row.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
            writer
                .as_mut()
                .write(&values)
                .await
                .context("writing row to COPY stream")?;
        }

        let appended = writer.finish().await.context("finishing COPY")?;
        Ok(appended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::Field;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn sample_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, true),
            Field::new("amount", DataType::Float64, true),
            Field::new("flag", DataType::Utf8, true),
            Field::new(
                "at",
                DataType::Timestamp(TimeUnit::Microsecond, None),
                true,
            ),
        ]));
        let at = NaiveDate::from_ymd_opt(2021, 1, 8)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
            .and_utc()
            .timestamp_micros();
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![Some(1), None])),
                Arc::new(Float64Array::from(vec![Some(9.5), Some(0.0)])),
                Arc::new(StringArray::from(vec![Some("N"), None])),
                Arc::new(TimestampMicrosecondArray::from(vec![Some(at), None])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn batch_rows_preserves_values_and_nulls() {
        let rows = batch_rows(&sample_batch()).unwrap();
        assert_eq!(rows.len(), 2);

        let at = NaiveDate::from_ymd_opt(2021, 1, 8)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(
            rows[0],
            vec![
                PgValue::Int(Some(1)),
                PgValue::Float(Some(9.5)),
                PgValue::Text(Some("N".to_string())),
                PgValue::Timestamp(Some(at)),
            ]
        );
        assert_eq!(
            rows[1],
            vec![
                PgValue::Int(None),
                PgValue::Float(Some(0.0)),
                PgValue::Text(None),
                PgValue::Timestamp(None),
            ]
        );
    }

    #[test]
    fn batch_rows_rejects_undeclared_types() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "flag",
            DataType::Boolean,
            true,
        )]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(arrow::array::BooleanArray::from(vec![true]))],
        )
        .unwrap();
        assert!(batch_rows(&batch).is_err());
    }

    #[test]
    fn copy_values_accept_their_wire_types() {
        assert!(PgValue::accepts(&Type::INT8));
        assert!(PgValue::accepts(&Type::FLOAT8));
        assert!(PgValue::accepts(&Type::TEXT));
        assert!(PgValue::accepts(&Type::TIMESTAMP));
        assert!(!PgValue::accepts(&Type::BOOL));
    }
}
