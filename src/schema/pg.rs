// src/schema/pg.rs

use anyhow::{bail, Result};
use arrow::datatypes::{DataType, Schema};
use tokio_postgres::types::Type;

/// Map an Arrow column type to the Postgres type name used in DDL.
///
/// Covers exactly the types the trip schema declares:
/// - Int64          → BIGINT
/// - Float64        → DOUBLE PRECISION
/// - Utf8           → TEXT
/// - Timestamp(_,_) → TIMESTAMP (naive, no time zone)
pub fn pg_type_name(dt: &DataType) -> Result<&'static str> {
    Ok(match dt {
        DataType::Int64 => "BIGINT",
        DataType::Float64 => "DOUBLE PRECISION",
        DataType::Utf8 => "TEXT",
        DataType::Timestamp(_, None) => "TIMESTAMP",
        other => bail!("no Postgres mapping for Arrow type {other}"),
    })
}

/// Map an Arrow column type to the wire type used by binary COPY.
pub fn pg_type(dt: &DataType) -> Result<Type> {
    Ok(match dt {
        DataType::Int64 => Type::INT8,
        DataType::Float64 => Type::FLOAT8,
        DataType::Utf8 => Type::TEXT,
        DataType::Timestamp(_, None) => Type::TIMESTAMP,
        other => bail!("no Postgres mapping for Arrow type {other}"),
    })
}

/// Wire types for every column of `schema`, in column order.
pub fn copy_types(schema: &Schema) -> Result<Vec<Type>> {
    schema
        .fields()
        .iter()
        .map(|f| pg_type(f.data_type()))
        .collect()
}

pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(table))
}

/// `CREATE TABLE` DDL derived from the chunk schema. All columns are
/// declared without constraints; nullability is the Postgres default.
pub fn create_table_sql(table: &str, schema: &Schema) -> Result<String> {
    let mut columns = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        columns.push(format!(
            "{} {}",
            quote_ident(field.name()),
            pg_type_name(field.data_type())?
        ));
    }
    Ok(format!(
        "CREATE TABLE {} ({})",
        quote_ident(table),
        columns.join(", ")
    ))
}

/// `COPY ... FROM STDIN BINARY` statement listing every column explicitly.
pub fn copy_sql(table: &str, schema: &Schema) -> String {
    let columns: Vec<String> = schema
        .fields()
        .iter()
        .map(|f| quote_ident(f.name()))
        .collect();
    format!(
        "COPY {} ({}) FROM STDIN BINARY",
        quote_ident(table),
        columns.join(", ")
    )
}

/// Double-quote an identifier. Column names like `VendorID` are
/// mixed-case, so they must be quoted everywhere to round-trip.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::trip_schema;
    use arrow::datatypes::TimeUnit;

    #[test]
    fn maps_declared_types() {
        assert_eq!(pg_type_name(&DataType::Int64).unwrap(), "BIGINT");
        assert_eq!(
            pg_type_name(&DataType::Float64).unwrap(),
            "DOUBLE PRECISION"
        );
        assert_eq!(pg_type_name(&DataType::Utf8).unwrap(), "TEXT");
        assert_eq!(
            pg_type_name(&DataType::Timestamp(TimeUnit::Microsecond, None)).unwrap(),
            "TIMESTAMP"
        );
        assert!(pg_type_name(&DataType::Boolean).is_err());
    }

    #[test]
    fn create_table_quotes_mixed_case_columns() {
        let schema = trip_schema();
        let ddl = create_table_sql("yellow_taxi_trips", &schema).unwrap();
        assert!(ddl.starts_with("CREATE TABLE \"yellow_taxi_trips\" ("));
        assert!(ddl.contains("\"VendorID\" BIGINT"));
        assert!(ddl.contains("\"tpep_pickup_datetime\" TIMESTAMP"));
        assert!(ddl.contains("\"store_and_fwd_flag\" TEXT"));
        assert!(ddl.contains("\"congestion_surcharge\" DOUBLE PRECISION"));
    }

    #[test]
    fn drop_is_idempotent_form() {
        assert_eq!(
            drop_table_sql("yellow_taxi_trips"),
            "DROP TABLE IF EXISTS \"yellow_taxi_trips\""
        );
    }

    #[test]
    fn copy_lists_every_column_in_order() {
        let schema = trip_schema();
        let sql = copy_sql("t", &schema);
        assert!(sql.starts_with("COPY \"t\" (\"VendorID\", \"tpep_pickup_datetime\""));
        assert!(sql.ends_with("\"congestion_surcharge\") FROM STDIN BINARY"));

        let types = copy_types(&schema).unwrap();
        assert_eq!(types.len(), 18);
        assert_eq!(types[0], Type::INT8);
        assert_eq!(types[1], Type::TIMESTAMP);
        assert_eq!(types[6], Type::TEXT);
        assert_eq!(types[17], Type::FLOAT8);
    }
}
