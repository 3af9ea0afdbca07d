// src/schema/trips.rs

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use std::sync::Arc;

/// Declared schema of the yellow-cab trip record CSV, in file column order.
///
/// Every field is nullable: the published months contain empty cells in
/// most columns (rides with no recorded vendor, surcharge columns that
/// appear mid-2019, etc). Id-like columns are kept as integers rather
/// than strings to match the upstream data dictionary.
///
/// - vendor/ratecode/location/payment ids, passenger count → Int64
/// - monetary amounts and trip distance                     → Float64
/// - store_and_fwd_flag                                     → Utf8
/// - pickup/dropoff datetimes                               → Timestamp(µs)
pub fn trip_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("VendorID", DataType::Int64, true),
        Field::new(
            "tpep_pickup_datetime",
            DataType::Timestamp(TimeUnit::Microsecond, None),
            true,
        ),
        Field::new(
            "tpep_dropoff_datetime",
            DataType::Timestamp(TimeUnit::Microsecond, None),
            true,
        ),
        Field::new("passenger_count", DataType::Int64, true),
        Field::new("trip_distance", DataType::Float64, true),
        Field::new("RatecodeID", DataType::Int64, true),
        Field::new("store_and_fwd_flag", DataType::Utf8, true),
        Field::new("PULocationID", DataType::Int64, true),
        Field::new("DOLocationID", DataType::Int64, true),
        Field::new("payment_type", DataType::Int64, true),
        Field::new("fare_amount", DataType::Float64, true),
        Field::new("extra", DataType::Float64, true),
        Field::new("mta_tax", DataType::Float64, true),
        Field::new("tip_amount", DataType::Float64, true),
        Field::new("tolls_amount", DataType::Float64, true),
        Field::new("improvement_surcharge", DataType::Float64, true),
        Field::new("total_amount", DataType::Float64, true),
        Field::new("congestion_surcharge", DataType::Float64, true),
    ]))
}
