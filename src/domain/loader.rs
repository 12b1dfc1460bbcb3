//! Decodes a parquet object into a validated [`PriceTable`].
//!
//! Column names are lower-cased before lookup. `date` may be stored as a date,
//! a timestamp or an ISO string; prices may be any numeric type.

use std::collections::BTreeMap;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::domain::error::PricedashError;
use crate::domain::price::{PriceRow, PriceTable, REQUIRED_COLUMNS};

pub fn decode_price_table(key: &str, data: Bytes) -> Result<PriceTable, PricedashError> {
    let decode_err = |reason: String| PricedashError::Decode {
        key: key.to_string(),
        reason,
    };

    let builder =
        ParquetRecordBatchReaderBuilder::try_new(data).map_err(|e| decode_err(e.to_string()))?;

    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().to_lowercase())
        .collect();
    check_schema(key, &columns)?;

    let reader = builder.build().map_err(|e| decode_err(e.to_string()))?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| decode_err(e.to_string()))?;
        append_batch(&batch, &columns, &mut rows).map_err(decode_err)?;
    }

    tracing::debug!(key, rows = rows.len(), columns = columns.len(), "decoded price table");
    Ok(PriceTable::new(columns, rows))
}

fn check_schema(key: &str, columns: &[String]) -> Result<(), PricedashError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c == *required))
        .map(|c| c.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PricedashError::Schema {
            key: key.to_string(),
            missing,
        })
    }
}

fn column<'a>(
    batch: &'a RecordBatch,
    columns: &[String],
    name: &str,
) -> Result<&'a ArrayRef, String> {
    columns
        .iter()
        .position(|c| c == name)
        .map(|i| batch.column(i))
        .ok_or_else(|| format!("column {name} missing from batch"))
}

fn to_f64(array: &ArrayRef, name: &str) -> Result<Vec<f64>, String> {
    let casted = cast(array, &DataType::Float64).map_err(|e| format!("column {name}: {e}"))?;
    let values = casted.as_primitive::<Float64Type>();
    Ok((0..values.len())
        .map(|i| {
            if values.is_null(i) {
                f64::NAN
            } else {
                values.value(i)
            }
        })
        .collect())
}

fn to_dates(array: &ArrayRef) -> Result<Vec<NaiveDate>, String> {
    match array.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            let strings = cast(array, &DataType::Utf8).map_err(|e| format!("column date: {e}"))?;
            let strings = strings.as_string::<i32>();
            (0..strings.len())
                .map(|i| {
                    if strings.is_null(i) {
                        return Err(format!("row {i} has a null date"));
                    }
                    parse_date_str(strings.value(i))
                        .ok_or_else(|| format!("row {i} has unparseable date {:?}", strings.value(i)))
                })
                .collect()
        }
        _ => {
            let days = cast(array, &DataType::Date32).map_err(|e| format!("column date: {e}"))?;
            let days = days.as_primitive::<Date32Type>();
            (0..days.len())
                .map(|i| {
                    if days.is_null(i) {
                        return Err(format!("row {i} has a null date"));
                    }
                    days.value_as_date(i)
                        .ok_or_else(|| format!("row {i} has an out-of-range date"))
                })
                .collect()
        }
    }
}

/// Accepts `YYYY-MM-DD` optionally followed by a time part.
fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let date_part = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn append_batch(
    batch: &RecordBatch,
    columns: &[String],
    rows: &mut Vec<PriceRow>,
) -> Result<(), String> {
    let dates = to_dates(column(batch, columns, "date")?)?;
    let open = to_f64(column(batch, columns, "open")?, "open")?;
    let high = to_f64(column(batch, columns, "high")?, "high")?;
    let low = to_f64(column(batch, columns, "low")?, "low")?;
    let close = to_f64(column(batch, columns, "close")?, "close")?;

    let mut extras: Vec<(&str, Vec<f64>)> = Vec::new();
    for (i, name) in columns.iter().enumerate() {
        if REQUIRED_COLUMNS.contains(&name.as_str()) {
            continue;
        }
        let array = batch.column(i);
        if array.data_type().is_numeric() {
            extras.push((name.as_str(), to_f64(array, name)?));
        }
    }

    for i in 0..batch.num_rows() {
        let extra: BTreeMap<String, f64> = extras
            .iter()
            .map(|(name, values)| (name.to_string(), values[i]))
            .collect();
        rows.push(PriceRow {
            date: dates[i],
            open: open[i],
            high: high[i],
            low: low[i],
            close: close[i],
            extra,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray, TimestampMillisecondArray};
    use arrow::datatypes::{Field, Schema, TimeUnit};
    use parquet::arrow::ArrowWriter;
    use std::sync::Arc;

    fn write_parquet(fields: Vec<Field>, columns: Vec<ArrayRef>) -> Bytes {
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let mut writer = ArrowWriter::try_new(Vec::new(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        Bytes::from(writer.into_inner().unwrap())
    }

    fn price_columns() -> Vec<ArrayRef> {
        vec![
            Arc::new(Float64Array::from(vec![10.0, 11.0])),
            Arc::new(Float64Array::from(vec![12.0, 13.0])),
            Arc::new(Float64Array::from(vec![9.0, 10.0])),
            Arc::new(Float64Array::from(vec![11.0, 10.5])),
        ]
    }

    fn price_fields() -> Vec<Field> {
        vec![
            Field::new("Open", DataType::Float64, false),
            Field::new("High", DataType::Float64, false),
            Field::new("Low", DataType::Float64, false),
            Field::new("Close", DataType::Float64, false),
        ]
    }

    #[test]
    fn decodes_string_dates_and_lowercases_columns() {
        let mut fields = vec![Field::new("Date", DataType::Utf8, false)];
        fields.extend(price_fields());
        let mut columns: Vec<ArrayRef> =
            vec![Arc::new(StringArray::from(vec!["1980-12-15", "1980-12-12 00:00:00"]))];
        columns.extend(price_columns());

        let table = decode_price_table("k", write_parquet(fields, columns)).unwrap();

        assert_eq!(table.columns(), &["date", "open", "high", "low", "close"]);
        assert_eq!(table.len(), 2);
        // sorted: the 12th comes first
        assert_eq!(table.rows()[0].date, NaiveDate::from_ymd_opt(1980, 12, 12).unwrap());
        assert_eq!(table.rows()[0].close, 10.5);
        assert_eq!(table.rows()[1].open, 10.0);
    }

    #[test]
    fn decodes_date32_and_timestamp() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2000, 1, 4).unwrap();

        let mut fields = vec![Field::new("date", DataType::Date32, false)];
        fields.extend(price_fields());
        let mut columns: Vec<ArrayRef> = vec![Arc::new(Date32Array::from(vec![
            (d1 - epoch).num_days() as i32,
            (d2 - epoch).num_days() as i32,
        ]))];
        columns.extend(price_columns());
        let table = decode_price_table("k", write_parquet(fields, columns)).unwrap();
        assert_eq!(table.dates(), vec![d1, d2]);

        let mut fields = vec![Field::new(
            "date",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            false,
        )];
        fields.extend(price_fields());
        let ms = |d: NaiveDate| (d - epoch).num_days() * 86_400_000 + 3_600_000;
        let mut columns: Vec<ArrayRef> =
            vec![Arc::new(TimestampMillisecondArray::from(vec![ms(d1), ms(d2)]))];
        columns.extend(price_columns());
        let table = decode_price_table("k", write_parquet(fields, columns)).unwrap();
        assert_eq!(table.dates(), vec![d1, d2]);
    }

    #[test]
    fn keeps_numeric_extras() {
        let mut fields = vec![Field::new("date", DataType::Utf8, false)];
        fields.extend(price_fields());
        fields.push(Field::new("Volume", DataType::Int64, false));
        fields.push(Field::new("ticker", DataType::Utf8, false));
        let mut columns: Vec<ArrayRef> =
            vec![Arc::new(StringArray::from(vec!["2000-01-03", "2000-01-04"]))];
        columns.extend(price_columns());
        columns.push(Arc::new(Int64Array::from(vec![100, 200])));
        columns.push(Arc::new(StringArray::from(vec!["AAPL", "AAPL"])));

        let table = decode_price_table("k", write_parquet(fields, columns)).unwrap();
        assert_eq!(table.rows()[1].extra.get("volume"), Some(&200.0));
        assert!(!table.rows()[0].extra.contains_key("ticker"));
        assert!(table.columns().contains(&"ticker".to_string()));
    }

    #[test]
    fn missing_columns_is_schema_error() {
        let fields = vec![
            Field::new("date", DataType::Utf8, false),
            Field::new("close", DataType::Float64, false),
        ];
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["2000-01-03"])),
            Arc::new(Float64Array::from(vec![1.0])),
        ];
        let err = decode_price_table("k", write_parquet(fields, columns)).unwrap_err();
        match err {
            PricedashError::Schema { missing, .. } => {
                assert_eq!(missing, vec!["open", "high", "low"]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn garbage_bytes_is_decode_error() {
        let err = decode_price_table("k", Bytes::from_static(b"date,open\n1,2\n")).unwrap_err();
        assert!(matches!(err, PricedashError::Decode { .. }));
    }

    #[test]
    fn null_price_becomes_nan() {
        let fields = vec![
            Field::new("date", DataType::Utf8, false),
            Field::new("open", DataType::Float64, true),
            Field::new("high", DataType::Float64, false),
            Field::new("low", DataType::Float64, false),
            Field::new("close", DataType::Float64, false),
        ];
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["2000-01-03"])),
            Arc::new(Float64Array::from(vec![None::<f64>])),
            Arc::new(Float64Array::from(vec![2.0])),
            Arc::new(Float64Array::from(vec![1.0])),
            Arc::new(Float64Array::from(vec![1.5])),
        ];
        let table = decode_price_table("k", write_parquet(fields, columns)).unwrap();
        assert!(table.rows()[0].open.is_nan());
    }

    #[test]
    fn unparseable_date_is_decode_error() {
        let mut fields = vec![Field::new("date", DataType::Utf8, false)];
        fields.extend(price_fields());
        let mut columns: Vec<ArrayRef> =
            vec![Arc::new(StringArray::from(vec!["12/15/1980", "1980-12-16"]))];
        columns.extend(price_columns());
        let err = decode_price_table("k", write_parquet(fields, columns)).unwrap_err();
        assert!(matches!(err, PricedashError::Decode { .. }));
    }
}
