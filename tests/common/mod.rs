#![allow(dead_code)]

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use pricedash::domain::error::PricedashError;
use pricedash::domain::period::{PeriodCatalog, PeriodEntry, PeriodLabel};
use pricedash::domain::price::{PriceRow, PriceTable};
use pricedash::ports::store_port::StorePort;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

pub const PREFIX: &str = "aapl_versions_export/";

/// In-memory store that counts its calls.
pub struct MockStore {
    pub objects: HashMap<String, Bytes>,
    /// Keys that appear in listings but have no body.
    pub listed_only: Vec<String>,
    pub list_calls: Rc<Cell<usize>>,
    pub get_calls: Rc<Cell<usize>>,
    pub fail_list: Option<String>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            listed_only: Vec::new(),
            list_calls: Rc::new(Cell::new(0)),
            get_calls: Rc::new(Cell::new(0)),
            fail_list: None,
        }
    }

    pub fn with_object(mut self, key: &str, data: Bytes) -> Self {
        self.objects.insert(key.to_string(), data);
        self
    }

    pub fn with_listed_only(mut self, key: &str) -> Self {
        self.listed_only.push(key.to_string());
        self
    }

    pub fn with_list_error(mut self, reason: &str) -> Self {
        self.fail_list = Some(reason.to_string());
        self
    }
}

impl StorePort for MockStore {
    fn list(&self, prefix: &str) -> Result<Vec<String>, PricedashError> {
        self.list_calls.set(self.list_calls.get() + 1);
        if let Some(reason) = &self.fail_list {
            return Err(PricedashError::Store {
                reason: reason.clone(),
            });
        }
        Ok(self
            .objects
            .keys()
            .chain(self.listed_only.iter())
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn get(&self, key: &str) -> Result<Bytes, PricedashError> {
        self.get_calls.set(self.get_calls.get() + 1);
        self.objects
            .get(key)
            .cloned()
            .ok_or_else(|| PricedashError::NotFound {
                key: key.to_string(),
            })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Rows on consecutive days starting 1980-12-12, open one below close.
pub fn rows_from_closes(closes: &[f64]) -> Vec<PriceRow> {
    let start = date(1980, 12, 12);
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            PriceRow::new(
                start + chrono::Duration::days(i as i64),
                c - 1.0,
                c + 0.5,
                c - 1.5,
                c,
            )
        })
        .collect()
}

pub fn table_from_closes(closes: &[f64]) -> PriceTable {
    PriceTable::from_rows(rows_from_closes(closes))
}

/// Parquet bytes with capitalised columns and string dates, plus a volume column.
pub fn parquet_from_rows(rows: &[PriceRow]) -> Bytes {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Date", DataType::Utf8, false),
        Field::new("Open", DataType::Float64, false),
        Field::new("High", DataType::Float64, false),
        Field::new("Low", DataType::Float64, false),
        Field::new("Close", DataType::Float64, false),
        Field::new("Volume", DataType::Int64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            rows.iter()
                .map(|r| r.date.format("%Y-%m-%d").to_string())
                .collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.open).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.high).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.low).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.close).collect::<Vec<_>>())),
        Arc::new(Int64Array::from(vec![1_000_i64; rows.len()])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let mut writer = ArrowWriter::try_new(Vec::new(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    Bytes::from(writer.into_inner().unwrap())
}

/// Parquet bytes missing the `low` column.
pub fn parquet_without_low() -> Bytes {
    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Utf8, false),
        Field::new("open", DataType::Float64, false),
        Field::new("high", DataType::Float64, false),
        Field::new("close", DataType::Float64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["1980-12-12"])),
        Arc::new(Float64Array::from(vec![1.0])),
        Arc::new(Float64Array::from(vec![2.0])),
        Arc::new(Float64Array::from(vec![1.5])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let mut writer = ArrowWriter::try_new(Vec::new(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    Bytes::from(writer.into_inner().unwrap())
}

pub fn part_key(version: usize, part: usize) -> String {
    format!("{PREFIX}ver_{version}.parquet/part-{part:05}.parquet")
}

/// Two periods: "short" over ver_0 and "long" over ver_1.
pub fn two_period_catalog() -> PeriodCatalog {
    PeriodCatalog::new(vec![
        PeriodEntry {
            label: PeriodLabel::new("short"),
            prefix: format!("{PREFIX}ver_0.parquet/"),
        },
        PeriodEntry {
            label: PeriodLabel::new("long"),
            prefix: format!("{PREFIX}ver_1.parquet/"),
        },
    ])
}
