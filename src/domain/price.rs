//! Daily price rows and the in-memory price table.

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Columns every decoded price file must carry after lower-casing.
pub const REQUIRED_COLUMNS: [&str; 5] = ["date", "open", "high", "low", "close"];

#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Other numeric columns present in the source file (e.g. `volume`), keyed
    /// by their lower-cased name.
    pub extra: BTreeMap<String, f64>,
}

impl PriceRow {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            extra: BTreeMap::new(),
        }
    }

    /// Candle direction: a row is "up" only when it closed strictly above its open.
    pub fn is_up(&self) -> bool {
        self.close > self.open
    }

    /// Numeric value of a lower-cased column; `None` for `date` and for
    /// columns this row does not carry.
    pub fn value(&self, column: &str) -> Option<f64> {
        match column {
            "open" => Some(self.open),
            "high" => Some(self.high),
            "low" => Some(self.low),
            "close" => Some(self.close),
            other => self.extra.get(other).copied(),
        }
    }
}

/// A chronologically ordered sequence of price rows.
///
/// `columns` lists every lower-cased column name in source order, required
/// columns first when the file has them in that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceTable {
    columns: Vec<String>,
    rows: Vec<PriceRow>,
}

impl PriceTable {
    /// Builds a table, stably sorting rows by date.
    pub fn new(columns: Vec<String>, mut rows: Vec<PriceRow>) -> Self {
        rows.sort_by_key(|r| r.date);
        Self { columns, rows }
    }

    pub fn from_rows(rows: Vec<PriceRow>) -> Self {
        let columns = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// First `n` rows, or all of them when the table is shorter.
    pub fn head(&self, n: usize) -> &[PriceRow] {
        &self.rows[..n.min(self.rows.len())]
    }
}
