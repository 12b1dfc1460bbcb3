//! Declarative chart descriptions.
//!
//! Builders here do no I/O and no drawing; adapters turn a chart description
//! into markup.

use chrono::NaiveDate;

use crate::domain::indicator::Indicators;
use crate::domain::price::PriceTable;
use crate::domain::strategy::StrategyResult;

/// How a candle is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CandleStyle {
    /// Body from open to close plus a high/low wick.
    #[default]
    Ohlc,
    /// Legacy: open-to-close body only, no wick.
    Body,
}

impl CandleStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ohlc" | "candlestick" => Some(CandleStyle::Ohlc),
            "body" | "legacy" => Some(CandleStyle::Body),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub up_color: String,
    pub down_color: String,
    pub background: String,
    pub foreground: String,
    pub grid_color: String,
    pub sma_fast_color: String,
    pub sma_slow_color: String,
    /// Cycled through for strategy lines.
    pub line_palette: Vec<String>,
    pub width: u32,
    pub height: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            up_color: "#26a69a".into(),
            down_color: "#ef5350".into(),
            background: "#111111".into(),
            foreground: "#dddddd".into(),
            grid_color: "#333333".into(),
            sma_fast_color: "#ffb300".into(),
            sma_slow_color: "#42a5f5".into(),
            line_palette: vec![
                "#66bb6a".into(),
                "#ab47bc".into(),
                "#ffa726".into(),
                "#29b6f6".into(),
            ],
            width: 960,
            height: 420,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandleMark {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub up: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinePoint {
    pub date: NaiveDate,
    /// NaN marks a gap.
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: String,
    pub color: String,
    pub points: Vec<LinePoint>,
}

impl LineSeries {
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        dates: &[NaiveDate],
        values: &[f64],
    ) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            points: dates
                .iter()
                .zip(values)
                .map(|(&date, &value)| LinePoint { date, value })
                .collect(),
        }
    }

    pub fn defined_points(&self) -> impl Iterator<Item = &LinePoint> {
        self.points.iter().filter(|p| p.value.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandleChart {
    pub title: String,
    pub style: CandleStyle,
    pub candles: Vec<CandleMark>,
    pub overlays: Vec<LineSeries>,
    pub x_label: String,
    pub y_label: String,
}

impl CandleChart {
    /// (min, max) over every finite candle price and overlay value.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let candle_values = self.candles.iter().flat_map(|c| {
            let extremes = match self.style {
                CandleStyle::Ohlc => [c.low, c.high],
                CandleStyle::Body => [c.open, c.close],
            };
            [extremes[0], extremes[1], c.open, c.close]
        });
        let overlay_values = self
            .overlays
            .iter()
            .flat_map(|s| s.defined_points().map(|p| p.value));
        finite_range(candle_values.chain(overlay_values))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PnlChart {
    pub title: String,
    pub lines: Vec<LineSeries>,
    pub x_label: String,
    pub y_label: String,
}

impl PnlChart {
    pub fn value_range(&self) -> Option<(f64, f64)> {
        finite_range(self.lines.iter().flat_map(|s| s.defined_points().map(|p| p.value)))
    }
}

pub fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

pub fn build_candle_chart(
    title: &str,
    table: &PriceTable,
    indicators: Option<&Indicators>,
    style: CandleStyle,
    theme: &Theme,
) -> CandleChart {
    let candles = table
        .rows()
        .iter()
        .map(|r| CandleMark {
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            up: r.is_up(),
        })
        .collect();

    let overlays = match indicators {
        Some(ind) => {
            let dates = table.dates();
            vec![
                LineSeries::new(
                    ind.sma_fast.indicator_type.to_string(),
                    theme.sma_fast_color.clone(),
                    &dates,
                    &ind.sma_fast.values,
                ),
                LineSeries::new(
                    ind.sma_slow.indicator_type.to_string(),
                    theme.sma_slow_color.clone(),
                    &dates,
                    &ind.sma_slow.values,
                ),
            ]
        }
        None => Vec::new(),
    };

    CandleChart {
        title: title.to_string(),
        style,
        candles,
        overlays,
        x_label: "date".into(),
        y_label: "price".into(),
    }
}

/// `None` when no strategy is enabled, so callers show their empty state.
pub fn build_pnl_chart(
    title: &str,
    table: &PriceTable,
    results: &[StrategyResult],
    theme: &Theme,
) -> Option<PnlChart> {
    if results.is_empty() {
        return None;
    }

    let dates = table.dates();
    let lines = results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let color = theme
                .line_palette
                .get(i % theme.line_palette.len().max(1))
                .cloned()
                .unwrap_or_else(|| theme.foreground.clone());
            LineSeries::new(result.name(), color, &dates, &result.pnl)
        })
        .collect();

    Some(PnlChart {
        title: title.to_string(),
        lines,
        x_label: "date".into(),
        y_label: "cumulative PnL".into(),
    })
}
