//! Rolling indicators over a price table.
//!
//! Every series is aligned 1:1 with the table rows. Rows where an indicator is
//! not yet defined hold `f64::NAN`; they are never coerced to zero.

pub mod returns;
pub mod sma;

use std::fmt;

use crate::domain::price::PriceTable;

pub const SMA_FAST: usize = 5;
pub const SMA_SLOW: usize = 10;
/// Slow leg of the SMA crossover rule.
pub const SMA_TREND: usize = 20;
pub const MOMENTUM_PERIOD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    DailyReturn,
    Momentum(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::DailyReturn => write!(f, "RETURN"),
            IndicatorType::Momentum(period) => write!(f, "MOMENTUM({})", period),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<f64>,
}

impl IndicatorSeries {
    pub fn compute(indicator_type: IndicatorType, closes: &[f64]) -> Self {
        let values = match indicator_type {
            IndicatorType::Sma(period) => sma::calculate_sma(closes, period),
            IndicatorType::DailyReturn => returns::daily_returns(closes),
            IndicatorType::Momentum(period) => returns::pct_change(closes, period),
        };
        Self {
            indicator_type,
            values,
        }
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }
}

/// Chart overlays and strategy inputs derived once from one price table.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicators {
    pub sma_fast: IndicatorSeries,
    pub sma_slow: IndicatorSeries,
    pub sma_trend: IndicatorSeries,
    pub daily_return: IndicatorSeries,
    pub momentum: IndicatorSeries,
}

impl Indicators {
    pub fn compute(table: &PriceTable) -> Self {
        let closes = table.closes();
        Self {
            sma_fast: IndicatorSeries::compute(IndicatorType::Sma(SMA_FAST), &closes),
            sma_slow: IndicatorSeries::compute(IndicatorType::Sma(SMA_SLOW), &closes),
            sma_trend: IndicatorSeries::compute(IndicatorType::Sma(SMA_TREND), &closes),
            daily_return: IndicatorSeries::compute(IndicatorType::DailyReturn, &closes),
            momentum: IndicatorSeries::compute(IndicatorType::Momentum(MOMENTUM_PERIOD), &closes),
        }
    }
}
