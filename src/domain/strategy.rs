//! Trivial trading rules and their cumulative PnL.
//!
//! Every rule turns a raw signal into a position by delaying it one row, so a
//! row's position only depends on information available at the previous close.
//! The row before the first signal is filled with 0 (flat).

use std::fmt;
use std::str::FromStr;

use crate::domain::error::PricedashError;
use crate::domain::indicator::Indicators;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyKind {
    BuyAndHold,
    SmaCrossover,
    Momentum,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::BuyAndHold,
        StrategyKind::SmaCrossover,
        StrategyKind::Momentum,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::BuyAndHold => "Buy & Hold",
            StrategyKind::SmaCrossover => "SMA Crossover",
            StrategyKind::Momentum => "Momentum",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = PricedashError;

    /// Matches display names ignoring case and punctuation, plus a few aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_name(s);
        if let Some(kind) = Self::ALL
            .into_iter()
            .find(|k| normalize_name(k.name()) == normalized)
        {
            return Ok(kind);
        }
        match normalized.as_str() {
            "buyandhold" | "bh" => Ok(StrategyKind::BuyAndHold),
            "crossover" | "sma" => Ok(StrategyKind::SmaCrossover),
            "mom" => Ok(StrategyKind::Momentum),
            _ => Err(PricedashError::UnknownStrategy(s.to_string())),
        }
    }
}

fn normalize_name(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Delays `signal` by one row; row 0 takes `fill`.
pub fn shift_with_fill(signal: &[f64], fill: f64) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }
    let mut shifted = Vec::with_capacity(signal.len());
    shifted.push(fill);
    shifted.extend_from_slice(&signal[..signal.len() - 1]);
    shifted
}

/// 1 where `fast > slow`, else 0. Undefined inputs compare false and give 0.
pub fn crossover_signal(fast: &[f64], slow: &[f64]) -> Vec<f64> {
    fast.iter()
        .zip(slow)
        .map(|(f, s)| if f > s { 1.0 } else { 0.0 })
        .collect()
}

/// 1 where the lookback change is positive, else 0.
pub fn momentum_signal(momentum: &[f64]) -> Vec<f64> {
    momentum
        .iter()
        .map(|m| if *m > 0.0 { 1.0 } else { 0.0 })
        .collect()
}

/// Positions for `kind`, read from the precomputed series. The crossover
/// rule compares `sma_fast` with `sma_trend`.
pub fn positions(kind: StrategyKind, indicators: &Indicators) -> Vec<f64> {
    match kind {
        StrategyKind::BuyAndHold => vec![1.0; indicators.daily_return.values.len()],
        StrategyKind::SmaCrossover => shift_with_fill(
            &crossover_signal(&indicators.sma_fast.values, &indicators.sma_trend.values),
            0.0,
        ),
        StrategyKind::Momentum => {
            shift_with_fill(&momentum_signal(&indicators.momentum.values), 0.0)
        }
    }
}

/// Running product of `1 + return * position`, seeded at 1.
///
/// Rows whose product is undefined (the first return, or any NaN) contribute a
/// factor of 1, so the index holds its previous level instead of turning NaN.
pub fn cumulative_pnl(daily_returns: &[f64], positions: &[f64]) -> Vec<f64> {
    let mut level = 1.0;
    daily_returns
        .iter()
        .zip(positions)
        .map(|(r, p)| {
            let step = r * p;
            if !step.is_nan() {
                level *= 1.0 + step;
            }
            level
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyResult {
    pub kind: StrategyKind,
    pub positions: Vec<f64>,
    pub pnl: Vec<f64>,
}

impl StrategyResult {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Last PnL index value; 1.0 for an empty table.
    pub fn final_value(&self) -> f64 {
        self.pnl.last().copied().unwrap_or(1.0)
    }
}

/// Runs each enabled strategy once, in the order given. Duplicates are ignored
/// and an empty selection yields an empty result set.
pub fn run_strategies(indicators: &Indicators, enabled: &[StrategyKind]) -> Vec<StrategyResult> {
    let returns = &indicators.daily_return.values;

    let mut seen = Vec::with_capacity(enabled.len());
    let mut results = Vec::with_capacity(enabled.len());
    for &kind in enabled {
        if seen.contains(&kind) {
            continue;
        }
        seen.push(kind);

        let positions = positions(kind, indicators);
        let pnl = cumulative_pnl(returns, &positions);
        tracing::debug!(
            strategy = kind.name(),
            rows = pnl.len(),
            final_value = pnl.last().copied().unwrap_or(1.0),
            "strategy computed"
        );
        results.push(StrategyResult {
            kind,
            positions,
            pnl,
        });
    }
    results
}
