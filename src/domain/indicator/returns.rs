//! Percentage-change indicators.
//!
//! pct_change(n)[i] = (C[i] - C[i-n]) / C[i-n]
//! Warmup: first n rows are NaN. A zero base close yields ±inf or NaN, which
//! callers treat like any other undefined value.

pub fn pct_change(closes: &[f64], periods: usize) -> Vec<f64> {
    (0..closes.len())
        .map(|i| {
            if periods == 0 || i < periods {
                f64::NAN
            } else {
                let base = closes[i - periods];
                (closes[i] - base) / base
            }
        })
        .collect()
}

/// One-row percentage change; undefined at row 0.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    pct_change(closes, 1)
}
