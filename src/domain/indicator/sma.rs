//! Simple moving average.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i])
//! Warmup: first (n-1) rows are NaN. A NaN close inside the window makes that
//! row NaN as well.

pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; closes.len()];
    }

    let warmup = period - 1;
    (0..closes.len())
        .map(|i| {
            if i < warmup {
                f64::NAN
            } else {
                let window = &closes[i + 1 - period..=i];
                window.iter().sum::<f64>() / period as f64
            }
        })
        .collect()
}
