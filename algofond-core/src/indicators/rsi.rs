//! Relative Strength Index (RSI), fast exponential variant.
//!
//! Gains and losses of the day-over-day change are each smoothed with a
//! recursive EWM (alpha = 1 / (1 + com)), seeded with the first change.
//! RSI = 100 - 100 / (1 + gains_ewm / losses_ewm)
//! Lookback: 1 (the first close has no change).
//! Edge cases: losses_ewm == 0 → undefined (NaN); gains_ewm == 0 with
//! losses_ewm > 0 → 0.

use super::ewm::{alpha_from_com, ewm_mean};
use super::Indicator;

#[derive(Debug, Clone)]
pub struct Rsi {
    center_of_mass: f64,
    name: String,
}

impl Rsi {
    /// The RSI(2) oscillator: center of mass 1, alpha 0.5.
    pub fn two_period() -> Self {
        Self {
            center_of_mass: 1.0,
            name: "rsi_2".to_string(),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let n = closes.len();
        if n < 2 {
            return vec![f64::NAN; n];
        }

        let mut gains = vec![f64::NAN; n];
        let mut losses = vec![f64::NAN; n];
        for i in 1..n {
            let change = closes[i] - closes[i - 1];
            if change.is_nan() {
                continue;
            }
            gains[i] = change.max(0.0);
            losses[i] = (-change).max(0.0);
        }

        let alpha = alpha_from_com(self.center_of_mass);
        let avg_gain = ewm_mean(&gains, alpha);
        let avg_loss = ewm_mean(&losses, alpha);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| compute_rsi(g, l))
            .collect()
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() || avg_loss == 0.0 {
        f64::NAN
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
