//! Synthetic, seed-reproducible commodity price series.
//!
//! Stands in for a real price feed. Each series is
//! `base + linear trend + seasonal sine (5 full cycles) + gaussian noise`,
//! floored elementwise at half the base price.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::{AgroError, Result};
use crate::model::{Commodity, PriceObservation};

/// Seed of the compiled-in price table.
pub const DEFAULT_PRICE_SEED: u64 = 42;

/// Number of complete seasonal cycles spread across a series.
pub const SEASONAL_CYCLES: f64 = 5.0;

/// Prices never drop below this fraction of the base price.
pub const PRICE_FLOOR_RATIO: f64 = 0.5;

/// First month (inclusive) and period count of the compiled-in table:
/// month ends from January 2019 through October 2024.
pub const PRICE_START: (i32, u32) = (2019, 1);
pub const PRICE_PERIODS: usize = 70;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSeriesParams {
    pub base_price: f64,
    /// Total rise over the whole series (linear from 0 to this value).
    pub trend_amplitude: f64,
    pub seasonal_amplitude: f64,
    pub noise_std_dev: f64,
    pub n_periods: usize,
}

impl PriceSeriesParams {
    /// Parameters of the built-in series for `commodity`.
    pub fn for_commodity(commodity: Commodity, n_periods: usize) -> Self {
        let (base_price, trend_amplitude, seasonal_amplitude, noise_std_dev) = match commodity {
            Commodity::Maize => (180.0, 40.0, 30.0, 15.0),
            Commodity::Wheat => (280.0, 50.0, 35.0, 20.0),
            Commodity::Soybean => (450.0, 80.0, 50.0, 30.0),
            Commodity::Cotton => (1800.0, 200.0, 150.0, 100.0),
            Commodity::Groundnuts => (900.0, 100.0, 80.0, 50.0),
        };
        Self {
            base_price,
            trend_amplitude,
            seasonal_amplitude,
            noise_std_dev,
            n_periods,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.base_price > 0.0) {
            return Err(AgroError::InvalidInput(format!(
                "base_price must be > 0, got {}",
                self.base_price
            )));
        }
        if !(self.noise_std_dev >= 0.0) {
            return Err(AgroError::InvalidInput(format!(
                "noise_std_dev must be >= 0, got {}",
                self.noise_std_dev
            )));
        }
        Ok(())
    }
}

/// Generate one series, drawing noise from `rng`.
///
/// Consecutive calls on the same rng continue its stream, so the order in
/// which series are generated is part of the output contract.
pub fn generate_price_series<R: Rng>(
    params: &PriceSeriesParams,
    rng: &mut R,
) -> Result<Vec<f64>> {
    params.validate()?;
    let n = params.n_periods;
    let denom = n.saturating_sub(1).max(1) as f64;
    let floor = params.base_price * PRICE_FLOOR_RATIO;

    let series = (0..n)
        .map(|i| {
            let t = if n > 1 { i as f64 / denom } else { 0.0 };
            let trend = params.trend_amplitude * t;
            let seasonal = params.seasonal_amplitude * (SEASONAL_CYCLES * 2.0 * PI * t).sin();
            let noise = sample_normal(rng, 0.0, params.noise_std_dev);
            (params.base_price + trend + seasonal + noise).max(floor)
        })
        .collect();
    Ok(series)
}

/// Generate one series from a fresh rng seeded with `seed`.
pub fn generate_seeded(params: &PriceSeriesParams, seed: u64) -> Result<Vec<f64>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_price_series(params, &mut rng)
}

/// Sample from a normal distribution using the Box-Muller transform.
fn sample_normal<R: Rng>(rng: &mut R, mean: f64, std: f64) -> f64 {
    // 1 - [0, 1) keeps u1 away from zero.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + std * z
}

/// `n` consecutive month-end dates starting with the month `(year, month)`.
pub fn month_ends(year: i32, month: u32, n: usize) -> Result<Vec<NaiveDate>> {
    if !(1..=12).contains(&month) {
        return Err(AgroError::InvalidInput(format!("month must be 1..=12, got {month}")));
    }
    (0..n)
        .map(|k| {
            let offset = (month - 1) as usize + k + 1;
            let next_year = year + (offset / 12) as i32;
            let next_month = (offset % 12) as u32 + 1;
            NaiveDate::from_ymd_opt(next_year, next_month, 1)
                .and_then(|first| first.pred_opt())
                .ok_or_else(|| {
                    AgroError::InvalidInput(format!("month end out of range at period {k}"))
                })
        })
        .collect()
}

/// Builds the long-format price table: every commodity in `Commodity::ALL`
/// order, each series in date order, all noise drawn from one rng.
pub fn build_price_table(seed: u64) -> Result<Vec<PriceObservation>> {
    let (year, month) = PRICE_START;
    let dates = month_ends(year, month, PRICE_PERIODS)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut observations = Vec::with_capacity(dates.len() * Commodity::ALL.len());
    for commodity in Commodity::ALL {
        let params = PriceSeriesParams::for_commodity(commodity, dates.len());
        let series = generate_price_series(&params, &mut rng)?;
        for (date, price) in dates.iter().zip(series) {
            observations.push(PriceObservation::new(*date, commodity, price)?);
        }
    }
    debug!(
        seed,
        observations = observations.len(),
        first = %dates.first().map(|d| d.to_string()).unwrap_or_default(),
        last_year = dates.last().map(|d| d.year()).unwrap_or_default(),
        "built price table"
    );
    Ok(observations)
}
