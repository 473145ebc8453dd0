//! Simplified ROI model for an agro-processing investment.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AgroError, Result};

/// Share of revenue consumed by operating costs, in percent.
pub const OPERATING_COST_PCT: f64 = 65.0;

/// Payback periods at or beyond this many years are shown as "Review inputs".
pub const PAYBACK_REVIEW_THRESHOLD_YEARS: f64 = 20.0;

pub const REVIEW_INPUTS_LABEL: &str = "Review inputs";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiAssumptions {
    pub operating_cost_pct: f64,
    pub payback_review_threshold_years: f64,
}

impl Default for RoiAssumptions {
    fn default() -> Self {
        Self {
            operating_cost_pct: OPERATING_COST_PCT,
            payback_review_threshold_years: PAYBACK_REVIEW_THRESHOLD_YEARS,
        }
    }
}

impl RoiAssumptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.operating_cost_pct) {
            return Err(AgroError::InvalidInput(format!(
                "operating cost must be in [0, 100] percent, got {}",
                self.operating_cost_pct
            )));
        }
        if !(self.payback_review_threshold_years > 0.0) {
            return Err(AgroError::InvalidInput(format!(
                "payback review threshold must be > 0 years, got {}",
                self.payback_review_threshold_years
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiInputs {
    pub investment_usd: f64,
    pub capacity_mt_per_year: f64,
    pub utilization_pct: f64,
    pub margin_usd_per_mt: f64,
}

impl RoiInputs {
    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.investment_usd > 0.0, "investment_usd must be > 0"),
            (self.capacity_mt_per_year > 0.0, "capacity_mt_per_year must be > 0"),
            (
                (0.0..=100.0).contains(&self.utilization_pct),
                "utilization_pct must be in [0, 100]",
            ),
            (self.margin_usd_per_mt >= 0.0, "margin_usd_per_mt must be >= 0"),
        ];
        // NaN fails every comparison above
        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, msg)) => Err(AgroError::InvalidInput(format!("{msg}, got {self:?}"))),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "years", rename_all = "snake_case")]
pub enum Payback {
    Years(f64),
    /// Net profit is zero, so the investment is never recovered.
    NonViable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoiVerdict {
    Viable,
    ReviewInputs,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoiOutcome {
    pub actual_volume_mt: f64,
    pub annual_revenue_usd: f64,
    pub net_profit_usd: f64,
    pub payback: Payback,
    pub annual_roi_pct: f64,
    pub verdict: RoiVerdict,
}

impl RoiOutcome {
    pub fn payback_years(&self) -> Option<f64> {
        match self.payback {
            Payback::Years(y) => Some(y),
            Payback::NonViable => None,
        }
    }

    /// "2.7 years", or "Review inputs" when the payback is flagged.
    pub fn payback_label(&self) -> String {
        match (self.verdict, self.payback) {
            (RoiVerdict::Viable, Payback::Years(y)) => format!("{y:.1} years"),
            _ => REVIEW_INPUTS_LABEL.to_string(),
        }
    }

    /// Annual ROI label, only shown alongside a displayed payback.
    pub fn roi_label(&self) -> Option<String> {
        match self.verdict {
            RoiVerdict::Viable => Some(format!("{:.1}%", self.annual_roi_pct)),
            RoiVerdict::ReviewInputs => None,
        }
    }
}

pub fn calculate_roi(inputs: &RoiInputs) -> Result<RoiOutcome> {
    calculate_roi_with(inputs, &RoiAssumptions::default())
}

pub fn calculate_roi_with(inputs: &RoiInputs, assumptions: &RoiAssumptions) -> Result<RoiOutcome> {
    if let Err(e) = inputs.validate().and_then(|_| assumptions.validate()) {
        warn!(error = %e, "rejected ROI inputs");
        return Err(e);
    }

    let actual_volume_mt = inputs.capacity_mt_per_year * inputs.utilization_pct / 100.0;
    let annual_revenue_usd = actual_volume_mt * inputs.margin_usd_per_mt;
    let net_profit_usd = annual_revenue_usd * (100.0 - assumptions.operating_cost_pct) / 100.0;
    let payback = if net_profit_usd > 0.0 {
        Payback::Years(inputs.investment_usd / net_profit_usd)
    } else {
        Payback::NonViable
    };
    let annual_roi_pct = net_profit_usd / inputs.investment_usd * 100.0;

    let verdict = match payback {
        Payback::Years(y) if y > 0.0 && y < assumptions.payback_review_threshold_years => {
            RoiVerdict::Viable
        }
        _ => RoiVerdict::ReviewInputs,
    };

    debug!(net_profit_usd, ?payback, ?verdict, "computed ROI");
    Ok(RoiOutcome {
        actual_volume_mt,
        annual_revenue_usd,
        net_profit_usd,
        payback,
        annual_roi_pct,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn inputs(investment: f64, capacity: f64, util: f64, margin: f64) -> RoiInputs {
        RoiInputs {
            investment_usd: investment,
            capacity_mt_per_year: capacity,
            utilization_pct: util,
            margin_usd_per_mt: margin,
        }
    }

    #[test]
    fn golden_case() {
        let out = calculate_roi(&inputs(5_000_000.0, 50_000.0, 70.0, 150.0)).unwrap();
        assert_eq!(out.actual_volume_mt, 35_000.0);
        assert_eq!(out.annual_revenue_usd, 5_250_000.0);
        assert_eq!(out.net_profit_usd, 1_837_500.0);
        assert_relative_eq!(out.payback_years().unwrap(), 5_000_000.0 / 1_837_500.0);
        assert_relative_eq!(out.payback_years().unwrap(), 2.72, epsilon = 0.005);
        assert_relative_eq!(out.annual_roi_pct, 36.75, epsilon = 1e-9);
        assert_eq!(out.verdict, RoiVerdict::Viable);
        assert_eq!(out.payback_label(), "2.7 years");
        assert!(out.roi_label().unwrap().ends_with('%'));
    }

    #[test]
    fn zero_margin_is_non_viable() {
        let out = calculate_roi(&inputs(5_000_000.0, 50_000.0, 70.0, 0.0)).unwrap();
        assert_eq!(out.net_profit_usd, 0.0);
        assert_eq!(out.payback, Payback::NonViable);
        assert_eq!(out.payback_years(), None);
        assert_eq!(out.verdict, RoiVerdict::ReviewInputs);
        assert_eq!(out.payback_label(), REVIEW_INPUTS_LABEL);
        assert_eq!(out.roi_label(), None);
    }

    #[test]
    fn long_payback_is_flagged() {
        // net profit 35_000 * 10 * 0.35 = 122_500 -> ~40.8 years
        let out = calculate_roi(&inputs(5_000_000.0, 50_000.0, 70.0, 10.0)).unwrap();
        assert!(out.payback_years().unwrap() > PAYBACK_REVIEW_THRESHOLD_YEARS);
        assert_eq!(out.verdict, RoiVerdict::ReviewInputs);
    }

    #[test]
    fn threshold_is_overridable() {
        let assumptions = RoiAssumptions {
            payback_review_threshold_years: 50.0,
            ..RoiAssumptions::default()
        };
        let out = calculate_roi_with(&inputs(5_000_000.0, 50_000.0, 70.0, 10.0), &assumptions)
            .unwrap();
        assert_eq!(out.verdict, RoiVerdict::Viable);
    }

    #[test]
    fn rejects_out_of_domain_inputs() {
        for bad in [
            inputs(0.0, 50_000.0, 70.0, 150.0),
            inputs(-1.0, 50_000.0, 70.0, 150.0),
            inputs(5e6, 0.0, 70.0, 150.0),
            inputs(5e6, 50_000.0, 120.0, 150.0),
            inputs(5e6, 50_000.0, 70.0, -5.0),
            inputs(f64::NAN, 50_000.0, 70.0, 150.0),
        ] {
            assert!(matches!(calculate_roi(&bad), Err(AgroError::InvalidInput(_))));
        }
        let bad_costs = RoiAssumptions {
            operating_cost_pct: 140.0,
            ..RoiAssumptions::default()
        };
        assert!(calculate_roi_with(&inputs(5e6, 5e4, 70.0, 150.0), &bad_costs).is_err());
    }
}
