//! Processing gap ranking: where installed capacity sits idle, by processing type.

use serde::Serialize;
use tracing::debug;

use crate::aggregation::{group_by, mean};
use crate::model::{CapacityRecord, InvestmentPotential};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapSummary {
    pub processing_type: String,
    pub total_capacity_mt: f64,
    pub mean_utilization_pct: f64,
    pub unutilized_capacity_mt: f64,
    /// Tag of the first record of this type in input order.
    pub investment_potential: InvestmentPotential,
}

impl GapSummary {
    pub fn color(&self) -> &'static str {
        self.investment_potential.color()
    }
}

/// Group capacity by processing type and rank by unutilized capacity, largest first.
///
/// Per type: total capacity and unutilized capacity are summed, utilization
/// is averaged, and the investment potential is the one carried by the first
/// record of that type (first wins, no vote and no maximum). Groups with equal
/// unutilized capacity keep first-appearance order.
pub fn rank_gap_by_type(records: &[CapacityRecord]) -> Vec<GapSummary> {
    let mut ranked: Vec<GapSummary> = group_by(records, |r| r.processing_type.clone())
        .into_iter()
        .map(|(processing_type, members)| {
            // group_by never yields an empty group
            let first = members[0];
            GapSummary {
                processing_type,
                total_capacity_mt: members.iter().map(|r| r.total_capacity_mt).sum(),
                mean_utilization_pct: mean(members.iter().map(|r| r.utilization_pct))
                    .unwrap_or_default(),
                unutilized_capacity_mt: members.iter().map(|r| r.unutilized_capacity_mt()).sum(),
                investment_potential: first.investment_potential,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.unutilized_capacity_mt.total_cmp(&a.unutilized_capacity_mt));
    debug!(groups = ranked.len(), "ranked processing gaps");
    ranked
}

/// Keep gaps whose potential is at least `min`, preserving rank order.
pub fn with_min_potential(gaps: &[GapSummary], min: InvestmentPotential) -> Vec<GapSummary> {
    gaps.iter()
        .filter(|g| g.investment_potential.weight() >= min.weight())
        .cloned()
        .collect()
}

/// Total idle capacity across `records`.
pub fn processing_gap_mt(records: &[CapacityRecord]) -> f64 {
    records.iter().map(|r| r.unutilized_capacity_mt()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::model::Country;
    use approx::assert_relative_eq;

    fn cap(country: Country, kind: &str, total: f64, util: f64, p: InvestmentPotential) -> CapacityRecord {
        CapacityRecord::new(country, kind, 1, total, util, p).unwrap()
    }

    #[test]
    fn ranks_source_capacity() {
        let d = Dataset::shared().unwrap();
        let gaps = rank_gap_by_type(d.capacity());
        let order: Vec<&str> = gaps.iter().map(|g| g.processing_type.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "Maize Milling",
                "Wheat Milling",
                "Vegetable Oil Extraction",
                "Dairy Processing",
                "Meat Processing",
                "Cotton Ginning",
                "Vegetable Processing",
            ]
        );
        let maize = &gaps[0];
        assert_relative_eq!(maize.total_capacity_mt, 2_580_000.0);
        assert_relative_eq!(maize.unutilized_capacity_mt, 625_000.0 + 36_000.0);
        assert_relative_eq!(maize.mean_utilization_pct, 65.0);
        assert_eq!(maize.investment_potential, InvestmentPotential::Medium);
    }

    #[test]
    fn first_encountered_potential_wins() {
        let records = vec![
            cap(Country::Zambia, "Dairy", 100.0, 50.0, InvestmentPotential::Low),
            cap(Country::Botswana, "Dairy", 100.0, 50.0, InvestmentPotential::VeryHigh),
            cap(Country::Botswana, "Dairy", 100.0, 50.0, InvestmentPotential::High),
        ];
        let gaps = rank_gap_by_type(&records);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].investment_potential, InvestmentPotential::Low);

        let reversed: Vec<CapacityRecord> = records.into_iter().rev().collect();
        assert_eq!(
            rank_gap_by_type(&reversed)[0].investment_potential,
            InvestmentPotential::High
        );
    }

    #[test]
    fn ties_keep_first_appearance() {
        let records = vec![
            cap(Country::Zambia, "B", 100.0, 50.0, InvestmentPotential::Low),
            cap(Country::Zambia, "A", 100.0, 50.0, InvestmentPotential::Low),
        ];
        let gaps = rank_gap_by_type(&records);
        assert_eq!(gaps[0].processing_type, "B");
        assert_eq!(gaps[1].processing_type, "A");
    }

    #[test]
    fn empty_input_and_threshold_filter() {
        assert!(rank_gap_by_type(&[]).is_empty());
        assert_eq!(processing_gap_mt(&[]), 0.0);

        let d = Dataset::shared().unwrap();
        let gaps = rank_gap_by_type(d.capacity());
        let high = with_min_potential(&gaps, InvestmentPotential::High);
        assert!(high.iter().all(|g| g.investment_potential >= InvestmentPotential::High));
        assert_eq!(high.len(), 4);
    }
}
