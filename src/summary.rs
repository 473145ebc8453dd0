//! Market overview metrics and the derived tables behind each dashboard panel.

use serde::Serialize;
use tracing::debug;

use crate::aggregation::{
    group_by, import_export_split, mean, mean_for_keys, sum_by, top_n, top_n_groups,
    year_over_year_growth, Group,
};
use crate::dataset::Dataset;
use crate::filter::{filter, FilterSelection};
use crate::gap::processing_gap_mt;
use crate::model::{
    CapacityRecord, Commodity, Country, OpportunityRecord, PriceObservation, ProductionRecord,
    TradeDirection, TradeRecord,
};

pub const DEFAULT_TOP_CROPS: usize = 5;
pub const DEFAULT_TOP_YIELDS: usize = 10;
pub const DEFAULT_TOP_TRADE: usize = 10;
pub const DEFAULT_TOP_COUNTRY_CROPS: usize = 10;

/// Observations back from the latest price used as the "a year ago" point.
pub const PRICE_LOOKBACK: usize = 13;

/// Price cards shown under the price chart.
pub const PRICE_INSIGHT_CARDS: usize = 3;

/// Headline metrics for the current selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// False when the selection leaves no production, trade, capacity or
    /// opportunity rows. Prices carry no country axis and do not count.
    pub has_data: bool,
    pub latest_year: i32,
    pub latest_year_production_mt: f64,
    pub previous_year_production_mt: f64,
    /// 0 when the previous year is outside the selection or produced nothing.
    pub yoy_growth_pct: f64,
    pub total_imports_usd_millions: f64,
    pub processing_gap_mt: f64,
    /// Opportunities in the selected countries, whatever the size focus.
    pub opportunity_count: usize,
    /// Mean payback over the same opportunities as `opportunity_count`.
    pub mean_roi_years: Option<f64>,
}

impl DashboardSummary {
    pub fn compute(dataset: &Dataset, selection: &FilterSelection) -> Self {
        let production = filter(dataset.production(), selection);
        let trade = filter(dataset.trade(), selection);
        let capacity = filter(dataset.capacity(), selection);
        let by_country = FilterSelection {
            investment_size_bucket: None,
            ..selection.clone()
        };
        let opportunities = filter(dataset.opportunities(), &by_country);

        let latest_year = selection.year_range.end();
        let latest = production_in_year(&production, latest_year);
        let previous = production_in_year(&production, latest_year.saturating_sub(1));

        let summary = Self {
            has_data: !(production.is_empty()
                && trade.is_empty()
                && capacity.is_empty()
                && opportunities.is_empty()),
            latest_year,
            latest_year_production_mt: latest,
            previous_year_production_mt: previous,
            yoy_growth_pct: year_over_year_growth(latest, previous),
            total_imports_usd_millions: import_export_split(&trade).total_imports(),
            processing_gap_mt: processing_gap_mt(&capacity),
            opportunity_count: opportunities.len(),
            mean_roi_years: mean(opportunities.iter().map(|o| o.roi_years)),
        };
        debug!(?summary, "computed dashboard summary");
        summary
    }
}

fn production_in_year(records: &[ProductionRecord], year: i32) -> f64 {
    records
        .iter()
        .filter(|r| r.year == year)
        .map(|r| r.production_mt)
        .sum()
}

// ── Production ──────────────────────────────────────────────────────────────

/// Crops with the largest total production, largest first.
pub fn top_crops(records: &[ProductionRecord], n: usize) -> Vec<String> {
    let totals = sum_by(records, |r| r.crop.clone(), |r| r.production_mt);
    top_n_groups(&totals, n).into_iter().map(|g| g.key).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropGrowth {
    pub crop: String,
    pub latest_mt: f64,
    pub previous_mt: f64,
    pub growth_pct: f64,
}

/// Latest vs previous year production for each of `crops`.
///
/// Crops with no production in the previous year are left out.
pub fn crop_growth(records: &[ProductionRecord], latest_year: i32, crops: &[String]) -> Vec<CropGrowth> {
    crops
        .iter()
        .filter_map(|crop| {
            let in_year = |year: i32| -> f64 {
                records
                    .iter()
                    .filter(|r| r.year == year && &r.crop == crop)
                    .map(|r| r.production_mt)
                    .sum()
            };
            let latest_mt = in_year(latest_year);
            let previous_mt = in_year(latest_year.saturating_sub(1));
            (previous_mt > 0.0).then(|| CropGrowth {
                crop: crop.clone(),
                latest_mt,
                previous_mt,
                growth_pct: year_over_year_growth(latest_mt, previous_mt),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldSummary {
    pub country: Country,
    pub crop: String,
    pub mean_yield_mt_per_ha: f64,
    pub mean_production_mt: f64,
}

/// Mean yield and production per (country, crop), top `n` by mean yield.
pub fn yield_by_country_crop(records: &[ProductionRecord], n: usize) -> Vec<YieldSummary> {
    let summaries: Vec<YieldSummary> = group_by(records, |r| (r.country, r.crop.clone()))
        .into_iter()
        .filter_map(|((country, crop), members)| {
            Some(YieldSummary {
                country,
                crop,
                mean_yield_mt_per_ha: mean(members.iter().map(|r| r.yield_mt_per_ha()))?,
                mean_production_mt: mean(members.iter().map(|r| r.production_mt))?,
            })
        })
        .collect();
    top_n(&summaries, |s| s.mean_yield_mt_per_ha, n)
}

pub fn production_by_country(records: &[ProductionRecord]) -> Vec<Group<Country, f64>> {
    sum_by(records, |r| r.country, |r| r.production_mt)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryCropProduction {
    pub country: Country,
    pub crop: String,
    pub production_mt: f64,
}

/// Total production per (country, crop), top `n`.
pub fn production_by_country_crop(records: &[ProductionRecord], n: usize) -> Vec<CountryCropProduction> {
    let totals: Vec<CountryCropProduction> =
        sum_by(records, |r| (r.country, r.crop.clone()), |r| r.production_mt)
            .into_iter()
            .map(|g| CountryCropProduction {
                country: g.key.0,
                crop: g.key.1,
                production_mt: g.value,
            })
            .collect();
    top_n(&totals, |t| t.production_mt, n)
}

// ── Trade ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeTotal {
    pub country: Country,
    pub category: String,
    pub value_usd_millions: f64,
}

/// Total trade value per (country, category) in one direction, top `n`.
pub fn trade_by_country_category(
    records: &[TradeRecord],
    direction: TradeDirection,
    n: usize,
) -> Vec<TradeTotal> {
    let in_direction: Vec<&TradeRecord> =
        records.iter().filter(|r| r.direction == direction).collect();
    let totals: Vec<TradeTotal> = sum_by(
        &in_direction,
        |r| (r.country, r.category.clone()),
        |r| r.value_usd_millions,
    )
    .into_iter()
    .map(|g| TradeTotal {
        country: g.key.0,
        category: g.key.1,
        value_usd_millions: g.value,
    })
    .collect();
    top_n(&totals, |t| t.value_usd_millions, n)
}

// ── Capacity ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryCapacity {
    pub country: Country,
    pub total_capacity_mt: f64,
    /// `None` when the country has no capacity rows in view.
    pub mean_utilization_pct: Option<f64>,
}

/// Capacity totals for each of `countries`, in the order given.
pub fn capacity_by_country(records: &[CapacityRecord], countries: &[Country]) -> Vec<CountryCapacity> {
    mean_for_keys(records, countries, |r| r.country, |r| r.utilization_pct)
        .into_iter()
        .map(|g| CountryCapacity {
            country: g.key,
            total_capacity_mt: records
                .iter()
                .filter(|r| r.country == g.key)
                .map(|r| r.total_capacity_mt)
                .sum(),
            mean_utilization_pct: g.value,
        })
        .collect()
}

// ── Prices ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceChange {
    pub commodity: Commodity,
    pub current_price: f64,
    pub year_ago_price: f64,
    pub change_pct: f64,
}

/// Latest price of `commodity` against the price [`PRICE_LOOKBACK`] points
/// earlier, or against the first point when the series is shorter.
pub fn price_change_yoy(prices: &[PriceObservation], commodity: Commodity) -> Option<PriceChange> {
    let series: Vec<f64> = prices
        .iter()
        .filter(|p| p.commodity == commodity)
        .map(|p| p.price_usd_per_mt)
        .collect();
    let current_price = *series.last()?;
    let year_ago_price = if series.len() > PRICE_LOOKBACK {
        series[series.len() - PRICE_LOOKBACK]
    } else {
        series[0]
    };
    Some(PriceChange {
        commodity,
        current_price,
        year_ago_price,
        change_pct: year_over_year_growth(current_price, year_ago_price),
    })
}

// ── Opportunities ───────────────────────────────────────────────────────────

/// Opportunities grouped per country, in first-appearance order.
pub fn opportunities_by_country(records: &[OpportunityRecord]) -> Vec<Group<Country, Vec<OpportunityRecord>>> {
    group_by(records, |o| o.country)
        .into_iter()
        .map(|(country, members)| Group {
            key: country,
            value: members.into_iter().cloned().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::YearRange;
    use approx::assert_relative_eq;

    fn dataset() -> std::sync::Arc<Dataset> {
        Dataset::shared().unwrap()
    }

    #[test]
    fn default_summary_matches_source_figures() {
        let d = dataset();
        let s = DashboardSummary::compute(&d, &FilterSelection::default());
        assert_eq!(s.latest_year, 2023);
        // Zambia 2023: 3.6M + 480K + 340K + 240K + 160K + 100K + 1.0M + 1.4M
        // Botswana 2023: 32K + 11K + 3.8K + 3K + 2.2K
        assert_relative_eq!(s.latest_year_production_mt, 7_320_000.0 + 52_000.0);
        assert_relative_eq!(s.previous_year_production_mt, 7_065_000.0 + 44_700.0);
        assert_relative_eq!(
            s.yoy_growth_pct,
            (7_372_000.0 - 7_109_700.0) / 7_109_700.0 * 100.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(s.processing_gap_mt, 1_118_500.0);
        assert_eq!(s.opportunity_count, 9);
        assert_relative_eq!(s.mean_roi_years.unwrap(), 37.0 / 9.0);
    }

    #[test]
    fn import_total_only_counts_imports() {
        let d = dataset();
        let sel = FilterSelection::new([Country::Zambia], YearRange::new(2023, 2023).unwrap());
        let s = DashboardSummary::compute(&d, &sel);
        // Wheat 130 + Processed Foods 320 + Vegetable Oil 85
        assert_relative_eq!(s.total_imports_usd_millions, 535.0);
    }

    #[test]
    fn single_year_range_has_zero_growth() {
        let d = dataset();
        let sel = FilterSelection::new(Country::ALL, YearRange::new(2021, 2021).unwrap());
        let s = DashboardSummary::compute(&d, &sel);
        assert_eq!(s.previous_year_production_mt, 0.0);
        assert_eq!(s.yoy_growth_pct, 0.0);
    }

    #[test]
    fn empty_selection_has_no_mean_roi() {
        let d = dataset();
        let sel = FilterSelection::new(Vec::<Country>::new(), YearRange::default());
        let s = DashboardSummary::compute(&d, &sel);
        assert!(!s.has_data);
        assert_eq!(s.opportunity_count, 0);
        assert_eq!(s.mean_roi_years, None);
        assert_eq!(s.latest_year_production_mt, 0.0);

        let years_outside = FilterSelection::new(Country::ALL, YearRange::new(1990, 1995).unwrap());
        let s = DashboardSummary::compute(&d, &years_outside);
        // capacity and opportunities have no year axis
        assert!(s.has_data);
        assert_eq!(s.latest_year_production_mt, 0.0);
    }

    #[test]
    fn default_summary_has_data() {
        assert!(DashboardSummary::compute(&dataset(), &FilterSelection::default()).has_data);
    }

    #[test]
    fn size_focus_does_not_change_headline_opportunities() {
        let d = dataset();
        let sel = FilterSelection::default().with_size_bucket(crate::model::SizeBucket::Large);
        let s = DashboardSummary::compute(&d, &sel);
        assert_eq!(s.opportunity_count, 9);
        assert_relative_eq!(s.mean_roi_years.unwrap(), 37.0 / 9.0);
    }

    #[test]
    fn earliest_representable_year_does_not_overflow() {
        let d = dataset();
        let sel = FilterSelection::new(Country::ALL, YearRange::new(i32::MIN, i32::MIN).unwrap());
        let s = DashboardSummary::compute(&d, &sel);
        assert_eq!(s.latest_year, i32::MIN);
        assert_eq!(s.yoy_growth_pct, 0.0);
        let crops = vec!["Maize".to_string()];
        assert!(crop_growth(d.production(), i32::MIN, &crops).is_empty());
    }

    #[test]
    fn crop_growth_skips_missing_previous_year() {
        let d = dataset();
        let crops = vec!["Maize".to_string(), "Teff".to_string()];
        let growth = crop_growth(d.production(), 2023, &crops);
        assert_eq!(growth.len(), 1);
        assert_relative_eq!(growth[0].latest_mt, 3_611_000.0);
        assert_relative_eq!(growth[0].previous_mt, 3_509_000.0);
    }

    #[test]
    fn yield_table_is_ranked() {
        let d = dataset();
        let yields = yield_by_country_crop(d.production(), DEFAULT_TOP_YIELDS);
        assert_eq!(yields.len(), 10);
        assert_eq!(yields[0].crop, "Sweet Potato");
        assert!(yields
            .windows(2)
            .all(|w| w[0].mean_yield_mt_per_ha >= w[1].mean_yield_mt_per_ha));
    }

    #[test]
    fn country_and_country_crop_totals() {
        let d = dataset();
        let by_country = production_by_country(d.production());
        assert_eq!(by_country.len(), 2);
        assert_eq!(by_country[0].key, Country::Zambia);

        let top = production_by_country_crop(d.production(), DEFAULT_TOP_COUNTRY_CROPS);
        assert_eq!(top.len(), 10);
        assert_eq!((top[0].country, top[0].crop.as_str()), (Country::Zambia, "Maize"));
        assert_relative_eq!(top[0].production_mt, 16_600_000.0);
    }

    #[test]
    fn trade_tables_by_direction() {
        let d = dataset();
        let imports = trade_by_country_category(d.trade(), TradeDirection::Import, DEFAULT_TOP_TRADE);
        assert_eq!(imports.len(), 9);
        assert_eq!(imports[0].country, Country::Botswana);
        assert_eq!(imports[0].category, "Processed Foods Imports");
        assert_relative_eq!(imports[0].value_usd_millions, 2_550.0);

        let exports = trade_by_country_category(d.trade(), TradeDirection::Export, DEFAULT_TOP_TRADE);
        let categories: Vec<&str> = exports.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(categories, vec!["Maize Exports", "Soybean Exports", "Cotton Exports"]);
    }

    #[test]
    fn capacity_reports_missing_countries() {
        let d = dataset();
        let zambia_only: Vec<CapacityRecord> = d
            .capacity()
            .iter()
            .filter(|r| r.country == Country::Zambia)
            .cloned()
            .collect();
        let rows = capacity_by_country(&zambia_only, &Country::ALL);
        assert_relative_eq!(rows[0].total_capacity_mt, 3_680_000.0);
        assert_relative_eq!(rows[0].mean_utilization_pct.unwrap(), 395.0 / 6.0);
        assert_eq!(rows[1].total_capacity_mt, 0.0);
        assert_eq!(rows[1].mean_utilization_pct, None);
    }

    #[test]
    fn price_change_uses_thirteenth_from_last() {
        let d = dataset();
        let change = price_change_yoy(d.prices(), Commodity::Maize).unwrap();
        let series: Vec<f64> = d
            .prices()
            .iter()
            .filter(|p| p.commodity == Commodity::Maize)
            .map(|p| p.price_usd_per_mt)
            .collect();
        assert_eq!(change.current_price, series[69]);
        assert_eq!(change.year_ago_price, series[57]);

        let short: Vec<PriceObservation> = d
            .prices()
            .iter()
            .filter(|p| p.commodity == Commodity::Wheat)
            .take(5)
            .cloned()
            .collect();
        let change = price_change_yoy(&short, Commodity::Wheat).unwrap();
        assert_eq!(change.year_ago_price, short[0].price_usd_per_mt);
        assert!(price_change_yoy(&short, Commodity::Cotton).is_none());
    }

    #[test]
    fn opportunities_group_per_country() {
        let d = dataset();
        let groups = opportunities_by_country(d.opportunities());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, Country::Zambia);
        assert_eq!(groups[0].value.len(), 5);
        assert_eq!(groups[1].value.len(), 4);
    }
}
