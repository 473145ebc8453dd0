//! One dashboard session: a dataset, a configuration, and per-selection views.

use std::sync::Arc;

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::debug;

use crate::aggregation::Group;
use crate::config::DashboardConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::filter::{filter, FilterSelection};
use crate::frame;
use crate::gap::{rank_gap_by_type, GapSummary};
use crate::model::{
    CapacityRecord, Commodity, Country, OpportunityRecord, PriceObservation, ProductionRecord,
    TradeDirection, TradeRecord,
};
use crate::prices::DEFAULT_PRICE_SEED;
use crate::roi::{calculate_roi_with, RoiInputs, RoiOutcome};
use crate::summary::{
    capacity_by_country, crop_growth, opportunities_by_country, price_change_yoy,
    production_by_country, production_by_country_crop, top_crops, trade_by_country_category,
    yield_by_country_crop, CountryCapacity, CropGrowth, DashboardSummary, PriceChange,
    PRICE_INSIGHT_CARDS,
};
use crate::visualization::{self as viz, ChartSpec};

/// The five tables narrowed to one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub production: Vec<ProductionRecord>,
    pub trade: Vec<TradeRecord>,
    pub capacity: Vec<CapacityRecord>,
    pub prices: Vec<PriceObservation>,
    pub opportunities: Vec<OpportunityRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardCharts {
    pub production_trend: ChartSpec,
    pub yields: ChartSpec,
    pub country_share: ChartSpec,
    pub country_crops: ChartSpec,
    pub imports: ChartSpec,
    pub exports: ChartSpec,
    pub capacity: ChartSpec,
    pub gap: ChartSpec,
    pub prices: ChartSpec,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Arc<Dataset>,
    config: DashboardConfig,
}

impl Dashboard {
    pub fn new() -> Result<Self> {
        Self::with_config(DashboardConfig::default())
    }

    /// Uses the shared dataset unless the config asks for a different price seed.
    pub fn with_config(config: DashboardConfig) -> Result<Self> {
        let dataset = if config.price_seed == DEFAULT_PRICE_SEED {
            Dataset::shared()?
        } else {
            Arc::new(Dataset::build(config.price_seed)?)
        };
        Ok(Self { dataset, config })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn default_selection(&self) -> Result<FilterSelection> {
        self.config.selection()
    }

    pub fn view(&self, selection: &FilterSelection) -> DashboardView {
        let view = DashboardView {
            production: filter(self.dataset.production(), selection),
            trade: filter(self.dataset.trade(), selection),
            capacity: filter(self.dataset.capacity(), selection),
            prices: filter(self.dataset.prices(), selection),
            opportunities: filter(self.dataset.opportunities(), selection),
        };
        debug!(
            production = view.production.len(),
            trade = view.trade.len(),
            capacity = view.capacity.len(),
            prices = view.prices.len(),
            opportunities = view.opportunities.len(),
            "filtered dashboard view"
        );
        view
    }

    pub fn summary(&self, selection: &FilterSelection) -> DashboardSummary {
        DashboardSummary::compute(&self.dataset, selection)
    }

    /// Growth of the top crops between the last selected year and the one before.
    pub fn crop_insights(&self, selection: &FilterSelection) -> Vec<CropGrowth> {
        let production = filter(self.dataset.production(), selection);
        let crops = top_crops(&production, self.config.top_n.crops);
        crop_growth(&production, selection.year_range.end(), &crops)
    }

    pub fn gap_ranking(&self, selection: &FilterSelection) -> Vec<GapSummary> {
        rank_gap_by_type(&filter(self.dataset.capacity(), selection))
    }

    /// Mean yield and production per (country, crop) as a frame, top
    /// `top_n.yields` by mean yield.
    pub fn yield_table(&self, selection: &FilterSelection) -> Result<DataFrame> {
        let production = filter(self.dataset.production(), selection);
        frame::yield_summary_lazy(frame::production_frame(&production)?, self.config.top_n.yields)
    }

    /// Total capacity and mean utilization for every selected country.
    pub fn capacity_metrics(&self, selection: &FilterSelection) -> Vec<CountryCapacity> {
        let countries: Vec<Country> = selection.countries.iter().copied().collect();
        capacity_by_country(&filter(self.dataset.capacity(), selection), &countries)
    }

    /// Latest price against a year earlier for the first selected commodities.
    pub fn price_insights(&self, selection: &FilterSelection) -> Vec<PriceChange> {
        let commodities: Vec<Commodity> = match &selection.commodities {
            Some(selected) => selected.iter().copied().collect(),
            None => Commodity::ALL.to_vec(),
        };
        let prices = filter(self.dataset.prices(), selection);
        commodities
            .into_iter()
            .take(PRICE_INSIGHT_CARDS)
            .filter_map(|c| price_change_yoy(&prices, c))
            .collect()
    }

    /// Opportunities in view, one group per country.
    pub fn opportunity_cards(
        &self,
        selection: &FilterSelection,
    ) -> Vec<Group<Country, Vec<OpportunityRecord>>> {
        opportunities_by_country(&filter(self.dataset.opportunities(), selection))
    }

    pub fn charts(&self, selection: &FilterSelection) -> DashboardCharts {
        let view = self.view(selection);
        let top = &self.config.top_n;
        let cfg = &self.config.charts;
        DashboardCharts {
            production_trend: viz::production_trend_chart(
                &view.production,
                &top_crops(&view.production, top.crops),
                cfg,
            ),
            yields: viz::yield_chart(&yield_by_country_crop(&view.production, top.yields), cfg),
            country_share: viz::country_share_chart(&production_by_country(&view.production), cfg),
            country_crops: viz::country_crop_chart(
                &production_by_country_crop(&view.production, top.country_crops),
                cfg,
            ),
            imports: viz::trade_chart(
                &trade_by_country_category(&view.trade, TradeDirection::Import, top.trade),
                TradeDirection::Import,
                cfg,
            ),
            exports: viz::trade_chart(
                &trade_by_country_category(&view.trade, TradeDirection::Export, top.trade),
                TradeDirection::Export,
                cfg,
            ),
            capacity: viz::capacity_chart(&view.capacity, cfg),
            gap: viz::gap_chart(&rank_gap_by_type(&view.capacity), cfg),
            prices: viz::price_chart(&view.prices, cfg),
        }
    }

    pub fn roi(&self, inputs: &RoiInputs) -> Result<RoiOutcome> {
        calculate_roi_with(inputs, &self.config.roi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::YearRange;
    use crate::model::{Commodity, Country};

    #[test]
    fn default_dashboard_shares_dataset() {
        let dash = Dashboard::new().unwrap();
        assert!(std::ptr::eq(dash.dataset(), &*Dataset::shared().unwrap()));
    }

    #[test]
    fn custom_seed_builds_own_prices() {
        let config = DashboardConfig {
            price_seed: 7,
            ..DashboardConfig::default()
        };
        let dash = Dashboard::with_config(config).unwrap();
        let shared = Dataset::shared().unwrap();
        assert_ne!(dash.dataset().prices(), shared.prices());
        assert_eq!(dash.dataset().production(), shared.production());
    }

    #[test]
    fn default_selection_narrows_prices_only_by_commodity() {
        let dash = Dashboard::new().unwrap();
        let sel = dash.default_selection().unwrap();
        let view = dash.view(&sel);
        assert_eq!(view.production.len(), 65);
        assert_eq!(view.prices.len(), 3 * 70);
        assert!(view.prices.iter().all(|p| p.commodity != Commodity::Cotton));
    }

    #[test]
    fn crop_insights_cover_top_crops() {
        let dash = Dashboard::new().unwrap();
        let insights = dash.crop_insights(&FilterSelection::default());
        let crops: Vec<&str> = insights.iter().map(|g| g.crop.as_str()).collect();
        assert_eq!(crops, vec!["Maize", "Cassava", "Sweet Potato", "Soybean", "Wheat"]);
    }

    #[test]
    fn empty_commodity_selection_has_no_price_cards() {
        let dash = Dashboard::new().unwrap();
        let sel = FilterSelection::default().with_commodities(Vec::<Commodity>::new());
        assert!(dash.price_insights(&sel).is_empty());
    }

    #[test]
    fn charts_follow_selection() {
        let dash = Dashboard::new().unwrap();
        let sel = FilterSelection::new([Country::Botswana], YearRange::default());
        let charts = dash.charts(&sel);
        assert!(charts.exports.is_empty());
        assert!(charts.exports.note.is_some());
        assert_eq!(charts.capacity.series.len(), 2);
        assert_eq!(charts.gap.series[0].points.len(), 4);
        assert_eq!(charts.prices.series.len(), 5);
    }
}
