//! Dashboard configuration
//!
//! Default selection, ranking sizes, price seed, ROI assumptions and chart
//! heights. Every field falls back to its default when omitted from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::{FIRST_YEAR, LAST_YEAR};
use crate::error::Result;
use crate::filter::{FilterSelection, YearRange};
use crate::model::{Commodity, Country, SizeBucket};
use crate::prices::DEFAULT_PRICE_SEED;
use crate::roi::RoiAssumptions;
use crate::summary::{
    DEFAULT_TOP_COUNTRY_CROPS, DEFAULT_TOP_CROPS, DEFAULT_TOP_TRADE, DEFAULT_TOP_YIELDS,
};
use crate::visualization::ChartConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Seed for the synthetic price series
    pub price_seed: u64,

    /// Selection applied when the viewer has not chosen anything
    pub selection: SelectionConfig,

    /// Ranking sizes
    pub top_n: TopNConfig,

    pub roi: RoiAssumptions,

    pub charts: ChartConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            price_seed: DEFAULT_PRICE_SEED,
            selection: SelectionConfig::default(),
            top_n: TopNConfig::default(),
            roi: RoiAssumptions::default(),
            charts: ChartConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.roi.validate()?;
        config.selection.to_filter()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), "loaded dashboard config");
        Ok(config)
    }

    pub fn selection(&self) -> Result<FilterSelection> {
        self.selection.to_filter()
    }
}

/// Names as shown in the dashboard, parsed case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub countries: Vec<String>,
    pub start_year: i32,
    pub end_year: i32,
    pub commodities: Vec<String>,
    /// "small", "medium" or "large"; omitted means all sizes
    pub investment_size: Option<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            countries: Country::ALL.iter().map(|c| c.name().to_string()).collect(),
            start_year: FIRST_YEAR,
            end_year: LAST_YEAR,
            commodities: [Commodity::Maize, Commodity::Soybean, Commodity::Wheat]
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            investment_size: None,
        }
    }
}

impl SelectionConfig {
    pub fn to_filter(&self) -> Result<FilterSelection> {
        let countries = self
            .countries
            .iter()
            .map(|c| c.parse::<Country>())
            .collect::<Result<Vec<_>>>()?;
        let commodities = self
            .commodities
            .iter()
            .map(|c| c.parse::<Commodity>())
            .collect::<Result<Vec<_>>>()?;
        let year_range = YearRange::new(self.start_year, self.end_year)?;
        let mut selection = FilterSelection::new(countries, year_range).with_commodities(commodities);
        if let Some(size) = &self.investment_size {
            selection = selection.with_size_bucket(size.parse::<SizeBucket>()?);
        }
        Ok(selection)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopNConfig {
    pub crops: usize,
    pub yields: usize,
    pub country_crops: usize,
    pub trade: usize,
}

impl Default for TopNConfig {
    fn default() -> Self {
        Self {
            crops: DEFAULT_TOP_CROPS,
            yields: DEFAULT_TOP_YIELDS,
            country_crops: DEFAULT_TOP_COUNTRY_CROPS,
            trade: DEFAULT_TOP_TRADE,
        }
    }
}
