//! Filter engine: narrows record tables by a `FilterSelection`.
//!
//! Each record type exposes only the axes it carries. An axis a record does
//! not expose never excludes it, so one selection can be applied to every
//! table.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::dataset::{FIRST_YEAR, LAST_YEAR};
use crate::error::{AgroError, Result};
use crate::model::{
    CapacityRecord, Commodity, Country, InvestmentRange, OpportunityRecord, PriceObservation,
    ProductionRecord, SizeBucket, TradeRecord,
};

/// Inclusive year range. Deserialisation goes through [`YearRange::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawYearRange")]
pub struct YearRange {
    start: i32,
    end: i32,
}

#[derive(Deserialize)]
struct RawYearRange {
    start: i32,
    end: i32,
}

impl TryFrom<RawYearRange> for YearRange {
    type Error = AgroError;

    fn try_from(raw: RawYearRange) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self> {
        if start > end {
            return Err(AgroError::InvalidInput(format!(
                "year range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            start: FIRST_YEAR,
            end: LAST_YEAR,
        }
    }
}

/// The filter axes a record exposes.
pub trait Filterable {
    fn country(&self) -> Option<Country> {
        None
    }

    fn year(&self) -> Option<i32> {
        None
    }

    fn commodity(&self) -> Option<Commodity> {
        None
    }

    fn investment_range(&self) -> Option<&InvestmentRange> {
        None
    }
}

impl Filterable for ProductionRecord {
    fn country(&self) -> Option<Country> {
        Some(self.country)
    }

    fn year(&self) -> Option<i32> {
        Some(self.year)
    }
}

impl Filterable for TradeRecord {
    fn country(&self) -> Option<Country> {
        Some(self.country)
    }

    fn year(&self) -> Option<i32> {
        Some(self.year)
    }
}

impl Filterable for CapacityRecord {
    fn country(&self) -> Option<Country> {
        Some(self.country)
    }
}

/// Prices are filtered by commodity only; the price chart always spans the full series.
impl Filterable for PriceObservation {
    fn commodity(&self) -> Option<Commodity> {
        Some(self.commodity)
    }
}

impl Filterable for OpportunityRecord {
    fn country(&self) -> Option<Country> {
        Some(self.country)
    }

    fn investment_range(&self) -> Option<&InvestmentRange> {
        Some(&self.investment_range)
    }
}

/// Everything the viewer can select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub countries: BTreeSet<Country>,
    pub year_range: YearRange,
    /// Narrows price series only. `None` keeps every commodity.
    pub commodities: Option<BTreeSet<Commodity>>,
    /// `None` keeps every investment size.
    pub investment_size_bucket: Option<SizeBucket>,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            countries: Country::ALL.into_iter().collect(),
            year_range: YearRange::default(),
            commodities: None,
            investment_size_bucket: None,
        }
    }
}

impl FilterSelection {
    pub fn new(countries: impl IntoIterator<Item = Country>, year_range: YearRange) -> Self {
        Self {
            countries: countries.into_iter().collect(),
            year_range,
            commodities: None,
            investment_size_bucket: None,
        }
    }

    pub fn with_commodities(mut self, commodities: impl IntoIterator<Item = Commodity>) -> Self {
        self.commodities = Some(commodities.into_iter().collect());
        self
    }

    pub fn with_size_bucket(mut self, bucket: SizeBucket) -> Self {
        self.investment_size_bucket = Some(bucket);
        self
    }

    pub fn matches<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        if let Some(country) = record.country() {
            if !self.countries.contains(&country) {
                return false;
            }
        }
        if let Some(year) = record.year() {
            if !self.year_range.contains(year) {
                return false;
            }
        }
        if let (Some(commodity), Some(selected)) = (record.commodity(), &self.commodities) {
            if !selected.contains(&commodity) {
                return false;
            }
        }
        if let (Some(range), Some(bucket)) =
            (record.investment_range(), self.investment_size_bucket)
        {
            if !bucket.contains(range) {
                return false;
            }
        }
        true
    }
}

/// Records matching `selection`, in input order.
pub fn filter<R: Filterable + Clone>(records: &[R], selection: &FilterSelection) -> Vec<R> {
    let view: Vec<R> = records
        .iter()
        .filter(|r| selection.matches(*r))
        .cloned()
        .collect();
    trace!(
        input = records.len(),
        kept = view.len(),
        "filtered {}",
        std::any::type_name::<R>()
    );
    view
}
