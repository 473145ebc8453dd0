//! Compiled-in dataset tables and the shared, lazily built store.
//!
//! Figures come from FAO statistics, national statistics offices and
//! ministry surveys for Zambia and Botswana, 2019-2023.

use std::sync::Arc;

use lazy_static::lazy_static;
use tracing::{debug, error};

use crate::error::{AgroError, Result};
use crate::model::{
    CapacityRecord, Country, InvestmentPotential, InvestmentRange, OpportunityRecord,
    PriceObservation, ProductionRecord, TradeRecord,
};
use crate::prices::{self, DEFAULT_PRICE_SEED};

/// Years covered by the production and trade tables.
pub const YEARS: [i32; 5] = [2019, 2020, 2021, 2022, 2023];
pub const FIRST_YEAR: i32 = YEARS[0];
pub const LAST_YEAR: i32 = YEARS[YEARS.len() - 1];

// ── Raw tables ──────────────────────────────────────────────────────────────

/// (crop, production MT per year, area hectares per year)
type CropRow = (&'static str, [f64; 5], [f64; 5]);

const ZAMBIA_PRODUCTION: &[CropRow] = &[
    ("Maize", [3_200_000.0, 2_500_000.0, 3_800_000.0, 3_500_000.0, 3_600_000.0], [1_200_000.0, 1_100_000.0, 1_300_000.0, 1_250_000.0, 1_280_000.0]),
    ("Soybean", [350_000.0, 380_000.0, 420_000.0, 450_000.0, 480_000.0], [180_000.0, 200_000.0, 220_000.0, 240_000.0, 260_000.0]),
    ("Wheat", [250_000.0, 280_000.0, 300_000.0, 320_000.0, 340_000.0], [85_000.0, 90_000.0, 95_000.0, 100_000.0, 105_000.0]),
    ("Cotton", [180_000.0, 160_000.0, 200_000.0, 220_000.0, 240_000.0], [120_000.0, 110_000.0, 130_000.0, 140_000.0, 150_000.0]),
    ("Groundnuts", [120_000.0, 130_000.0, 140_000.0, 150_000.0, 160_000.0], [180_000.0, 185_000.0, 190_000.0, 195_000.0, 200_000.0]),
    ("Sunflower", [80_000.0, 85_000.0, 90_000.0, 95_000.0, 100_000.0], [45_000.0, 47_000.0, 49_000.0, 51_000.0, 53_000.0]),
    ("Sweet Potato", [900_000.0, 920_000.0, 950_000.0, 980_000.0, 1_000_000.0], [80_000.0, 82_000.0, 84_000.0, 86_000.0, 88_000.0]),
    ("Cassava", [1_200_000.0, 1_250_000.0, 1_300_000.0, 1_350_000.0, 1_400_000.0], [280_000.0, 285_000.0, 290_000.0, 295_000.0, 300_000.0]),
];

const BOTSWANA_PRODUCTION: &[CropRow] = &[
    ("Sorghum", [25_000.0, 18_000.0, 30_000.0, 28_000.0, 32_000.0], [85_000.0, 80_000.0, 90_000.0, 88_000.0, 92_000.0]),
    ("Maize", [8_000.0, 6_000.0, 10_000.0, 9_000.0, 11_000.0], [25_000.0, 22_000.0, 28_000.0, 26_000.0, 30_000.0]),
    ("Millet", [3_000.0, 2_500.0, 3_500.0, 3_200.0, 3_800.0], [15_000.0, 13_000.0, 16_000.0, 15_000.0, 17_000.0]),
    ("Beans", [2_500.0, 2_200.0, 2_800.0, 2_600.0, 3_000.0], [8_000.0, 7_500.0, 8_500.0, 8_200.0, 9_000.0]),
    ("Groundnuts", [1_800.0, 1_600.0, 2_000.0, 1_900.0, 2_200.0], [7_000.0, 6_500.0, 7_500.0, 7_200.0, 8_000.0]),
];

/// (category, USD millions per year)
type TradeRow = (&'static str, [f64; 5]);

const ZAMBIA_TRADE: &[TradeRow] = &[
    ("Maize Exports", [120.0, 80.0, 180.0, 150.0, 160.0]),
    ("Wheat Imports", [95.0, 105.0, 110.0, 120.0, 130.0]),
    ("Soybean Exports", [45.0, 50.0, 60.0, 70.0, 80.0]),
    ("Cotton Exports", [30.0, 25.0, 35.0, 40.0, 45.0]),
    ("Processed Foods Imports", [250.0, 260.0, 280.0, 300.0, 320.0]),
    ("Vegetable Oil Imports", [65.0, 70.0, 75.0, 80.0, 85.0]),
];

const BOTSWANA_TRADE: &[TradeRow] = &[
    ("Maize Imports", [180.0, 200.0, 190.0, 210.0, 220.0]),
    ("Wheat Imports", [85.0, 90.0, 95.0, 100.0, 105.0]),
    ("Meat Imports", [120.0, 130.0, 140.0, 150.0, 160.0]),
    ("Dairy Imports", [95.0, 100.0, 105.0, 110.0, 115.0]),
    ("Processed Foods Imports", [450.0, 480.0, 510.0, 540.0, 570.0]),
    ("Vegetable Oil Imports", [45.0, 48.0, 51.0, 54.0, 57.0]),
];

/// (country, processing type, facilities, capacity MT/year, utilization %, potential)
type CapacityRow = (Country, &'static str, u32, f64, f64, InvestmentPotential);

const CAPACITY: &[CapacityRow] = &[
    (Country::Zambia, "Maize Milling", 85, 2_500_000.0, 75.0, InvestmentPotential::Medium),
    (Country::Zambia, "Wheat Milling", 12, 400_000.0, 60.0, InvestmentPotential::High),
    (Country::Zambia, "Vegetable Oil Extraction", 8, 150_000.0, 45.0, InvestmentPotential::VeryHigh),
    (Country::Zambia, "Cotton Ginning", 15, 200_000.0, 70.0, InvestmentPotential::Medium),
    (Country::Zambia, "Dairy Processing", 25, 180_000.0, 65.0, InvestmentPotential::High),
    (Country::Zambia, "Meat Processing", 35, 250_000.0, 80.0, InvestmentPotential::Medium),
    (Country::Botswana, "Maize Milling", 8, 80_000.0, 55.0, InvestmentPotential::High),
    (Country::Botswana, "Dairy Processing", 5, 50_000.0, 70.0, InvestmentPotential::Medium),
    (Country::Botswana, "Meat Processing", 12, 120_000.0, 85.0, InvestmentPotential::Low),
    (Country::Botswana, "Vegetable Processing", 4, 15_000.0, 40.0, InvestmentPotential::VeryHigh),
];

/// (country, opportunity, investment range, ROI years, market gap MT, key driver)
type OpportunityRow = (Country, &'static str, &'static str, f64, f64, &'static str);

const OPPORTUNITIES: &[OpportunityRow] = &[
    (Country::Zambia, "Vegetable Oil Processing Plant", "5M - 15M", 4.0, 85_000.0, "High import dependency (85M USD/year)"),
    (Country::Zambia, "Soybean Processing & Crushing", "3M - 8M", 3.5, 200_000.0, "Growing export demand + local needs"),
    (Country::Zambia, "Wheat Flour Milling", "8M - 20M", 5.0, 120_000.0, "Import substitution opportunity"),
    (Country::Zambia, "Cotton Textile Manufacturing", "10M - 25M", 6.0, 60_000.0, "Value addition to raw cotton exports"),
    (Country::Zambia, "Dried Fruit Processing", "1M - 3M", 3.0, 15_000.0, "Growing regional demand"),
    (Country::Botswana, "Vegetable Processing & Packaging", "2M - 5M", 3.5, 9_000.0, "Limited local processing capacity"),
    (Country::Botswana, "Dairy Processing Plant", "4M - 10M", 5.0, 15_000.0, "Import substitution (115M USD/year)"),
    (Country::Botswana, "Grain Storage & Handling", "3M - 7M", 4.0, 50_000.0, "Harvest loss reduction"),
    (Country::Botswana, "Organic Produce Processing", "1M - 3M", 3.0, 8_000.0, "Premium pricing in SADC markets"),
];

// ── Table builders ──────────────────────────────────────────────────────────

pub fn build_production() -> Result<Vec<ProductionRecord>> {
    let mut records = Vec::new();
    for (country, rows) in [
        (Country::Zambia, ZAMBIA_PRODUCTION),
        (Country::Botswana, BOTSWANA_PRODUCTION),
    ] {
        for (crop, production, area) in rows {
            for (i, year) in YEARS.iter().enumerate() {
                records.push(ProductionRecord::new(
                    *year,
                    country,
                    *crop,
                    production[i],
                    area[i],
                )?);
            }
        }
    }
    Ok(records)
}

pub fn build_trade() -> Result<Vec<TradeRecord>> {
    let mut records = Vec::new();
    for (country, rows) in [
        (Country::Zambia, ZAMBIA_TRADE),
        (Country::Botswana, BOTSWANA_TRADE),
    ] {
        for (category, values) in rows {
            for (year, value) in YEARS.iter().zip(values) {
                records.push(TradeRecord::new(*year, country, *category, *value)?);
            }
        }
    }
    Ok(records)
}

pub fn build_capacity() -> Result<Vec<CapacityRecord>> {
    CAPACITY
        .iter()
        .map(|(country, kind, facilities, total, utilization, potential)| {
            CapacityRecord::new(*country, *kind, *facilities, *total, *utilization, *potential)
        })
        .collect()
}

pub fn build_opportunities() -> Result<Vec<OpportunityRecord>> {
    OPPORTUNITIES
        .iter()
        .map(|(country, name, range, roi_years, gap, driver)| {
            OpportunityRecord::new(
                *country,
                *name,
                InvestmentRange::parse(range)?,
                *roi_years,
                *gap,
                *driver,
            )
        })
        .collect()
}

// ── Dataset ─────────────────────────────────────────────────────────────────

/// The five immutable tables. Built once and shared by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    production: Vec<ProductionRecord>,
    trade: Vec<TradeRecord>,
    capacity: Vec<CapacityRecord>,
    prices: Vec<PriceObservation>,
    opportunities: Vec<OpportunityRecord>,
}

impl Dataset {
    /// Build every table, with the price series drawn from `price_seed`.
    pub fn build(price_seed: u64) -> Result<Self> {
        let dataset = Self {
            production: build_production()?,
            trade: build_trade()?,
            capacity: build_capacity()?,
            prices: prices::build_price_table(price_seed)?,
            opportunities: build_opportunities()?,
        };
        debug!(
            production = dataset.production.len(),
            trade = dataset.trade.len(),
            capacity = dataset.capacity.len(),
            prices = dataset.prices.len(),
            opportunities = dataset.opportunities.len(),
            "dataset built"
        );
        Ok(dataset)
    }

    /// The process-wide dataset, built on first access with the default seed.
    pub fn shared() -> Result<Arc<Dataset>> {
        SHARED
            .as_ref()
            .map(Arc::clone)
            .map_err(|e| AgroError::DataUnavailable(e.clone()))
    }

    pub fn production(&self) -> &[ProductionRecord] {
        &self.production
    }

    pub fn trade(&self) -> &[TradeRecord] {
        &self.trade
    }

    pub fn capacity(&self) -> &[CapacityRecord] {
        &self.capacity
    }

    pub fn prices(&self) -> &[PriceObservation] {
        &self.prices
    }

    pub fn opportunities(&self) -> &[OpportunityRecord] {
        &self.opportunities
    }
}

lazy_static! {
    static ref SHARED: std::result::Result<Arc<Dataset>, String> =
        Dataset::build(DEFAULT_PRICE_SEED).map(Arc::new).map_err(|e| {
            error!(error = %e, "compiled-in dataset failed validation");
            e.to_string()
        });
}

fn shared_ref() -> Result<&'static Dataset> {
    SHARED
        .as_ref()
        .map(|d| &**d)
        .map_err(|e| AgroError::DataUnavailable(e.clone()))
}

// ── Memoized loaders ────────────────────────────────────────────────────────

pub fn load_production() -> Result<&'static [ProductionRecord]> {
    shared_ref().map(Dataset::production)
}

pub fn load_trade() -> Result<&'static [TradeRecord]> {
    shared_ref().map(Dataset::trade)
}

pub fn load_capacity() -> Result<&'static [CapacityRecord]> {
    shared_ref().map(Dataset::capacity)
}

pub fn load_prices() -> Result<&'static [PriceObservation]> {
    shared_ref().map(Dataset::prices)
}

pub fn load_opportunities() -> Result<&'static [OpportunityRecord]> {
    shared_ref().map(Dataset::opportunities)
}
