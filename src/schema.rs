//! Column-name constants for the exported DataFrames.
//! Single source of truth - shared by `frame` and the Python bindings.

// ── Shared key columns ──────────────────────────────────────────────────────
pub mod keys {
    pub const YEAR: &str = "year";
    pub const COUNTRY: &str = "country";
}

// ── Production columns ──────────────────────────────────────────────────────
pub mod production {
    pub const CROP: &str = "crop";
    pub const PRODUCTION_MT: &str = "production_mt";
    pub const AREA_HECTARES: &str = "area_hectares";
    pub const YIELD_MT_PER_HA: &str = "yield_mt_per_ha";
    pub const MEAN_YIELD_MT_PER_HA: &str = "mean_yield_mt_per_ha";
    pub const MEAN_PRODUCTION_MT: &str = "mean_production_mt";
}

// ── Trade columns ───────────────────────────────────────────────────────────
pub mod trade {
    pub const CATEGORY: &str = "category";
    pub const DIRECTION: &str = "direction";
    pub const VALUE_USD_MILLIONS: &str = "value_usd_millions";
}

// ── Processing capacity columns ─────────────────────────────────────────────
pub mod capacity {
    pub const PROCESSING_TYPE: &str = "processing_type";
    pub const FACILITY_COUNT: &str = "facility_count";
    pub const TOTAL_CAPACITY_MT: &str = "total_capacity_mt";
    pub const UTILIZATION_PCT: &str = "utilization_pct";
    pub const MEAN_UTILIZATION_PCT: &str = "mean_utilization_pct";
    pub const UTILIZED_CAPACITY_MT: &str = "utilized_capacity_mt";
    pub const UNUTILIZED_CAPACITY_MT: &str = "unutilized_capacity_mt";
    pub const INVESTMENT_POTENTIAL: &str = "investment_potential";
    pub const POTENTIAL_COLOR: &str = "potential_color";
}

// ── Price columns ───────────────────────────────────────────────────────────
pub mod prices {
    pub const DATE: &str = "date";
    pub const COMMODITY: &str = "commodity";
    pub const PRICE_USD_PER_MT: &str = "price_usd_per_mt";
}

// ── Opportunity columns ─────────────────────────────────────────────────────
pub mod opportunity {
    pub const OPPORTUNITY_NAME: &str = "opportunity_name";
    pub const INVESTMENT_RANGE: &str = "investment_range";
    pub const INVESTMENT_LOW_USD: &str = "investment_low_usd";
    pub const INVESTMENT_HIGH_USD: &str = "investment_high_usd";
    pub const SIZE_BUCKET: &str = "size_bucket";
    pub const ROI_YEARS: &str = "roi_years";
    pub const MARKET_GAP_MT: &str = "market_gap_mt";
    pub const KEY_DRIVER: &str = "key_driver";
}
