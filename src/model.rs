//! Record types for the five dashboard tables and the small enums they key on.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AgroError, Result};

// ── Country ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Country {
    Zambia,
    Botswana,
}

impl Country {
    pub const ALL: [Country; 2] = [Country::Zambia, Country::Botswana];

    pub fn name(self) -> &'static str {
        match self {
            Country::Zambia => "Zambia",
            Country::Botswana => "Botswana",
        }
    }

    /// Fixed chart colour used for every per-country series.
    pub fn color(self) -> &'static str {
        match self {
            Country::Zambia => "#c17a5c",
            Country::Botswana => "#d4a574",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Country {
    type Err = AgroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zambia" => Ok(Country::Zambia),
            "botswana" => Ok(Country::Botswana),
            _ => Err(AgroError::UnknownValue {
                kind: "country",
                value: s.to_string(),
            }),
        }
    }
}

// ── Commodity (price series) ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Commodity {
    Maize,
    Wheat,
    Soybean,
    Cotton,
    Groundnuts,
}

impl Commodity {
    /// Generation order of the price table; the seeded noise is drawn in this order.
    pub const ALL: [Commodity; 5] = [
        Commodity::Maize,
        Commodity::Wheat,
        Commodity::Soybean,
        Commodity::Cotton,
        Commodity::Groundnuts,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Commodity::Maize => "Maize",
            Commodity::Wheat => "Wheat",
            Commodity::Soybean => "Soybean",
            Commodity::Cotton => "Cotton",
            Commodity::Groundnuts => "Groundnuts",
        }
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Commodity {
    type Err = AgroError;

    fn from_str(s: &str) -> Result<Self> {
        Commodity::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AgroError::UnknownValue {
                kind: "commodity",
                value: s.to_string(),
            })
    }
}

// ── Trade direction ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeDirection {
    Import,
    Export,
}

impl TradeDirection {
    /// Reads the direction out of a category label such as "Wheat Imports".
    /// Only used when records are constructed.
    pub fn from_category(category: &str) -> Option<Self> {
        if category.contains("Imports") {
            Some(TradeDirection::Import)
        } else if category.contains("Exports") {
            Some(TradeDirection::Export)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TradeDirection::Import => "Import",
            TradeDirection::Export => "Export",
        }
    }
}

// ── Investment potential ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InvestmentPotential {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl InvestmentPotential {
    pub fn label(self) -> &'static str {
        match self {
            InvestmentPotential::Low => "Low",
            InvestmentPotential::Medium => "Medium",
            InvestmentPotential::High => "High",
            InvestmentPotential::VeryHigh => "Very High",
        }
    }

    /// Ordinal weight used for threshold filtering, Low = 1 through VeryHigh = 4.
    pub fn weight(self) -> u8 {
        match self {
            InvestmentPotential::Low => 1,
            InvestmentPotential::Medium => 2,
            InvestmentPotential::High => 3,
            InvestmentPotential::VeryHigh => 4,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            InvestmentPotential::Low => "#e8e6e0",
            InvestmentPotential::Medium => "#d4a574",
            InvestmentPotential::High => "#6b8e23",
            InvestmentPotential::VeryHigh => "#2d5016",
        }
    }
}

impl fmt::Display for InvestmentPotential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InvestmentPotential {
    type Err = AgroError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(InvestmentPotential::Low),
            "medium" => Ok(InvestmentPotential::Medium),
            "high" => Ok(InvestmentPotential::High),
            "veryhigh" => Ok(InvestmentPotential::VeryHigh),
            _ => Err(AgroError::UnknownValue {
                kind: "investment potential",
                value: s.to_string(),
            }),
        }
    }
}

// ── Investment range and size buckets ───────────────────────────────────────

/// Investment range in USD, parsed from labels like "5M - 15M".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvestmentRange {
    pub low_usd: f64,
    pub high_usd: f64,
}

impl InvestmentRange {
    pub fn new(low_usd: f64, high_usd: f64) -> Result<Self> {
        if !(low_usd >= 0.0 && high_usd >= low_usd) {
            return Err(AgroError::InvalidRecord(format!(
                "investment range {low_usd}..{high_usd} is not ordered and non-negative"
            )));
        }
        Ok(Self { low_usd, high_usd })
    }

    pub fn parse(label: &str) -> Result<Self> {
        let (low, high) = label.split_once('-').ok_or_else(|| {
            AgroError::InvalidRecord(format!("investment range '{label}' has no '-' separator"))
        })?;
        Self::new(parse_usd_amount(low)?, parse_usd_amount(high)?)
    }

    pub fn midpoint(&self) -> f64 {
        (self.low_usd + self.high_usd) / 2.0
    }

    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            format_usd_amount(self.low_usd),
            format_usd_amount(self.high_usd)
        )
    }
}

fn parse_usd_amount(raw: &str) -> Result<f64> {
    let s = raw.trim().trim_start_matches('$');
    let (digits, scale) = match s.chars().last() {
        Some('M') | Some('m') => (&s[..s.len() - 1], 1e6),
        Some('K') | Some('k') => (&s[..s.len() - 1], 1e3),
        _ => (s, 1.0),
    };
    digits
        .trim()
        .parse::<f64>()
        .map(|v| v * scale)
        .map_err(|_| AgroError::InvalidRecord(format!("cannot parse USD amount '{raw}'")))
}

fn format_usd_amount(usd: f64) -> String {
    if usd >= 1e6 {
        format!("{}M", usd / 1e6)
    } else if usd >= 1e3 {
        format!("{}K", usd / 1e3)
    } else {
        format!("{usd}")
    }
}

/// Investment size focus: Small (< $3M), Medium ($3M - $10M), Large (> $10M).
///
/// An opportunity belongs to the bucket containing the midpoint of its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
}

impl SizeBucket {
    pub const SMALL_UPPER_USD: f64 = 3_000_000.0;
    pub const LARGE_LOWER_USD: f64 = 10_000_000.0;

    pub fn classify(range: &InvestmentRange) -> Self {
        let mid = range.midpoint();
        if mid < Self::SMALL_UPPER_USD {
            SizeBucket::Small
        } else if mid > Self::LARGE_LOWER_USD {
            SizeBucket::Large
        } else {
            SizeBucket::Medium
        }
    }

    pub fn contains(self, range: &InvestmentRange) -> bool {
        Self::classify(range) == self
    }

    pub fn label(self) -> &'static str {
        match self {
            SizeBucket::Small => "Small (< $3M)",
            SizeBucket::Medium => "Medium ($3M - $10M)",
            SizeBucket::Large => "Large (> $10M)",
        }
    }
}

impl FromStr for SizeBucket {
    type Err = AgroError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        if lower.starts_with("small") {
            Ok(SizeBucket::Small)
        } else if lower.starts_with("medium") {
            Ok(SizeBucket::Medium)
        } else if lower.starts_with("large") {
            Ok(SizeBucket::Large)
        } else {
            Err(AgroError::UnknownValue {
                kind: "investment size bucket",
                value: s.to_string(),
            })
        }
    }
}

// ── Records ─────────────────────────────────────────────────────────────────

/// One crop's output for a country and year. Yield is derived once at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionRecord {
    pub year: i32,
    pub country: Country,
    pub crop: String,
    pub production_mt: f64,
    pub area_hectares: f64,
    yield_mt_per_ha: f64,
}

impl ProductionRecord {
    pub fn new(
        year: i32,
        country: Country,
        crop: impl Into<String>,
        production_mt: f64,
        area_hectares: f64,
    ) -> Result<Self> {
        let crop = crop.into();
        if !(area_hectares > 0.0) {
            return Err(AgroError::InvalidRecord(format!(
                "{country} {crop} {year}: area_hectares must be > 0, got {area_hectares}"
            )));
        }
        if !(production_mt >= 0.0) {
            return Err(AgroError::InvalidRecord(format!(
                "{country} {crop} {year}: production_mt must be >= 0, got {production_mt}"
            )));
        }
        Ok(Self {
            year,
            country,
            crop,
            production_mt,
            area_hectares,
            yield_mt_per_ha: production_mt / area_hectares,
        })
    }

    pub fn yield_mt_per_ha(&self) -> f64 {
        self.yield_mt_per_ha
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub year: i32,
    pub country: Country,
    pub category: String,
    pub direction: TradeDirection,
    pub value_usd_millions: f64,
}

impl TradeRecord {
    /// Builds a record whose direction is read from the category label.
    pub fn new(
        year: i32,
        country: Country,
        category: impl Into<String>,
        value_usd_millions: f64,
    ) -> Result<Self> {
        let category = category.into();
        let direction = TradeDirection::from_category(&category).ok_or_else(|| {
            AgroError::InvalidRecord(format!(
                "trade category '{category}' names neither Imports nor Exports"
            ))
        })?;
        Self::with_direction(year, country, category, direction, value_usd_millions)
    }

    pub fn with_direction(
        year: i32,
        country: Country,
        category: impl Into<String>,
        direction: TradeDirection,
        value_usd_millions: f64,
    ) -> Result<Self> {
        let category = category.into();
        if !(value_usd_millions >= 0.0) {
            return Err(AgroError::InvalidRecord(format!(
                "{country} {category} {year}: value must be >= 0, got {value_usd_millions}"
            )));
        }
        Ok(Self {
            year,
            country,
            category,
            direction,
            value_usd_millions,
        })
    }
}

/// Installed processing capacity for one processing type in one country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityRecord {
    pub country: Country,
    pub processing_type: String,
    pub facility_count: u32,
    pub total_capacity_mt: f64,
    pub utilization_pct: f64,
    pub investment_potential: InvestmentPotential,
    unutilized_capacity_mt: f64,
}

impl CapacityRecord {
    pub fn new(
        country: Country,
        processing_type: impl Into<String>,
        facility_count: u32,
        total_capacity_mt: f64,
        utilization_pct: f64,
        investment_potential: InvestmentPotential,
    ) -> Result<Self> {
        let processing_type = processing_type.into();
        if !(total_capacity_mt >= 0.0) {
            return Err(AgroError::InvalidRecord(format!(
                "{country} {processing_type}: total capacity must be >= 0, got {total_capacity_mt}"
            )));
        }
        if !(0.0..=100.0).contains(&utilization_pct) {
            return Err(AgroError::InvalidRecord(format!(
                "{country} {processing_type}: utilization must be in [0, 100], got {utilization_pct}"
            )));
        }
        Ok(Self {
            country,
            processing_type,
            facility_count,
            total_capacity_mt,
            utilization_pct,
            investment_potential,
            unutilized_capacity_mt: total_capacity_mt * (100.0 - utilization_pct) / 100.0,
        })
    }

    pub fn unutilized_capacity_mt(&self) -> f64 {
        self.unutilized_capacity_mt
    }

    pub fn utilized_capacity_mt(&self) -> f64 {
        self.total_capacity_mt * self.utilization_pct / 100.0
    }
}

/// Month-end price point for one commodity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub commodity: Commodity,
    pub price_usd_per_mt: f64,
}

impl PriceObservation {
    pub fn new(date: NaiveDate, commodity: Commodity, price_usd_per_mt: f64) -> Result<Self> {
        if !(price_usd_per_mt > 0.0) {
            return Err(AgroError::InvalidRecord(format!(
                "{commodity} {date}: price must be > 0, got {price_usd_per_mt}"
            )));
        }
        Ok(Self {
            date,
            commodity,
            price_usd_per_mt,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityRecord {
    pub country: Country,
    pub opportunity_name: String,
    pub investment_range: InvestmentRange,
    pub roi_years: f64,
    pub market_gap_mt: f64,
    pub key_driver: String,
}

impl OpportunityRecord {
    pub fn new(
        country: Country,
        opportunity_name: impl Into<String>,
        investment_range: InvestmentRange,
        roi_years: f64,
        market_gap_mt: f64,
        key_driver: impl Into<String>,
    ) -> Result<Self> {
        let opportunity_name = opportunity_name.into();
        if !(roi_years > 0.0) {
            return Err(AgroError::InvalidRecord(format!(
                "{opportunity_name}: roi_years must be > 0, got {roi_years}"
            )));
        }
        if !(market_gap_mt >= 0.0) {
            return Err(AgroError::InvalidRecord(format!(
                "{opportunity_name}: market gap must be >= 0, got {market_gap_mt}"
            )));
        }
        Ok(Self {
            country,
            opportunity_name,
            investment_range,
            roi_years,
            market_gap_mt,
            key_driver: key_driver.into(),
        })
    }

    pub fn size_bucket(&self) -> SizeBucket {
        SizeBucket::classify(&self.investment_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn production_rejects_zero_area() {
        let err = ProductionRecord::new(2020, Country::Zambia, "Maize", 10.0, 0.0).unwrap_err();
        assert!(matches!(err, AgroError::InvalidRecord(_)));
    }

    #[test]
    fn production_derives_yield() {
        let r = ProductionRecord::new(2020, Country::Zambia, "Wheat", 340_000.0, 105_000.0).unwrap();
        assert_relative_eq!(r.yield_mt_per_ha(), 340_000.0 / 105_000.0);
    }

    #[test]
    fn trade_direction_comes_from_category_once() {
        let r = TradeRecord::new(2023, Country::Botswana, "Dairy Imports", 115.0).unwrap();
        assert_eq!(r.direction, TradeDirection::Import);
        assert!(TradeRecord::new(2023, Country::Botswana, "Dairy", 1.0).is_err());
    }

    #[test]
    fn capacity_derives_unutilized() {
        let r = CapacityRecord::new(
            Country::Zambia,
            "Maize Milling",
            85,
            2_500_000.0,
            75.0,
            InvestmentPotential::Medium,
        )
        .unwrap();
        assert_relative_eq!(r.unutilized_capacity_mt(), 625_000.0);
        assert_relative_eq!(r.utilized_capacity_mt(), 1_875_000.0);
    }

    #[test]
    fn capacity_rejects_utilization_out_of_range() {
        assert!(CapacityRecord::new(
            Country::Zambia,
            "Maize Milling",
            1,
            10.0,
            101.0,
            InvestmentPotential::Low
        )
        .is_err());
    }

    #[test]
    fn investment_range_parses_labels() {
        let r = InvestmentRange::parse("5M - 15M").unwrap();
        assert_relative_eq!(r.low_usd, 5e6);
        assert_relative_eq!(r.high_usd, 15e6);
        assert_eq!(r.label(), "5M - 15M");
        assert!(InvestmentRange::parse("15M").is_err());
        assert!(InvestmentRange::parse("9M - 2M").is_err());
    }

    #[test]
    fn size_bucket_uses_range_midpoint() {
        let small = InvestmentRange::parse("1M - 3M").unwrap();
        let medium = InvestmentRange::parse("5M - 15M").unwrap();
        let large = InvestmentRange::parse("8M - 20M").unwrap();
        assert_eq!(SizeBucket::classify(&small), SizeBucket::Small);
        assert_eq!(SizeBucket::classify(&medium), SizeBucket::Medium);
        assert_eq!(SizeBucket::classify(&large), SizeBucket::Large);
    }

    #[test]
    fn enums_parse_display_names() {
        assert_eq!("zambia".parse::<Country>().unwrap(), Country::Zambia);
        assert_eq!(
            "Very High".parse::<InvestmentPotential>().unwrap(),
            InvestmentPotential::VeryHigh
        );
        assert_eq!("groundnuts".parse::<Commodity>().unwrap(), Commodity::Groundnuts);
        assert_eq!(
            "Large (> $10M)".parse::<SizeBucket>().unwrap(),
            SizeBucket::Large
        );
        assert!("Malawi".parse::<Country>().is_err());
    }
}
