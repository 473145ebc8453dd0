//! Visualization module: typed chart specifications for every dashboard panel.
//!
//! Each builder takes an already filtered and aggregated table and produces a
//! `ChartSpec` that a front end renders as-is:
//! - series with their points, colours and hover text
//! - chart kind, orientation and axis titles
//! - a fixed height per panel, taken from `ChartConfig`
//!
//! Specs serialise to JSON with `serde_json`; no rendering happens here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregation::{group_by, Group};
use crate::error::Result;
use crate::gap::GapSummary;
use crate::model::{
    CapacityRecord, Commodity, Country, PriceObservation, ProductionRecord, TradeDirection,
};
use crate::summary::{CountryCropProduction, TradeTotal, YieldSummary};

/// Colour of the unutilized share in the capacity chart.
pub const UNUTILIZED_COLOR: &str = "#e8e6e0";
pub const UNUTILIZED_PATTERN: &str = "/";

/// Qualitative palette for per-crop lines.
pub const CROP_PALETTE: [&str; 10] = [
    "#7F3C8D", "#11A579", "#3969AC", "#F2B701", "#E73F74", "#80BA5A", "#E68310", "#008695",
    "#CF1C90", "#F97B72",
];

pub const NO_EXPORTS_NOTE: &str = "Limited export data for Botswana (net importer)";

// ── Config ──────────────────────────────────────────────────────────────────

/// Panel heights in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub trend_height: u32,
    pub yield_height: u32,
    pub share_height: u32,
    pub trade_height: u32,
    pub capacity_height: u32,
    pub gap_height: u32,
    pub price_height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            trend_height: 450,
            yield_height: 500,
            share_height: 450,
            trade_height: 400,
            capacity_height: 450,
            gap_height: 400,
            price_height: 400,
        }
    }
}

// ── Spec types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    StackedBar,
    Pie,
}

/// Horizontal bars put categories on the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Category {
    Year(i32),
    Date(NaiveDate),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub category: Category,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ChartPoint {
    fn new(category: Category, value: f64) -> Self {
        Self {
            category,
            value,
            color: None,
            text: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    fn new(name: impl Into<String>, color: Option<&str>, points: Vec<ChartPoint>) -> Self {
        Self {
            name: name.into(),
            color: color.map(str::to_string),
            pattern: None,
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub orientation: Orientation,
    pub height: u32,
    pub series: Vec<ChartSeries>,
    /// Shown instead of the chart when there is nothing to plot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ChartSpec {
    fn new(kind: ChartKind, title: &str, x_label: &str, y_label: &str, height: u32) -> Self {
        Self {
            kind,
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            orientation: Orientation::Vertical,
            height,
            series: Vec::new(),
            note: None,
        }
    }

    fn horizontal(mut self) -> Self {
        self.orientation = Orientation::Horizontal;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// One series per country, in first-appearance order, coloured by country.
fn series_per_country<R>(
    rows: &[R],
    country: impl Fn(&R) -> Country,
    point: impl Fn(&R) -> ChartPoint,
) -> Vec<ChartSeries> {
    group_by(rows, |r| country(r))
        .into_iter()
        .map(|(c, members)| {
            let points = members.into_iter().map(|r| point(r)).collect();
            ChartSeries::new(c.name(), Some(c.color()), points)
        })
        .collect()
}

// ── Production ──────────────────────────────────────────────────────────────

/// Production over time for the top crops, one line per crop and country.
pub fn production_trend_chart(
    production: &[ProductionRecord],
    top_crops: &[String],
    config: &ChartConfig,
) -> ChartSpec {
    let mut spec = ChartSpec::new(
        ChartKind::Line,
        &format!("Top {} Crops by Production Volume", top_crops.len()),
        "Year",
        "Production (Metric Tons)",
        config.trend_height,
    );
    for (i, crop) in top_crops.iter().enumerate() {
        let color = CROP_PALETTE[i % CROP_PALETTE.len()];
        let of_crop: Vec<&ProductionRecord> =
            production.iter().filter(|r| &r.crop == crop).collect();
        for (country, members) in group_by(&of_crop, |r| r.country) {
            let points = members
                .into_iter()
                .map(|r| ChartPoint::new(Category::Year(r.year), r.production_mt))
                .collect();
            spec.series
                .push(ChartSeries::new(format!("{crop} ({country})"), Some(color), points));
        }
    }
    spec
}

pub fn yield_chart(yields: &[YieldSummary], config: &ChartConfig) -> ChartSpec {
    let mut spec = ChartSpec::new(
        ChartKind::Bar,
        "Average Crop Yields (MT per Hectare)",
        "Yield (MT/Ha)",
        "Crop Type",
        config.yield_height,
    )
    .horizontal();
    spec.series = series_per_country(yields, |y| y.country, |y| {
        ChartPoint::new(Category::Label(y.crop.clone()), y.mean_yield_mt_per_ha)
    });
    spec
}

/// Production share per country.
pub fn country_share_chart(by_country: &[Group<Country, f64>], config: &ChartConfig) -> ChartSpec {
    let mut spec = ChartSpec::new(
        ChartKind::Pie,
        "Total Production Share",
        "Country",
        "Production (Metric Tons)",
        config.share_height,
    );
    let points = by_country
        .iter()
        .map(|g| ChartPoint {
            color: Some(g.key.color().to_string()),
            ..ChartPoint::new(Category::Label(g.key.name().to_string()), g.value)
        })
        .collect();
    spec.series.push(ChartSeries::new("Production", None, points));
    spec
}

pub fn country_crop_chart(top: &[CountryCropProduction], config: &ChartConfig) -> ChartSpec {
    let mut spec = ChartSpec::new(
        ChartKind::Bar,
        &format!("Top {} Crop-Country Combinations", top.len()),
        "Production (Metric Tons)",
        "Crop",
        config.share_height,
    )
    .horizontal();
    spec.series = series_per_country(top, |t| t.country, |t| {
        ChartPoint::new(Category::Label(t.crop.clone()), t.production_mt)
    });
    spec
}

// ── Trade ───────────────────────────────────────────────────────────────────

pub fn trade_chart(
    totals: &[TradeTotal],
    direction: TradeDirection,
    config: &ChartConfig,
) -> ChartSpec {
    let (title, x_label) = match direction {
        TradeDirection::Import => (
            "Major Import Categories (USD Millions)",
            "Import Value (USD Millions)",
        ),
        TradeDirection::Export => (
            "Export Performance (USD Millions)",
            "Export Value (USD Millions)",
        ),
    };
    let mut spec =
        ChartSpec::new(ChartKind::Bar, title, x_label, "Category", config.trade_height).horizontal();
    spec.series = series_per_country(totals, |t| t.country, |t| {
        ChartPoint::new(Category::Label(t.category.clone()), t.value_usd_millions)
    });
    if spec.is_empty() && direction == TradeDirection::Export {
        spec.note = Some(NO_EXPORTS_NOTE.to_string());
    }
    spec
}

// ── Capacity ────────────────────────────────────────────────────────────────

/// Utilized and unutilized capacity stacked per processing type, two series per country.
pub fn capacity_chart(capacity: &[CapacityRecord], config: &ChartConfig) -> ChartSpec {
    let mut spec = ChartSpec::new(
        ChartKind::StackedBar,
        "Processing Capacity Utilization by Type",
        "Processing Type",
        "Capacity (MT per year)",
        config.capacity_height,
    );
    for (country, members) in group_by(capacity, |r| r.country) {
        let points = |value: fn(&CapacityRecord) -> f64| -> Vec<ChartPoint> {
            members
                .iter()
                .map(|r| ChartPoint::new(Category::Label(r.processing_type.clone()), value(r)))
                .collect()
        };
        spec.series.push(ChartSeries::new(
            format!("{country} - Utilized"),
            Some(country.color()),
            points(CapacityRecord::utilized_capacity_mt),
        ));
        spec.series.push(ChartSeries {
            pattern: Some(UNUTILIZED_PATTERN.to_string()),
            ..ChartSeries::new(
                format!("{country} - Unutilized"),
                Some(UNUTILIZED_COLOR),
                points(CapacityRecord::unutilized_capacity_mt),
            )
        });
    }
    spec
}

/// Ranked idle capacity, each bar coloured and labelled by its investment potential.
pub fn gap_chart(gaps: &[GapSummary], config: &ChartConfig) -> ChartSpec {
    let mut spec = ChartSpec::new(
        ChartKind::Bar,
        "Unutilized Processing Capacity by Type (Investment Potential Color-Coded)",
        "Processing Type",
        "Unutilized Capacity (MT/year)",
        config.gap_height,
    );
    let points = gaps
        .iter()
        .map(|g| ChartPoint {
            color: Some(g.color().to_string()),
            text: Some(g.investment_potential.label().to_string()),
            ..ChartPoint::new(Category::Label(g.processing_type.clone()), g.unutilized_capacity_mt)
        })
        .collect();
    spec.series.push(ChartSeries::new("Unutilized capacity", None, points));
    spec
}

// ── Prices ──────────────────────────────────────────────────────────────────

/// One line per commodity present in `prices`, in commodity order.
pub fn price_chart(prices: &[PriceObservation], config: &ChartConfig) -> ChartSpec {
    let mut spec = ChartSpec::new(
        ChartKind::Line,
        "Commodity Price Trends (USD per Metric Ton)",
        "Date",
        "Price (USD/MT)",
        config.price_height,
    );
    spec.series = Commodity::ALL
        .into_iter()
        .filter_map(|commodity| {
            let points: Vec<ChartPoint> = prices
                .iter()
                .filter(|p| p.commodity == commodity)
                .map(|p| ChartPoint::new(Category::Date(p.date), p.price_usd_per_mt))
                .collect();
            (!points.is_empty()).then(|| ChartSeries::new(commodity.name(), None, points))
        })
        .collect();
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::gap::rank_gap_by_type;
    use crate::summary::{top_crops, trade_by_country_category, yield_by_country_crop};

    #[test]
    fn trend_chart_has_line_per_crop_and_country() {
        let d = Dataset::shared().unwrap();
        let crops = top_crops(d.production(), 5);
        let spec = production_trend_chart(d.production(), &crops, &ChartConfig::default());
        assert_eq!(spec.kind, ChartKind::Line);
        assert_eq!(spec.height, 450);
        // Maize is grown in both countries, the other four only in Zambia
        assert_eq!(spec.series.len(), 6);
        assert_eq!(spec.series[0].name, "Maize (Zambia)");
        assert_eq!(spec.series[1].name, "Maize (Botswana)");
        assert_eq!(spec.series[0].color, spec.series[1].color);
        assert!(spec.series.iter().all(|s| s.points.len() == 5));
    }

    #[test]
    fn yield_chart_is_horizontal_and_country_coloured() {
        let d = Dataset::shared().unwrap();
        let spec = yield_chart(&yield_by_country_crop(d.production(), 10), &ChartConfig::default());
        assert_eq!(spec.orientation, Orientation::Horizontal);
        assert_eq!(spec.height, 500);
        let zambia = spec.series.iter().find(|s| s.name == "Zambia").unwrap();
        assert_eq!(zambia.color.as_deref(), Some(Country::Zambia.color()));
    }

    #[test]
    fn gap_chart_colours_by_potential() {
        let d = Dataset::shared().unwrap();
        let spec = gap_chart(&rank_gap_by_type(d.capacity()), &ChartConfig::default());
        let first = &spec.series[0].points[0];
        assert_eq!(first.category, Category::Label("Maize Milling".to_string()));
        assert_eq!(first.color.as_deref(), Some("#d4a574"));
        assert_eq!(first.text.as_deref(), Some("Medium"));
    }

    #[test]
    fn capacity_chart_stacks_two_series_per_country() {
        let d = Dataset::shared().unwrap();
        let spec = capacity_chart(d.capacity(), &ChartConfig::default());
        let names: Vec<&str> = spec.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Zambia - Utilized",
                "Zambia - Unutilized",
                "Botswana - Utilized",
                "Botswana - Unutilized"
            ]
        );
        assert_eq!(spec.series[1].pattern.as_deref(), Some(UNUTILIZED_PATTERN));
        assert_eq!(spec.series[0].points[0].value, 1_875_000.0);
    }

    #[test]
    fn empty_exports_carry_a_note() {
        let d = Dataset::shared().unwrap();
        let botswana: Vec<_> = d
            .trade()
            .iter()
            .filter(|r| r.country == Country::Botswana)
            .cloned()
            .collect();
        let totals = trade_by_country_category(&botswana, TradeDirection::Export, 10);
        let spec = trade_chart(&totals, TradeDirection::Export, &ChartConfig::default());
        assert!(spec.is_empty());
        assert_eq!(spec.note.as_deref(), Some(NO_EXPORTS_NOTE));
    }

    #[test]
    fn price_chart_serialises_dates() {
        let d = Dataset::shared().unwrap();
        let wheat: Vec<_> = d
            .prices()
            .iter()
            .filter(|p| p.commodity == Commodity::Wheat)
            .cloned()
            .collect();
        let spec = price_chart(&wheat, &ChartConfig::default());
        assert_eq!(spec.series.len(), 1);
        let json: serde_json::Value = serde_json::from_str(&spec.to_json().unwrap()).unwrap();
        assert_eq!(json["kind"], "line");
        assert_eq!(json["series"][0]["name"], "Wheat");
        assert_eq!(json["series"][0]["points"][0]["category"], "2019-01-31");
        assert!(json.get("note").is_none());
    }
}
