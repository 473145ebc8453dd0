//! Polars DataFrame views of the record tables and summary tables.
//!
//! Column names come from `schema`. Dates are stored as `Date` (days since
//! the Unix epoch).
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use tracing::trace;

use crate::error::Result;
use crate::gap::GapSummary;
use crate::model::{CapacityRecord, OpportunityRecord, PriceObservation, ProductionRecord, TradeRecord};
use crate::schema::{capacity, keys, opportunity, prices, production, trade};

/// `num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn frame(columns: Vec<Column>) -> Result<DataFrame> {
    let df = DataFrame::new(columns)?;
    trace!(rows = df.height(), cols = df.width(), "built frame");
    Ok(df)
}

pub fn production_frame(records: &[ProductionRecord]) -> Result<DataFrame> {
    frame(vec![
        Column::new(keys::YEAR.into(), records.iter().map(|r| r.year).collect::<Vec<_>>()),
        Column::new(keys::COUNTRY.into(), records.iter().map(|r| r.country.name()).collect::<Vec<_>>()),
        Column::new(production::CROP.into(), records.iter().map(|r| r.crop.as_str()).collect::<Vec<_>>()),
        Column::new(
            production::PRODUCTION_MT.into(),
            records.iter().map(|r| r.production_mt).collect::<Vec<_>>(),
        ),
        Column::new(
            production::AREA_HECTARES.into(),
            records.iter().map(|r| r.area_hectares).collect::<Vec<_>>(),
        ),
        Column::new(
            production::YIELD_MT_PER_HA.into(),
            records.iter().map(|r| r.yield_mt_per_ha()).collect::<Vec<_>>(),
        ),
    ])
}

pub fn trade_frame(records: &[TradeRecord]) -> Result<DataFrame> {
    frame(vec![
        Column::new(keys::YEAR.into(), records.iter().map(|r| r.year).collect::<Vec<_>>()),
        Column::new(keys::COUNTRY.into(), records.iter().map(|r| r.country.name()).collect::<Vec<_>>()),
        Column::new(trade::CATEGORY.into(), records.iter().map(|r| r.category.as_str()).collect::<Vec<_>>()),
        Column::new(trade::DIRECTION.into(), records.iter().map(|r| r.direction.name()).collect::<Vec<_>>()),
        Column::new(
            trade::VALUE_USD_MILLIONS.into(),
            records.iter().map(|r| r.value_usd_millions).collect::<Vec<_>>(),
        ),
    ])
}

pub fn capacity_frame(records: &[CapacityRecord]) -> Result<DataFrame> {
    frame(vec![
        Column::new(keys::COUNTRY.into(), records.iter().map(|r| r.country.name()).collect::<Vec<_>>()),
        Column::new(
            capacity::PROCESSING_TYPE.into(),
            records.iter().map(|r| r.processing_type.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            capacity::FACILITY_COUNT.into(),
            records.iter().map(|r| r.facility_count).collect::<Vec<_>>(),
        ),
        Column::new(
            capacity::TOTAL_CAPACITY_MT.into(),
            records.iter().map(|r| r.total_capacity_mt).collect::<Vec<_>>(),
        ),
        Column::new(
            capacity::UTILIZATION_PCT.into(),
            records.iter().map(|r| r.utilization_pct).collect::<Vec<_>>(),
        ),
        Column::new(
            capacity::UTILIZED_CAPACITY_MT.into(),
            records.iter().map(|r| r.utilized_capacity_mt()).collect::<Vec<_>>(),
        ),
        Column::new(
            capacity::UNUTILIZED_CAPACITY_MT.into(),
            records.iter().map(|r| r.unutilized_capacity_mt()).collect::<Vec<_>>(),
        ),
        Column::new(
            capacity::INVESTMENT_POTENTIAL.into(),
            records.iter().map(|r| r.investment_potential.label()).collect::<Vec<_>>(),
        ),
    ])
}

/// Long format: one row per (date, commodity).
pub fn price_frame(records: &[PriceObservation]) -> Result<DataFrame> {
    let dates = Column::new(
        prices::DATE.into(),
        records.iter().map(|r| epoch_days(r.date)).collect::<Vec<_>>(),
    )
    .cast(&DataType::Date)?;
    frame(vec![
        dates,
        Column::new(prices::COMMODITY.into(), records.iter().map(|r| r.commodity.name()).collect::<Vec<_>>()),
        Column::new(
            prices::PRICE_USD_PER_MT.into(),
            records.iter().map(|r| r.price_usd_per_mt).collect::<Vec<_>>(),
        ),
    ])
}

pub fn opportunity_frame(records: &[OpportunityRecord]) -> Result<DataFrame> {
    frame(vec![
        Column::new(keys::COUNTRY.into(), records.iter().map(|r| r.country.name()).collect::<Vec<_>>()),
        Column::new(
            opportunity::OPPORTUNITY_NAME.into(),
            records.iter().map(|r| r.opportunity_name.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            opportunity::INVESTMENT_RANGE.into(),
            records.iter().map(|r| r.investment_range.label()).collect::<Vec<_>>(),
        ),
        Column::new(
            opportunity::INVESTMENT_LOW_USD.into(),
            records.iter().map(|r| r.investment_range.low_usd).collect::<Vec<_>>(),
        ),
        Column::new(
            opportunity::INVESTMENT_HIGH_USD.into(),
            records.iter().map(|r| r.investment_range.high_usd).collect::<Vec<_>>(),
        ),
        Column::new(
            opportunity::SIZE_BUCKET.into(),
            records.iter().map(|r| r.size_bucket().label()).collect::<Vec<_>>(),
        ),
        Column::new(opportunity::ROI_YEARS.into(), records.iter().map(|r| r.roi_years).collect::<Vec<_>>()),
        Column::new(
            opportunity::MARKET_GAP_MT.into(),
            records.iter().map(|r| r.market_gap_mt).collect::<Vec<_>>(),
        ),
        Column::new(
            opportunity::KEY_DRIVER.into(),
            records.iter().map(|r| r.key_driver.as_str()).collect::<Vec<_>>(),
        ),
    ])
}

pub fn gap_frame(gaps: &[GapSummary]) -> Result<DataFrame> {
    frame(vec![
        Column::new(
            capacity::PROCESSING_TYPE.into(),
            gaps.iter().map(|g| g.processing_type.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            capacity::TOTAL_CAPACITY_MT.into(),
            gaps.iter().map(|g| g.total_capacity_mt).collect::<Vec<_>>(),
        ),
        Column::new(
            capacity::MEAN_UTILIZATION_PCT.into(),
            gaps.iter().map(|g| g.mean_utilization_pct).collect::<Vec<_>>(),
        ),
        Column::new(
            capacity::UNUTILIZED_CAPACITY_MT.into(),
            gaps.iter().map(|g| g.unutilized_capacity_mt).collect::<Vec<_>>(),
        ),
        Column::new(
            capacity::INVESTMENT_POTENTIAL.into(),
            gaps.iter().map(|g| g.investment_potential.label()).collect::<Vec<_>>(),
        ),
        Column::new(capacity::POTENTIAL_COLOR.into(), gaps.iter().map(|g| g.color()).collect::<Vec<_>>()),
    ])
}

/// Mean yield and production per (country, crop) computed on a production
/// frame, top `n` by mean yield. Groups keep first-appearance order and ties
/// keep group order.
pub fn yield_summary_lazy(production_df: DataFrame, n: usize) -> Result<DataFrame> {
    let out = production_df
        .lazy()
        .group_by_stable([col(keys::COUNTRY), col(production::CROP)])
        .agg([
            col(production::YIELD_MT_PER_HA)
                .mean()
                .alias(production::MEAN_YIELD_MT_PER_HA),
            col(production::PRODUCTION_MT)
                .mean()
                .alias(production::MEAN_PRODUCTION_MT),
        ])
        .sort(
            [production::MEAN_YIELD_MT_PER_HA],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .limit(n as IdxSize)
        .collect()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::gap::rank_gap_by_type;
    use crate::summary::yield_by_country_crop;
    use approx::assert_relative_eq;

    #[test]
    fn production_frame_shape() {
        let d = Dataset::shared().unwrap();
        let df = production_frame(d.production()).unwrap();
        assert_eq!(df.height(), 65);
        assert_eq!(df.width(), 6);
        let crops = df.column(production::CROP).unwrap().as_materialized_series().str().unwrap().clone();
        assert_eq!(crops.get(0), Some("Maize"));
    }

    #[test]
    fn price_dates_are_typed() {
        let d = Dataset::shared().unwrap();
        let df = price_frame(d.prices()).unwrap();
        assert_eq!(df.height(), 350);
        assert_eq!(df.column(prices::DATE).unwrap().dtype(), &DataType::Date);
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(2019, 1, 31).unwrap()), 17_927);
    }

    #[test]
    fn gap_frame_keeps_rank_order() {
        let d = Dataset::shared().unwrap();
        let df = gap_frame(&rank_gap_by_type(d.capacity())).unwrap();
        let unutilized = df
            .column(capacity::UNUTILIZED_CAPACITY_MT)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .clone();
        let values: Vec<f64> = unutilized.into_no_null_iter().collect();
        assert!(values.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(values[0], 661_000.0);
    }

    #[test]
    fn lazy_yield_summary_matches_record_path() {
        let d = Dataset::shared().unwrap();
        let expected = yield_by_country_crop(d.production(), 10);
        let df = yield_summary_lazy(production_frame(d.production()).unwrap(), 10).unwrap();
        assert_eq!(df.height(), expected.len());

        let crops = df.column(production::CROP).unwrap().as_materialized_series().str().unwrap().clone();
        let yields = df
            .column(production::MEAN_YIELD_MT_PER_HA)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .clone();
        for (i, row) in expected.iter().enumerate() {
            assert_eq!(crops.get(i), Some(row.crop.as_str()));
            assert_relative_eq!(yields.get(i).unwrap(), row.mean_yield_mt_per_ha, epsilon = 1e-9);
        }
    }

    #[test]
    fn opportunity_frame_labels_size() {
        let d = Dataset::shared().unwrap();
        let df = opportunity_frame(d.opportunities()).unwrap();
        let buckets = df
            .column(opportunity::SIZE_BUCKET)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .clone();
        // "5M - 15M" has midpoint 10M
        assert_eq!(buckets.get(0), Some("Medium ($3M - $10M)"));
    }
}
