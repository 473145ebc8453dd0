pub mod aggregation;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod frame;
pub mod gap;
pub mod logging;
pub mod model;
pub mod prices;
pub mod roi;
pub mod schema;
pub mod summary;
pub mod visualization;

#[cfg(feature = "python")]
mod python;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardCharts, DashboardView};
pub use dataset::Dataset;
pub use error::{AgroError, Result};
pub use filter::{filter, FilterSelection, YearRange};
pub use gap::{rank_gap_by_type, GapSummary};
pub use model::{
    CapacityRecord, Commodity, Country, InvestmentPotential, InvestmentRange, OpportunityRecord,
    PriceObservation, ProductionRecord, SizeBucket, TradeDirection, TradeRecord,
};
pub use roi::{calculate_roi, calculate_roi_with, RoiAssumptions, RoiInputs, RoiOutcome};
pub use summary::DashboardSummary;
