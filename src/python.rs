use pyo3::prelude::*;
use pyo3::types::{PyDict, PyModule};
use pyo3_polars::PyDataFrame;

use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::error::AgroError;
use crate::filter::{FilterSelection, YearRange};
use crate::frame;
use crate::logging;
use crate::model::{Commodity, Country, SizeBucket};
use crate::roi::{self, RoiInputs, RoiOutcome};
use crate::schema;

fn parse_all<T: std::str::FromStr<Err = AgroError>>(names: &[String]) -> PyResult<Vec<T>> {
    Ok(names
        .iter()
        .map(|n| n.parse::<T>())
        .collect::<Result<Vec<_>, _>>()?)
}

/// Viewer selection. Omitted arguments keep the dashboard defaults.
#[pyclass(name = "Selection")]
#[derive(Clone)]
pub struct PySelection {
    inner: FilterSelection,
}

#[pymethods]
impl PySelection {
    #[new]
    #[pyo3(signature = (countries=None, start_year=None, end_year=None, commodities=None, investment_size=None))]
    fn new(
        countries: Option<Vec<String>>,
        start_year: Option<i32>,
        end_year: Option<i32>,
        commodities: Option<Vec<String>>,
        investment_size: Option<String>,
    ) -> PyResult<Self> {
        let mut inner = FilterSelection::default();
        if let Some(names) = countries {
            inner.countries = parse_all::<Country>(&names)?.into_iter().collect();
        }
        inner.year_range = YearRange::new(
            start_year.unwrap_or(inner.year_range.start()),
            end_year.unwrap_or(inner.year_range.end()),
        )?;
        if let Some(names) = commodities {
            inner = inner.with_commodities(parse_all::<Commodity>(&names)?);
        }
        if let Some(size) = investment_size {
            inner = inner.with_size_bucket(size.parse::<SizeBucket>()?);
        }
        Ok(Self { inner })
    }

    fn __repr__(&self) -> String {
        format!("Selection({:?})", self.inner)
    }
}

#[pyclass(name = "AgroDashboard")]
pub struct PyDashboard {
    inner: Dashboard,
}

impl PyDashboard {
    fn resolve(&self, selection: Option<PyRef<'_, PySelection>>) -> PyResult<FilterSelection> {
        match selection {
            Some(s) => Ok(s.inner.clone()),
            None => Ok(self.inner.default_selection()?),
        }
    }
}

#[pymethods]
impl PyDashboard {
    /// Optionally configured from a TOML string.
    #[new]
    #[pyo3(signature = (config_toml=None))]
    fn new(config_toml: Option<&str>) -> PyResult<Self> {
        let config = match config_toml {
            Some(contents) => DashboardConfig::from_toml_str(contents)?,
            None => DashboardConfig::default(),
        };
        Ok(Self {
            inner: Dashboard::with_config(config)?,
        })
    }

    #[staticmethod]
    fn from_file(path: &str) -> PyResult<Self> {
        Ok(Self {
            inner: Dashboard::with_config(DashboardConfig::load(path)?)?,
        })
    }

    // ── Tables ──────────────────────────────────────────────────────────────

    #[pyo3(signature = (selection=None))]
    fn production(&self, selection: Option<PyRef<'_, PySelection>>) -> PyResult<PyDataFrame> {
        let view = self.inner.view(&self.resolve(selection)?);
        Ok(PyDataFrame(frame::production_frame(&view.production)?))
    }

    #[pyo3(signature = (selection=None))]
    fn trade(&self, selection: Option<PyRef<'_, PySelection>>) -> PyResult<PyDataFrame> {
        let view = self.inner.view(&self.resolve(selection)?);
        Ok(PyDataFrame(frame::trade_frame(&view.trade)?))
    }

    #[pyo3(signature = (selection=None))]
    fn capacity(&self, selection: Option<PyRef<'_, PySelection>>) -> PyResult<PyDataFrame> {
        let view = self.inner.view(&self.resolve(selection)?);
        Ok(PyDataFrame(frame::capacity_frame(&view.capacity)?))
    }

    #[pyo3(signature = (selection=None))]
    fn prices(&self, selection: Option<PyRef<'_, PySelection>>) -> PyResult<PyDataFrame> {
        let view = self.inner.view(&self.resolve(selection)?);
        Ok(PyDataFrame(frame::price_frame(&view.prices)?))
    }

    #[pyo3(signature = (selection=None))]
    fn opportunities(&self, selection: Option<PyRef<'_, PySelection>>) -> PyResult<PyDataFrame> {
        let view = self.inner.view(&self.resolve(selection)?);
        Ok(PyDataFrame(frame::opportunity_frame(&view.opportunities)?))
    }

    // ── Analysis ────────────────────────────────────────────────────────────

    #[pyo3(signature = (selection=None))]
    fn gap_ranking(&self, selection: Option<PyRef<'_, PySelection>>) -> PyResult<PyDataFrame> {
        let gaps = self.inner.gap_ranking(&self.resolve(selection)?);
        Ok(PyDataFrame(frame::gap_frame(&gaps)?))
    }

    #[pyo3(signature = (selection=None))]
    fn yields(&self, selection: Option<PyRef<'_, PySelection>>) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.inner.yield_table(&self.resolve(selection)?)?))
    }

    #[pyo3(signature = (selection=None))]
    fn crop_insights<'py>(
        &self,
        py: Python<'py>,
        selection: Option<PyRef<'_, PySelection>>,
    ) -> PyResult<Vec<Bound<'py, PyDict>>> {
        self.inner
            .crop_insights(&self.resolve(selection)?)
            .into_iter()
            .map(|g| {
                let dict = PyDict::new(py);
                dict.set_item("crop", g.crop)?;
                dict.set_item("latest_mt", g.latest_mt)?;
                dict.set_item("previous_mt", g.previous_mt)?;
                dict.set_item("growth_pct", g.growth_pct)?;
                Ok(dict)
            })
            .collect()
    }

    #[pyo3(signature = (selection=None))]
    fn capacity_metrics<'py>(
        &self,
        py: Python<'py>,
        selection: Option<PyRef<'_, PySelection>>,
    ) -> PyResult<Vec<Bound<'py, PyDict>>> {
        self.inner
            .capacity_metrics(&self.resolve(selection)?)
            .into_iter()
            .map(|c| {
                let dict = PyDict::new(py);
                dict.set_item("country", c.country.name())?;
                dict.set_item("total_capacity_mt", c.total_capacity_mt)?;
                dict.set_item("mean_utilization_pct", c.mean_utilization_pct)?;
                Ok(dict)
            })
            .collect()
    }

    #[pyo3(signature = (selection=None))]
    fn price_insights<'py>(
        &self,
        py: Python<'py>,
        selection: Option<PyRef<'_, PySelection>>,
    ) -> PyResult<Vec<Bound<'py, PyDict>>> {
        self.inner
            .price_insights(&self.resolve(selection)?)
            .into_iter()
            .map(|p| {
                let dict = PyDict::new(py);
                dict.set_item("commodity", p.commodity.name())?;
                dict.set_item("current_price", p.current_price)?;
                dict.set_item("year_ago_price", p.year_ago_price)?;
                dict.set_item("change_pct", p.change_pct)?;
                Ok(dict)
            })
            .collect()
    }

    /// Country name to opportunity frame, in first-appearance order.
    #[pyo3(signature = (selection=None))]
    fn opportunity_cards<'py>(
        &self,
        py: Python<'py>,
        selection: Option<PyRef<'_, PySelection>>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        for group in self.inner.opportunity_cards(&self.resolve(selection)?) {
            dict.set_item(
                group.key.name(),
                PyDataFrame(frame::opportunity_frame(&group.value)?),
            )?;
        }
        Ok(dict)
    }

    #[pyo3(signature = (selection=None))]
    fn summary<'py>(
        &self,
        py: Python<'py>,
        selection: Option<PyRef<'_, PySelection>>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let s = self.inner.summary(&self.resolve(selection)?);
        let dict = PyDict::new(py);
        dict.set_item("has_data", s.has_data)?;
        dict.set_item("latest_year", s.latest_year)?;
        dict.set_item("latest_year_production_mt", s.latest_year_production_mt)?;
        dict.set_item("previous_year_production_mt", s.previous_year_production_mt)?;
        dict.set_item("yoy_growth_pct", s.yoy_growth_pct)?;
        dict.set_item("total_imports_usd_millions", s.total_imports_usd_millions)?;
        dict.set_item("processing_gap_mt", s.processing_gap_mt)?;
        dict.set_item("opportunity_count", s.opportunity_count)?;
        dict.set_item("mean_roi_years", s.mean_roi_years)?;
        Ok(dict)
    }

    /// All chart specs for the selection, as one JSON document.
    #[pyo3(signature = (selection=None))]
    fn charts_json(&self, selection: Option<PyRef<'_, PySelection>>) -> PyResult<String> {
        let charts = self.inner.charts(&self.resolve(selection)?);
        Ok(serde_json::to_string(&charts).map_err(AgroError::from)?)
    }

    fn roi<'py>(
        &self,
        py: Python<'py>,
        investment_usd: f64,
        capacity_mt_per_year: f64,
        utilization_pct: f64,
        margin_usd_per_mt: f64,
    ) -> PyResult<Bound<'py, PyDict>> {
        let outcome = self.inner.roi(&RoiInputs {
            investment_usd,
            capacity_mt_per_year,
            utilization_pct,
            margin_usd_per_mt,
        })?;
        roi_dict(py, &outcome)
    }
}

fn roi_dict<'py>(py: Python<'py>, outcome: &RoiOutcome) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("actual_volume_mt", outcome.actual_volume_mt)?;
    dict.set_item("annual_revenue_usd", outcome.annual_revenue_usd)?;
    dict.set_item("net_profit_usd", outcome.net_profit_usd)?;
    dict.set_item("payback_years", outcome.payback_years())?;
    dict.set_item("annual_roi_pct", outcome.annual_roi_pct)?;
    dict.set_item("payback_label", outcome.payback_label())?;
    dict.set_item("roi_label", outcome.roi_label())?;
    Ok(dict)
}

/// ROI with the default assumptions.
#[pyfunction]
fn calculate_roi<'py>(
    py: Python<'py>,
    investment_usd: f64,
    capacity_mt_per_year: f64,
    utilization_pct: f64,
    margin_usd_per_mt: f64,
) -> PyResult<Bound<'py, PyDict>> {
    let outcome = roi::calculate_roi(&RoiInputs {
        investment_usd,
        capacity_mt_per_year,
        utilization_pct,
        margin_usd_per_mt,
    })?;
    roi_dict(py, &outcome)
}

#[pyfunction]
#[pyo3(signature = (filter=None))]
fn init_logging(filter: Option<&str>) -> bool {
    logging::init_logging(filter)
}

/// Export schema constants as Python submodules
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let keys = PyModule::new(m.py(), "keys")?;
    keys.add("YEAR", schema::keys::YEAR)?;
    keys.add("COUNTRY", schema::keys::COUNTRY)?;
    m.add_submodule(&keys)?;

    let production = PyModule::new(m.py(), "production")?;
    production.add("CROP", schema::production::CROP)?;
    production.add("PRODUCTION_MT", schema::production::PRODUCTION_MT)?;
    production.add("AREA_HECTARES", schema::production::AREA_HECTARES)?;
    production.add("YIELD_MT_PER_HA", schema::production::YIELD_MT_PER_HA)?;
    production.add("MEAN_YIELD_MT_PER_HA", schema::production::MEAN_YIELD_MT_PER_HA)?;
    production.add("MEAN_PRODUCTION_MT", schema::production::MEAN_PRODUCTION_MT)?;
    m.add_submodule(&production)?;

    let trade = PyModule::new(m.py(), "trade")?;
    trade.add("CATEGORY", schema::trade::CATEGORY)?;
    trade.add("DIRECTION", schema::trade::DIRECTION)?;
    trade.add("VALUE_USD_MILLIONS", schema::trade::VALUE_USD_MILLIONS)?;
    m.add_submodule(&trade)?;

    let capacity = PyModule::new(m.py(), "capacity")?;
    capacity.add("PROCESSING_TYPE", schema::capacity::PROCESSING_TYPE)?;
    capacity.add("FACILITY_COUNT", schema::capacity::FACILITY_COUNT)?;
    capacity.add("TOTAL_CAPACITY_MT", schema::capacity::TOTAL_CAPACITY_MT)?;
    capacity.add("UTILIZATION_PCT", schema::capacity::UTILIZATION_PCT)?;
    capacity.add("MEAN_UTILIZATION_PCT", schema::capacity::MEAN_UTILIZATION_PCT)?;
    capacity.add("UTILIZED_CAPACITY_MT", schema::capacity::UTILIZED_CAPACITY_MT)?;
    capacity.add("UNUTILIZED_CAPACITY_MT", schema::capacity::UNUTILIZED_CAPACITY_MT)?;
    capacity.add("INVESTMENT_POTENTIAL", schema::capacity::INVESTMENT_POTENTIAL)?;
    capacity.add("POTENTIAL_COLOR", schema::capacity::POTENTIAL_COLOR)?;
    m.add_submodule(&capacity)?;

    let prices = PyModule::new(m.py(), "prices")?;
    prices.add("DATE", schema::prices::DATE)?;
    prices.add("COMMODITY", schema::prices::COMMODITY)?;
    prices.add("PRICE_USD_PER_MT", schema::prices::PRICE_USD_PER_MT)?;
    m.add_submodule(&prices)?;

    let opportunity = PyModule::new(m.py(), "opportunity")?;
    opportunity.add("OPPORTUNITY_NAME", schema::opportunity::OPPORTUNITY_NAME)?;
    opportunity.add("INVESTMENT_RANGE", schema::opportunity::INVESTMENT_RANGE)?;
    opportunity.add("INVESTMENT_LOW_USD", schema::opportunity::INVESTMENT_LOW_USD)?;
    opportunity.add("INVESTMENT_HIGH_USD", schema::opportunity::INVESTMENT_HIGH_USD)?;
    opportunity.add("SIZE_BUCKET", schema::opportunity::SIZE_BUCKET)?;
    opportunity.add("ROI_YEARS", schema::opportunity::ROI_YEARS)?;
    opportunity.add("MARKET_GAP_MT", schema::opportunity::MARKET_GAP_MT)?;
    opportunity.add("KEY_DRIVER", schema::opportunity::KEY_DRIVER)?;
    m.add_submodule(&opportunity)?;

    Ok(())
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySelection>()?;
    m.add_class::<PyDashboard>()?;
    m.add_function(wrap_pyfunction!(calculate_roi, m)?)?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    add_schema_exports(m)?;
    Ok(())
}
