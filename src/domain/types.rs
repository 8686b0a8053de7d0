//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - handed from the pipeline to any renderer (report, plot, TUI)
//! - exported to JSON/CSV
//! - compared directly in tests

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Header of the date column shared by both input spreadsheets.
pub const DATE_COLUMN: &str = "Fecha";

/// Seasonal period used when the sampling cadence has no conventional period.
pub const DEFAULT_SEASONAL_PERIOD: usize = 7;

/// Every numeric column known to the dashboard.
///
/// Columns are addressed through this enum rather than by string name; the
/// source header name is only used at the ingest boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Column {
    #[value(name = "OilVol")]
    OilVol,
    #[value(name = "GasVol")]
    GasVol,
    #[value(name = "WaterVol")]
    WaterVol,
    #[value(name = "WorkHours")]
    WorkHours,
    #[value(name = "VolLiq")]
    VolLiq,
    #[value(name = "WaterCut")]
    WaterCut,
    #[value(name = "DnmcLvl")]
    DnmcLvl,
    #[value(name = "Pressure")]
    Pressure,
    #[value(name = "PronosticosOilVol")]
    PronosticosOilVol,
    #[value(name = "PronosticosGasVol")]
    PronosticosGasVol,
    #[value(name = "PronosticosWaterVol")]
    PronosticosWaterVol,
}

impl Column {
    /// Historical measurement columns, in spreadsheet order.
    pub const MEASUREMENTS: [Column; 8] = [
        Column::OilVol,
        Column::GasVol,
        Column::WaterVol,
        Column::WorkHours,
        Column::VolLiq,
        Column::WaterCut,
        Column::DnmcLvl,
        Column::Pressure,
    ];

    /// Forecast columns, in spreadsheet order.
    pub const FORECASTS: [Column; 3] = [
        Column::PronosticosOilVol,
        Column::PronosticosGasVol,
        Column::PronosticosWaterVol,
    ];

    /// Historical columns that must be present in the header.
    pub const REQUIRED_HISTORICAL: [Column; 4] = [
        Column::OilVol,
        Column::GasVol,
        Column::WaterVol,
        Column::WorkHours,
    ];

    /// All columns: measurements followed by forecasts.
    pub fn all() -> impl Iterator<Item = Column> {
        Self::MEASUREMENTS.into_iter().chain(Self::FORECASTS)
    }

    /// Header name as it appears in the source spreadsheets.
    pub fn name(self) -> &'static str {
        match self {
            Column::OilVol => "OilVol",
            Column::GasVol => "GasVol",
            Column::WaterVol => "WaterVol",
            Column::WorkHours => "WorkHours",
            Column::VolLiq => "VolLiq",
            Column::WaterCut => "WaterCut",
            Column::DnmcLvl => "DnmcLvl",
            Column::Pressure => "Pressure",
            Column::PronosticosOilVol => "PronosticosOilVol",
            Column::PronosticosGasVol => "PronosticosGasVol",
            Column::PronosticosWaterVol => "PronosticosWaterVol",
        }
    }

    /// Resolve a header name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Column> {
        let name = name.trim();
        Self::all().find(|c| c.name().eq_ignore_ascii_case(name))
    }

    pub fn is_forecast(self) -> bool {
        Self::FORECASTS.contains(&self)
    }

    /// The forecast column paired with a measured volume, if any.
    pub fn forecast(self) -> Option<Column> {
        match self {
            Column::OilVol => Some(Column::PronosticosOilVol),
            Column::GasVol => Some(Column::PronosticosGasVol),
            Column::WaterVol => Some(Column::PronosticosWaterVol),
            _ => None,
        }
    }

    /// Physical unit label.
    pub fn unit(self) -> &'static str {
        match self {
            Column::OilVol
            | Column::GasVol
            | Column::WaterVol
            | Column::VolLiq
            | Column::PronosticosOilVol
            | Column::PronosticosGasVol
            | Column::PronosticosWaterVol => "m³/day",
            Column::WorkHours => "h/day",
            Column::WaterCut => "%",
            Column::DnmcLvl => "m",
            Column::Pressure => "atm",
        }
    }

    /// One-line description used by the glossary.
    pub fn description(self) -> &'static str {
        match self {
            Column::OilVol => "Volume of oil produced.",
            Column::GasVol => "Volume of gas produced by the well.",
            Column::WaterVol => "Volume of water extracted.",
            Column::WorkHours => "Operating hours per day.",
            Column::VolLiq => "Total liquid (oil, gas and water mixture) produced by the well.",
            Column::WaterCut => "Share of water in the extracted liquid.",
            Column::DnmcLvl => "Height of the fluid column in the well during operation.",
            Column::Pressure => "Reservoir pressure.",
            Column::PronosticosOilVol => "ARIMA forecast of OilVol.",
            Column::PronosticosGasVol => "ARIMA forecast of GasVol.",
            Column::PronosticosWaterVol => "ARIMA forecast of WaterVol.",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Historical measurements for one date. Blank cells are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub oil_vol: Option<f64>,
    pub gas_vol: Option<f64>,
    pub water_vol: Option<f64>,
    pub work_hours: Option<f64>,
    pub vol_liq: Option<f64>,
    pub water_cut: Option<f64>,
    pub dnmc_lvl: Option<f64>,
    pub pressure: Option<f64>,
}

impl Measurements {
    pub fn get(&self, column: Column) -> Option<f64> {
        match column {
            Column::OilVol => self.oil_vol,
            Column::GasVol => self.gas_vol,
            Column::WaterVol => self.water_vol,
            Column::WorkHours => self.work_hours,
            Column::VolLiq => self.vol_liq,
            Column::WaterCut => self.water_cut,
            Column::DnmcLvl => self.dnmc_lvl,
            Column::Pressure => self.pressure,
            _ => None,
        }
    }

    /// Set a measurement column. Forecast columns are ignored.
    pub fn set(&mut self, column: Column, value: Option<f64>) {
        match column {
            Column::OilVol => self.oil_vol = value,
            Column::GasVol => self.gas_vol = value,
            Column::WaterVol => self.water_vol = value,
            Column::WorkHours => self.work_hours = value,
            Column::VolLiq => self.vol_liq = value,
            Column::WaterCut => self.water_cut = value,
            Column::DnmcLvl => self.dnmc_lvl = value,
            Column::Pressure => self.pressure = value,
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        Column::MEASUREMENTS.iter().all(|&c| self.get(c).is_none())
    }
}

/// Externally computed forecasts for one date. Blank cells are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecasts {
    pub oil_vol: Option<f64>,
    pub gas_vol: Option<f64>,
    pub water_vol: Option<f64>,
}

impl Forecasts {
    pub fn get(&self, column: Column) -> Option<f64> {
        match column {
            Column::PronosticosOilVol => self.oil_vol,
            Column::PronosticosGasVol => self.gas_vol,
            Column::PronosticosWaterVol => self.water_vol,
            _ => None,
        }
    }

    /// Set a forecast column. Measurement columns are ignored.
    pub fn set(&mut self, column: Column, value: Option<f64>) {
        match column {
            Column::PronosticosOilVol => self.oil_vol = value,
            Column::PronosticosGasVol => self.gas_vol = value,
            Column::PronosticosWaterVol => self.water_vol = value,
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        Column::FORECASTS.iter().all(|&c| self.get(c).is_none())
    }
}

/// A fixed set of nullable numeric columns, addressable by `Column`.
///
/// `get` returns `None` and `set` is a no-op for columns outside the set.
pub trait ColumnValues: Copy + Default {
    fn get(&self, column: Column) -> Option<f64>;
    fn set(&mut self, column: Column, value: Option<f64>);
}

impl ColumnValues for Measurements {
    fn get(&self, column: Column) -> Option<f64> {
        Measurements::get(self, column)
    }

    fn set(&mut self, column: Column, value: Option<f64>) {
        Measurements::set(self, column, value)
    }
}

impl ColumnValues for Forecasts {
    fn get(&self, column: Column) -> Option<f64> {
        Forecasts::get(self, column)
    }

    fn set(&mut self, column: Column, value: Option<f64>) {
        Forecasts::set(self, column, value)
    }
}

impl<A: ColumnValues, B: ColumnValues> ColumnValues for (A, B) {
    fn get(&self, column: Column) -> Option<f64> {
        self.0.get(column).or_else(|| self.1.get(column))
    }

    fn set(&mut self, column: Column, value: Option<f64>) {
        self.0.set(column, value);
        self.1.set(column, value);
    }
}

/// One row of the historical spreadsheet.
///
/// `fecha` is the raw date key as read from the file; it is parsed to a
/// calendar date right before the merge.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRecord {
    pub fecha: String,
    pub values: Measurements,
}

/// One row of the forecast spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRecord {
    pub fecha: String,
    pub values: Forecasts,
}

/// Row-count bookkeeping for one loaded input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Path of the file, or `demo` for generated inputs.
    pub source: String,
    pub rows_read: usize,
    /// Rows folded into an earlier row with the same date key.
    pub duplicates_resolved: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalTable {
    pub rows: Vec<HistoricalRecord>,
    pub report: LoadReport,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastTable {
    pub rows: Vec<ForecastRecord>,
    pub report: LoadReport,
}

/// Outer-join row keyed by calendar date (not yet sorted).
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub date: NaiveDate,
    pub measurements: Measurements,
    pub forecasts: Forecasts,
}

/// Output of the merge: one row per distinct date across both inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedTable {
    pub rows: Vec<MergedRow>,
}

/// One row of the date-indexed series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub date: NaiveDate,
    pub measurements: Measurements,
    pub forecasts: Forecasts,
}

impl SeriesRow {
    pub fn value(&self, column: Column) -> Option<f64> {
        if column.is_forecast() {
            self.forecasts.get(column)
        } else {
            self.measurements.get(column)
        }
    }
}

/// The merged, date-indexed table: strictly ascending, no duplicate dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedSeries {
    pub rows: Vec<SeriesRow>,
}

impl MergedSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// `(date, value)` pairs for one column, nulls included.
    pub fn column(&self, column: Column) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.rows.iter().map(move |r| (r.date, r.value(column)))
    }

    /// Lookup by date (binary search over the ascending index).
    pub fn get(&self, date: NaiveDate) -> Option<&SeriesRow> {
        self.rows
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|idx| &self.rows[idx])
    }
}

/// Mean / max / min of one column over its non-null values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: Column,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    /// Number of non-null values aggregated.
    pub count: usize,
}

/// Dashboard header metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub columns: Vec<ColumnSummary>,
}

impl SummaryMetrics {
    pub fn get(&self, column: Column) -> Option<&ColumnSummary> {
        self.columns.iter().find(|s| s.column == column)
    }
}

/// Sampling cadence of a date index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    /// Any other fixed step, in days.
    Days(i64),
}

impl Cadence {
    /// Conventional seasonal period for this cadence.
    pub fn seasonal_period(self) -> usize {
        match self {
            Cadence::Daily => 7,
            Cadence::Weekly => 52,
            Cadence::Monthly => 12,
            Cadence::Quarterly => 4,
            Cadence::Yearly => 1,
            Cadence::Days(_) => DEFAULT_SEASONAL_PERIOD,
        }
    }
}

/// One row of an additive decomposition: `observed = trend + seasonal + residual`.
///
/// Trend and residual are undefined at the edges of the centered moving average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecomposedRow {
    pub date: NaiveDate,
    pub observed: f64,
    pub trend: Option<f64>,
    pub seasonal: f64,
    pub residual: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecomposedSeries {
    pub column: Column,
    pub period: usize,
    pub cadence: Cadence,
    pub rows: Vec<DecomposedRow>,
}

/// One calendar year of the annual comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualRow {
    pub year: i32,
    /// Means in the same order as `AnnualAggregate::columns`.
    pub means: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnualAggregate {
    pub columns: Vec<Column>,
    pub rows: Vec<AnnualRow>,
}

impl AnnualAggregate {
    pub fn value(&self, year: i32, column: Column) -> Option<f64> {
        let col = self.columns.iter().position(|&c| c == column)?;
        let row = self.rows.iter().find(|r| r.year == year)?;
        row.means.get(col).copied().flatten()
    }
}

/// What to do when a date key occurs more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail with a duplicate-date error.
    #[default]
    Reject,
    /// Keep the first occurrence, drop the rest.
    First,
    /// Field-wise mean of the non-null values.
    Mean,
}

/// Dashboard chart selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ChartKind {
    /// Oil volume vs forecast.
    Oil,
    /// Water volume vs forecast.
    Water,
    /// Gas volume vs forecast.
    Gas,
    /// Trend, seasonal and residual components.
    Decomposition,
    /// Yearly mean volumes.
    Annual,
    #[default]
    All,
}

impl ChartKind {
    /// The measured column of a volume chart.
    pub fn volume_column(self) -> Option<Column> {
        match self {
            ChartKind::Oil => Some(Column::OilVol),
            ChartKind::Water => Some(Column::WaterVol),
            ChartKind::Gas => Some(Column::GasVol),
            _ => None,
        }
    }
}

/// Seasonal decomposition settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecomposeConfig {
    pub column: Column,
    /// Seasonal period in observations; `None` infers it from the cadence.
    pub period: Option<usize>,
}

impl Default for DecomposeConfig {
    fn default() -> Self {
        Self {
            column: Column::OilVol,
            period: None,
        }
    }
}

/// Where the two input tables come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Files { historical: PathBuf, forecast: PathBuf },
    /// Seeded synthetic well data.
    Demo { seed: u64, days: usize },
}

/// Everything the pipeline needs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub source: InputSource,
    pub duplicates: DuplicatePolicy,
    pub decompose: DecomposeConfig,
    pub summary_columns: Vec<Column>,
    pub annual_columns: Vec<Column>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: InputSource::Demo {
                seed: 42,
                days: 3 * 365,
            },
            duplicates: DuplicatePolicy::Reject,
            decompose: DecomposeConfig::default(),
            summary_columns: Column::REQUIRED_HISTORICAL.to_vec(),
            annual_columns: vec![Column::OilVol, Column::WaterVol, Column::GasVol],
        }
    }
}
