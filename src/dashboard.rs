use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::data::aggregate::{self, Kpis};
use crate::data::filter::{FilterCriteria, filtered_indices, select};
use crate::data::model::{FundingRecord, FundingTable};
use crate::forecast::Horizon;
use crate::forecast::model::{AdditiveModel, ModelSettings};
use crate::forecast::pipeline::{ForecastReport, run_forecast};
use crate::settings::Settings;

/// Shown instead of every section when the session holds no rows.
pub const NO_DATA_WARNING: &str = "No data loaded.";

// ---------------------------------------------------------------------------
// Filtered section – recomputed on every filter change
// ---------------------------------------------------------------------------

/// Chart inputs derived from the filtered rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Charts {
    /// Funding per industry, largest first.
    pub industry_totals: Vec<(String, f64)>,
    /// Per-industry dated amounts; `None` when no filtered row has a date.
    pub amount_over_time: Option<BTreeMap<String, Vec<(NaiveDate, f64)>>>,
    pub top_cities: Vec<(String, f64)>,
    pub rounds_per_year: Vec<(i32, usize)>,
    pub funding_per_year: Vec<(i32, f64)>,
    pub top_investors: Vec<(String, usize)>,
    /// Funding behind each of `top_investors`, same order.
    pub investor_funding: Vec<(String, f64)>,
}

impl Charts {
    pub fn compute(rows: &[&FundingRecord], top_n: usize) -> Self {
        let industries = aggregate::sum_by_industry(rows);
        let dated = rows.iter().any(|r| r.date.is_some());
        let top_investors = aggregate::investor_ranking(rows, top_n);
        let by_investor = aggregate::sum_by_investor(rows);
        let investor_funding = top_investors
            .iter()
            .map(|(name, _)| {
                let sum = by_investor
                    .groups
                    .iter()
                    .find(|(k, _)| k == name)
                    .map_or(0.0, |(_, v)| *v);
                (name.clone(), sum)
            })
            .collect();

        Charts {
            industry_totals: industries.top_n(industries.groups.len()),
            amount_over_time: dated.then(|| aggregate::amount_over_time(rows)),
            top_cities: aggregate::sum_by_city(rows).top_n(top_n),
            rounds_per_year: aggregate::count_by_year(rows).groups,
            funding_per_year: aggregate::sum_by_year(rows).groups,
            top_investors,
            investor_funding,
        }
    }
}

/// The rows matching the current filters and everything drawn from them.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub criteria: FilterCriteria,
    pub indices: Vec<usize>,
    pub charts: Charts,
}

impl FilteredView {
    pub fn compute(table: &FundingTable, criteria: &FilterCriteria, top_n: usize) -> Self {
        let indices = filtered_indices(table, criteria);
        let rows = select(table, &indices);
        log::debug!("Filter {criteria:?} kept {} of {} rows", rows.len(), table.len());
        FilteredView {
            criteria: criteria.clone(),
            charts: Charts::compute(&rows, top_n),
            indices,
        }
    }
}

// ---------------------------------------------------------------------------
// Forecast section – refit on every horizon change
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum ForecastSection {
    Ready(ForecastReport),
    /// Not enough dated history; shown as a warning.
    Skipped { warning: String },
    /// The model failed; shown as an error in this section only.
    Failed { error: String },
}

impl ForecastSection {
    /// Forecast over the full, unfiltered table.
    pub fn compute(table: &FundingTable, horizon: Horizon, settings: ModelSettings) -> Self {
        let mut model = AdditiveModel::new(settings);
        match run_forecast(table, horizon, &mut model) {
            Ok(report) => ForecastSection::Ready(report),
            Err(e) if e.is_data_shortage() => {
                log::warn!("Skipping forecast: {e}");
                ForecastSection::Skipped {
                    warning: e.to_string(),
                }
            }
            Err(e) => {
                log::error!("Forecast failed: {e}");
                ForecastSection::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Whole dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub banner: String,
    /// Computed over the full table, not the filtered rows.
    pub kpis: Kpis,
    pub filtered: FilteredView,
    pub forecast: ForecastSection,
}

#[derive(Debug, Clone)]
pub enum DashboardView {
    /// Nothing loaded: every section is skipped behind one warning.
    NoData { warning: String },
    Loaded(Box<Dashboard>),
}

impl DashboardView {
    pub fn build(
        table: &FundingTable,
        criteria: &FilterCriteria,
        horizon: Horizon,
        settings: &Settings,
    ) -> Self {
        if table.is_empty() {
            log::warn!("{NO_DATA_WARNING}");
            return DashboardView::NoData {
                warning: NO_DATA_WARNING.to_string(),
            };
        }

        let all: Vec<&FundingRecord> = table.records.iter().collect();
        DashboardView::Loaded(Box::new(Dashboard {
            banner: format!("Loaded {} startup records successfully!", table.len()),
            kpis: Kpis::compute(&all),
            filtered: FilteredView::compute(table, criteria, settings.charts.top_n),
            forecast: ForecastSection::compute(table, horizon, settings.model_settings()),
        }))
    }
}

/// Whole dollars with thousands separators, e.g. `$1,234,567`.
pub fn format_usd(amount: f64) -> String {
    let digits = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && digits != "0" { "-" } else { "" };
    format!("{sign}${grouped}")
}
