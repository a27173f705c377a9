use std::collections::BTreeMap;
use std::fmt;

use chrono::{Duration, NaiveDate};

use super::model::ForecastModel;
use super::{DailyTotal, ForecastError, ForecastPoint, Horizon};
use crate::data::model::FundingTable;

// ---------------------------------------------------------------------------
// Daily totals / axis
// ---------------------------------------------------------------------------

/// Sum funding per exact date, in date order. Undated rows are left out,
/// null amounts count as zero.
pub fn daily_totals(table: &FundingTable) -> Vec<DailyTotal> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for rec in &table.records {
        if let Some(date) = rec.date {
            *by_date.entry(date).or_default() += rec.amount_or_zero();
        }
    }
    by_date
        .into_iter()
        .map(|(date, total)| DailyTotal { date, total })
        .collect()
}

/// Historical dates followed by `horizon` consecutive days after the last one.
pub fn extend_axis(history: &[DailyTotal], horizon: Horizon) -> Vec<NaiveDate> {
    let mut axis: Vec<NaiveDate> = history.iter().map(|h| h.date).collect();
    if let Some(last) = history.last().map(|h| h.date) {
        axis.extend((1..=i64::from(horizon.days())).map(|d| last + Duration::days(d)));
    }
    axis
}

// ---------------------------------------------------------------------------
// Delta
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Increase => write!(f, "increase"),
            Direction::Decrease => write!(f, "decrease"),
        }
    }
}

/// Relative change between the last observed day and the last forecast day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FundingDelta {
    Change { percent: f64, direction: Direction },
    /// Last observed total was zero (or the result was not finite).
    Undefined,
}

/// `(last_predicted - last_known) / last_known * 100`, guarded against zero.
pub fn funding_delta(last_known: f64, last_predicted: f64) -> FundingDelta {
    if last_known == 0.0 {
        return FundingDelta::Undefined;
    }
    let percent = (last_predicted - last_known) / last_known * 100.0;
    if !percent.is_finite() {
        return FundingDelta::Undefined;
    }
    let direction = if percent > 0.0 {
        Direction::Increase
    } else {
        Direction::Decrease
    };
    FundingDelta::Change { percent, direction }
}

impl FundingDelta {
    /// Sentence shown above the forecast chart.
    pub fn message(&self, horizon: Horizon) -> String {
        match self {
            FundingDelta::Change { percent, direction } => format!(
                "Total investment is expected to {direction} by {:.2}% over the next {} days.",
                percent.abs(),
                horizon.days()
            ),
            FundingDelta::Undefined => format!(
                "Total investment change over the next {} days is undefined: \
                 the last recorded day has no funding.",
                horizon.days()
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Everything the forecast section shows or exports.
#[derive(Debug, Clone)]
pub struct ForecastReport {
    pub horizon: Horizon,
    pub history: Vec<DailyTotal>,
    /// One point per day of the extended axis (history + horizon).
    pub points: Vec<ForecastPoint>,
    pub delta: FundingDelta,
}

impl ForecastReport {
    pub fn message(&self) -> String {
        self.delta.message(self.horizon)
    }
}

/// Fit `model` on the full table's daily totals and forecast `horizon` days ahead.
///
/// The model is refit on every call.
pub fn run_forecast(
    table: &FundingTable,
    horizon: Horizon,
    model: &mut dyn ForecastModel,
) -> Result<ForecastReport, ForecastError> {
    if !table.has_dates() {
        return Err(ForecastError::NoDateData);
    }

    let history = daily_totals(table);
    model.fit(&history)?;

    let axis = extend_axis(&history, horizon);
    let points = model.predict(&axis)?;

    let (Some(last_known), Some(last_point)) = (history.last(), points.last()) else {
        return Err(ForecastError::NoDateData);
    };
    let delta = funding_delta(last_known.total, last_point.yhat);

    log::info!(
        "Forecast {} days past {} ({} historical days): {:?}",
        horizon.days(),
        last_known.date,
        history.len(),
        delta
    );

    Ok(ForecastReport {
        horizon,
        history,
        points,
        delta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::forecast::model::AdditiveModel;

    fn three_days() -> FundingTable {
        FundingTable::from_records(vec![
            record("a", None, None, Some((2018, 1, 1)), Some(100.0)),
            record("b", None, None, Some((2018, 1, 2)), Some(200.0)),
            record("c", None, None, Some((2018, 1, 3)), Some(300.0)),
        ])
    }

    #[test]
    fn daily_totals_sum_same_day_and_skip_undated() {
        let table = FundingTable::from_records(vec![
            record("a", None, None, Some((2018, 1, 2)), Some(5.0)),
            record("b", None, None, Some((2018, 1, 1)), Some(1.0)),
            record("c", None, None, Some((2018, 1, 2)), None),
            record("d", None, None, Some((2018, 1, 2)), Some(2.5)),
            record("e", None, None, None, Some(1000.0)),
        ]);
        let totals = daily_totals(&table);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].total, 1.0);
        assert_eq!(totals[1].total, 7.5);
        assert!(totals[0].date < totals[1].date);
    }

    #[test]
    fn extended_axis_adds_exactly_horizon_days() {
        let history = daily_totals(&three_days());
        let horizon = Horizon::new(60).unwrap();
        let axis = extend_axis(&history, horizon);

        assert_eq!(axis.len(), history.len() + 60);
        assert!(axis.windows(2).all(|w| (w[1] - w[0]).num_days() == 1));
        assert_eq!(axis[0], NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
    }

    #[test]
    fn delta_direction_and_zero_guard() {
        assert_eq!(
            funding_delta(100.0, 150.0),
            FundingDelta::Change {
                percent: 50.0,
                direction: Direction::Increase
            }
        );
        assert!(matches!(
            funding_delta(100.0, 100.0),
            FundingDelta::Change {
                direction: Direction::Decrease,
                ..
            }
        ));
        assert_eq!(funding_delta(0.0, 42.0), FundingDelta::Undefined);
        assert_eq!(funding_delta(1e-300, 1e300), FundingDelta::Undefined);
    }

    #[test]
    fn undefined_delta_message_has_no_nan_or_inf() {
        let msg = funding_delta(0.0, 0.0).message(Horizon::default());
        assert!(msg.contains("undefined"));
        assert!(!msg.contains("NaN") && !msg.contains("inf"));
    }

    #[test]
    fn change_message_reports_absolute_percent() {
        let msg = funding_delta(200.0, 150.0).message(Horizon::new(30).unwrap());
        assert_eq!(
            msg,
            "Total investment is expected to decrease by 25.00% over the next 30 days."
        );
    }

    #[test]
    fn three_day_scenario() {
        let mut model = AdditiveModel::default();
        let report = run_forecast(&three_days(), Horizon::new(30).unwrap(), &mut model).unwrap();

        assert_eq!(report.points.len(), 33);
        assert_eq!(report.history.last().map(|h| h.total), Some(300.0));
        assert!(matches!(
            report.delta,
            FundingDelta::Change {
                direction: Direction::Increase,
                ..
            }
        ));
        assert_eq!(
            report.points.last().map(|p| p.date),
            NaiveDate::from_ymd_opt(2018, 2, 2)
        );
    }

    #[test]
    fn zero_last_day_is_undefined_not_infinite() {
        let table = FundingTable::from_records(vec![
            record("a", None, None, Some((2018, 1, 1)), Some(100.0)),
            record("b", None, None, Some((2018, 1, 2)), None),
        ]);
        let mut model = AdditiveModel::default();
        let report = run_forecast(&table, Horizon::default(), &mut model).unwrap();
        assert_eq!(report.delta, FundingDelta::Undefined);
    }

    #[test]
    fn undated_table_is_skipped() {
        let table = FundingTable::from_records(vec![record("a", None, None, None, Some(1.0))]);
        let mut model = AdditiveModel::default();
        assert!(matches!(
            run_forecast(&table, Horizon::default(), &mut model),
            Err(ForecastError::NoDateData)
        ));
    }

    #[test]
    fn single_day_is_insufficient() {
        let table = FundingTable::from_records(vec![record(
            "a",
            None,
            None,
            Some((2018, 1, 1)),
            Some(1.0),
        )]);
        let mut model = AdditiveModel::default();
        let err = run_forecast(&table, Horizon::default(), &mut model).unwrap_err();
        assert!(err.is_data_shortage());
    }
}
