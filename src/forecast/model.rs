//! Additive time-series model: linear trend + Fourier seasonalities.
//!
//! ```text
//!   y(t) = intercept + slope·t + Σ weekly(k) + Σ yearly(k) + ε
//! ```
//!
//! Fitted by ridge-regularised least squares on max-abs scaled values.
//! Seasonal blocks switch on only when the history is long enough to see them.

use std::f64::consts::PI;

use chrono::NaiveDate;

use super::{DailyTotal, ForecastError, ForecastPoint};

const WEEKLY_PERIOD: f64 = 7.0;
const YEARLY_PERIOD: f64 = 365.25;
const WEEKLY_ORDER: usize = 3;
const YEARLY_ORDER: usize = 10;
/// History span (days) needed before each seasonality is modelled.
const WEEKLY_MIN_SPAN: i64 = 14;
const YEARLY_MIN_SPAN: i64 = 730;

const TREND_PENALTY: f64 = 1e-6;
const SEASONAL_PENALTY: f64 = 1e-2;
const PIVOT_EPSILON: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Model boundary
// ---------------------------------------------------------------------------

/// Anything that can learn from daily totals and predict arbitrary dates.
pub trait ForecastModel {
    fn fit(&mut self, history: &[DailyTotal]) -> Result<(), ForecastError>;

    /// Point estimate and interval for each date, historical or future.
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastPoint>, ForecastError>;
}

/// Knobs for [`AdditiveModel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelSettings {
    /// Coverage of the uncertainty interval, e.g. 0.8 for 80 %.
    pub interval_width: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        ModelSettings {
            interval_width: 0.8,
        }
    }
}

/// Two-sided normal quantile for the common interval widths.
fn z_score(interval_width: f64) -> f64 {
    match interval_width {
        x if x >= 0.99 => 2.576,
        x if x >= 0.95 => 1.96,
        x if x >= 0.90 => 1.645,
        x if x >= 0.80 => 1.282,
        x if x >= 0.68 => 1.0,
        _ => 0.674,
    }
}

// ---------------------------------------------------------------------------
// AdditiveModel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Fitted {
    origin: NaiveDate,
    last: NaiveDate,
    span_days: f64,
    n_obs: usize,
    y_scale: f64,
    weekly_order: usize,
    yearly_order: usize,
    coefficients: Vec<f64>,
    /// Residual standard deviation in original units.
    sigma: f64,
}

impl Fitted {
    fn features(&self, date: NaiveDate) -> Vec<f64> {
        let t = (date - self.origin).num_days() as f64 / self.span_days;
        let mut row = Vec::with_capacity(2 + 2 * (self.weekly_order + self.yearly_order));
        row.push(1.0);
        row.push(t);
        let day = (date - NaiveDate::default()).num_days() as f64;
        fourier(&mut row, day, WEEKLY_PERIOD, self.weekly_order);
        fourier(&mut row, day, YEARLY_PERIOD, self.yearly_order);
        row
    }

    fn point(&self, date: NaiveDate) -> f64 {
        let row = self.features(date);
        row.iter()
            .zip(&self.coefficients)
            .map(|(x, b)| x * b)
            .sum::<f64>()
            * self.y_scale
    }
}

fn fourier(row: &mut Vec<f64>, day: f64, period: f64, order: usize) {
    for k in 1..=order {
        let angle = 2.0 * PI * k as f64 * day / period;
        row.push(angle.sin());
        row.push(angle.cos());
    }
}

/// Trend + weekly/yearly seasonality, intervals from residual spread.
#[derive(Debug, Clone, Default)]
pub struct AdditiveModel {
    settings: ModelSettings,
    fitted: Option<Fitted>,
}

impl AdditiveModel {
    pub fn new(settings: ModelSettings) -> Self {
        AdditiveModel {
            settings,
            fitted: None,
        }
    }
}

impl ForecastModel for AdditiveModel {
    fn fit(&mut self, history: &[DailyTotal]) -> Result<(), ForecastError> {
        if history.len() < 2 {
            return Err(ForecastError::InsufficientHistory {
                required: 2,
                actual: history.len(),
            });
        }

        let origin = history[0].date;
        let last = history[history.len() - 1].date;
        let span = (last - origin).num_days();

        let y_scale = history
            .iter()
            .map(|h| h.total.abs())
            .fold(0.0_f64, f64::max);
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };

        let mut fitted = Fitted {
            origin,
            last,
            span_days: span.max(1) as f64,
            n_obs: history.len(),
            y_scale,
            weekly_order: if span >= WEEKLY_MIN_SPAN { WEEKLY_ORDER } else { 0 },
            yearly_order: if span >= YEARLY_MIN_SPAN { YEARLY_ORDER } else { 0 },
            coefficients: Vec::new(),
            sigma: 0.0,
        };

        // Normal equations with a ridge penalty; the intercept is not penalised.
        let rows: Vec<Vec<f64>> = history.iter().map(|h| fitted.features(h.date)).collect();
        let p = rows[0].len();
        let mut gram = vec![vec![0.0; p]; p];
        let mut rhs = vec![0.0; p];
        for (row, h) in rows.iter().zip(history) {
            let y = h.total / y_scale;
            for i in 0..p {
                rhs[i] += row[i] * y;
                for j in 0..p {
                    gram[i][j] += row[i] * row[j];
                }
            }
        }
        gram[1][1] += TREND_PENALTY;
        for (i, gram_row) in gram.iter_mut().enumerate().skip(2) {
            gram_row[i] += SEASONAL_PENALTY;
        }

        fitted.coefficients = solve(gram, rhs)?;

        let sse: f64 = history
            .iter()
            .map(|h| (h.total - fitted.point(h.date)).powi(2))
            .sum();
        fitted.sigma = (sse / history.len() as f64).sqrt();

        log::debug!(
            "Fitted additive model on {} days (weekly order {}, yearly order {}, sigma {:.2})",
            fitted.n_obs,
            fitted.weekly_order,
            fitted.yearly_order,
            fitted.sigma
        );
        self.fitted = Some(fitted);
        Ok(())
    }

    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastPoint>, ForecastError> {
        let fitted = self.fitted.as_ref().ok_or(ForecastError::NotFitted)?;
        let z = z_score(self.settings.interval_width);

        Ok(dates
            .iter()
            .map(|&date| {
                let yhat = fitted.point(date);
                let steps_ahead = (date - fitted.last).num_days().max(0) as f64;
                let half_width =
                    z * fitted.sigma * (1.0 + steps_ahead / fitted.n_obs as f64).sqrt();
                ForecastPoint {
                    date,
                    yhat,
                    yhat_lower: yhat - half_width,
                    yhat_upper: yhat + half_width,
                }
            })
            .collect())
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, ForecastError> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < PIVOT_EPSILON {
            return Err(ForecastError::Numerical(format!(
                "singular system at column {col}"
            )));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(ForecastError::Numerical("non-finite coefficients".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 1, 1).unwrap() + Duration::days(offset)
    }

    fn series(values: &[f64]) -> Vec<DailyTotal> {
        values
            .iter()
            .enumerate()
            .map(|(i, &total)| DailyTotal {
                date: day(i as i64),
                total,
            })
            .collect()
    }

    #[test]
    fn solve_recovers_known_system() {
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let x = solve(a, vec![3.0, 5.0]).unwrap();
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);
    }

    #[test]
    fn singular_system_is_an_error() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(matches!(solve(a, vec![1.0, 2.0]), Err(ForecastError::Numerical(_))));
    }

    #[test]
    fn linear_history_extrapolates_linearly() {
        let mut model = AdditiveModel::default();
        model.fit(&series(&[100.0, 200.0, 300.0])).unwrap();

        let out = model.predict(&[day(2), day(32)]).unwrap();
        assert!((out[0].yhat - 300.0).abs() < 1.0);
        assert!((out[1].yhat - 3300.0).abs() / 3300.0 < 1e-3);
    }

    #[test]
    fn weekly_pattern_is_learned() {
        // Mondays spike on top of a flat baseline.
        let values: Vec<f64> = (0..56)
            .map(|i| if i % 7 == 0 { 500.0 } else { 100.0 })
            .collect();
        let mut model = AdditiveModel::default();
        model.fit(&series(&values)).unwrap();

        let out = model.predict(&[day(56), day(59)]).unwrap();
        assert!(out[0].yhat > out[1].yhat + 200.0);
    }

    #[test]
    fn intervals_bracket_and_widen_into_the_future() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 + (i % 5) as f64 * 20.0).collect();
        let mut model = AdditiveModel::new(ModelSettings {
            interval_width: 0.95,
        });
        model.fit(&series(&values)).unwrap();

        let out = model.predict(&[day(10), day(40), day(120)]).unwrap();
        for p in &out {
            assert!(p.yhat_lower <= p.yhat && p.yhat <= p.yhat_upper);
        }
        let width = |p: &ForecastPoint| p.yhat_upper - p.yhat_lower;
        assert!(width(&out[2]) > width(&out[1]));
        assert!(width(&out[1]) > width(&out[0]));
    }

    #[test]
    fn needs_two_days_and_a_fit() {
        let mut model = AdditiveModel::default();
        assert!(matches!(model.predict(&[day(0)]), Err(ForecastError::NotFitted)));
        assert!(matches!(
            model.fit(&series(&[1.0])),
            Err(ForecastError::InsufficientHistory { required: 2, actual: 1 })
        ));
        assert!(matches!(model.predict(&[day(0)]), Err(ForecastError::NotFitted)));
    }

    #[test]
    fn all_zero_history_is_flat() {
        let mut model = AdditiveModel::default();
        model.fit(&series(&[0.0, 0.0, 0.0])).unwrap();
        let out = model.predict(&[day(40)]).unwrap();
        assert!(out[0].yhat.abs() < 1e-9);
    }
}
