//! Funding forecast: daily totals → additive model → extended axis → delta / export.
//!
//! ```text
//!   FundingTable (unfiltered)
//!        │  daily_totals
//!        ▼
//!   [DailyTotal]  ──fit──▶  ForecastModel
//!        │  extend_axis         │ predict
//!        ▼                      ▼
//!   [NaiveDate]  ──────▶  [ForecastPoint] ──▶ delta, CSV export
//! ```

use chrono::NaiveDate;
use thiserror::Error;

pub mod export;
pub mod model;
pub mod pipeline;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Not enough date data for forecasting.")]
    NoDateData,
    #[error("Not enough date data for forecasting: need {required} distinct days, found {actual}.")]
    InsufficientHistory { required: usize, actual: usize },
    #[error(
        "Forecast horizon must be {min}..={max} days in steps of {step}, got {0}",
        min = Horizon::MIN_DAYS,
        max = Horizon::MAX_DAYS,
        step = Horizon::STEP_DAYS
    )]
    InvalidHorizon(u32),
    #[error("Forecast model has not been fitted")]
    NotFitted,
    #[error("Numerical error while fitting forecast: {0}")]
    Numerical(String),
    #[error("Writing forecast CSV: {0}")]
    Export(#[from] csv::Error),
    #[error("Saving forecast CSV: {0}")]
    Io(#[from] std::io::Error),
}

impl ForecastError {
    /// Shortage of dated history; shown as a warning rather than an error.
    pub fn is_data_shortage(&self) -> bool {
        matches!(
            self,
            ForecastError::NoDateData | ForecastError::InsufficientHistory { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Horizon
// ---------------------------------------------------------------------------

/// Number of future days to forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Horizon(u32);

impl Horizon {
    pub const MIN_DAYS: u32 = 30;
    pub const MAX_DAYS: u32 = 365;
    pub const STEP_DAYS: u32 = 30;
    pub const DEFAULT_DAYS: u32 = 90;

    /// Accepts multiples of 30 inside `30..=365` (so 30, 60, …, 360).
    pub fn new(days: u32) -> Result<Self, ForecastError> {
        if (Self::MIN_DAYS..=Self::MAX_DAYS).contains(&days) && days % Self::STEP_DAYS == 0 {
            Ok(Horizon(days))
        } else {
            Err(ForecastError::InvalidHorizon(days))
        }
    }

    pub fn days(self) -> u32 {
        self.0
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Horizon(Self::DEFAULT_DAYS)
    }
}

// ---------------------------------------------------------------------------
// Series types
// ---------------------------------------------------------------------------

/// Funding summed over one calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: f64,
}

/// Point estimate and interval for one day of the extended axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizon_accepts_slider_values_only() {
        assert_eq!(Horizon::default().days(), 90);
        assert!(Horizon::new(30).is_ok());
        assert!(Horizon::new(360).is_ok());
        assert!(matches!(Horizon::new(0), Err(ForecastError::InvalidHorizon(0))));
        assert!(Horizon::new(45).is_err());
        assert!(Horizon::new(365).is_err());
        assert!(Horizon::new(390).is_err());
    }

    #[test]
    fn shortage_errors_are_warnings() {
        assert!(ForecastError::NoDateData.is_data_shortage());
        assert!(ForecastError::InsufficientHistory { required: 2, actual: 1 }.is_data_shortage());
        assert!(!ForecastError::Numerical("singular".into()).is_data_shortage());
        assert_eq!(
            ForecastError::NoDateData.to_string(),
            "Not enough date data for forecasting."
        );
    }
}
