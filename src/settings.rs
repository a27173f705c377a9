use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::forecast::Horizon;
use crate::forecast::model::ModelSettings;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DataSettings {
    /// File opened at start-up.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ForecastSettings {
    pub default_horizon: u32,
    pub interval_width: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ChartSettings {
    /// Bars shown in the "top cities" and "top investors" charts.
    pub top_n: usize,
}

/// Dashboard settings: defaults, then `dashboard.toml`, then `DASHBOARD__*` env vars.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub data: DataSettings,
    pub forecast: ForecastSettings,
    pub charts: ChartSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data: DataSettings {
                path: PathBuf::from("startup_funding.csv"),
            },
            forecast: ForecastSettings {
                default_horizon: Horizon::DEFAULT_DAYS,
                interval_width: 0.8,
            },
            charts: ChartSettings { top_n: 10 },
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Self::defaults()?
                .add_source(File::with_name("dashboard").required(false))
                .add_source(Environment::with_prefix("DASHBOARD").separator("__")),
        )
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("data.path", "startup_funding.csv")?
            .set_default("forecast.default_horizon", i64::from(Horizon::DEFAULT_DAYS))?
            .set_default("forecast.interval_width", 0.8)?
            .set_default("charts.top_n", 10)?)
    }

    fn from_builder(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let settings: Settings = builder
            .build()
            .context("building dashboard configuration")?
            .try_deserialize()
            .context("parsing dashboard configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.forecast.interval_width > 0.0 && self.forecast.interval_width < 1.0,
            "forecast.interval_width must be in (0, 1), got {}",
            self.forecast.interval_width
        );
        ensure!(self.charts.top_n > 0, "charts.top_n must be positive");
        Ok(())
    }

    /// Configured start-up horizon, or the default when it is not a slider value.
    pub fn default_horizon(&self) -> Horizon {
        Horizon::new(self.forecast.default_horizon).unwrap_or_else(|e| {
            log::warn!("{e}; using {} days", Horizon::DEFAULT_DAYS);
            Horizon::default()
        })
    }

    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            interval_width: self.forecast.interval_width,
        }
    }
}
