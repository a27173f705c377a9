use std::path::{Path, PathBuf};

use crate::color::ColorMap;
use crate::dashboard::{DashboardView, FilteredView, ForecastSection};
use crate::data::filter::FilterCriteria;
use crate::data::session::Session;
use crate::forecast::Horizon;
use crate::settings::Settings;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    /// Loaded table for this session (empty if loading failed).
    pub session: Session,

    /// File the session was loaded from.
    pub source: Option<PathBuf>,

    /// Current industry / city / year selections.
    pub criteria: FilterCriteria,

    /// Forecast horizon chosen with the slider.
    pub horizon: Horizon,

    /// Everything the central panel draws (cached between interactions).
    pub view: DashboardView,

    /// Industry colours, fixed per session so filters don't recolour charts.
    pub colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load the configured data file and build the first view.
    pub fn new(settings: Settings) -> Self {
        let path = settings.data.path.clone();
        let horizon = settings.default_horizon();
        let mut state = AppState {
            settings,
            session: Session::default(),
            source: None,
            criteria: FilterCriteria::default(),
            horizon,
            view: DashboardView::NoData {
                warning: String::new(),
            },
            colors: ColorMap::default(),
            status_message: None,
        };
        state.open_path(&path);
        state
    }

    /// Replace the session with the contents of `path`.
    pub fn open_path(&mut self, path: &Path) {
        self.set_session(Session::from_path(path));
        self.source = Some(path.to_path_buf());
    }

    /// Ingest a newly loaded session, reset filters and rebuild every section.
    pub fn set_session(&mut self, session: Session) {
        self.status_message = session.load_error.clone();
        self.colors = ColorMap::new(&session.table.industries);
        self.session = session;
        self.criteria = FilterCriteria::default();
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.view = DashboardView::build(
            &self.session.table,
            &self.criteria,
            self.horizon,
            &self.settings,
        );
    }

    /// Apply new filter selections; only the filtered section is recomputed.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        if criteria == self.criteria {
            return;
        }
        self.criteria = criteria;
        self.refilter();
    }

    pub fn reset_filters(&mut self) {
        self.set_criteria(FilterCriteria::default());
    }

    /// Recompute the filtered rows and charts after a filter change.
    pub fn refilter(&mut self) {
        if let DashboardView::Loaded(dash) = &mut self.view {
            dash.filtered = FilteredView::compute(
                &self.session.table,
                &self.criteria,
                self.settings.charts.top_n,
            );
        }
    }

    /// Change the horizon from the slider; the model is refit.
    pub fn set_horizon(&mut self, days: u32) {
        match Horizon::new(days) {
            Ok(horizon) if horizon == self.horizon => {}
            Ok(horizon) => {
                self.horizon = horizon;
                self.reforecast();
            }
            Err(e) => {
                log::warn!("{e}");
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Refit the forecast over the full table.
    pub fn reforecast(&mut self) {
        if let DashboardView::Loaded(dash) = &mut self.view {
            dash.forecast = ForecastSection::compute(
                &self.session.table,
                self.horizon,
                self.settings.model_settings(),
            );
        }
    }

    /// Number of rows passing the current filters.
    pub fn visible_count(&self) -> usize {
        match &self.view {
            DashboardView::Loaded(dash) => dash.filtered.indices.len(),
            DashboardView::NoData { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::data::filter::Selection;
    use crate::data::model::FundingTable;
    use crate::data::model::tests::record;

    fn state_with(records: Vec<crate::data::model::FundingRecord>) -> AppState {
        let mut settings = Settings::default();
        settings.data.path = PathBuf::from("does/not/exist.csv");
        let mut state = AppState::new(settings);
        state.set_session(Session::open(|| Ok(FundingTable::from_records(records))));
        state
    }

    fn sample() -> AppState {
        state_with(vec![
            record("a", Some("Fintech"), Some("Pune"), Some((2017, 1, 1)), Some(10.0)),
            record("b", Some("Edtech"), Some("Delhi"), Some((2017, 1, 2)), Some(30.0)),
            record("c", Some("Fintech"), Some("Mumbai"), Some((2018, 1, 3)), Some(5.0)),
        ])
    }

    #[test]
    fn missing_start_file_leaves_error_and_empty_view() {
        let mut settings = Settings::default();
        settings.data.path = PathBuf::from("does/not/exist.csv");
        let state = AppState::new(settings);

        assert!(state.status_message.as_deref().unwrap().starts_with("Error loading data"));
        assert!(matches!(state.view, DashboardView::NoData { .. }));
        assert_eq!(state.visible_count(), 0);
    }

    #[test]
    fn new_session_clears_error_and_filters() {
        let mut state = sample();
        assert!(state.status_message.is_none());
        state.set_criteria(FilterCriteria {
            city: Selection::Only("Pune".to_string()),
            ..Default::default()
        });
        assert_eq!(state.visible_count(), 1);

        state.set_session(Session::open(|| {
            Ok(FundingTable::from_records(vec![record("z", None, None, None, None)]))
        }));
        assert_eq!(state.criteria, FilterCriteria::default());
        assert_eq!(state.visible_count(), 1);
    }

    #[test]
    fn filter_change_keeps_forecast() {
        let mut state = sample();
        state.set_criteria(FilterCriteria {
            year: Selection::Only(2018),
            ..Default::default()
        });
        let DashboardView::Loaded(dash) = &state.view else {
            panic!("expected loaded view");
        };
        assert_eq!(dash.filtered.indices, vec![2]);
        match &dash.forecast {
            ForecastSection::Ready(report) => assert_eq!(report.history.len(), 3),
            other => panic!("expected a forecast, got {other:?}"),
        }

        state.reset_filters();
        assert_eq!(state.visible_count(), 3);
    }

    #[test]
    fn horizon_change_refits() {
        let mut state = sample();
        state.set_horizon(180);
        assert_eq!(state.horizon.days(), 180);
        let DashboardView::Loaded(dash) = &state.view else {
            panic!("expected loaded view");
        };
        let ForecastSection::Ready(report) = &dash.forecast else {
            panic!("expected a forecast");
        };
        assert_eq!(report.points.len(), 3 + 180);
    }

    #[test]
    fn invalid_horizon_is_reported_and_ignored() {
        let mut state = sample();
        state.set_horizon(45);
        assert_eq!(state.horizon, Horizon::default());
        assert!(state.status_message.is_some());
    }

    #[test]
    fn failed_reload_degrades_to_no_data() {
        let mut state = sample();
        state.set_session(Session::open(|| Err(anyhow!("malformed CSV"))));
        assert!(matches!(state.view, DashboardView::NoData { .. }));
        assert_eq!(
            state.status_message.as_deref(),
            Some("Error loading data: malformed CSV")
        );
    }
}
