use std::path::Path;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::cache::DatasetCache;
use crate::data::filter::FilterSelection;
use crate::data::model::Dataset;
use crate::error::DashboardError;
use crate::pipeline::{ViewModel, render};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Source of the current dataset; replaced when another file is opened.
    pub cache: DatasetCache,

    /// The memoized dataset held by `cache`.
    pub dataset: Arc<Dataset>,

    /// Per-dimension filter selections.
    pub selection: FilterSelection,

    /// Output of the last pipeline run.
    pub view: ViewModel,

    /// Colours for sex series and slices.
    pub sex_colors: ColorMap,

    /// Colours for marital status slices.
    pub marital_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Build the state around an already loaded cache.
    pub fn new(config: DashboardConfig, cache: DatasetCache) -> Result<Self, DashboardError> {
        let dataset = cache.load()?;
        let selection = FilterSelection::defaults(dataset.domains(), config.default_year);
        let view = render(&dataset, &selection);
        let mut state = Self {
            config,
            cache,
            dataset,
            selection,
            view,
            sex_colors: ColorMap::default(),
            marital_colors: ColorMap::default(),
            status_message: None,
        };
        state.rebuild_colors();
        Ok(state)
    }

    /// Re-run the pipeline for the current selection.
    pub fn refresh(&mut self) {
        self.view = render(&self.dataset, &self.selection);
    }

    /// Re-read the current file. On failure the old data stays on screen.
    pub fn reload(&mut self) {
        match self.cache.reload() {
            Ok(dataset) => {
                log::info!("Reloaded {}", self.cache.path().display());
                self.set_dataset(dataset);
            }
            Err(e) => self.status_message = Some(describe(e)),
        }
    }

    /// Switch to another population file. On failure the old data stays.
    pub fn open(&mut self, path: &Path) {
        let cache = DatasetCache::new(path);
        match cache.load() {
            Ok(dataset) => {
                log::info!("Opened {}", path.display());
                self.cache = cache;
                self.set_dataset(dataset);
            }
            Err(e) => self.status_message = Some(describe(e)),
        }
    }

    /// Ingest a newly loaded dataset, reset filters and colours.
    fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.selection = FilterSelection::defaults(dataset.domains(), self.config.default_year);
        self.dataset = dataset;
        self.rebuild_colors();
        self.status_message = None;
        self.refresh();
    }

    fn rebuild_colors(&mut self) {
        let domains = self.dataset.domains();
        self.sex_colors = ColorMap::new(domains.sex.values().iter().cloned());
        self.marital_colors = ColorMap::new(domains.marital_status.values().iter().cloned());
    }
}

/// One-line message with the full cause chain, for the status bar.
fn describe(e: DashboardError) -> String {
    format!("Error: {:#}", anyhow::Error::new(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "county,sex,marital status,year,age,population\n\
                       Stockholm,men,married,2022,40,1200\n\
                       Stockholm,women,single,2022,41,800\n\
                       Uppsala,women,single,2021,41,300\n";

    fn state_for(csv: &str) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pop.csv");
        std::fs::write(&path, csv).unwrap();
        let state = AppState::new(DashboardConfig::default(), DatasetCache::new(&path)).unwrap();
        (dir, state)
    }

    #[test]
    fn starts_with_default_selection() {
        let (_dir, state) = state_for(CSV);
        assert_eq!(state.selection.county.len(), 1);
        assert!(state.selection.year.contains(&2022));
        assert_eq!(state.view.rows(), 2);
    }

    #[test]
    fn clearing_a_dimension_shows_no_data() {
        let (_dir, mut state) = state_for(CSV);
        state.selection.marital_status.clear();
        state.refresh();
        assert!(state.view.is_empty());
    }

    #[test]
    fn failed_open_keeps_current_dataset() {
        let (_dir, mut state) = state_for(CSV);
        let before = Arc::clone(&state.dataset);
        state.open(Path::new("missing/pop.csv"));
        assert!(Arc::ptr_eq(&before, &state.dataset));
        let status = state.status_message.as_deref().unwrap();
        assert!(status.starts_with("Error: data unavailable at missing/pop.csv: "));
    }

    #[test]
    fn open_resets_selection_for_new_file() {
        let (dir, mut state) = state_for(CSV);
        let other = dir.path().join("other.json");
        std::fs::write(
            &other,
            r#"[{"county":"Kalmar","sex":"men","marital status":"divorced","year":2022,"age":50,"population":9}]"#,
        )
        .unwrap();

        state.open(&other);
        assert_eq!(state.dataset.len(), 1);
        assert!(state.selection.county.contains("Kalmar"));
        assert_eq!(state.view.rows(), 1);
        assert_eq!(state.cache.path(), other.as_path());
    }
}
