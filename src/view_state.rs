use std::collections::BTreeSet;

use thiserror::Error;

use crate::dataset::Dataset;
use crate::metrics::{resolve, MetricMode, MetricPair};
use crate::scene::BrushExtent;

/// What a transition changed; drives the orchestrator's render policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Season,
    Mode,
    Selection,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("unknown season `{0}`")]
    InvalidSeason(String),
    #[error("squad `{squad}` has no team record in season {season}")]
    UnknownSquad { squad: String, season: String },
    #[error("a cleared brush cannot select teams")]
    SelectionWithoutBrush,
}

/// Shared view state. Fields change only through the transitions below,
/// each of which reports what changed.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    season: String,
    mode: MetricMode,
    selected_teams: BTreeSet<String>,
    brush: Option<BrushExtent>,
}

impl ViewState {
    pub fn new(season: impl Into<String>, mode: MetricMode) -> Self {
        Self {
            season: season.into(),
            mode,
            selected_teams: BTreeSet::new(),
            brush: None,
        }
    }

    /// Starts on `preferred` when the dataset knows it, else on the first season.
    pub fn initial(dataset: &Dataset, preferred: Option<&str>, mode: MetricMode) -> Self {
        let season = preferred
            .filter(|s| dataset.has_season(s))
            .map(str::to_string)
            .or_else(|| dataset.seasons().first().cloned())
            .unwrap_or_default();
        Self::new(season, mode)
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    pub fn mode(&self) -> MetricMode {
        self.mode
    }

    pub fn pair(&self) -> MetricPair {
        resolve(self.mode)
    }

    pub fn selected_teams(&self) -> &BTreeSet<String> {
        &self.selected_teams
    }

    pub fn brush(&self) -> Option<&BrushExtent> {
        self.brush.as_ref()
    }

    pub fn set_season(
        &mut self,
        dataset: &Dataset,
        season: &str,
    ) -> Result<StateChange, ViewError> {
        if !dataset.has_season(season) {
            return Err(ViewError::InvalidSeason(season.to_string()));
        }
        self.season = season.to_string();
        self.clear_selection();
        Ok(StateChange::Season)
    }

    pub fn set_mode(&mut self, mode: MetricMode) -> StateChange {
        self.mode = mode;
        self.clear_selection();
        StateChange::Mode
    }

    /// Replaces brush and selection together, or leaves both untouched on error.
    pub fn set_brush_selection(
        &mut self,
        dataset: &Dataset,
        extent: Option<BrushExtent>,
        matched: BTreeSet<String>,
    ) -> Result<StateChange, ViewError> {
        if extent.is_none() && !matched.is_empty() {
            return Err(ViewError::SelectionWithoutBrush);
        }
        let squads = dataset.squads_in(&self.season);
        if let Some(unknown) = matched.iter().find(|s| !squads.contains(s.as_str())) {
            return Err(ViewError::UnknownSquad {
                squad: unknown.clone(),
                season: self.season.clone(),
            });
        }
        self.brush = extent;
        self.selected_teams = matched;
        Ok(StateChange::Selection)
    }

    fn clear_selection(&mut self) {
        self.selected_teams.clear();
        self.brush = None;
    }
}
