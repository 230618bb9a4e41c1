use std::collections::BTreeSet;

use crate::assets::CrestAssets;
use crate::bar::{self, BarScene, RankLimits};
use crate::dataset::Dataset;
use crate::metrics::MetricMode;
use crate::scatter::{self, ScatterScene};
use crate::scene::{BrushExtent, Point, Viewport};
use crate::tooltip::TooltipSlot;
use crate::view_state::{StateChange, ViewError, ViewState};

/// Issued by `RenderSlot::begin`; only the newest ticket may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket {
    generation: u64,
}

/// The rendered scene of one component. Beginning a render tears the old
/// scene down; a newer render supersedes an older one instead of queueing.
#[derive(Debug, Clone)]
pub struct RenderSlot<S> {
    generation: u64,
    scene: Option<S>,
}

impl<S> Default for RenderSlot<S> {
    fn default() -> Self {
        Self {
            generation: 0,
            scene: None,
        }
    }
}

impl<S> RenderSlot<S> {
    pub fn begin(&mut self) -> RenderTicket {
        self.generation += 1;
        self.scene = None;
        RenderTicket {
            generation: self.generation,
        }
    }

    /// Installs `scene` unless a newer render has begun since `ticket`.
    pub fn commit(&mut self, ticket: RenderTicket, scene: S) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.scene = Some(scene);
        true
    }

    pub fn scene(&self) -> Option<&S> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut S> {
        self.scene.as_mut()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScatterAction {
    Rebuild,
    Restyle,
}

/// Which components redraw for a state change. The bar chart always rebuilds;
/// the scatter plot only restyles when nothing but the selection moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPlan {
    pub scatter: ScatterAction,
}

impl RenderPlan {
    pub fn for_change(change: StateChange) -> Self {
        let scatter = match change {
            StateChange::Season | StateChange::Mode => ScatterAction::Rebuild,
            StateChange::Selection => ScatterAction::Restyle,
        };
        Self { scatter }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderEvent {
    ScatterRebuilt,
    ScatterRestyled,
    BarRebuilt,
}

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub default_season: Option<String>,
    pub default_mode: MetricMode,
    pub limits: RankLimits,
    pub scatter_viewport: Viewport,
    pub bar_viewport: Viewport,
    pub assets: CrestAssets,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            default_season: None,
            default_mode: MetricMode::Expected,
            limits: RankLimits::default(),
            scatter_viewport: Viewport::default(),
            bar_viewport: Viewport::default(),
            assets: CrestAssets::new("data/logos"),
        }
    }
}

/// Owns the dataset, the view state and both charts, and keeps them in step.
pub struct Dashboard {
    dataset: Dataset,
    view: ViewState,
    limits: RankLimits,
    scatter_viewport: Viewport,
    bar_viewport: Viewport,
    assets: CrestAssets,
    scatter: RenderSlot<ScatterScene>,
    bar: RenderSlot<BarScene>,
    scatter_tooltip: TooltipSlot,
    bar_tooltip: TooltipSlot,
    last_renders: Vec<RenderEvent>,
}

impl Dashboard {
    pub fn new(dataset: Dataset, options: DashboardOptions) -> Self {
        let view = ViewState::initial(
            &dataset,
            options.default_season.as_deref(),
            options.default_mode,
        );
        if let Some(wanted) = options.default_season.as_deref() {
            if wanted != view.season() {
                log::warn!("default season {wanted} not in dataset; using {}", view.season());
            }
        }
        let mut dashboard = Self {
            dataset,
            view,
            limits: options.limits,
            scatter_viewport: options.scatter_viewport,
            bar_viewport: options.bar_viewport,
            assets: options.assets,
            scatter: RenderSlot::default(),
            bar: RenderSlot::default(),
            scatter_tooltip: TooltipSlot::default(),
            bar_tooltip: TooltipSlot::default(),
            last_renders: Vec::new(),
        };
        dashboard.apply(StateChange::Season);
        dashboard
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn limits(&self) -> RankLimits {
        self.limits
    }

    pub fn scatter_scene(&self) -> Option<&ScatterScene> {
        self.scatter.scene()
    }

    pub fn bar_scene(&self) -> Option<&BarScene> {
        self.bar.scene()
    }

    pub fn scatter_slot(&self) -> &RenderSlot<ScatterScene> {
        &self.scatter
    }

    pub fn bar_slot(&self) -> &RenderSlot<BarScene> {
        &self.bar
    }

    pub fn scatter_tooltip(&self) -> &TooltipSlot {
        &self.scatter_tooltip
    }

    pub fn bar_tooltip(&self) -> &TooltipSlot {
        &self.bar_tooltip
    }

    /// Renders performed by the most recent state change, in order.
    pub fn last_renders(&self) -> &[RenderEvent] {
        &self.last_renders
    }

    pub fn select_season(&mut self, season: &str) -> Result<(), ViewError> {
        let change = self.view.set_season(&self.dataset, season)?;
        log::info!("season -> {season}");
        self.apply(change);
        Ok(())
    }

    /// Steps through `Dataset::seasons()` in load order, wrapping around.
    pub fn cycle_season(&mut self, forward: bool) -> Result<(), ViewError> {
        let seasons = self.dataset.seasons();
        if seasons.is_empty() {
            return Ok(());
        }
        let current = seasons
            .iter()
            .position(|s| s == self.view.season())
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % seasons.len()
        } else {
            (current + seasons.len() - 1) % seasons.len()
        };
        let season = seasons[next].clone();
        self.select_season(&season)
    }

    pub fn select_mode(&mut self, mode: MetricMode) {
        let change = self.view.set_mode(mode);
        log::info!("mode -> {}", mode.label());
        self.apply(change);
    }

    pub fn toggle_mode(&mut self) {
        self.select_mode(self.view.mode().toggle());
    }

    /// Brush end on the scatter plot. An absent or zero-area extent clears the
    /// selection.
    pub fn brush(&mut self, extent: Option<BrushExtent>) -> Result<(), ViewError> {
        let extent = extent.filter(|e| !e.is_empty());
        let matched = self
            .scatter
            .scene()
            .map(|scene| scene.brush_match(extent.as_ref()))
            .unwrap_or_default();
        log::debug!("brush {extent:?} matched {} squads", matched.len());
        let change = self.view.set_brush_selection(&self.dataset, extent, matched)?;
        self.apply(change);
        Ok(())
    }

    pub fn clear_brush(&mut self) -> Result<(), ViewError> {
        self.brush(None)
    }

    /// Moving within the hovered marker only repositions its tooltip.
    pub fn hover_scatter(&mut self, pointer: Point) {
        let Some(scene) = self.scatter.scene() else {
            self.scatter_tooltip.hide();
            return;
        };
        match scene.marker_at(pointer) {
            Some(marker) if self.scatter_tooltip.shows(&marker.squad) => {
                self.scatter_tooltip.move_to(pointer)
            }
            Some(marker) => self.scatter_tooltip.show(scene.tooltip(marker, pointer)),
            None => self.scatter_tooltip.hide(),
        }
    }

    pub fn leave_scatter(&mut self) {
        self.scatter_tooltip.hide();
    }

    pub fn hover_bar(&mut self, pointer: Point) {
        let Some(scene) = self.bar.scene() else {
            self.bar_tooltip.hide();
            return;
        };
        match scene.bar_at(pointer) {
            Some(bar) if self.bar_tooltip.shows(&bar.player) => self.bar_tooltip.move_to(pointer),
            Some(bar) => self.bar_tooltip.show(scene.tooltip(bar, pointer)),
            None => self.bar_tooltip.hide(),
        }
    }

    pub fn leave_bar(&mut self) {
        self.bar_tooltip.hide();
    }

    fn apply(&mut self, change: StateChange) {
        self.last_renders.clear();
        match RenderPlan::for_change(change).scatter {
            ScatterAction::Rebuild => self.rebuild_scatter(),
            ScatterAction::Restyle => self.restyle_scatter(),
        }
        self.rebuild_bar();
    }

    fn rebuild_scatter(&mut self) {
        let ticket = self.scatter.begin();
        self.scatter_tooltip.dispose();
        let mut scene = scatter::build_scene(
            &self.dataset,
            self.view.season(),
            self.view.pair(),
            &self.scatter_viewport,
            &mut self.assets,
        );
        scene.apply_selection(self.view.brush().copied(), self.view.selected_teams());
        if self.scatter.commit(ticket, scene) {
            self.last_renders.push(RenderEvent::ScatterRebuilt);
        }
    }

    fn restyle_scatter(&mut self) {
        let extent = self.view.brush().copied();
        let selection: BTreeSet<String> = self.view.selected_teams().clone();
        if let Some(scene) = self.scatter.scene_mut() {
            scene.apply_selection(extent, &selection);
            self.last_renders.push(RenderEvent::ScatterRestyled);
        }
    }

    fn rebuild_bar(&mut self) {
        let ticket = self.bar.begin();
        self.bar_tooltip.dispose();
        let scene = bar::build_scene(
            &self.dataset,
            self.view.season(),
            self.view.pair(),
            self.view.selected_teams(),
            self.limits,
            &self.bar_viewport,
        );
        if self.bar.commit(ticket, scene) {
            self.last_renders.push(RenderEvent::BarRebuilt);
        }
    }
}
