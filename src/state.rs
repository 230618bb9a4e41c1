use std::time::Instant;

use crate::dataset::Dataset;
use crate::logging::Console;
use crate::metrics::MetricMode;
use crate::orchestrator::{Dashboard, DashboardOptions};
use crate::scene::{BrushExtent, Point, Viewport};
use crate::view_state::ViewError;

/// Side length of the brush created from the keyboard, in chart pixels.
const KEYBOARD_BRUSH_SIZE: f64 = 160.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Dashboard,
    Failed { reason: String },
}

/// In-progress brush gesture on the scatter plot. Only the end of a gesture
/// touches the view state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrushGesture {
    Idle,
    Dragging { anchor: Point, current: Point },
    Keyboard(BrushExtent),
}

impl BrushGesture {
    pub fn preview(&self) -> Option<BrushExtent> {
        match *self {
            BrushGesture::Idle => None,
            BrushGesture::Dragging { anchor, current } => {
                Some(BrushExtent::from_corners(anchor, current))
            }
            BrushGesture::Keyboard(extent) => Some(extent),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportState {
    pub active: bool,
    pub done: bool,
    pub path: Option<String>,
    pub message: String,
    pub failed: bool,
    pub last_updated: Option<Instant>,
}

impl ExportState {
    pub fn clear_if_done_for(&mut self, now: Instant, keep_secs: u64) {
        if !self.active || !self.done {
            return;
        }
        let Some(last) = self.last_updated else {
            return;
        };
        if now.duration_since(last).as_secs() >= keep_secs {
            *self = Self::default();
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    DatasetLoaded(Dataset),
    DatasetFailed(String),
    ExportFinished {
        path: String,
        teams: usize,
        players: usize,
    },
    ExportFailed(String),
    Log(String),
}

pub struct AppState {
    pub screen: Screen,
    pub dashboard: Option<Dashboard>,
    pub options: DashboardOptions,
    pub console: Console,
    pub help_overlay: bool,
    pub gesture: BrushGesture,
    pub export: ExportState,
}

impl AppState {
    pub fn new(options: DashboardOptions) -> Self {
        Self {
            screen: Screen::Loading,
            dashboard: None,
            options,
            console: Console::default(),
            help_overlay: false,
            gesture: BrushGesture::Idle,
            export: ExportState::default(),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.console.push(msg);
    }

    pub fn maybe_clear_export(&mut self, now: Instant) {
        self.export.clear_if_done_for(now, 8);
    }

    pub fn scatter_viewport(&self) -> Viewport {
        self.options.scatter_viewport
    }

    pub fn cycle_season(&mut self, forward: bool) {
        let Some(dashboard) = self.dashboard.as_mut() else {
            return;
        };
        let result = dashboard.cycle_season(forward);
        let season = dashboard.view().season().to_string();
        self.gesture = BrushGesture::Idle;
        self.report(result, format!("[INFO] Season: {season}"));
    }

    pub fn toggle_mode(&mut self) {
        let Some(dashboard) = self.dashboard.as_mut() else {
            return;
        };
        dashboard.toggle_mode();
        let mode = dashboard.view().mode();
        self.gesture = BrushGesture::Idle;
        self.push_log(format!("[INFO] Mode: {}", mode_label(mode)));
    }

    pub fn begin_drag(&mut self, at: Point) {
        if self.dashboard.is_none() {
            return;
        }
        self.gesture = BrushGesture::Dragging {
            anchor: at,
            current: at,
        };
    }

    pub fn update_drag(&mut self, at: Point) {
        if let BrushGesture::Dragging { anchor, .. } = self.gesture {
            self.gesture = BrushGesture::Dragging {
                anchor,
                current: at,
            };
        }
    }

    pub fn end_drag(&mut self, at: Point) {
        let BrushGesture::Dragging { anchor, .. } = self.gesture else {
            return;
        };
        self.gesture = BrushGesture::Idle;
        self.commit_brush(Some(BrushExtent::from_corners(anchor, at)));
    }

    pub fn start_keyboard_brush(&mut self) {
        if self.dashboard.is_none() {
            return;
        }
        let viewport = self.scatter_viewport();
        let start = self
            .dashboard
            .as_ref()
            .and_then(|d| d.view().brush().copied())
            .unwrap_or_else(|| {
                let (x0, _) = viewport.x_range();
                let (_, y0) = viewport.y_range();
                BrushExtent::from_corners(
                    Point::new(x0, y0),
                    Point::new(x0 + KEYBOARD_BRUSH_SIZE, y0 + KEYBOARD_BRUSH_SIZE),
                )
            });
        self.gesture = BrushGesture::Keyboard(start);
    }

    pub fn nudge_brush(&mut self, dx: f64, dy: f64) {
        let viewport = self.scatter_viewport();
        if let BrushGesture::Keyboard(extent) = self.gesture {
            self.gesture = BrushGesture::Keyboard(extent.translated(dx, dy, &viewport));
        }
    }

    pub fn resize_brush(&mut self, dw: f64, dh: f64) {
        let viewport = self.scatter_viewport();
        if let BrushGesture::Keyboard(extent) = self.gesture {
            self.gesture = BrushGesture::Keyboard(extent.resized(dw, dh, &viewport));
        }
    }

    pub fn commit_keyboard_brush(&mut self) {
        let BrushGesture::Keyboard(extent) = self.gesture else {
            return;
        };
        self.gesture = BrushGesture::Idle;
        self.commit_brush(Some(extent));
    }

    pub fn clear_brush(&mut self) {
        self.gesture = BrushGesture::Idle;
        self.commit_brush(None);
    }

    fn commit_brush(&mut self, extent: Option<BrushExtent>) {
        let Some(dashboard) = self.dashboard.as_mut() else {
            return;
        };
        let result = dashboard.brush(extent);
        let selected = dashboard.view().selected_teams();
        let msg = if selected.is_empty() {
            "[INFO] Brush cleared".to_string()
        } else {
            format!(
                "[INFO] Brushed {}: {}",
                selected.len(),
                selected.iter().cloned().collect::<Vec<_>>().join(", ")
            )
        };
        self.report(result, msg);
    }

    fn report(&mut self, result: Result<(), ViewError>, ok_msg: String) {
        match result {
            Ok(()) => self.push_log(ok_msg),
            Err(err) => {
                log::warn!("view transition rejected: {err}");
                self.push_log(format!("[WARN] {err}"));
            }
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::DatasetLoaded(dataset) => {
            let seasons = dataset.seasons().len();
            let teams = dataset.teams().len();
            let players = dataset.players().len();
            state.dashboard = Some(Dashboard::new(dataset, state.options.clone()));
            state.screen = Screen::Dashboard;
            state.push_log(format!(
                "[INFO] Loaded {teams} teams, {players} players, {seasons} seasons"
            ));
        }
        Delta::DatasetFailed(reason) => {
            log::error!("dataset load failed: {reason}");
            state.dashboard = None;
            state.screen = Screen::Failed {
                reason: reason.clone(),
            };
            state.push_log(format!("[ERROR] {reason}"));
        }
        Delta::ExportFinished {
            path,
            teams,
            players,
        } => {
            state.export.done = true;
            state.export.failed = false;
            state.export.message = format!("Exported {teams} teams, {players} players");
            state.export.path = Some(path.clone());
            state.export.last_updated = Some(Instant::now());
            state.push_log(format!("[INFO] Export saved: {path}"));
        }
        Delta::ExportFailed(reason) => {
            state.export.done = true;
            state.export.failed = true;
            state.export.message = reason.clone();
            state.export.last_updated = Some(Instant::now());
            state.push_log(format!("[WARN] Export failed: {reason}"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

pub fn mode_label(mode: MetricMode) -> &'static str {
    match mode {
        MetricMode::Expected => "Expected (xG)",
        MetricMode::Actual => "Actual (Goals)",
    }
}
