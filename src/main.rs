use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;

use xg_terminal::config::{self, Config};
use xg_terminal::export::ExportSnapshot;
use xg_terminal::loader;
use xg_terminal::logging;
use xg_terminal::scene::Point;
use xg_terminal::state::{apply_delta, AppState, BrushGesture, Delta, Screen};
use xg_terminal::ui::{self, UiLayout};

/// Keyboard brush step, in chart pixels.
const BRUSH_STEP: f64 = 20.0;

struct App {
    state: AppState,
    config: Config,
    should_quit: bool,
    tx: mpsc::Sender<Delta>,
    layout: UiLayout,
}

impl App {
    fn new(config: Config, tx: mpsc::Sender<Delta>) -> Self {
        Self {
            state: AppState::new(config.dashboard_options()),
            config,
            should_quit: false,
            tx,
            layout: UiLayout::default(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if let BrushGesture::Keyboard(_) = self.state.gesture {
            if self.on_brush_key(key) {
                return;
            }
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('s') => self.state.cycle_season(true),
            KeyCode::Char('S') => self.state.cycle_season(false),
            KeyCode::Char('m') | KeyCode::Char('M') => self.state.toggle_mode(),
            KeyCode::Char('b') | KeyCode::Char('B') => self.state.start_keyboard_brush(),
            KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Esc => {
                if self.state.help_overlay {
                    self.state.help_overlay = false;
                } else {
                    self.state.clear_brush();
                }
            }
            KeyCode::Char('e') | KeyCode::Char('E') => self.request_export(),
            _ => {}
        }
    }

    /// Keys consumed while the keyboard brush is active.
    fn on_brush_key(&mut self, key: KeyEvent) -> bool {
        let resize = key.modifiers.contains(KeyModifiers::SHIFT);
        let (dx, dy) = match key.code {
            KeyCode::Left => (-BRUSH_STEP, 0.0),
            KeyCode::Right => (BRUSH_STEP, 0.0),
            KeyCode::Up => (0.0, -BRUSH_STEP),
            KeyCode::Down => (0.0, BRUSH_STEP),
            KeyCode::Enter => {
                self.state.commit_keyboard_brush();
                return true;
            }
            KeyCode::Esc => {
                self.state.gesture = BrushGesture::Idle;
                return true;
            }
            _ => return false,
        };
        if resize {
            self.state.resize_brush(dx, dy);
        } else {
            self.state.nudge_brush(dx, dy);
        }
        true
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        let scatter_at = self
            .layout
            .scatter
            .and_then(|area| area.pixel_at(mouse.column, mouse.row));
        let bar_at = self
            .layout
            .bar
            .and_then(|area| area.pixel_at(mouse.column, mouse.row));

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(p) = scatter_at {
                    self.state.begin_drag(p);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(p) = scatter_at {
                    self.state.update_drag(p);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let end = scatter_at.or_else(|| match self.state.gesture {
                    BrushGesture::Dragging { current, .. } => Some(current),
                    _ => None,
                });
                if let Some(p) = end {
                    self.state.end_drag(p);
                }
            }
            MouseEventKind::Moved => self.on_hover(scatter_at, bar_at),
            _ => {}
        }
    }

    fn on_hover(&mut self, scatter_at: Option<Point>, bar_at: Option<Point>) {
        let Some(dashboard) = self.state.dashboard.as_mut() else {
            return;
        };
        match scatter_at {
            Some(p) => dashboard.hover_scatter(p),
            None => dashboard.leave_scatter(),
        }
        match bar_at {
            Some(p) => dashboard.hover_bar(p),
            None => dashboard.leave_bar(),
        }
    }

    fn request_export(&mut self) {
        if self.state.export.active && !self.state.export.done {
            self.state.push_log("[INFO] Export already running");
            return;
        }
        let Some(dashboard) = self.state.dashboard.as_ref() else {
            self.state.push_log("[WARN] Nothing to export yet");
            return;
        };
        let snapshot = ExportSnapshot::capture(dashboard);
        let path = self.config.export_dir.join(snapshot.default_file_name());
        self.state.export = Default::default();
        self.state.export.active = true;
        self.state.export.last_updated = Some(Instant::now());
        self.state
            .push_log(format!("[INFO] Exporting to {}", path.display()));
        loader::spawn_export(path, snapshot, self.tx.clone());
    }
}

fn main() -> io::Result<()> {
    config::load_dotenv();
    let mut config = Config::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();
    config.apply_args(&args);

    if let Err(err) = logging::init_file_logger(&config.log_file) {
        eprintln!("warning: {err:#}");
    }
    log::info!("starting xg_terminal");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    loader::spawn_dataset_loader(config.sources.clone(), tx.clone());

    let mut app = App::new(config, tx);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("terminal loop failed: {err}");
        eprintln!("error: {err}");
    }
    if let Screen::Failed { reason } = &app.state.screen {
        eprintln!("data load failed: {reason}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        app.state.maybe_clear_export(Instant::now());

        let mut layout = UiLayout::default();
        terminal.draw(|f| layout = ui::draw(f, &app.state))?;
        app.layout = layout;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
