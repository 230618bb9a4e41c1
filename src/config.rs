use std::path::PathBuf;

use crate::assets::CrestAssets;
use crate::bar::RankLimits;
use crate::dataset::{DataSource, DataSources};
use crate::metrics::MetricMode;
use crate::orchestrator::DashboardOptions;

const DEFAULT_TEAM_DATA: &str = "data/team_data.csv";
const DEFAULT_PLAYER_DATA: &str = "data/player_data.csv";
const DEFAULT_LOGO_DIR: &str = "data/logos";
const DEFAULT_LOG_FILE: &str = "xg_terminal.log";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub sources: DataSources,
    pub logo_dir: PathBuf,
    pub default_season: Option<String>,
    pub default_mode: MetricMode,
    pub limits: RankLimits,
    pub export_dir: PathBuf,
    pub log_file: PathBuf,
}

/// Loads `.env.local` then `.env`; values already in the environment win.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let rank_limit = text("XG_RANK_LIMIT")
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(10)
            .clamp(1, 30);
        let min_minutes = text("XG_MIN_MINUTES")
            .and_then(|val| val.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(180.0)
            .max(0.0);

        Self {
            sources: DataSources {
                teams: DataSource::parse(
                    &text("XG_TEAM_DATA").unwrap_or_else(|| DEFAULT_TEAM_DATA.to_string()),
                ),
                players: DataSource::parse(
                    &text("XG_PLAYER_DATA").unwrap_or_else(|| DEFAULT_PLAYER_DATA.to_string()),
                ),
            },
            logo_dir: PathBuf::from(
                text("XG_LOGO_DIR").unwrap_or_else(|| DEFAULT_LOGO_DIR.to_string()),
            ),
            default_season: text("XG_DEFAULT_SEASON"),
            default_mode: text("XG_DEFAULT_MODE")
                .and_then(|val| MetricMode::parse(&val))
                .unwrap_or(MetricMode::Expected),
            limits: RankLimits {
                rank_limit,
                min_minutes,
            },
            export_dir: PathBuf::from(text("XG_EXPORT_DIR").unwrap_or_else(|| ".".to_string())),
            log_file: PathBuf::from(
                text("XG_LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            ),
        }
    }

    /// `--teams=<path>` / `--teams <path>`, same for `--players`, `--season`
    /// and `--mode`.
    pub fn apply_args(&mut self, args: &[String]) {
        if let Some(val) = arg_value(args, "teams") {
            self.sources.teams = DataSource::parse(&val);
        }
        if let Some(val) = arg_value(args, "players") {
            self.sources.players = DataSource::parse(&val);
        }
        if let Some(val) = arg_value(args, "season") {
            self.default_season = Some(val);
        }
        if let Some(mode) = arg_value(args, "mode").and_then(|val| MetricMode::parse(&val)) {
            self.default_mode = mode;
        }
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            default_season: self.default_season.clone(),
            default_mode: self.default_mode,
            limits: self.limits,
            assets: CrestAssets::new(self.logo_dir.clone()),
            ..DashboardOptions::default()
        }
    }
}

pub fn arg_value(args: &[String], name: &str) -> Option<String> {
    let long = format!("--{name}");
    let prefix = format!("--{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(val) = arg.strip_prefix(&prefix) {
            let trimmed = val.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if *arg == long {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() && !next.starts_with("--") {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
