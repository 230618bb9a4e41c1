use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::bar;
use crate::orchestrator::Dashboard;
use crate::scene::format_value;

/// Owned copy of the current view, safe to hand to a writer thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSnapshot {
    pub season: String,
    pub mode: String,
    pub metric: String,
    pub selected: Vec<String>,
    pub rank_limit: usize,
    pub min_minutes: f64,
    pub teams: Vec<Vec<String>>,
    pub players: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub teams: usize,
    pub players: usize,
}

impl ExportSnapshot {
    pub fn capture(dashboard: &Dashboard) -> Self {
        let view = dashboard.view();
        let pair = view.pair();
        let limits = dashboard.limits();
        let selected = view.selected_teams();

        let teams = dashboard
            .dataset()
            .teams_in(view.season())
            .map(|t| {
                vec![
                    t.squad.clone(),
                    format_value(t.xg),
                    format_value(t.xg_against),
                    format_value(t.goals),
                    if selected.contains(&t.squad) { "yes" } else { "" }.to_string(),
                ]
            })
            .collect();

        let players = bar::rank(dashboard.dataset(), view.season(), pair, selected, limits)
            .into_iter()
            .enumerate()
            .map(|(idx, p)| {
                vec![
                    (idx + 1).to_string(),
                    p.player.clone(),
                    p.team.clone(),
                    format_value(p.minutes),
                    format_value(p.value(pair.bar).unwrap_or(0.0)),
                    format_value(p.xg_per90),
                ]
            })
            .collect();

        Self {
            season: view.season().to_string(),
            mode: view.mode().label().to_string(),
            metric: pair.bar.label().to_string(),
            selected: selected.iter().cloned().collect(),
            rank_limit: limits.rank_limit,
            min_minutes: limits.min_minutes,
            teams,
            players,
        }
    }

    pub fn default_file_name(&self) -> String {
        let season: String = self
            .season
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        format!(
            "xg_{season}_{}_{}.xlsx",
            self.mode.to_ascii_lowercase(),
            Local::now().format("%Y%m%d_%H%M%S")
        )
    }
}

pub fn write_workbook(path: &Path, snapshot: &ExportSnapshot) -> Result<ExportReport> {
    let mut workbook = Workbook::new();

    let mut team_rows = vec![vec![
        "Squad".to_string(),
        "xG".to_string(),
        "xG Against".to_string(),
        "Goals".to_string(),
        "Brushed".to_string(),
    ]];
    team_rows.extend(snapshot.teams.iter().cloned());

    let mut player_rows = vec![vec![
        "Rank".to_string(),
        "Player".to_string(),
        "Team".to_string(),
        "Min".to_string(),
        snapshot.metric.clone(),
        "xG per 90".to_string(),
    ]];
    player_rows.extend(snapshot.players.iter().cloned());

    let view_rows = vec![
        vec!["Season".to_string(), snapshot.season.clone()],
        vec!["Mode".to_string(), snapshot.mode.clone()],
        vec!["Ranked by".to_string(), snapshot.metric.clone()],
        vec!["Brushed teams".to_string(), snapshot.selected.join(", ")],
        vec!["Rank limit".to_string(), snapshot.rank_limit.to_string()],
        vec!["Min minutes".to_string(), format_value(snapshot.min_minutes)],
    ];

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Teams")?;
        write_rows(sheet, &team_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("TopPlayers")?;
        write_rows(sheet, &player_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("View")?;
        write_rows(sheet, &view_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportReport {
        path: path.to_path_buf(),
        teams: snapshot.teams.len(),
        players: snapshot.players.len(),
    })
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
