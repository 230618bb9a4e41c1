use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use xg_terminal::config::arg_value;
use xg_terminal::dataset::{PlayerRecord, TeamRecord};

const SEASONS: &[&str] = &["2020-2021", "2021-2022", "2022-2023"];
const SQUADS: &[&str] = &[
    "Arsenal",
    "Aston Villa",
    "Brentford",
    "Brighton",
    "Chelsea",
    "Crystal Palace",
    "Everton",
    "Fulham",
    "Leeds United",
    "Leicester City",
    "Liverpool",
    "Manchester City",
    "Manchester Utd",
    "Newcastle Utd",
    "Southampton",
    "Tottenham",
    "West Ham",
    "Wolves",
];
const PLAYERS_PER_SQUAD: usize = 14;

fn main() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let out_dir = arg_value(&args, "out")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    let seed = arg_value(&args, "seed")
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(7);
    let mut rng = StdRng::seed_from_u64(seed);

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("create {}", out_dir.display()))?;

    let mut teams = Vec::new();
    let mut players = Vec::new();
    for season in SEASONS {
        for squad in SQUADS {
            let strength: f64 = rng.gen_range(0.6..1.6);
            let xg = round2(strength * rng.gen_range(38.0..52.0));
            let xg_against = round2(rng.gen_range(30.0..70.0) / strength);
            let goals = (xg + rng.gen_range(-12.0..12.0)).max(15.0).round();
            teams.push(TeamRecord {
                season: season.to_string(),
                squad: squad.to_string(),
                xg,
                xg_against,
                goals,
            });

            for n in 0..PLAYERS_PER_SQUAD {
                let minutes: f64 = rng.gen_range(0.0..3420.0_f64).round();
                let share: f64 = rng.gen_range(0.0..0.35) / (1.0 + n as f64 * 0.2);
                let player_xg = round2(xg * share * minutes / 3420.0);
                let player_goals = (player_xg + rng.gen_range(-3.0..3.0)).max(0.0).round();
                let per90 = if minutes > 0.0 {
                    round2(player_xg * 90.0 / minutes)
                } else {
                    0.0
                };
                players.push(PlayerRecord {
                    season: season.to_string(),
                    player: format!("{} Player {}", tag(squad), n + 1),
                    team: squad.to_string(),
                    minutes,
                    xg: player_xg,
                    goals: player_goals,
                    xg_per90: per90,
                });
            }
        }
    }

    let team_path = out_dir.join("team_data.csv");
    let player_path = out_dir.join("player_data.csv");
    write_csv(&team_path, &teams)?;
    write_csv(&player_path, &players)?;

    println!("Sample data written (seed {seed})");
    println!("Teams: {} rows -> {}", teams.len(), team_path.display());
    println!("Players: {} rows -> {}", players.len(), player_path.display());
    Ok(())
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("open {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("write row to {}", path.display()))?;
    }
    writer.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn tag(squad: &str) -> String {
    squad.split_whitespace().next().unwrap_or(squad).to_string()
}
