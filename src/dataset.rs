use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::de::{self, DeserializeOwned, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_client;
use crate::metrics::Metric;

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to read {source_name}: {source}")]
    Io {
        source_name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {source_name}: {message}")]
    Http { source_name: String, message: String },
    #[error("malformed csv in {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },
    #[error("malformed json in {source_name}: {source}")]
    Json {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{source_name} is missing required column `{column}`")]
    MissingColumn {
        source_name: String,
        column: &'static str,
    },
}

impl DataLoadError {
    pub fn source_name(&self) -> &str {
        match self {
            DataLoadError::Io { source_name, .. }
            | DataLoadError::Http { source_name, .. }
            | DataLoadError::Csv { source_name, .. }
            | DataLoadError::Json { source_name, .. }
            | DataLoadError::MissingColumn { source_name, .. } => source_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    #[serde(rename = "Season", deserialize_with = "de_text")]
    pub season: String,
    #[serde(rename = "Squad", deserialize_with = "de_text")]
    pub squad: String,
    #[serde(rename = "xG", deserialize_with = "de_number")]
    pub xg: f64,
    #[serde(rename = "xG Against", deserialize_with = "de_number")]
    pub xg_against: f64,
    #[serde(rename = "Goals", deserialize_with = "de_number")]
    pub goals: f64,
}

impl TeamRecord {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Xg => Some(self.xg),
            Metric::XgAgainst => Some(self.xg_against),
            Metric::Goals => Some(self.goals),
            Metric::XgPer90 => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(rename = "Season", deserialize_with = "de_text")]
    pub season: String,
    #[serde(rename = "Player", deserialize_with = "de_text")]
    pub player: String,
    #[serde(rename = "Team", deserialize_with = "de_text")]
    pub team: String,
    #[serde(rename = "Min", deserialize_with = "de_number")]
    pub minutes: f64,
    #[serde(rename = "xG", deserialize_with = "de_number")]
    pub xg: f64,
    #[serde(rename = "Goals", deserialize_with = "de_number")]
    pub goals: f64,
    #[serde(rename = "xG per 90", deserialize_with = "de_number")]
    pub xg_per90: f64,
}

impl PlayerRecord {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Xg => Some(self.xg),
            Metric::Goals => Some(self.goals),
            Metric::XgPer90 => Some(self.xg_per90),
            Metric::XgAgainst => None,
        }
    }
}

pub trait TableRow: DeserializeOwned {
    const COLUMNS: &'static [&'static str];
}

impl TableRow for TeamRecord {
    const COLUMNS: &'static [&'static str] = &["Season", "Squad", "xG", "xG Against", "Goals"];
}

impl TableRow for PlayerRecord {
    const COLUMNS: &'static [&'static str] =
        &["Season", "Player", "Team", "Min", "xG", "Goals", "xG per 90"];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataSource::Url(trimmed.to_string())
        } else {
            DataSource::File(PathBuf::from(trimmed))
        }
    }

    pub fn name(&self) -> String {
        match self {
            DataSource::File(path) => path.display().to_string(),
            DataSource::Url(url) => url.clone(),
        }
    }

    fn is_json(&self) -> bool {
        let name = match self {
            DataSource::File(path) => path.to_string_lossy().to_ascii_lowercase(),
            DataSource::Url(url) => url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase(),
        };
        name.ends_with(".json")
    }

    fn read(&self) -> Result<String, DataLoadError> {
        match self {
            DataSource::File(path) => fs::read_to_string(path).map_err(|source| DataLoadError::Io {
                source_name: self.name(),
                source,
            }),
            DataSource::Url(url) => {
                http_client::fetch_table(url).map_err(|err| DataLoadError::Http {
                    source_name: self.name(),
                    message: format!("{err:#}"),
                })
            }
        }
    }

    pub fn load_rows<T: TableRow>(&self) -> Result<Vec<T>, DataLoadError> {
        let raw = self.read()?;
        if self.is_json() {
            parse_json(&raw, &self.name())
        } else {
            parse_csv(&raw, &self.name())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub teams: DataSource,
    pub players: DataSource,
}

pub fn parse_csv<T: TableRow>(raw: &str, source_name: &str) -> Result<Vec<T>, DataLoadError> {
    let csv_err = |source| DataLoadError::Csv {
        source_name: source_name.to_string(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());
    let headers = reader.headers().map_err(csv_err)?.clone();
    for column in T::COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(DataLoadError::MissingColumn {
                source_name: source_name.to_string(),
                column: *column,
            });
        }
    }
    reader
        .deserialize::<T>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_err)
}

pub fn parse_json<T: TableRow>(raw: &str, source_name: &str) -> Result<Vec<T>, DataLoadError> {
    let json_err = |source| DataLoadError::Json {
        source_name: source_name.to_string(),
        source,
    };
    let rows: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_str(raw).map_err(json_err)?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(column) = T::COLUMNS.iter().find(|c| !row.contains_key(**c)) {
            return Err(DataLoadError::MissingColumn {
                source_name: source_name.to_string(),
                column: *column,
            });
        }
        out.push(serde_json::from_value(serde_json::Value::Object(row)).map_err(json_err)?);
    }
    Ok(out)
}

/// Team and player tables, immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    teams: Vec<TeamRecord>,
    players: Vec<PlayerRecord>,
    seasons: Vec<String>,
}

impl Dataset {
    pub fn new(teams: Vec<TeamRecord>, players: Vec<PlayerRecord>) -> Self {
        let mut seen = BTreeSet::new();
        let seasons = teams
            .iter()
            .filter(|t| seen.insert(t.season.as_str()))
            .map(|t| t.season.clone())
            .collect();
        Self {
            teams,
            players,
            seasons,
        }
    }

    pub fn load(sources: &DataSources) -> Result<Self, DataLoadError> {
        let teams = sources.teams.load_rows::<TeamRecord>()?;
        let players = sources.players.load_rows::<PlayerRecord>()?;
        log::info!(
            "loaded {} team rows from {} and {} player rows from {}",
            teams.len(),
            sources.teams.name(),
            players.len(),
            sources.players.name()
        );
        Ok(Self::new(teams, players))
    }

    pub fn teams(&self) -> &[TeamRecord] {
        &self.teams
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    /// Distinct team seasons in order of first appearance.
    pub fn seasons(&self) -> &[String] {
        &self.seasons
    }

    pub fn has_season(&self, season: &str) -> bool {
        self.seasons.iter().any(|s| s == season)
    }

    pub fn teams_in<'a>(&'a self, season: &'a str) -> impl Iterator<Item = &'a TeamRecord> + 'a {
        self.teams.iter().filter(move |t| t.season == season)
    }

    pub fn players_in<'a>(
        &'a self,
        season: &'a str,
    ) -> impl Iterator<Item = &'a PlayerRecord> + 'a {
        self.players.iter().filter(move |p| p.season == season)
    }

    pub fn squads_in(&self, season: &str) -> BTreeSet<&str> {
        self.teams
            .iter()
            .filter(|t| t.season == season)
            .map(|t| t.squad.as_str())
            .collect()
    }

    /// Maximum over every season; 0 when no row carries the metric.
    pub fn team_max(&self, metric: Metric) -> f64 {
        max_of(self.teams.iter().filter_map(|t| t.value(metric)))
    }

    pub fn player_max(&self, metric: Metric) -> f64 {
        max_of(self.players.iter().filter_map(|p| p.value(metric)))
    }
}

fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    values.filter(|v| v.is_finite()).fold(0.0, f64::max)
}

pub fn mean_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn de_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    struct NumberVisitor;

    impl Visitor<'_> for NumberVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number or numeric string")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            if v.is_finite() {
                Ok(v)
            } else {
                Err(E::invalid_value(Unexpected::Float(v), &self))
            }
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            v.trim()
                .replace(',', "")
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    deserializer.deserialize_any(NumberVisitor)
}

fn de_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    struct TextVisitor;

    impl Visitor<'_> for TextVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string or number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.trim().to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(TextVisitor)
}
