use std::fs;
use std::path::PathBuf;

use xg_terminal::dataset::{
    parse_csv, parse_json, DataLoadError, DataSource, DataSources, Dataset, PlayerRecord,
    TeamRecord,
};
use xg_terminal::metrics::Metric;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture file should be readable")
}

fn fixture_sources() -> DataSources {
    DataSources {
        teams: DataSource::File(fixture_path("team_data.csv")),
        players: DataSource::File(fixture_path("player_data.csv")),
    }
}

#[test]
fn loads_fixture_tables() {
    let dataset = Dataset::load(&fixture_sources()).expect("fixtures should load");
    assert_eq!(dataset.teams().len(), 7);
    assert_eq!(dataset.players().len(), 16);
    assert_eq!(dataset.seasons(), ["2021-2022", "2022-2023"]);

    let arsenal = &dataset.teams()[0];
    assert_eq!(arsenal.squad, "Arsenal");
    assert_eq!(arsenal.xg, 60.0);
    assert_eq!(arsenal.xg_against, 40.0);
    assert_eq!(arsenal.goals, 61.0);

    let ash = &dataset.players()[0];
    assert_eq!(ash.player, "Aaron Ash");
    assert_eq!(ash.minutes, 2000.0);
    assert_eq!(ash.xg_per90, 0.68);
}

#[test]
fn season_queries_and_global_maxima() {
    let dataset = Dataset::load(&fixture_sources()).expect("fixtures should load");
    assert!(dataset.has_season("2022-2023"));
    assert!(!dataset.has_season("2019-2020"));
    assert_eq!(dataset.teams_in("2022-2023").count(), 3);
    assert_eq!(dataset.players_in("2022-2023").count(), 3);
    assert!(dataset.squads_in("2021-2022").contains("Leeds United"));
    assert!(!dataset.squads_in("2021-2022").contains("Fulham"));

    assert_eq!(dataset.team_max(Metric::Xg), 75.0);
    assert_eq!(dataset.team_max(Metric::Goals), 88.0);
    assert_eq!(dataset.team_max(Metric::XgPer90), 0.0);
    assert_eq!(dataset.player_max(Metric::Xg), 22.0);
    assert_eq!(dataset.player_max(Metric::XgPer90), 2.7);
}

#[test]
fn missing_column_is_reported_by_name() {
    let raw = read_fixture("team_missing_column.csv");
    let err = parse_csv::<TeamRecord>(&raw, "team_missing_column.csv").unwrap_err();
    match &err {
        DataLoadError::MissingColumn {
            source_name,
            column,
        } => {
            assert_eq!(source_name, "team_missing_column.csv");
            assert_eq!(*column, "xG Against");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("xG Against"));
}

#[test]
fn missing_file_is_an_io_error() {
    let sources = DataSources {
        teams: DataSource::File(fixture_path("does_not_exist.csv")),
        players: DataSource::File(fixture_path("player_data.csv")),
    };
    let err = Dataset::load(&sources).unwrap_err();
    assert!(matches!(err, DataLoadError::Io { .. }));
    assert!(err.source_name().ends_with("does_not_exist.csv"));
}

#[test]
fn bad_number_is_a_csv_error() {
    let raw = "Season,Player,Team,Min,xG,Goals,xG per 90\n2021-2022,A,B,lots,1,1,0.1\n";
    let err = parse_csv::<PlayerRecord>(raw, "inline").unwrap_err();
    assert!(matches!(err, DataLoadError::Csv { .. }));
}

#[test]
fn json_tables_accept_numeric_strings() {
    let raw = read_fixture("team_data.json");
    let teams = parse_json::<TeamRecord>(&raw, "team_data.json").expect("json should parse");
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0].xg_against, 40.0);
    assert_eq!(teams[1].xg, 70.5);

    let sources = DataSources {
        teams: DataSource::File(fixture_path("team_data.json")),
        players: DataSource::File(fixture_path("player_data.csv")),
    };
    let dataset = Dataset::load(&sources).expect("mixed formats should load");
    assert_eq!(dataset.teams().len(), 2);
}

#[test]
fn json_missing_column_is_reported() {
    let raw = r#"[{"Season": "2021-2022", "Squad": "Arsenal", "xG": 1, "Goals": 2}]"#;
    let err = parse_json::<TeamRecord>(raw, "inline.json").unwrap_err();
    assert!(matches!(
        err,
        DataLoadError::MissingColumn {
            column: "xG Against",
            ..
        }
    ));
}

#[test]
fn data_source_parse_detects_urls() {
    assert_eq!(
        DataSource::parse(" https://example.org/team_data.csv "),
        DataSource::Url("https://example.org/team_data.csv".to_string())
    );
    assert_eq!(
        DataSource::parse("data/team_data.csv"),
        DataSource::File(PathBuf::from("data/team_data.csv"))
    );
}

#[test]
fn empty_tables_load_without_seasons() {
    let teams = parse_csv::<TeamRecord>("Season,Squad,xG,xG Against,Goals\n", "empty").unwrap();
    let dataset = Dataset::new(teams, Vec::new());
    assert!(dataset.seasons().is_empty());
    assert_eq!(dataset.team_max(Metric::Xg), 0.0);
}

#[test]
fn non_finite_numbers_are_rejected() {
    let raw = "Season,Player,Team,Min,xG,Goals,xG per 90\n\
               2021-2022,Good,Arsenal,900,20,5,0.5\n\
               2021-2022,Bad,Arsenal,900,NaN,5,0.5\n";
    let err = parse_csv::<PlayerRecord>(raw, "players.csv").unwrap_err();
    assert!(matches!(err, DataLoadError::Csv { .. }));

    for cell in ["inf", "-infinity", " NaN "] {
        let raw = format!("Season,Squad,xG,xG Against,Goals\n2021-2022,Arsenal,{cell},40,61\n");
        assert!(parse_csv::<TeamRecord>(&raw, "teams.csv").is_err(), "{cell}");
    }

    let json = r#"[{"Season": "2021-2022", "Squad": "Arsenal", "xG": "NaN",
                   "xG Against": 1, "Goals": 2}]"#;
    let err = parse_json::<TeamRecord>(json, "teams.json").unwrap_err();
    assert!(matches!(err, DataLoadError::Json { .. }));
}

#[test]
fn squads_in_lists_season_squads() {
    let dataset = Dataset::load(&fixture_sources()).expect("fixtures should load");
    let season = String::from("2022-2023");
    let squads = dataset.squads_in(&season);
    drop(season);
    assert_eq!(squads.into_iter().collect::<Vec<_>>(), ["Arsenal", "Chelsea", "Fulham"]);
}
