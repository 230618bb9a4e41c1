use std::collections::BTreeSet;

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use xg_terminal::assets::CrestAssets;
use xg_terminal::bar::{self, RankLimits};
use xg_terminal::dataset::{Dataset, PlayerRecord, TeamRecord, parse_csv};
use xg_terminal::metrics::{MetricMode, resolve};
use xg_terminal::orchestrator::{Dashboard, DashboardOptions};
use xg_terminal::scatter;
use xg_terminal::scene::{BrushExtent, Point, Viewport};

const SEASONS: usize = 6;
const SQUADS: usize = 20;
const PLAYERS_PER_SQUAD: usize = 30;

fn synthetic_dataset() -> Dataset {
    let mut teams = Vec::new();
    let mut players = Vec::new();
    for s in 0..SEASONS {
        let season = format!("{}-{}", 2015 + s, 2016 + s);
        for t in 0..SQUADS {
            let squad = format!("Squad {t}");
            let spread = (t * 7 + s * 3) % 40;
            teams.push(TeamRecord {
                season: season.clone(),
                squad: squad.clone(),
                xg: 35.0 + spread as f64,
                xg_against: 75.0 - spread as f64,
                goals: 30.0 + ((t * 11 + s) % 50) as f64,
            });
            for p in 0..PLAYERS_PER_SQUAD {
                let minutes = ((p * 131 + t * 17 + s) % 3400) as f64;
                let xg = ((p * 37 + t * 5) % 250) as f64 / 10.0;
                players.push(PlayerRecord {
                    season: season.clone(),
                    player: format!("Player {t}-{p}"),
                    team: squad.clone(),
                    minutes,
                    xg,
                    goals: (xg * 1.1).round(),
                    xg_per90: if minutes > 0.0 { xg * 90.0 / minutes } else { 0.0 },
                });
            }
        }
    }
    Dataset::new(teams, players)
}

fn bench_csv_parse(c: &mut Criterion) {
    let mut raw = String::from("Season,Player,Team,Min,xG,Goals,xG per 90\n");
    for i in 0..2000 {
        raw.push_str(&format!(
            "2022-2023,Player {i},Squad {},{},{:.2},{},{:.2}\n",
            i % 20,
            (i * 97) % 3420,
            (i % 250) as f64 / 10.0,
            i % 25,
            (i % 90) as f64 / 100.0
        ));
    }
    c.bench_function("player_csv_parse", |b| {
        b.iter(|| {
            let rows = parse_csv::<PlayerRecord>(black_box(&raw), "bench").unwrap();
            black_box(rows.len());
        })
    });
}

fn bench_rank(c: &mut Criterion) {
    let dataset = synthetic_dataset();
    let pair = resolve(MetricMode::Expected);
    let selection: BTreeSet<String> = ["Squad 3", "Squad 7", "Squad 11"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    c.bench_function("rank_top_players", |b| {
        b.iter(|| {
            let limits = RankLimits::default();
            let all = bar::rank(&dataset, "2019-2020", pair, &BTreeSet::new(), limits);
            let filtered = bar::rank(&dataset, "2019-2020", pair, &selection, limits);
            black_box((all.len(), filtered.len()));
        })
    });
}

fn bench_scene_builds(c: &mut Criterion) {
    let dataset = synthetic_dataset();
    let viewport = Viewport::default();
    let mut assets = CrestAssets::new("benches/no-crests");
    c.bench_function("scatter_scene_build", |b| {
        b.iter(|| {
            let scene = scatter::build_scene(
                &dataset,
                black_box("2019-2020"),
                resolve(MetricMode::Actual),
                &viewport,
                &mut assets,
            );
            black_box(scene.markers.len());
        })
    });
    c.bench_function("bar_scene_build", |b| {
        b.iter(|| {
            let scene = bar::build_scene(
                &dataset,
                black_box("2019-2020"),
                resolve(MetricMode::Expected),
                &BTreeSet::new(),
                RankLimits::default(),
                &viewport,
            );
            black_box(scene.bars.len());
        })
    });
}

fn bench_brush_cycle(c: &mut Criterion) {
    let mut dashboard = Dashboard::new(
        synthetic_dataset(),
        DashboardOptions {
            assets: CrestAssets::new("benches/no-crests"),
            ..DashboardOptions::default()
        },
    );
    let brush = BrushExtent::from_corners(Point::new(300.0, 200.0), Point::new(700.0, 600.0));
    c.bench_function("brush_then_clear", |b| {
        b.iter(|| {
            dashboard.brush(black_box(Some(brush))).unwrap();
            dashboard.clear_brush().unwrap();
            black_box(dashboard.last_renders().len());
        })
    });
}

criterion_group!(
    benches,
    bench_csv_parse,
    bench_rank,
    bench_scene_builds,
    bench_brush_cycle
);
criterion_main!(benches);
