use std::path::PathBuf;

use xg_terminal::assets::CrestAssets;
use xg_terminal::dataset::{DataSource, DataSources, Dataset};
use xg_terminal::metrics::{Metric, MetricMode};
use xg_terminal::orchestrator::{
    Dashboard, DashboardOptions, RenderEvent, RenderPlan, RenderSlot, ScatterAction,
};
use xg_terminal::scatter::{GuideKind, MarkerStyle};
use xg_terminal::scene::{BrushExtent, Point};
use xg_terminal::view_state::{StateChange, ViewError, ViewState};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn dataset() -> Dataset {
    Dataset::load(&DataSources {
        teams: DataSource::File(fixture_path("team_data.csv")),
        players: DataSource::File(fixture_path("player_data.csv")),
    })
    .expect("fixtures should load")
}

fn dashboard() -> Dashboard {
    Dashboard::new(
        dataset(),
        DashboardOptions {
            assets: CrestAssets::new(fixture_path("logos")),
            ..DashboardOptions::default()
        },
    )
}

/// Covers the Arsenal and Chelsea markers of 2021-2022 in expected mode.
fn top_right_brush() -> BrushExtent {
    BrushExtent::from_corners(Point::new(700.0, 340.0), Point::new(810.0, 410.0))
}

fn squads(dashboard: &Dashboard) -> Vec<String> {
    dashboard.view().selected_teams().iter().cloned().collect()
}

#[test]
fn initial_render_builds_both_charts() {
    let dash = dashboard();
    assert_eq!(dash.view().season(), "2021-2022");
    assert_eq!(dash.view().mode(), MetricMode::Expected);
    assert!(dash.view().selected_teams().is_empty());
    assert_eq!(
        dash.last_renders(),
        [RenderEvent::ScatterRebuilt, RenderEvent::BarRebuilt]
    );
    assert_eq!(dash.scatter_scene().map(|s| s.markers.len()), Some(4));
    assert_eq!(dash.bar_scene().map(|s| s.bars.len()), Some(10));
}

#[test]
fn brushing_restyles_scatter_and_rebuilds_bar() {
    let mut dash = dashboard();
    let scatter_gen = dash.scatter_slot().generation();
    let bar_gen = dash.bar_slot().generation();

    dash.brush(Some(top_right_brush())).expect("brush should apply");

    assert_eq!(squads(&dash), vec!["Arsenal", "Chelsea"]);
    assert_eq!(dash.view().brush(), Some(&top_right_brush()));
    assert_eq!(
        dash.last_renders(),
        [RenderEvent::ScatterRestyled, RenderEvent::BarRebuilt]
    );
    assert_eq!(dash.scatter_slot().generation(), scatter_gen);
    assert_eq!(dash.bar_slot().generation(), bar_gen + 1);

    let scatter = dash.scatter_scene().expect("scatter scene");
    let everton = scatter
        .markers
        .iter()
        .find(|m| m.squad == "Everton")
        .expect("Everton marker");
    assert_eq!(everton.style, MarkerStyle::Dimmed);

    let bar = dash.bar_scene().expect("bar scene");
    assert_eq!(bar.filtered_by, vec!["Arsenal", "Chelsea"]);
    assert_eq!(bar.bars.len(), 6);
    assert!(bar.bars.iter().all(|b| b.team == "Arsenal" || b.team == "Chelsea"));
}

#[test]
fn season_change_clears_selection_and_rebuilds() {
    let mut dash = dashboard();
    dash.brush(Some(top_right_brush())).expect("brush should apply");

    dash.select_season("2022-2023").expect("season exists");

    assert_eq!(dash.view().season(), "2022-2023");
    assert!(dash.view().selected_teams().is_empty());
    assert!(dash.view().brush().is_none());
    assert_eq!(
        dash.last_renders(),
        [RenderEvent::ScatterRebuilt, RenderEvent::BarRebuilt]
    );
    let scatter = dash.scatter_scene().expect("scatter scene");
    assert_eq!(scatter.markers.len(), 3);
    assert!(scatter.brush.is_none());
    assert!(scatter.markers.iter().all(|m| m.style == MarkerStyle::Default));
    assert_eq!(dash.bar_scene().map(|s| s.bars.len()), Some(3));
}

#[test]
fn mode_toggle_switches_fields_and_guides() {
    let mut dash = dashboard();
    dash.brush(Some(top_right_brush())).expect("brush should apply");

    dash.toggle_mode();

    assert_eq!(dash.view().mode(), MetricMode::Actual);
    assert!(dash.view().selected_teams().is_empty());
    assert_eq!(
        dash.last_renders(),
        [RenderEvent::ScatterRebuilt, RenderEvent::BarRebuilt]
    );
    let scatter = dash.scatter_scene().expect("scatter scene");
    assert_eq!(scatter.y_axis.label, "Goals");
    assert_eq!(scatter.guides[0].kind, GuideKind::Diagonal);
    let bar = dash.bar_scene().expect("bar scene");
    assert_eq!(bar.metric, Metric::Goals);
    assert_eq!(bar.bars[0].player, "Eli Elm");
}

#[test]
fn unknown_season_is_rejected_without_side_effects() {
    let mut dash = dashboard();
    dash.brush(Some(top_right_brush())).expect("brush should apply");
    let before = dash.view().clone();
    let bar_gen = dash.bar_slot().generation();

    let err = dash.select_season("1999-2000").unwrap_err();

    assert_eq!(err, ViewError::InvalidSeason("1999-2000".to_string()));
    assert_eq!(dash.view(), &before);
    assert_eq!(dash.bar_slot().generation(), bar_gen);
}

#[test]
fn empty_or_missing_brush_clears_selection() {
    let mut dash = dashboard();
    dash.brush(Some(top_right_brush())).expect("brush should apply");

    let flat = BrushExtent::from_corners(Point::new(300.0, 300.0), Point::new(300.0, 500.0));
    dash.brush(Some(flat)).expect("flat brush clears");
    assert!(dash.view().selected_teams().is_empty());
    assert!(dash.view().brush().is_none());

    dash.brush(Some(top_right_brush())).expect("brush should apply");
    dash.clear_brush().expect("clear");
    assert!(dash.view().selected_teams().is_empty());
    assert_eq!(dash.bar_scene().map(|s| s.bars.len()), Some(10));
    assert!(dash
        .scatter_scene()
        .expect("scatter scene")
        .markers
        .iter()
        .all(|m| m.style == MarkerStyle::Default));
}

#[test]
fn brush_over_empty_area_selects_nothing_but_keeps_extent() {
    let mut dash = dashboard();
    let empty = BrushExtent::from_corners(Point::new(160.0, 600.0), Point::new(260.0, 700.0));
    dash.brush(Some(empty)).expect("brush should apply");
    assert!(dash.view().selected_teams().is_empty());
    assert_eq!(dash.view().brush(), Some(&empty));
    assert_eq!(dash.bar_scene().map(|s| s.bars.len()), Some(10));
}

#[test]
fn cycling_seasons_wraps_around() {
    let mut dash = dashboard();
    dash.cycle_season(true).expect("cycle");
    assert_eq!(dash.view().season(), "2022-2023");
    dash.cycle_season(true).expect("cycle");
    assert_eq!(dash.view().season(), "2021-2022");
    dash.cycle_season(false).expect("cycle");
    assert_eq!(dash.view().season(), "2022-2023");
}

#[test]
fn rebuilds_dispose_tooltips() {
    let mut dash = dashboard();
    dash.hover_scatter(Point::new(712.0, 352.0));
    assert_eq!(
        dash.scatter_tooltip().current().map(|t| t.title.as_str()),
        Some("Arsenal")
    );

    let first = dash.bar_scene().expect("bar scene").bars[0].clone();
    dash.hover_bar(Point::new(first.x + 1.0, first.y + 1.0));
    assert!(dash.bar_tooltip().current().is_some());
    let bar_cycle = dash.bar_tooltip().cycle();

    dash.brush(Some(top_right_brush())).expect("brush should apply");
    assert!(dash.bar_tooltip().current().is_none());
    assert_eq!(dash.bar_tooltip().cycle(), bar_cycle + 1);

    let scatter_cycle = dash.scatter_tooltip().cycle();
    dash.select_season("2022-2023").expect("season exists");
    assert!(dash.scatter_tooltip().current().is_none());
    assert_eq!(dash.scatter_tooltip().cycle(), scatter_cycle + 1);

    dash.hover_scatter(Point::new(5.0, 5.0));
    assert!(dash.scatter_tooltip().current().is_none());
}

#[test]
fn hovering_within_a_marker_moves_its_tooltip() {
    let mut dash = dashboard();
    dash.hover_scatter(Point::new(712.0, 352.0));
    dash.hover_scatter(Point::new(700.0, 345.0));
    let tip = dash.scatter_tooltip().current().expect("tooltip stays up");
    assert_eq!(tip.title, "Arsenal");
    assert_eq!(tip.anchor, Point::new(700.0, 360.0));
    assert_eq!(dash.scatter_tooltip().cycle(), 1);

    let first = dash.bar_scene().expect("bar scene").bars[0].clone();
    dash.hover_bar(Point::new(first.x + 1.0, first.y + 1.0));
    dash.hover_bar(Point::new(first.x + 2.0, first.y + 30.0));
    let tip = dash.bar_tooltip().current().expect("tooltip stays up");
    assert_eq!(tip.title, first.player);
    assert_eq!(tip.anchor, Point::new(first.x + 2.0, first.y + 45.0));

    dash.leave_scatter();
    dash.leave_bar();
    assert!(dash.scatter_tooltip().current().is_none());
    assert!(dash.bar_tooltip().current().is_none());
}

#[test]
fn repeated_season_selection_is_idempotent() {
    let mut dash = dashboard();
    let before_scatter = dash.scatter_scene().cloned();
    let before_bar = dash.bar_scene().cloned();
    dash.select_season("2021-2022").expect("season exists");
    assert_eq!(dash.scatter_scene().cloned(), before_scatter);
    assert_eq!(dash.bar_scene().cloned(), before_bar);
}

#[test]
fn stale_render_tickets_cannot_commit() {
    let mut slot: RenderSlot<&str> = RenderSlot::default();
    let older = slot.begin();
    let newer = slot.begin();
    assert!(!slot.commit(older, "stale"));
    assert!(slot.scene().is_none());
    assert!(slot.commit(newer, "fresh"));
    assert_eq!(slot.scene(), Some(&"fresh"));
    assert_eq!(slot.generation(), 2);

    let again = slot.begin();
    assert!(slot.scene().is_none());
    assert!(slot.commit(again, "next"));
}

#[test]
fn render_plan_restyles_only_for_selection() {
    assert_eq!(
        RenderPlan::for_change(StateChange::Season).scatter,
        ScatterAction::Rebuild
    );
    assert_eq!(
        RenderPlan::for_change(StateChange::Mode).scatter,
        ScatterAction::Rebuild
    );
    assert_eq!(
        RenderPlan::for_change(StateChange::Selection).scatter,
        ScatterAction::Restyle
    );
}

#[test]
fn view_state_rejects_inconsistent_selections() {
    let dataset = dataset();
    let mut view = ViewState::initial(&dataset, Some("2022-2023"), MetricMode::Actual);
    assert_eq!(view.season(), "2022-2023");

    let leeds: std::collections::BTreeSet<String> =
        ["Leeds United".to_string()].into_iter().collect();
    let err = view
        .set_brush_selection(&dataset, Some(top_right_brush()), leeds.clone())
        .unwrap_err();
    assert!(matches!(err, ViewError::UnknownSquad { .. }));
    assert!(view.selected_teams().is_empty());
    assert!(view.brush().is_none());

    let err = view.set_brush_selection(&dataset, None, leeds).unwrap_err();
    assert_eq!(err, ViewError::SelectionWithoutBrush);

    let fallback = ViewState::initial(&dataset, Some("1999-2000"), MetricMode::Expected);
    assert_eq!(fallback.season(), "2021-2022");
    assert_eq!(view.set_mode(MetricMode::Expected), StateChange::Mode);
}
