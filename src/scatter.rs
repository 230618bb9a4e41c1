use std::collections::BTreeSet;

use crate::assets::{CrestAssets, MarkerGlyph};
use crate::dataset::{mean_of, Dataset, TeamRecord};
use crate::metrics::MetricPair;
use crate::scale::LinearScale;
use crate::scene::{format_value, Axis, BrushExtent, Point, Viewport};
use crate::tooltip::Tooltip;

pub const MARKER_SIZE: f64 = 40.0;
const AXIS_TICKS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    Default,
    Dimmed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub squad: String,
    pub x_value: f64,
    pub y_value: f64,
    pub center: Point,
    /// Top-left corner; the marker box is centred on the data point.
    pub origin: Point,
    pub size: f64,
    pub glyph: MarkerGlyph,
    pub style: MarkerStyle,
}

impl Marker {
    fn covers(&self, p: Point) -> bool {
        self.origin.x <= p.x
            && p.x <= self.origin.x + self.size
            && self.origin.y <= p.y
            && p.y <= self.origin.y + self.size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideKind {
    Diagonal,
    SeasonMeanX,
    SeasonMeanY,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuideLabel {
    pub text: String,
    pub at: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Guide {
    pub kind: GuideKind,
    pub from: Point,
    pub to: Point,
    pub label: Option<GuideLabel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterScene {
    pub season: String,
    pub pair: MetricPair,
    pub viewport: Viewport,
    pub x_scale: LinearScale,
    pub y_scale: LinearScale,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub guides: Vec<Guide>,
    pub markers: Vec<Marker>,
    pub brush: Option<BrushExtent>,
}

pub fn build_scene(
    dataset: &Dataset,
    season: &str,
    pair: MetricPair,
    viewport: &Viewport,
    assets: &mut CrestAssets,
) -> ScatterScene {
    // Domains span every season so the axes stay put when the season changes.
    let mut x_max = dataset.team_max(pair.x);
    let mut y_max = dataset.team_max(pair.y);
    if pair.square_axes() {
        let shared = x_max.max(y_max);
        x_max = shared;
        y_max = shared;
    }

    let x_scale = LinearScale::new((0.0, x_max), viewport.x_range());
    let y_scale = LinearScale::new((0.0, y_max), viewport.y_range());

    let season_teams: Vec<&TeamRecord> = dataset.teams_in(season).collect();
    let guides = if pair.square_axes() {
        diagonal_guide(&x_scale, &y_scale)
    } else {
        season_mean_guides(&season_teams, pair, &x_scale, &y_scale)
    };

    let half = MARKER_SIZE / 2.0;
    let markers = season_teams
        .iter()
        .map(|team| {
            let x_value = team.value(pair.x).unwrap_or(0.0);
            let y_value = team.value(pair.y).unwrap_or(0.0);
            let center = Point::new(x_scale.map(x_value), y_scale.map(y_value));
            Marker {
                squad: team.squad.clone(),
                x_value,
                y_value,
                center,
                origin: Point::new(center.x - half, center.y - half),
                size: MARKER_SIZE,
                glyph: assets.glyph(&team.squad),
                style: MarkerStyle::Default,
            }
        })
        .collect();

    ScatterScene {
        season: season.to_string(),
        pair,
        viewport: *viewport,
        x_axis: Axis::linear(pair.x.label(), &x_scale, AXIS_TICKS),
        y_axis: Axis::linear(pair.y.label(), &y_scale, AXIS_TICKS),
        x_scale,
        y_scale,
        guides,
        markers,
        brush: None,
    }
}

fn diagonal_guide(x_scale: &LinearScale, y_scale: &LinearScale) -> Vec<Guide> {
    let to = Point::new(x_scale.map(x_scale.domain().1), y_scale.map(y_scale.domain().1));
    vec![Guide {
        kind: GuideKind::Diagonal,
        from: Point::new(x_scale.map(0.0), y_scale.map(0.0)),
        to,
        label: Some(GuideLabel {
            text: "xG = Goals".to_string(),
            at: Point::new(to.x, to.y + 20.0),
        }),
    }]
}

fn season_mean_guides(
    teams: &[&TeamRecord],
    pair: MetricPair,
    x_scale: &LinearScale,
    y_scale: &LinearScale,
) -> Vec<Guide> {
    let x_mean = mean_of(teams.iter().filter_map(|t| t.value(pair.x)));
    let y_mean = mean_of(teams.iter().filter_map(|t| t.value(pair.y)));
    let (Some(x_mean), Some(y_mean)) = (x_mean, y_mean) else {
        return Vec::new();
    };
    let x_end = x_scale.domain().1;
    let y_end = y_scale.domain().1;

    vec![
        Guide {
            kind: GuideKind::SeasonMeanX,
            from: Point::new(x_scale.map(x_mean), y_scale.map(0.0)),
            to: Point::new(x_scale.map(x_mean), y_scale.map(y_end)),
            label: None,
        },
        Guide {
            kind: GuideKind::SeasonMeanY,
            from: Point::new(x_scale.map(0.0), y_scale.map(y_mean)),
            to: Point::new(x_scale.map(x_end), y_scale.map(y_mean)),
            label: Some(GuideLabel {
                text: "Season Avg.".to_string(),
                at: Point::new(x_scale.map(x_end), y_scale.map(y_mean) - 10.0),
            }),
        },
    ]
}

impl ScatterScene {
    /// Squads whose marker centre lies inside the brush, bounds inclusive.
    pub fn brush_match(&self, extent: Option<&BrushExtent>) -> BTreeSet<String> {
        let Some(extent) = extent else {
            return BTreeSet::new();
        };
        self.markers
            .iter()
            .filter(|m| extent.contains(m.center))
            .map(|m| m.squad.clone())
            .collect()
    }

    /// Restyles markers in place without rebuilding the scene.
    pub fn apply_selection(&mut self, extent: Option<BrushExtent>, selection: &BTreeSet<String>) {
        self.brush = extent;
        for marker in &mut self.markers {
            marker.style = if selection.is_empty() || selection.contains(&marker.squad) {
                MarkerStyle::Default
            } else {
                MarkerStyle::Dimmed
            };
        }
    }

    /// Topmost marker under the pointer; later markers are drawn above earlier ones.
    pub fn marker_at(&self, p: Point) -> Option<&Marker> {
        self.markers.iter().rev().find(|m| m.covers(p))
    }

    pub fn tooltip(&self, marker: &Marker, pointer: Point) -> Tooltip {
        Tooltip::new(
            marker.squad.clone(),
            vec![
                (self.pair.x.label().to_string(), format_value(marker.x_value)),
                (self.pair.y.label().to_string(), format_value(marker.y_value)),
            ],
            pointer,
        )
    }

    pub fn hover(&self, pointer: Point) -> Option<Tooltip> {
        self.marker_at(pointer).map(|m| self.tooltip(m, pointer))
    }
}
