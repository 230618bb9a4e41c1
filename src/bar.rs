use std::collections::BTreeSet;

use crate::dataset::{Dataset, PlayerRecord};
use crate::metrics::{Metric, MetricPair};
use crate::scale::{BandScale, ColorScale, LinearScale, Rgb};
use crate::scene::{format_value, Axis, Point, Viewport};
use crate::tooltip::Tooltip;

const BAND_PADDING: f64 = 0.1;
const AXIS_TICKS: usize = 8;
const LEGEND_CELLS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankLimits {
    pub rank_limit: usize,
    /// Players must have played strictly more than this many minutes.
    pub min_minutes: f64,
}

impl Default for RankLimits {
    fn default() -> Self {
        Self {
            rank_limit: 10,
            min_minutes: 180.0,
        }
    }
}

/// Top players of a season by the bar metric. A non-empty `selection`
/// restricts the pool to those squads. Ties keep input order.
pub fn rank<'a>(
    dataset: &'a Dataset,
    season: &str,
    pair: MetricPair,
    selection: &BTreeSet<String>,
    limits: RankLimits,
) -> Vec<&'a PlayerRecord> {
    let mut pool: Vec<&PlayerRecord> = dataset
        .players()
        .iter()
        .filter(|p| p.minutes > limits.min_minutes)
        .filter(|p| p.season == season)
        .filter(|p| selection.is_empty() || selection.contains(&p.team))
        .collect();
    let metric = pair.bar;
    pool.sort_by(|a, b| {
        let a = a.value(metric).unwrap_or(f64::NEG_INFINITY);
        let b = b.value(metric).unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });
    pool.truncate(limits.rank_limit);
    pool
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarItem {
    pub player: String,
    pub team: String,
    pub value: f64,
    pub per90: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Rgb,
}

impl BarItem {
    fn covers(&self, p: Point) -> bool {
        self.x <= p.x && p.x <= self.x + self.width && self.y <= p.y && p.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendSwatch {
    pub value: f64,
    pub label: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub title: String,
    pub swatches: Vec<LegendSwatch>,
}

impl Legend {
    /// Horizontal legend with evenly spaced cells over the color domain.
    pub fn for_scale(title: &str, scale: &ColorScale) -> Self {
        let (d0, d1) = scale.domain();
        let swatches = (0..LEGEND_CELLS)
            .map(|i| {
                let value = d0 + (d1 - d0) * i as f64 / (LEGEND_CELLS - 1) as f64;
                LegendSwatch {
                    value,
                    label: format!("{value:.2}"),
                    color: scale.map(value),
                }
            })
            .collect();
        Self {
            title: title.to_string(),
            swatches,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarScene {
    pub season: String,
    pub metric: Metric,
    pub color_metric: Metric,
    pub viewport: Viewport,
    pub x_scale: BandScale,
    pub y_scale: LinearScale,
    pub color_scale: ColorScale,
    pub y_axis: Axis,
    pub bars: Vec<BarItem>,
    pub legend: Legend,
    /// Squads the ranking was restricted to; empty means the whole season.
    pub filtered_by: Vec<String>,
}

pub fn build_scene(
    dataset: &Dataset,
    season: &str,
    pair: MetricPair,
    selection: &BTreeSet<String>,
    limits: RankLimits,
    viewport: &Viewport,
) -> BarScene {
    let ranked = rank(dataset, season, pair, selection, limits);

    // Fresh categorical domain every render.
    let x_scale = BandScale::new(
        ranked.iter().map(|p| p.player.clone()).collect(),
        viewport.x_range(),
        BAND_PADDING,
    );
    // Global maxima keep bar heights comparable across re-renders.
    let y_scale = LinearScale::new((0.0, dataset.player_max(pair.bar)), viewport.y_range());
    let color_scale = ColorScale::blues(dataset.player_max(pair.color));

    let baseline = viewport.baseline();
    let bars = ranked
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            let value = p.value(pair.bar).unwrap_or(0.0);
            let per90 = p.value(pair.color).unwrap_or(0.0);
            let y = y_scale.map(value);
            // Positional bands so two players sharing a name never overlap.
            let x = x_scale.band_at(idx);
            BarItem {
                player: p.player.clone(),
                team: p.team.clone(),
                value,
                per90,
                x,
                y,
                width: x_scale.bandwidth(),
                height: (baseline - y).max(0.0),
                fill: color_scale.map(per90),
            }
        })
        .collect();

    BarScene {
        season: season.to_string(),
        metric: pair.bar,
        color_metric: pair.color,
        viewport: *viewport,
        y_axis: Axis::linear(pair.bar.label(), &y_scale, AXIS_TICKS),
        legend: Legend::for_scale(pair.color.label(), &color_scale),
        x_scale,
        y_scale,
        color_scale,
        bars,
        filtered_by: selection.iter().cloned().collect(),
    }
}

impl BarScene {
    pub fn bar_at(&self, p: Point) -> Option<&BarItem> {
        self.bars.iter().find(|b| b.covers(p))
    }

    pub fn tooltip(&self, bar: &BarItem, pointer: Point) -> Tooltip {
        Tooltip::new(
            bar.player.clone(),
            vec![
                ("Team".to_string(), bar.team.clone()),
                (self.metric.label().to_string(), format_value(bar.value)),
                ("xG/90".to_string(), format_value(bar.per90)),
            ],
            pointer,
        )
    }

    pub fn hover(&self, pointer: Point) -> Option<Tooltip> {
        self.bar_at(pointer).map(|b| self.tooltip(b, pointer))
    }
}
