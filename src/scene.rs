//! Declarative chart scenes. Components build these from data; the terminal
//! reconciler in `ui` draws them. Coordinates are chart pixels with the origin
//! at the top-left corner, y growing downwards.

use crate::scale::LinearScale;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 1000.0,
            margin: Margin {
                top: 50.0,
                right: 50.0,
                bottom: 250.0,
                left: 150.0,
            },
        }
    }
}

impl Viewport {
    pub fn x_range(&self) -> (f64, f64) {
        (self.margin.left, self.width - self.margin.right)
    }

    /// Inverted so that larger values sit higher on screen.
    pub fn y_range(&self) -> (f64, f64) {
        (self.height - self.margin.bottom, self.margin.top)
    }

    pub fn baseline(&self) -> f64 {
        self.height - self.margin.bottom
    }
}

/// Rectangular brush selection in chart pixels, normalised so `x0 <= x1` and
/// `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushExtent {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BrushExtent {
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x0: a.x.min(b.x),
            y0: a.y.min(b.y),
            x1: a.x.max(b.x),
            y1: a.y.max(b.y),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        self.x0 <= p.x && p.x <= self.x1 && self.y0 <= p.y && p.y <= self.y1
    }

    pub fn is_empty(&self) -> bool {
        self.x1 - self.x0 <= 0.0 || self.y1 - self.y0 <= 0.0
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Moves the brush, keeping it inside the viewport.
    pub fn translated(&self, dx: f64, dy: f64, viewport: &Viewport) -> Self {
        let dx = dx.clamp(-self.x0, viewport.width - self.x1);
        let dy = dy.clamp(-self.y0, viewport.height - self.y1);
        Self {
            x0: self.x0 + dx,
            y0: self.y0 + dy,
            x1: self.x1 + dx,
            y1: self.y1 + dy,
        }
    }

    /// Grows or shrinks the bottom-right corner; never inverts the brush.
    pub fn resized(&self, dw: f64, dh: f64, viewport: &Viewport) -> Self {
        Self {
            x0: self.x0,
            y0: self.y0,
            x1: (self.x1 + dw).clamp(self.x0, viewport.width),
            y1: (self.y1 + dh).clamp(self.y0, viewport.height),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub label: String,
    pub domain: (f64, f64),
    pub ticks: Vec<Tick>,
}

impl Axis {
    pub fn linear(label: &str, scale: &LinearScale, tick_count: usize) -> Self {
        let ticks = scale
            .ticks(tick_count)
            .into_iter()
            .map(|value| Tick {
                value,
                position: scale.map(value),
                label: format_value(value),
            })
            .collect();
        Self {
            label: label.to_string(),
            domain: scale.domain(),
            ticks,
        }
    }
}

/// Up to two decimals with trailing zeros dropped (`1.50` -> `1.5`, `3.00` -> `3`).
pub fn format_value(value: f64) -> String {
    let raw = format!("{value:.2}");
    let trimmed = raw.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
