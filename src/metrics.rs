use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Xg,
    XgAgainst,
    Goals,
    XgPer90,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Metric::Xg => "xG",
            Metric::XgAgainst => "xG Against",
            Metric::Goals => "Goals",
            Metric::XgPer90 => "xG per 90",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricMode {
    Expected,
    Actual,
}

impl MetricMode {
    pub fn toggle(self) -> Self {
        match self {
            MetricMode::Expected => MetricMode::Actual,
            MetricMode::Actual => MetricMode::Expected,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "expected" | "xg" => Some(MetricMode::Expected),
            "actual" | "goals" => Some(MetricMode::Actual),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MetricMode::Expected => "EXPECTED",
            MetricMode::Actual => "ACTUAL",
        }
    }
}

/// Fields read by the scatter plot (`x`, `y`) and the bar chart (`bar`, `color`)
/// for one metric mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricPair {
    pub x: Metric,
    pub y: Metric,
    pub bar: Metric,
    pub color: Metric,
}

impl MetricPair {
    /// Goals on the y axis are compared against xG on one shared square domain.
    pub fn square_axes(&self) -> bool {
        self.y == Metric::Goals
    }
}

pub fn resolve(mode: MetricMode) -> MetricPair {
    match mode {
        // Player tables carry no xG-against column, so the bar ranks by xG.
        MetricMode::Expected => MetricPair {
            x: Metric::Xg,
            y: Metric::XgAgainst,
            bar: Metric::Xg,
            color: Metric::XgPer90,
        },
        MetricMode::Actual => MetricPair {
            x: Metric::Xg,
            y: Metric::Goals,
            bar: Metric::Goals,
            color: Metric::XgPer90,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_is_total_and_keeps_color_metric() {
        for mode in [MetricMode::Expected, MetricMode::Actual] {
            let pair = resolve(mode);
            assert_eq!(pair.x, Metric::Xg);
            assert_eq!(pair.color, Metric::XgPer90);
        }
    }

    #[test]
    fn actual_mode_aligns_bar_with_scatter_y() {
        let pair = resolve(MetricMode::Actual);
        assert_eq!(pair.y, Metric::Goals);
        assert_eq!(pair.bar, pair.y);
        assert!(pair.square_axes());
        assert!(!resolve(MetricMode::Expected).square_axes());
    }

    #[test]
    fn parse_accepts_control_values() {
        assert_eq!(MetricMode::parse("expected"), Some(MetricMode::Expected));
        assert_eq!(MetricMode::parse(" Actual "), Some(MetricMode::Actual));
        assert_eq!(MetricMode::parse("both"), None);
        assert_eq!(MetricMode::Expected.toggle(), MetricMode::Actual);
    }
}
