use crate::scene::Point;

/// Vertical gap between the pointer and the tooltip box, in chart pixels.
pub const TOOLTIP_Y_OFFSET: f64 = 15.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub title: String,
    pub rows: Vec<(String, String)>,
    pub anchor: Point,
}

impl Tooltip {
    pub fn new(title: impl Into<String>, rows: Vec<(String, String)>, pointer: Point) -> Self {
        Self {
            title: title.into(),
            rows,
            anchor: anchor_for(pointer),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.title.clone()];
        lines.extend(self.rows.iter().map(|(k, v)| format!("{k}: {v}")));
        lines
    }
}

fn anchor_for(pointer: Point) -> Point {
    Point::new(pointer.x, pointer.y + TOOLTIP_Y_OFFSET)
}

/// Owns at most one tooltip for a chart. Every render cycle disposes of the
/// previous tooltip before a new one can be shown.
#[derive(Debug, Clone, Default)]
pub struct TooltipSlot {
    current: Option<Tooltip>,
    cycle: u64,
}

impl TooltipSlot {
    pub fn show(&mut self, tooltip: Tooltip) {
        self.current = Some(tooltip);
    }

    pub fn move_to(&mut self, pointer: Point) {
        if let Some(tooltip) = self.current.as_mut() {
            tooltip.anchor = anchor_for(pointer);
        }
    }

    pub fn shows(&self, title: &str) -> bool {
        self.current.as_ref().is_some_and(|t| t.title == title)
    }

    pub fn hide(&mut self) {
        self.current = None;
    }

    pub fn dispose(&mut self) {
        self.current = None;
        self.cycle += 1;
    }

    pub fn current(&self) -> Option<&Tooltip> {
        self.current.as_ref()
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tooltip_sits_below_pointer() {
        let tip = Tooltip::new(
            "Arsenal",
            vec![("xG".into(), "70.1".into())],
            Point::new(10.0, 20.0),
        );
        assert_eq!(tip.anchor, Point::new(10.0, 35.0));
        assert_eq!(tip.lines(), vec!["Arsenal".to_string(), "xG: 70.1".to_string()]);
    }

    #[test]
    fn dispose_clears_and_advances_cycle() {
        let mut slot = TooltipSlot::default();
        slot.show(Tooltip::new("A", Vec::new(), Point::new(0.0, 0.0)));
        slot.move_to(Point::new(5.0, 5.0));
        assert_eq!(slot.current().unwrap().anchor, Point::new(5.0, 20.0));
        slot.dispose();
        assert!(slot.current().is_none());
        assert_eq!(slot.cycle(), 1);
    }
}
