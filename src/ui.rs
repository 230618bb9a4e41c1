//! Terminal reconciler: draws dashboard scenes with ratatui.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as CanvasLine, Rectangle};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::assets::{squad_tag, MarkerGlyph};
use crate::bar::BarScene;
use crate::orchestrator::Dashboard;
use crate::scale::Rgb;
use crate::scatter::{MarkerStyle, ScatterScene};
use crate::scene::{BrushExtent, Point, Viewport};
use crate::state::{mode_label, AppState, Screen};
use crate::tooltip::Tooltip;

/// Screen region of a chart's drawing surface, used to map terminal cells to
/// chart pixels and back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartArea {
    pub inner: Rect,
    pub viewport: Viewport,
}

impl ChartArea {
    /// Chart pixel at the centre of a terminal cell, if the cell is inside.
    pub fn pixel_at(&self, column: u16, row: u16) -> Option<Point> {
        let r = self.inner;
        if r.width == 0 || r.height == 0 {
            return None;
        }
        if column < r.x || column >= r.x + r.width || row < r.y || row >= r.y + r.height {
            return None;
        }
        let fx = (f64::from(column - r.x) + 0.5) / f64::from(r.width);
        let fy = (f64::from(row - r.y) + 0.5) / f64::from(r.height);
        Some(Point::new(fx * self.viewport.width, fy * self.viewport.height))
    }

    /// Terminal cell containing a chart pixel, clamped to the chart.
    pub fn cell_at(&self, p: Point) -> (u16, u16) {
        let r = self.inner;
        let fx = (p.x / self.viewport.width).clamp(0.0, 1.0);
        let fy = (p.y / self.viewport.height).clamp(0.0, 1.0);
        let col = r.x + ((fx * f64::from(r.width)) as u16).min(r.width.saturating_sub(1));
        let row = r.y + ((fy * f64::from(r.height)) as u16).min(r.height.saturating_sub(1));
        (col, row)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UiLayout {
    pub scatter: Option<ChartArea>,
    pub bar: Option<ChartArea>,
}

pub fn draw(frame: &mut Frame, state: &AppState) -> UiLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let layout = match (&state.screen, state.dashboard.as_ref()) {
        (Screen::Dashboard, Some(dashboard)) => draw_dashboard(frame, chunks[1], state, dashboard),
        (Screen::Failed { reason }, _) => {
            draw_failed(frame, chunks[1], reason);
            UiLayout::default()
        }
        _ => {
            let loading = Paragraph::new("Loading team and player tables...")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(loading, chunks[1]);
            UiLayout::default()
        }
    };

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if let Some(dashboard) = state.dashboard.as_ref() {
        if let (Some(area), Some(tip)) = (layout.scatter, dashboard.scatter_tooltip().current()) {
            draw_tooltip(frame, area, tip);
        }
        if let (Some(area), Some(tip)) = (layout.bar, dashboard.bar_tooltip().current()) {
            draw_tooltip(frame, area, tip);
        }
    }

    if state.help_overlay {
        let area = frame.size();
        draw_help_overlay(frame, area);
    }

    layout
}

fn header_text(state: &AppState) -> String {
    let title = match state.dashboard.as_ref() {
        Some(dashboard) => {
            let view = dashboard.view();
            let brushed = view.selected_teams().len();
            let brush = if brushed == 0 {
                "none".to_string()
            } else {
                format!("{brushed} teams")
            };
            format!(
                "xG TERMINAL | Season: {} | Mode: {} | Brush: {}",
                view.season(),
                mode_label(view.mode()),
                brush
            )
        }
        None => "xG TERMINAL".to_string(),
    };
    let export = if state.export.active {
        let status = if !state.export.done {
            "exporting...".to_string()
        } else {
            state.export.message.clone()
        };
        format!("  Export: {status}")
    } else {
        String::new()
    };
    format!("{title}\n{export}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Dashboard => {
            [
                "s/S Season",
                "m Mode",
                "drag Brush",
                "b Key brush (arrows move, shift resize, Enter)",
                "c/Esc Clear",
                "e Export",
                "? Help",
                "q Quit",
            ]
            .join(" | ")
        }
        _ => "? Help | q Quit".to_string(),
    }
}

fn console_text(state: &AppState) -> String {
    if state.console.is_empty() {
        return "No messages yet".to_string();
    }
    state.console.tail(3).join("\n")
}

fn draw_failed(frame: &mut Frame, area: Rect, reason: &str) {
    let text = format!(
        "The dashboard could not start because its data failed to load.\n\n{reason}\n\n\
         Fix the data source (XG_TEAM_DATA / XG_PLAYER_DATA) and restart. Press q to quit."
    );
    let panel = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Red))
        .block(Block::default().title("Data load failed").borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn draw_dashboard(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    dashboard: &Dashboard,
) -> UiLayout {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(60),
            Constraint::Length(4),
            Constraint::Min(3),
        ])
        .split(columns[1]);

    let mut layout = UiLayout::default();

    if let Some(scene) = dashboard.scatter_scene() {
        let preview = state.gesture.preview();
        layout.scatter = Some(draw_scatter(frame, columns[0], scene, preview));
    }

    if let Some(scene) = dashboard.bar_scene() {
        layout.bar = Some(draw_bar(frame, right[0], scene));
        draw_legend(frame, right[1], scene);
        draw_ranking(frame, right[2], scene);
    }

    layout
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Chart pixels have y growing downwards; the canvas grows upwards.
fn flip(viewport: &Viewport, y: f64) -> f64 {
    viewport.height - y
}

fn draw_brush(ctx: &mut Context, viewport: &Viewport, extent: &BrushExtent, stroke: Color) {
    ctx.draw(&Rectangle {
        x: extent.x0,
        y: flip(viewport, extent.y1),
        width: extent.width(),
        height: extent.height(),
        color: stroke,
    });
}

fn draw_axes(ctx: &mut Context, viewport: &Viewport) {
    let (x0, x1) = viewport.x_range();
    let (y_bottom, y_top) = viewport.y_range();
    ctx.draw(&CanvasLine {
        x1: x0,
        y1: flip(viewport, y_bottom),
        x2: x1,
        y2: flip(viewport, y_bottom),
        color: Color::Gray,
    });
    ctx.draw(&CanvasLine {
        x1: x0,
        y1: flip(viewport, y_bottom),
        x2: x0,
        y2: flip(viewport, y_top),
        color: Color::Gray,
    });
}

fn draw_scatter(
    frame: &mut Frame,
    area: Rect,
    scene: &ScatterScene,
    preview: Option<BrushExtent>,
) -> ChartArea {
    let block = Block::default()
        .title(format!(
            "Teams {} | {} vs {}",
            scene.season,
            scene.x_axis.label,
            scene.y_axis.label
        ))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    let viewport = scene.viewport;

    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, viewport.width])
        .y_bounds([0.0, viewport.height])
        .paint(move |ctx| {
            draw_axes(ctx, &viewport);
            let baseline = viewport.baseline();
            for tick in &scene.x_axis.ticks {
                ctx.print(
                    tick.position,
                    flip(&viewport, baseline + 40.0),
                    Span::styled(tick.label.clone(), Style::default().fg(Color::Gray)),
                );
            }
            for tick in &scene.y_axis.ticks {
                ctx.print(
                    viewport.margin.left - 100.0,
                    flip(&viewport, tick.position),
                    Span::styled(tick.label.clone(), Style::default().fg(Color::Gray)),
                );
            }
            let (x0, x1) = viewport.x_range();
            ctx.print(
                (x0 + x1) / 2.0,
                flip(&viewport, baseline + 110.0),
                Span::styled(scene.x_axis.label.clone(), Style::default().fg(Color::White)),
            );
            ctx.print(
                10.0,
                flip(&viewport, viewport.margin.top / 2.0),
                Span::styled(scene.y_axis.label.clone(), Style::default().fg(Color::White)),
            );

            for guide in &scene.guides {
                ctx.draw(&CanvasLine {
                    x1: guide.from.x,
                    y1: flip(&viewport, guide.from.y),
                    x2: guide.to.x,
                    y2: flip(&viewport, guide.to.y),
                    color: Color::DarkGray,
                });
                if let Some(label) = &guide.label {
                    ctx.print(
                        label.at.x - 120.0,
                        flip(&viewport, label.at.y),
                        Span::styled(label.text.clone(), Style::default().fg(Color::DarkGray)),
                    );
                }
            }

            ctx.layer();
            for marker in &scene.markers {
                let style = match marker.style {
                    MarkerStyle::Default => Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                    MarkerStyle::Dimmed => Style::default().fg(Color::DarkGray),
                };
                match &marker.glyph {
                    MarkerGlyph::Crest(_) => ctx.print(
                        marker.origin.x,
                        flip(&viewport, marker.center.y),
                        Span::styled(squad_tag(&marker.squad), style),
                    ),
                    MarkerGlyph::Fallback => ctx.draw(&Circle {
                        x: marker.center.x,
                        y: flip(&viewport, marker.center.y),
                        radius: marker.size / 4.0,
                        color: style.fg.unwrap_or(Color::Cyan),
                    }),
                }
            }

            if let Some(extent) = &scene.brush {
                draw_brush(ctx, &viewport, extent, Color::Yellow);
            }
            if let Some(extent) = &preview {
                draw_brush(ctx, &viewport, extent, Color::LightYellow);
            }
        });
    frame.render_widget(canvas, area);

    ChartArea { inner, viewport }
}

fn draw_bar(frame: &mut Frame, area: Rect, scene: &BarScene) -> ChartArea {
    let filter = if scene.filtered_by.is_empty() {
        "all teams".to_string()
    } else {
        scene.filtered_by.join(", ")
    };
    let block = Block::default()
        .title(format!("Top players by {} | {}", scene.metric.label(), filter))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    let viewport = scene.viewport;
    // One braille dot column per fill stroke.
    let stroke = viewport.width / (f64::from(inner.width.max(1)) * 2.0);

    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, viewport.width])
        .y_bounds([0.0, viewport.height])
        .paint(move |ctx| {
            draw_axes(ctx, &viewport);
            for tick in &scene.y_axis.ticks {
                ctx.print(
                    viewport.margin.left - 100.0,
                    flip(&viewport, tick.position),
                    Span::styled(tick.label.clone(), Style::default().fg(Color::Gray)),
                );
            }
            let baseline = viewport.baseline();
            for bar in &scene.bars {
                let mut x = bar.x;
                while x <= bar.x + bar.width {
                    ctx.draw(&CanvasLine {
                        x1: x,
                        y1: flip(&viewport, baseline),
                        x2: x,
                        y2: flip(&viewport, bar.y),
                        color: color(bar.fill),
                    });
                    x += stroke;
                }
            }
            ctx.layer();
            for (idx, bar) in scene.bars.iter().enumerate() {
                ctx.print(
                    bar.x + bar.width / 2.0,
                    flip(&viewport, baseline + 40.0),
                    Span::styled((idx + 1).to_string(), Style::default().fg(Color::Gray)),
                );
            }
        });
    frame.render_widget(canvas, area);

    ChartArea { inner, viewport }
}

fn draw_legend(frame: &mut Frame, area: Rect, scene: &BarScene) {
    let block = Block::default()
        .title(scene.legend.title.clone())
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 || scene.legend.swatches.is_empty() {
        return;
    }

    let cell = (inner.width as usize / scene.legend.swatches.len()).max(1);
    let mut swatches = Vec::new();
    let mut labels = Vec::new();
    for swatch in &scene.legend.swatches {
        swatches.push(Span::styled(
            " ".repeat(cell),
            Style::default().bg(color(swatch.color)),
        ));
        labels.push(Span::raw(format!("{:<width$}", swatch.label, width = cell)));
    }
    let legend = Paragraph::new(vec![Line::from(swatches), Line::from(labels)]);
    frame.render_widget(legend, inner);
}

fn draw_ranking(frame: &mut Frame, area: Rect, scene: &BarScene) {
    let lines: Vec<Line> = if scene.bars.is_empty() {
        vec![Line::styled(
            "No players above the minutes threshold",
            Style::default().fg(Color::DarkGray),
        )]
    } else {
        scene
            .bars
            .iter()
            .enumerate()
            .map(|(idx, bar)| {
                Line::from(vec![
                    Span::styled(format!("{:>2}. ", idx + 1), Style::default().fg(Color::Gray)),
                    Span::styled("  ", Style::default().bg(color(bar.fill))),
                    Span::raw(format!(
                        " {} ({}) {}: {}  xG/90: {:.2}",
                        bar.player,
                        bar.team,
                        scene.metric.label(),
                        crate::scene::format_value(bar.value),
                        bar.per90
                    )),
                ])
            })
            .collect()
    };
    let ranking =
        Paragraph::new(lines).block(Block::default().title("Ranking").borders(Borders::ALL));
    frame.render_widget(ranking, area);
}

fn draw_tooltip(frame: &mut Frame, chart: ChartArea, tooltip: &Tooltip) {
    let lines = tooltip.lines();
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 2;
    let height = lines.len() as u16 + 2;
    let bounds = frame.size();
    let (col, row) = chart.cell_at(tooltip.anchor);
    let x = col.min(bounds.width.saturating_sub(width));
    let y = row.min(bounds.height.saturating_sub(height));
    let popup = Rect {
        x,
        y,
        width: width.min(bounds.width),
        height: height.min(bounds.height),
    };

    let mut text: Vec<Line> = Vec::with_capacity(lines.len());
    text.push(Line::styled(
        tooltip.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    text.extend(lines.into_iter().skip(1).map(Line::raw));

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL)),
        popup,
    );
}

fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "xG Terminal - Help",
        "",
        "Filters:",
        "  s / S        Next / previous season",
        "  m            Toggle Expected / Actual",
        "",
        "Brushing (scatter plot):",
        "  mouse drag   Select teams by area",
        "  b            Keyboard brush",
        "  arrows       Move brush",
        "  shift+arrows Resize brush",
        "  Enter        Apply brush",
        "  c / Esc      Clear brush",
        "",
        "Other:",
        "  mouse move   Tooltips",
        "  e            Export view to xlsx",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_area_maps_cells_to_pixels_and_back() {
        let area = ChartArea {
            inner: Rect {
                x: 1,
                y: 4,
                width: 90,
                height: 50,
            },
            viewport: Viewport::default(),
        };
        assert_eq!(area.pixel_at(0, 10), None);
        let p = area.pixel_at(1, 4).unwrap();
        assert_eq!(p, Point::new(5.0, 10.0));
        assert_eq!(area.cell_at(p), (1, 4));
        assert_eq!(area.cell_at(Point::new(900.0, 1000.0)), (90, 53));
    }
}
