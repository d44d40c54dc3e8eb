use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Gauge, List, ListItem, Paragraph,
        canvas::{Canvas, Circle, Context},
    },
};

use halo_player::accent::{Rgb, rgb_or};
use halo_player::constants::{CELL_HEIGHT_PX, CELL_WIDTH_PX, FALLBACK_ACCENT};
use halo_player::visual::ambient::{BackgroundCircle, SizeClass};
use halo_player::visual::media::{AudioGraph, MediaElement, PlaybackState};
use halo_player::visual::radial::{BoxRect, Viewport};
use halo_player::visual::stage::CoverState;

use super::app::{App, PlaybackProgress};

const PLAYLIST_WIDTH: u16 = 32;
const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Screen regions, in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageLayout {
    pub title: Rect,
    pub playlist: Rect,
    pub stage: Rect,
    pub cover: Rect,
    pub info: Rect,
    pub progress: Rect,
    pub controls: Rect,
}

pub fn stage_layout(area: Rect) -> StageLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Min(6),    // Playlist + stage
            Constraint::Length(2), // Track info
            Constraint::Length(3), // Progress bar
            Constraint::Length(2), // Controls
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(PLAYLIST_WIDTH), Constraint::Min(10)])
        .split(rows[1]);

    let stage = columns[1];
    StageLayout {
        title: rows[0],
        playlist: columns[0],
        stage,
        cover: cover_cells(stage),
        info: rows[2],
        progress: rows[3],
        controls: rows[4],
    }
}

/// A square (in px) cover centered in the stage, about 40% of its shorter side.
fn cover_cells(stage: Rect) -> Rect {
    let shorter = (stage.width as f64 * CELL_WIDTH_PX).min(stage.height as f64 * CELL_HEIGHT_PX);
    let px = shorter * 0.4;
    let width = ((px / CELL_WIDTH_PX).round() as u16).clamp(2, stage.width.max(2));
    let height = ((px / CELL_HEIGHT_PX).round() as u16).clamp(1, stage.height.max(1));

    Rect {
        x: stage.x + stage.width.saturating_sub(width) / 2,
        y: stage.y + stage.height.saturating_sub(height) / 2,
        width: width.min(stage.width),
        height: height.min(stage.height),
    }
}

/// The whole terminal expressed as a viewport in px.
pub fn viewport_for(area: Rect, pixel_ratio: f64) -> Viewport {
    Viewport {
        width: area.width as f64 * CELL_WIDTH_PX,
        height: area.height as f64 * CELL_HEIGHT_PX,
        pixel_ratio,
    }
}

pub fn cells_to_px(rect: Rect) -> BoxRect {
    BoxRect::new(
        rect.x as f64 * CELL_WIDTH_PX,
        rect.y as f64 * CELL_HEIGHT_PX,
        rect.width as f64 * CELL_WIDTH_PX,
        rect.height as f64 * CELL_HEIGHT_PX,
    )
}

/// The cells covered by a px box, clipped to `bounds`.
pub fn px_to_cells(rect: &BoxRect, bounds: Rect) -> Rect {
    let x0 = (rect.x / CELL_WIDTH_PX).floor().max(0.0) as u16;
    let y0 = (rect.y / CELL_HEIGHT_PX).floor().max(0.0) as u16;
    let x1 = ((rect.x + rect.width) / CELL_WIDTH_PX).ceil().max(0.0) as u16;
    let y1 = ((rect.y + rect.height) / CELL_HEIGHT_PX).ceil().max(0.0) as u16;

    Rect {
        x: x0,
        y: y0,
        width: x1.saturating_sub(x0),
        height: y1.saturating_sub(y0),
    }
    .intersection(bounds)
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

pub fn draw<M>(f: &mut Frame, app: &App<M>, layout: &StageLayout)
where
    M: MediaElement + AudioGraph + PlaybackProgress,
{
    let title = Paragraph::new("◎ halo")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, layout.title);

    draw_playlist(f, layout.playlist, app);

    let stage = app.session.stage();
    if let Some(ambient) = &stage.ambient {
        draw_background(f, layout.stage, ambient.circles());
    }
    if let Some(cover) = &stage.cover {
        draw_radial(f, layout.stage, app);
        draw_cover(f, layout.cover, cover, app);
    }

    draw_track_info(f, layout.info, app);
    draw_progress_bar(f, layout.progress, app);
    draw_controls(f, layout.controls, app);
}

fn draw_playlist<M>(f: &mut Frame, area: Rect, app: &App<M>)
where
    M: MediaElement + AudioGraph + PlaybackProgress,
{
    let current = app.session.current_track();
    let items: Vec<ListItem> = app
        .session
        .playlist()
        .tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let is_selected = i == app.selected;
            let style = if is_selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else if track.src.is_none() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };

            let prefix = if current == Some(i) { "▶ " } else { "  " };
            let swatch = color(rgb_or(&track.accent(FALLBACK_ACCENT).primary, FALLBACK_ACCENT));
            ListItem::new(Line::from(vec![
                Span::styled("■ ", Style::default().fg(swatch)),
                Span::raw(format!("{prefix}{}", track.display_name())),
            ]))
            .style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::RIGHT)
            .title(" Playlist "),
    );
    f.render_widget(list, area);
}

fn circle_radius(size: SizeClass) -> f64 {
    match size {
        SizeClass::Small => 3.0,
        SizeClass::Medium => 6.0,
        SizeClass::Large => 10.0,
    }
}

fn draw_background(f: &mut Frame, area: Rect, circles: &[BackgroundCircle]) {
    let canvas = Canvas::default()
        .paint(|ctx| {
            for circle in circles {
                let base = circle
                    .color
                    .as_deref()
                    .map(|c| rgb_or(c, FALLBACK_ACCENT))
                    .unwrap_or(Rgb(60, 60, 70));
                // Idle circles sit in the dark, pulsing ones light up
                let shade = if circle.pulsing { base } else { base.dim(0.25) };
                ctx.draw(&Circle {
                    x: circle.x_pct,
                    y: 100.0 - circle.y_pct,
                    radius: circle_radius(circle.size),
                    color: color(shade),
                });
            }
        })
        .x_bounds([0.0, 100.0])
        .y_bounds([0.0, 100.0]);

    f.render_widget(canvas, area);
}

fn draw_radial<M>(f: &mut Frame, stage_area: Rect, app: &App<M>)
where
    M: MediaElement + AudioGraph + PlaybackProgress,
{
    let Some(canvas) = app.session.canvas() else {
        return;
    };
    let (Some(size), Some(cover)) = (canvas.size, &app.session.stage().cover) else {
        return;
    };
    if canvas.is_blank() {
        return;
    }

    // The canvas is a square centered on the cover
    let (cx, cy) = cover.rect.center();
    let (w, h) = size.css();
    let bounds = BoxRect::new(cx - w / 2.0, cy - h / 2.0, w, h);
    let area = px_to_cells(&bounds, stage_area);
    if area.width == 0 || area.height == 0 {
        return;
    }

    // Visible part of the canvas, in canvas coordinates
    let visible = cells_to_px(area);
    let x0 = visible.x - bounds.x;
    let y0 = visible.y - bounds.y;
    let x1 = x0 + visible.width;
    let y1 = y0 + visible.height;

    let widget = Canvas::default()
        .paint(|ctx: &mut Context| {
            for bar in &canvas.bars {
                let mid = (
                    (bar.from.0 + bar.to.0) / 2.0,
                    (bar.from.1 + bar.to.1) / 2.0,
                );
                let rgb = canvas
                    .gradient
                    .as_ref()
                    .map(|g| g.color_at(mid))
                    .unwrap_or(Rgb::WHITE);
                ctx.draw(&ratatui::widgets::canvas::Line {
                    x1: bar.from.0,
                    y1: h - bar.from.1,
                    x2: bar.to.0,
                    y2: h - bar.to.1,
                    color: color(rgb),
                });
            }
        })
        .x_bounds([x0, x1])
        .y_bounds([h - y1, h - y0]);

    f.render_widget(widget, area);
}

fn draw_cover<M>(f: &mut Frame, area: Rect, cover: &CoverState, app: &App<M>)
where
    M: MediaElement + AudioGraph + PlaybackProgress,
{
    let primary = color(rgb_or(&cover.accent.primary, FALLBACK_ACCENT));

    if !cover.visible {
        let placeholder = Paragraph::new("♪")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(placeholder, area);
        return;
    }

    let mut border_style = Style::default().fg(primary);
    if cover.popped {
        border_style = border_style.add_modifier(Modifier::BOLD);
        if let Some(glow) = &cover.glow {
            let lit = rgb_or(glow, FALLBACK_ACCENT).lerp(Rgb::WHITE, 0.4);
            border_style = border_style.fg(color(lit));
        }
    }

    let image_name = cover
        .image
        .as_deref()
        .and_then(|p| std::path::Path::new(p).file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let spinner = cover
        .transform
        .map(|deg| SPINNER[((deg.rem_euclid(360.0) / 90.0) as usize).min(3)])
        .unwrap_or("●");

    let body = Paragraph::new(vec![Line::from(""), Line::from(spinner)])
        .style(Style::default().fg(primary))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(image_name),
        );
    f.render_widget(body, area);

    if let Some(markers) = &app.session.stage().markers {
        for marker in markers.markers() {
            let x = area.x as f64 + marker.x_pct / 100.0 * area.width as f64;
            let y = area.y as f64 + marker.y_pct / 100.0 * area.height as f64;
            let cell = Rect {
                x: (x as u16).min(area.right().saturating_sub(1)),
                y: (y as u16).min(area.bottom().saturating_sub(1)),
                width: 1,
                height: 1,
            };
            let (glyph, fg) = if marker.active {
                let lit = marker
                    .color
                    .as_deref()
                    .map(|c| color(rgb_or(c, FALLBACK_ACCENT)))
                    .unwrap_or(primary);
                ("●", lit)
            } else {
                ("·", Color::DarkGray)
            };
            f.render_widget(Paragraph::new(glyph).style(Style::default().fg(fg)), cell);
        }
    }
}

fn draw_track_info<M>(f: &mut Frame, area: Rect, app: &App<M>)
where
    M: MediaElement + AudioGraph + PlaybackProgress,
{
    let (title, artist) = app
        .session
        .stage()
        .info
        .as_ref()
        .map(|i| (i.title.as_str(), i.artist.as_str()))
        .unwrap_or(("", ""));

    let line = if app.session.current_track().is_none() {
        Line::from(Span::styled(
            "Select a track and press Enter",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(vec![
            Span::styled(
                title.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(artist.to_string(), Style::default().fg(Color::Gray)),
        ])
    };

    let widget = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(widget, area);
}

fn draw_progress_bar<M>(f: &mut Frame, area: Rect, app: &App<M>)
where
    M: MediaElement + AudioGraph + PlaybackProgress,
{
    let media = app.session.media();
    let progress = media.progress();

    let time_info = if let Some(duration) = media.duration() {
        let total_secs = duration.as_secs();
        let current_secs = (total_secs as f32 * progress) as u64;
        format!(
            "{:02}:{:02} / {:02}:{:02}",
            current_secs / 60,
            current_secs % 60,
            total_secs / 60,
            total_secs % 60
        )
    } else {
        "00:00 / 00:00".to_string()
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(10),    // Progress bar
            Constraint::Length(17), // Time display
        ])
        .split(area);

    let accent = color(rgb_or(&app.session.visual().accent.primary, FALLBACK_ACCENT));
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(accent))
        .ratio(progress.clamp(0.0, 1.0) as f64)
        .label("");
    f.render_widget(gauge, chunks[0]);

    let time_widget = Paragraph::new(time_info)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(time_widget, chunks[1]);
}

fn draw_controls<M>(f: &mut Frame, area: Rect, app: &App<M>)
where
    M: MediaElement + AudioGraph + PlaybackProgress,
{
    let playing = app.session.playback_state() == PlaybackState::Playing;
    let controls = vec![
        if playing {
            Span::styled("[space]", Style::default().fg(Color::Yellow))
        } else {
            Span::styled("[space]", Style::default().fg(Color::Green))
        },
        Span::raw(if playing { " pause  " } else { " play  " }),
        Span::styled("[↑↓]", Style::default().fg(Color::Magenta)),
        Span::raw(" select  "),
        Span::styled("[enter]", Style::default().fg(Color::Blue)),
        Span::raw(" load  "),
        Span::styled("[q]", Style::default().fg(Color::Red)),
        Span::raw(" quit"),
    ];

    let border_widget = Block::default().borders(Borders::TOP);
    f.render_widget(border_widget, area);

    let inner = Rect {
        y: area.y + 1,
        height: area.height.saturating_sub(1),
        ..area
    };
    let widget = Paragraph::new(Line::from(controls)).alignment(Alignment::Center);
    f.render_widget(widget, inner);
}
