//! UI rendering helpers for the terminal user interface.
//!
//! Everything drawn here comes from the controller's `View`; this module
//! never mutates playback state.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::View;
use crate::config::{ControlsSettings, UiSettings};

const ACTIVE_MARKER: &str = "♪ ";
const IDLE_MARKER: &str = "  ";

/// Render the controls help text, incorporating the configured steps.
fn controls_text(controls: &ControlsSettings) -> String {
    [
        "[a] add songs".to_string(),
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] seek -/+{}%", controls.seek_step_percent),
        format!("[-/+] volume -/+{}", controls.volume_step),
        "[j/k] up/down".to_string(),
        "[gg/G] top/bottom".to_string(),
        "[enter] play selected".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// First visible row and the cursor's offset inside the window, keeping the
/// cursor centered when the list is taller than the area.
fn visible_window(total: usize, height: usize, cursor: usize) -> (usize, usize, usize) {
    let cursor = cursor.min(total.saturating_sub(1));
    if total <= height || height == 0 {
        return (0, total, cursor);
    }
    let half = height / 2;
    let mut start = cursor.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, cursor - start)
}

fn ratio(percent: f64) -> f64 {
    if percent.is_finite() {
        (percent / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        })
}

fn draw_now_playing(frame: &mut Frame, view: &View, area: Rect) {
    let title_style = if view.notice_until.is_some() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let title = if view.title.is_empty() {
        "No song loaded"
    } else {
        view.title.as_str()
    };

    let lines = vec![
        Line::from(vec![
            Span::raw(format!("{} ", view.play_button.glyph())),
            Span::styled(title.to_string(), title_style),
        ]),
        Line::from(view.subtitle.as_str()).italic(),
    ];

    let paragraph = Paragraph::new(lines)
        .block(padded(" now playing "))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_progress(frame: &mut Frame, view: &View, area: Rect) {
    let gauge = Gauge::default()
        .block(padded(" progress "))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(ratio(view.progress))
        .label(format!("{} / {}", view.elapsed, view.duration));
    frame.render_widget(gauge, area);
}

fn draw_volume(frame: &mut Frame, view: &View, area: Rect) {
    let gauge = Gauge::default()
        .block(padded(" volume "))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(ratio(view.volume))
        .label(format!("{:.0}%", view.volume));
    frame.render_widget(gauge, area);
}

fn draw_playlist(frame: &mut Frame, view: &View, cursor: usize, area: Rect) {
    // Only build ListItems for the visible window.
    let total = view.rows.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let (start, end, selected) = visible_window(total, list_height, cursor);

    let items: Vec<ListItem> = view.rows[start..end]
        .iter()
        .map(|row| {
            let marker = if row.active { ACTIVE_MARKER } else { IDLE_MARKER };
            let item = ListItem::new(format!("{marker}{}", row.name));
            if row.active {
                item.style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" playlist ({total}) ")),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    view: &View,
    cursor: usize,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cadenza ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    draw_now_playing(frame, view, chunks[1]);

    let gauges = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
        .split(chunks[2]);
    draw_progress(frame, view, gauges[0]);
    draw_volume(frame, view, gauges[1]);

    draw_playlist(frame, view, cursor, chunks[3]);

    let footer = Paragraph::new(controls_text(controls_settings))
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}
