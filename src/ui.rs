//! UI rendering helpers for the terminal user interface.
//!
//! This module renders the TUI using `ratatui` and maps mouse positions back
//! onto list rows and the progress bar.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, Mode};
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::player::PlaybackEngine;
use crate::playlist::Song;

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("enter".to_string(), "play selected song".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    // H/L is filled dynamically from config.
    map.insert("0-9".to_string(), "seek 0-90%".to_string());
    map.insert("m".to_string(), "grab/drop".to_string());
    map.insert("J/K".to_string(), "move song down/up".to_string());
    map.insert("e/r".to_string(), "rename".to_string());
    map.insert("a".to_string(), "add files".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = [
        "j/k", "enter", "space/p", "H/L", "0-9", "m", "J/K", "e/r", "a", "gg/G", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Help line shown instead of the controls while a prompt or grab is active.
fn mode_controls_text(mode: &Mode) -> Option<&'static str> {
    match mode {
        Mode::Normal => None,
        Mode::Grab { .. } => Some("[j/k] choose target | [enter/m] drop here | [esc] cancel"),
        Mode::Rename { .. } => Some("[enter] save | [esc] revert | [up/down] save and move"),
        Mode::Upload { .. } => Some("[enter] add path | [esc] cancel"),
    }
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn seconds(s: f64) -> Duration {
    Duration::try_from_secs_f64(s.max(0.0)).unwrap_or_default()
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
///
/// `total` is `None` while the duration is still unknown.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    if ui.now_playing_time_fields.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Screen regions, shared by drawing and mouse hit-testing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Areas {
    pub header: Rect,
    pub status: Rect,
    pub list: Rect,
    pub progress: Rect,
    pub footer: Rect,
}

/// Split the terminal area into the UI regions.
pub fn layout(area: Rect) -> Areas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(area);

    Areas {
        header: chunks[0],
        status: chunks[1],
        list: chunks[2],
        progress: chunks[3],
        footer: chunks[4],
    }
}

fn bordered_inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

/// Window `[start, end)` of list rows to render, keeping `selected` centered when possible.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize) {
    if total <= height || height == 0 {
        return (0, total);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

/// Map a terminal cell onto the index of the song drawn there.
pub fn row_at(list_area: Rect, total: usize, selected: usize, column: u16, row: u16) -> Option<usize> {
    let inner = bordered_inner(list_area);
    if column < inner.x
        || column >= inner.x + inner.width
        || row < inner.y
        || row >= inner.y + inner.height
    {
        return None;
    }

    let (start, end) = visible_window(total, inner.height as usize, selected);
    let idx = start + (row - inner.y) as usize;
    (idx < end).then_some(idx)
}

/// Map a terminal cell onto a fraction of the progress bar.
///
/// While `dragging`, positions outside the bar clamp to its ends so the user
/// can overshoot; otherwise only clicks inside the bar count.
pub fn progress_fraction_at(area: Rect, column: u16, row: u16, dragging: bool) -> Option<f64> {
    let inner = bordered_inner(area);
    if inner.width == 0 {
        return None;
    }
    if !dragging {
        let inside = column >= inner.x
            && column < inner.x + inner.width
            && row >= inner.y
            && row < inner.y + inner.height;
        if !inside {
            return None;
        }
    }

    let span = inner.width.saturating_sub(1).max(1) as f64;
    let offset = column.saturating_sub(inner.x) as f64;
    Some((offset / span).clamp(0.0, 1.0))
}

fn status_text<E: PlaybackEngine>(app: &App<E>, ui_settings: &UiSettings) -> Text<'static> {
    let state = app.player.state();
    let mut parts: Vec<String> = Vec::new();

    match state.current_song_id.and_then(|id| app.songs.get(id)) {
        Some(song) => {
            parts.push(if state.is_playing { "Playing" } else { "Paused" }.to_string());
            let total = (state.duration > 0.0).then(|| seconds(state.duration));
            match now_playing_time_text(seconds(state.current_time), total, ui_settings) {
                Some(time) => parts.push(format!("Song: {} [{}]", song.name, time)),
                None => parts.push(format!("Song: {}", song.name)),
            }
        }
        None => parts.push("Stopped".to_string()),
    }

    parts.push(format!("Songs: {}", app.songs.len()));

    match &app.mode {
        Mode::Normal => {}
        Mode::Grab { .. } => parts.push("MOVING".to_string()),
        Mode::Rename { .. } => parts.push("RENAMING".to_string()),
        Mode::Upload { .. } => parts.push("ADDING".to_string()),
    }

    if let Some(notice) = &app.notice {
        parts.push(notice.clone());
    }

    let mut lines = vec![Line::from(parts.join(" • "))];
    if let Some(err) = app.player.last_error() {
        lines.push(Line::from(Span::raw(format!("Error: {err}")).red()));
    }
    Text::from(lines)
}

fn song_item<E: PlaybackEngine>(app: &App<E>, song: &Song) -> ListItem<'static> {
    let is_current = app.player.state().current_song_id == Some(song.id);

    let marker = if is_current {
        if app.player.state().is_playing { "♪ " } else { "‖ " }
    } else {
        "  "
    };

    let name = match &app.mode {
        Mode::Rename { id, buffer } if *id == song.id => format!("{buffer}▏"),
        _ => song.name.clone(),
    };

    let mut style = Style::default();
    if is_current {
        style = style.add_modifier(Modifier::BOLD);
    }
    if app.grabbed() == Some(song.id) {
        style = style.fg(Color::Yellow).add_modifier(Modifier::ITALIC);
    }

    ListItem::new(format!("{marker}{name}")).style(style)
}

/// Render the entire UI into the provided `frame` and return the regions used.
pub fn draw<E: PlaybackEngine>(
    frame: &mut Frame,
    app: &App<E>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) -> Areas {
    let areas = layout(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" mixtape ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, areas.header);

    // Status box
    let status_par = Paragraph::new(status_text(app, ui_settings))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, areas.status);

    // Main list; only build ListItems for the visible window.
    {
        let total = app.songs.len();
        let list_height = bordered_inner(areas.list).height as usize;
        let (start, end) = visible_window(total, list_height, app.selected);

        let visible_items: Vec<ListItem> = app
            .songs
            .iter()
            .skip(start)
            .take(end - start)
            .map(|song| song_item(app, song))
            .collect();

        let highlight = match app.mode {
            Mode::Grab { .. } => "⇅ ",
            _ => "> ",
        };
        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(" songs "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol(highlight);
        let mut state = ListState::default();
        if total > 0 {
            state.select(Some(app.selected.saturating_sub(start)));
        }
        frame.render_stateful_widget(list, areas.list, &mut state);
    }

    // Progress bar; clicking or dragging on it seeks.
    {
        let player_state = app.player.state();
        let progress = app.player.progress();
        let ratio = if progress.is_finite() { progress.clamp(0.0, 1.0) } else { 0.0 };
        let label = if player_state.current_song_id.is_some() {
            let total = (player_state.duration > 0.0).then(|| seconds(player_state.duration));
            match total {
                Some(t) => format!("{} / {}", format_mmss(seconds(player_state.current_time)), format_mmss(t)),
                None => format_mmss(seconds(player_state.current_time)),
            }
        } else {
            "--:--".to_string()
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" progress "))
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(ratio)
            .label(label);
        frame.render_widget(gauge, areas.progress);
    }

    // Upload prompt overlays the list so the header/status/footer stay visible.
    if let Mode::Upload { buffer } = &app.mode {
        let popup_area = centered_rect_sized(72, 3, areas.list);
        frame.render_widget(Clear, popup_area);
        let prompt = Paragraph::new(format!("{buffer}▏")).block(
            Block::default()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .borders(Borders::ALL)
                .title(" add file or directory "),
        );
        frame.render_widget(prompt, popup_area);
    }

    let footer_text = mode_controls_text(&app.mode)
        .map(str::to_string)
        .unwrap_or_else(|| controls_text(controls_settings.scrub_seconds));
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, areas.footer);

    areas
}
