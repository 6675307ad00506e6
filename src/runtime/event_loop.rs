use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::{App, Mode};
use crate::audio::AudioPlayer;
use crate::config;
use crate::player::EngineEvent;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Regions from the last draw, used for mouse hit-testing.
    pub areas: ui::Areas,
    /// A mouse press landed on the progress bar and the button is still held.
    pub seeking: bool,
}

/// Main terminal event loop: drains engine notifications, draws, and handles
/// keyboard and mouse input. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App<AudioPlayer>,
    engine_rx: &mpsc::Receiver<EngineEvent>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(ev) = engine_rx.try_recv() {
            app.player.handle_engine_event(ev);
        }

        terminal.draw(|f| {
            state.areas = ui::draw(f, app, &settings.ui, &settings.controls);
        })?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key_event(key, settings, app, state) {
                        app.player
                            .engine()
                            .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
                        break;
                    }
                }
                Event::Mouse(mouse) => handle_mouse_event(mouse, app, state),
                _ => {}
            }
        }
    }

    Ok(())
}

/// Returns `true` when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App<AudioPlayer>,
    state: &mut EventLoopState,
) -> bool {
    match app.mode {
        Mode::Rename { .. } => {
            match key.code {
                KeyCode::Enter => app.commit_rename(),
                KeyCode::Esc => app.cancel_rename(),
                KeyCode::Backspace => app.pop_input_char(),
                // Leaving the row commits the edit.
                KeyCode::Down => app.next(),
                KeyCode::Up => app.prev(),
                KeyCode::Char(c) if !c.is_control() => app.push_input_char(c),
                _ => {}
            }
            return false;
        }
        Mode::Upload { .. } => {
            match key.code {
                KeyCode::Enter => {
                    app.submit_upload(&settings.upload);
                }
                KeyCode::Esc => app.cancel_upload(),
                KeyCode::Backspace => app.pop_input_char(),
                KeyCode::Char(c) if !c.is_control() => app.push_input_char(c),
                _ => {}
            }
            return false;
        }
        Mode::Grab { .. } => {
            match key.code {
                KeyCode::Char('j') | KeyCode::Down => app.next(),
                KeyCode::Char('k') | KeyCode::Up => app.prev(),
                KeyCode::Char('g') => app.select_first(),
                KeyCode::Char('G') => app.select_last(),
                KeyCode::Enter | KeyCode::Char('m') => app.drop_grab(),
                KeyCode::Esc => app.cancel_grab(),
                KeyCode::Char('q') => return true,
                _ => {}
            }
            return false;
        }
        Mode::Normal => {}
    }

    let scrub = settings.controls.scrub_seconds as f64;
    match key.code {
        KeyCode::Char('q') => {
            state.pending_gg = false;
            return true;
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            app.select_last();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.pending_gg = false;
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.pending_gg = false;
            app.prev();
        }
        KeyCode::Enter => {
            state.pending_gg = false;
            app.play_selected();
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            state.pending_gg = false;
            app.toggle_playback();
        }
        KeyCode::Char('L') => {
            state.pending_gg = false;
            app.scrub(scrub);
        }
        KeyCode::Char('H') => {
            state.pending_gg = false;
            app.scrub(-scrub);
        }
        KeyCode::Char(c @ '0'..='9') => {
            state.pending_gg = false;
            let tenths = c.to_digit(10).unwrap_or(0) as f64;
            app.seek_fraction(tenths / 10.0);
        }
        KeyCode::Char('m') => {
            state.pending_gg = false;
            app.grab();
        }
        KeyCode::Char('J') => {
            state.pending_gg = false;
            app.move_selected_down();
        }
        KeyCode::Char('K') => {
            state.pending_gg = false;
            app.move_selected_up();
        }
        KeyCode::Char('e') | KeyCode::Char('r') => {
            state.pending_gg = false;
            app.begin_rename();
        }
        KeyCode::Char('a') => {
            state.pending_gg = false;
            app.begin_upload();
        }
        KeyCode::Char(_) => {
            // g pending should clear on any other printable char
            state.pending_gg = false;
        }
        _ => {}
    }

    false
}

fn handle_mouse_event(mouse: MouseEvent, app: &mut App<AudioPlayer>, state: &mut EventLoopState) {
    let areas = state.areas;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(f) = ui::progress_fraction_at(areas.progress, mouse.column, mouse.row, false) {
                state.seeking = true;
                app.seek_fraction(f);
            } else if let Some(idx) = list_row(&mouse, &areas, app) {
                if matches!(app.mode, Mode::Upload { .. }) {
                    return;
                }
                app.cancel_grab();
                app.begin_drag(idx);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if state.seeking {
                if let Some(f) = ui::progress_fraction_at(areas.progress, mouse.column, mouse.row, true) {
                    app.seek_fraction(f);
                }
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if state.seeking {
                state.seeking = false;
            } else {
                let target = list_row(&mouse, &areas, app);
                debug!(?target, "drop");
                app.end_drag(target);
            }
        }
        MouseEventKind::ScrollDown => app.next(),
        MouseEventKind::ScrollUp => app.prev(),
        _ => {}
    }
}

fn list_row(mouse: &MouseEvent, areas: &ui::Areas, app: &App<AudioPlayer>) -> Option<usize> {
    ui::row_at(areas.list, app.songs.len(), app.selected, mouse.column, mouse.row)
}
