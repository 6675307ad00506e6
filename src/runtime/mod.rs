use std::env;
use std::sync::mpsc;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::player::EngineEvent;

mod event_loop;
mod logging;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = startup::Cli::parse(env::args().skip(1));
    let (settings, settings_problem) = settings::load_settings();

    if cli.print_config {
        if let Some(problem) = &settings_problem {
            eprintln!("mixtape: {problem}");
        }
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    let log_path = logging::init(&settings.log);
    info!(version = env!("CARGO_PKG_VERSION"), log = ?log_path, "starting mixtape");
    if let Some(problem) = &settings_problem {
        warn!("{problem}");
    }

    let (engine_tx, engine_rx) = mpsc::channel::<EngineEvent>();
    let audio_player = AudioPlayer::new(engine_tx, settings.audio.clone());
    let mut app = App::new(audio_player);
    startup::add_initial_songs(&mut app, &cli.paths, &settings);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(&mut terminal, &settings, &mut app, &engine_rx, &mut state)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &run_result {
        warn!(error = %e, "event loop failed");
    }
    info!("bye");
    run_result
}
