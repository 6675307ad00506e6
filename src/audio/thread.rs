use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, info, warn};

use crate::config::AudioSettings;
use crate::player::{EngineEvent, LoadId};

use super::clock::PlaybackClock;
use super::error::AudioError;
use super::sink::{create_sink, open_track_at, read_duration};
use super::types::AudioCmd;

/// The source currently owned by the audio thread.
struct Loaded {
    load: LoadId,
    path: PathBuf,
    /// Built lazily on play; dropped when the source ends or is sought while paused.
    sink: Option<Sink>,
    clock: PlaybackClock,
}

impl Loaded {
    fn new(load: LoadId, path: PathBuf) -> Self {
        Self {
            load,
            path,
            sink: None,
            clock: PlaybackClock::default(),
        }
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }
}

/// Output stream, or the reason it could not be opened.
pub(super) type Output = Result<OutputStream, String>;

fn open_output() -> Output {
    match OutputStreamBuilder::open_default_stream() {
        Ok(mut stream) => {
            // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
            // but noisy for a TUI app.
            stream.log_on_drop(false);
            Ok(stream)
        }
        Err(e) => {
            error!(error = %e, "failed to open audio output; playback disabled");
            Err(e.to_string())
        }
    }
}

fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    sink.set_volume(1.0);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(1.0 - t);
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

/// Start (or resume) `current`, rebuilding its sink when there is none or the
/// old one has drained.
/// The file is decoded before the output is touched, so a bad file is
/// reported as such even without a device.
fn do_play(output: &Output, current: &mut Loaded) -> Result<(), AudioError> {
    let needs_sink = current.sink.as_ref().is_none_or(|s| s.empty());
    if needs_sink {
        current.stop();
        let track = open_track_at(&current.path, current.clock.elapsed())?;
        let stream = output
            .as_ref()
            .map_err(|reason| AudioError::NoOutputDevice(reason.clone()))?;
        current.sink = Some(create_sink(stream, track));
    }

    if let Some(ref s) = current.sink {
        s.play();
    }
    current.clock.start();
    Ok(())
}

fn do_seek(output: &Output, current: &mut Loaded, position: Duration) -> Result<(), AudioError> {
    current.clock.set(position);

    // Scrubbing: rebuild the sink and skip into the file. A paused source is
    // rebuilt on the next play instead.
    current.stop();
    if current.clock.is_running() {
        current.clock.pause();
        do_play(output, current)?;
    }
    Ok(())
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<EngineEvent>,
    audio_settings: AudioSettings,
) -> JoinHandle<()> {
    spawn_audio_thread_with(rx, events, audio_settings, open_output)
}

/// Like [`spawn_audio_thread`], with the output opened by `open` on the audio thread.
pub(super) fn spawn_audio_thread_with<F>(
    rx: Receiver<AudioCmd>,
    events: Sender<EngineEvent>,
    audio_settings: AudioSettings,
    open: F,
) -> JoinHandle<()>
where
    F: FnOnce() -> Output + Send + 'static,
{
    thread::spawn(move || {
        let output = open();
        let tick = Duration::from_millis(audio_settings.tick_ms.max(1));

        let mut current: Option<Loaded> = None;

        // Report to the controller; a closed channel means the UI is gone.
        let emit = |event: EngineEvent| events.send(event).is_ok();

        loop {
            match rx.recv_timeout(tick) {
                Ok(cmd) => match cmd {
                    AudioCmd::SetSource { load, path } => {
                        if let Some(mut old) = current.take() {
                            old.stop();
                        }
                        debug!(path = %path.display(), "source set");
                        current = Some(Loaded::new(load, path));
                    }

                    AudioCmd::Retag(load) => {
                        if let Some(ref mut cur) = current {
                            cur.load = load;
                        }
                    }

                    AudioCmd::Load => {
                        let Some(ref cur) = current else {
                            continue;
                        };
                        match read_duration(&cur.path) {
                            Some(d) => {
                                if !emit(EngineEvent::DurationKnown {
                                    load: cur.load,
                                    duration: d.as_secs_f64(),
                                }) {
                                    break;
                                }
                            }
                            None => debug!(path = %cur.path.display(), "duration unknown"),
                        }
                    }

                    AudioCmd::Play => {
                        let Some(ref mut cur) = current else {
                            continue;
                        };
                        if let Err(e) = do_play(&output, cur) {
                            cur.stop();
                            cur.clock.pause();
                            warn!(error = %e, "play failed");
                            if !emit(EngineEvent::PlayFailed {
                                load: cur.load,
                                reason: e.to_string(),
                            }) {
                                break;
                            }
                        }
                    }

                    AudioCmd::Pause => {
                        if let Some(ref mut cur) = current {
                            if let Some(ref s) = cur.sink {
                                s.pause();
                            }
                            cur.clock.pause();
                        }
                    }

                    AudioCmd::Seek(position) => {
                        let Some(ref mut cur) = current else {
                            continue;
                        };
                        if let Err(e) = do_seek(&output, cur, position) {
                            cur.stop();
                            cur.clock.pause();
                            warn!(error = %e, "seek failed");
                            if !emit(EngineEvent::PlayFailed {
                                load: cur.load,
                                reason: e.to_string(),
                            }) {
                                break;
                            }
                        }
                    }

                    AudioCmd::Quit { fade_out_ms } => {
                        if let Some(ref cur) = current {
                            if let Some(ref s) = cur.sink {
                                if cur.clock.is_running() {
                                    // Fade out gently before stopping.
                                    fade_out_sink(s, fade_out_ms);
                                }
                                s.stop();
                            }
                        }
                        info!("audio thread exiting");
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    // Periodic position report and end-of-source check.
                    let Some(ref mut cur) = current else {
                        continue;
                    };
                    if !cur.clock.is_running() {
                        continue;
                    }

                    let drained = cur.sink.as_ref().is_none_or(|s| s.empty());
                    let event = if drained {
                        cur.stop();
                        cur.clock.reset();
                        EngineEvent::Ended { load: cur.load }
                    } else {
                        EngineEvent::PositionChanged {
                            load: cur.load,
                            position: cur.clock.elapsed().as_secs_f64(),
                        }
                    };
                    if !emit(event) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
