use std::sync::Mutex;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::config::AudioSettings;
use crate::player::{EngineEvent, LoadId, PlaybackEngine};
use crate::playlist::PlayableRef;

use super::thread::spawn_audio_thread;
use super::types::AudioCmd;

/// Handle to the audio thread. This is the session's one playback engine.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    /// Spawn the audio thread. Notifications are delivered on `events`.
    pub fn new(events: Sender<EngineEvent>, audio_settings: AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let audio_handle = spawn_audio_thread(rx, events, audio_settings);

        Self {
            tx,
            join: Mutex::new(Some(audio_handle)),
        }
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    fn send_or_warn(&self, cmd: AudioCmd) {
        if let Err(e) = self.send(cmd) {
            warn!(cmd = ?e.0, "audio thread is gone; command dropped");
        }
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl PlaybackEngine for AudioPlayer {
    fn set_source(&mut self, load: LoadId, source: &PlayableRef) {
        self.send_or_warn(AudioCmd::SetSource {
            load,
            path: source.path().to_path_buf(),
        });
    }

    fn retag(&mut self, load: LoadId) {
        self.send_or_warn(AudioCmd::Retag(load));
    }

    fn load(&mut self) {
        self.send_or_warn(AudioCmd::Load);
    }

    fn play(&mut self) {
        self.send_or_warn(AudioCmd::Play);
    }

    fn pause(&mut self) {
        self.send_or_warn(AudioCmd::Pause);
    }

    fn set_current_time(&mut self, seconds: f64) {
        let position = Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::ZERO);
        self.send_or_warn(AudioCmd::Seek(position));
    }
}
