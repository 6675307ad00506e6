use super::clock::PlaybackClock;
use super::error::AudioError;
use super::sink::read_duration;
use super::thread::spawn_audio_thread_with;
use super::types::AudioCmd;
use crate::config::AudioSettings;
use crate::player::{EngineEvent, LoadId};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Audio thread wired to channels, with no output device available.
struct Engine {
    tx: Sender<AudioCmd>,
    events: Receiver<EngineEvent>,
    join: Option<JoinHandle<()>>,
}

impl Engine {
    fn without_device() -> Self {
        let (tx, rx) = mpsc::channel();
        let (events_tx, events) = mpsc::channel();
        let settings = AudioSettings {
            tick_ms: 5,
            quit_fade_out_ms: 0,
        };
        let join = spawn_audio_thread_with(rx, events_tx, settings, || {
            Err("no default device".to_string())
        });
        Self {
            tx,
            events,
            join: Some(join),
        }
    }

    fn send(&self, cmd: AudioCmd) {
        self.tx.send(cmd).unwrap();
    }

    fn set_source(&self, load: LoadId, path: &Path) {
        self.send(AudioCmd::SetSource {
            load,
            path: path.to_path_buf(),
        });
    }

    fn next_event(&self) -> EngineEvent {
        self.events.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    fn assert_quiet(&self) {
        assert!(self.events.recv_timeout(Duration::from_millis(80)).is_err());
    }

    fn quit(mut self) {
        self.send(AudioCmd::Quit { fade_out_ms: 0 });
        if let Some(j) = self.join.take() {
            j.join().unwrap();
        }
    }
}

/// Silent 16-bit mono PCM WAV file of `seconds` length.
fn write_wav(path: &Path, seconds: u32) {
    let rate: u32 = 8_000;
    let data_len = rate * 2 * seconds;

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&rate.to_le_bytes());
    bytes.extend_from_slice(&(rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(bytes.len() + data_len as usize, 0);

    std::fs::write(path, bytes).unwrap();
}

fn loads() -> (LoadId, LoadId) {
    let first = LoadId::default().next();
    (first, first.next())
}

#[test]
fn clock_accumulates_only_while_running() {
    let t0 = Instant::now();
    let mut clock = PlaybackClock::default();
    assert_eq!(clock.elapsed_at(t0), Duration::ZERO);

    clock.start_at(t0);
    assert!(clock.is_running());
    assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(3)), Duration::from_secs(3));

    clock.pause_at(t0 + Duration::from_secs(3));
    assert!(!clock.is_running());
    assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(60)), Duration::from_secs(3));

    clock.start_at(t0 + Duration::from_secs(10));
    assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(12)), Duration::from_secs(5));
}

#[test]
fn clock_start_twice_keeps_first_start() {
    let t0 = Instant::now();
    let mut clock = PlaybackClock::default();
    clock.start_at(t0);
    clock.start_at(t0 + Duration::from_secs(5));
    assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(6)), Duration::from_secs(6));
}

#[test]
fn clock_set_jumps_and_keeps_running_state() {
    let t0 = Instant::now();
    let mut clock = PlaybackClock::default();

    clock.set_at(Duration::from_secs(45), t0);
    assert!(!clock.is_running());
    assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(9)), Duration::from_secs(45));

    clock.start_at(t0);
    clock.set_at(Duration::from_secs(100), t0 + Duration::from_secs(2));
    assert!(clock.is_running());
    assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(4)), Duration::from_secs(102));
}

#[test]
fn clock_reset_rewinds_and_stops() {
    let t0 = Instant::now();
    let mut clock = PlaybackClock::default();
    clock.start_at(t0);
    clock.reset();
    assert!(!clock.is_running());
    assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(5)), Duration::ZERO);
}

#[test]
fn read_duration_is_none_for_missing_or_garbage_files() {
    let dir = tempfile::tempdir().unwrap();
    let garbage = dir.path().join("noise.mp3");
    std::fs::write(&garbage, b"definitely not an mp3").unwrap();

    assert_eq!(read_duration(&dir.path().join("missing.mp3")), None);
    assert_eq!(read_duration(&garbage), None);
}

#[test]
fn audio_error_messages_name_the_file() {
    let err = AudioError::Open {
        path: PathBuf::from("/music/gone.mp3"),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    };
    assert!(err.to_string().starts_with("failed to open /music/gone.mp3"));

    let err = AudioError::NoOutputDevice("no default device".into());
    assert_eq!(err.to_string(), "no audio output device: no default device");
}

#[test]
fn load_reports_duration_tagged_with_current_load() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("two-seconds.wav");
    write_wav(&wav, 2);
    let (first, _) = loads();

    let engine = Engine::without_device();
    engine.set_source(first, &wav);
    engine.send(AudioCmd::Load);

    match engine.next_event() {
        EngineEvent::DurationKnown { load, duration } => {
            assert_eq!(load, first);
            assert!((duration - 2.0).abs() < 0.05, "duration {duration}");
        }
        other => panic!("unexpected event {other:?}"),
    }
    engine.quit();
}

#[test]
fn load_of_undecodable_file_reports_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let garbage = dir.path().join("noise.mp3");
    std::fs::write(&garbage, b"definitely not an mp3").unwrap();

    let engine = Engine::without_device();
    engine.set_source(loads().0, &garbage);
    engine.send(AudioCmd::Load);
    engine.assert_quiet();
    engine.quit();
}

#[test]
fn play_without_output_device_fails_for_current_load() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("tone.wav");
    write_wav(&wav, 1);
    let (first, _) = loads();

    let engine = Engine::without_device();
    engine.set_source(first, &wav);
    engine.send(AudioCmd::Play);

    assert_eq!(
        engine.next_event(),
        EngineEvent::PlayFailed {
            load: first,
            reason: "no audio output device: no default device".into(),
        }
    );
    // Nothing is running afterwards, so no position ticks follow.
    engine.assert_quiet();
    engine.quit();
}

#[test]
fn play_reports_bad_files_before_missing_device() {
    let dir = tempfile::tempdir().unwrap();
    let garbage = dir.path().join("noise.mp3");
    std::fs::write(&garbage, b"definitely not an mp3").unwrap();
    let (first, second) = loads();

    let engine = Engine::without_device();
    engine.set_source(first, &garbage);
    engine.send(AudioCmd::Play);
    match engine.next_event() {
        EngineEvent::PlayFailed { load, reason } => {
            assert_eq!(load, first);
            assert!(reason.starts_with("failed to decode"), "{reason}");
        }
        other => panic!("unexpected event {other:?}"),
    }

    engine.set_source(second, &dir.path().join("missing.mp3"));
    engine.send(AudioCmd::Play);
    match engine.next_event() {
        EngineEvent::PlayFailed { load, reason } => {
            assert_eq!(load, second);
            assert!(reason.starts_with("failed to open"), "{reason}");
        }
        other => panic!("unexpected event {other:?}"),
    }
    engine.quit();
}

#[test]
fn set_source_replaces_previous_tag() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("tone.wav");
    write_wav(&wav, 1);
    let (first, second) = loads();

    let engine = Engine::without_device();
    engine.set_source(first, &wav);
    engine.set_source(second, &wav);
    engine.send(AudioCmd::Play);

    assert_eq!(engine.next_event().load(), second);
    engine.quit();
}

#[test]
fn retag_applies_to_later_notifications_only() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("tone.wav");
    write_wav(&wav, 1);
    let (first, second) = loads();

    let engine = Engine::without_device();
    engine.set_source(first, &wav);
    engine.send(AudioCmd::Load);
    engine.send(AudioCmd::Retag(second));
    engine.send(AudioCmd::Play);

    assert!(matches!(
        engine.next_event(),
        EngineEvent::DurationKnown { load, .. } if load == first
    ));
    assert!(matches!(
        engine.next_event(),
        EngineEvent::PlayFailed { load, .. } if load == second
    ));
    engine.quit();
}

#[test]
fn pause_and_seek_while_stopped_stay_silent() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("tone.wav");
    write_wav(&wav, 1);

    let engine = Engine::without_device();
    // Commands without a source are ignored.
    engine.send(AudioCmd::Play);
    engine.send(AudioCmd::Seek(Duration::from_secs(1)));
    engine.assert_quiet();

    engine.set_source(loads().0, &wav);
    engine.send(AudioCmd::Seek(Duration::from_millis(500)));
    engine.send(AudioCmd::Pause);
    engine.assert_quiet();
    engine.quit();
}

#[test]
fn thread_exits_when_command_channel_closes() {
    let engine = Engine::without_device();
    let Engine { tx, events, join } = engine;
    drop(tx);
    join.unwrap().join().unwrap();
    assert!(events.recv().is_err());
}
