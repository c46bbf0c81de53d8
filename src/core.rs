use crate::audio::AudioEngine;
use crate::error::{PlayerError, Result};
use crate::model::{PlayerState, Progress, Settings, Track};
use reqwest::Url;
use std::time::Duration;
use tracing::{error, info, warn};

/// Every input the player reacts to, whether it comes from the transport
/// controls or from the playback engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerEvent {
    Play,
    Pause,
    TogglePlayback,
    Next,
    Previous,
    SelectTrack(usize),
    ToggleTrack(usize),
    Seek(f64),
    SetVolume(f64),
    PlaybackEnded,
    MetadataLoaded,
    TimeUpdated,
}

#[derive(Debug)]
pub struct PlayerController {
    pub state: PlayerState,
    pub progress: Progress,
    pub settings: Settings,
    pub dirty: bool,
    pub status: String,
}

impl PlayerController {
    pub fn new(tracks: Vec<Track>, settings: Settings) -> Self {
        let status = if tracks.is_empty() {
            String::from("No songs found")
        } else {
            format!("Loaded {} songs", tracks.len())
        };
        Self {
            state: PlayerState::with_tracks(tracks),
            progress: Progress::default(),
            settings,
            dirty: true,
            status,
        }
    }

    pub fn into_state(self) -> PlayerState {
        self.state
    }

    pub fn dispatch(&mut self, audio: &mut dyn AudioEngine, event: PlayerEvent) {
        let outcome = match event {
            PlayerEvent::Play => self.resume_or_start(audio),
            PlayerEvent::Pause => {
                self.pause(audio);
                Ok(())
            }
            PlayerEvent::TogglePlayback => self.toggle_from_transport_button(audio),
            PlayerEvent::Next => self.next(audio),
            PlayerEvent::Previous => self.previous(audio),
            PlayerEvent::SelectTrack(index) => self.play(audio, index),
            PlayerEvent::ToggleTrack(index) => self.toggle_track(audio, index),
            PlayerEvent::Seek(fraction) => {
                self.seek(audio, fraction);
                Ok(())
            }
            PlayerEvent::SetVolume(level) => {
                self.set_volume(audio, level);
                Ok(())
            }
            PlayerEvent::PlaybackEnded => self.on_track_ended(audio),
            PlayerEvent::MetadataLoaded => {
                self.on_metadata_loaded(audio);
                Ok(())
            }
            PlayerEvent::TimeUpdated => {
                self.on_time_updated(audio);
                Ok(())
            }
        };

        if let Err(err) = outcome {
            error!(error = %err, ?event, "player event failed");
            self.set_status(&format!("playback error: {err}"));
        }
    }

    pub fn play(&mut self, audio: &mut dyn AudioEngine, index: usize) -> Result<()> {
        if self.state.is_playing && self.state.current_index == Some(index) {
            return Ok(());
        }

        let Some(track) = self.state.tracks.get(index).cloned() else {
            warn!(index, "ignoring play for missing track");
            return Err(PlayerError::NoTrack(index));
        };

        if self.state.current_index == Some(index) && audio.current_source().is_some() {
            self.resume(audio);
            return Ok(());
        }

        let source = self.source_url(&track)?;
        if let Err(err) = audio.play(&source) {
            audio.pause();
            self.state.is_playing = false;
            self.dirty = true;
            return Err(err);
        }

        info!(index, track = %track.file_name(), "playing");
        self.state.current_index = Some(index);
        self.state.is_playing = true;
        self.progress = Progress::default();
        self.set_status(&format!("Playing {}", track.display_name()));
        Ok(())
    }

    pub fn pause(&mut self, audio: &mut dyn AudioEngine) {
        audio.pause();
        self.state.is_playing = false;
        self.set_status("Paused");
    }

    pub fn toggle_from_transport_button(&mut self, audio: &mut dyn AudioEngine) -> Result<()> {
        if audio.current_source().is_none() {
            if self.state.tracks.is_empty() {
                self.set_status("Nothing to play");
                return Ok(());
            }
            return self.play(audio, 0);
        }

        if self.state.is_playing {
            self.pause(audio);
        } else {
            self.resume(audio);
        }
        Ok(())
    }

    pub fn toggle_track(&mut self, audio: &mut dyn AudioEngine, index: usize) -> Result<()> {
        if self.state.is_playing && self.state.current_index == Some(index) {
            self.pause(audio);
            return Ok(());
        }
        self.play(audio, index)
    }

    pub fn next(&mut self, audio: &mut dyn AudioEngine) -> Result<()> {
        let len = self.state.tracks.len();
        if len == 0 {
            return Ok(());
        }
        let index = self
            .state
            .current_index
            .map_or(0, |current| (current + 1) % len);
        self.play(audio, index)
    }

    pub fn previous(&mut self, audio: &mut dyn AudioEngine) -> Result<()> {
        let len = self.state.tracks.len();
        if len == 0 {
            return Ok(());
        }
        let index = self
            .state
            .current_index
            .map_or(len - 1, |current| (current + len - 1) % len);
        self.play(audio, index)
    }

    pub fn on_track_ended(&mut self, audio: &mut dyn AudioEngine) -> Result<()> {
        // A finished resource cannot be resumed, so force a reload even when
        // the list wraps onto the same index.
        self.state.is_playing = false;
        audio.stop();
        self.next(audio)
    }

    /// `fraction` is a 0-100 slider value.
    pub fn seek(&mut self, audio: &mut dyn AudioEngine, fraction: f64) {
        let Some(duration) = audio.duration() else {
            return;
        };
        if !fraction.is_finite() {
            return;
        }

        let target =
            Duration::from_secs_f64(duration.as_secs_f64() * fraction.clamp(0.0, 100.0) / 100.0);
        match audio.seek_to(target) {
            Ok(()) => {
                self.progress.elapsed = Some(target);
                self.dirty = true;
            }
            Err(err) => {
                error!(error = %err, "seek failed");
                self.set_status(&format!("seek error: {err}"));
            }
        }
    }

    /// `level` is a 0-100 slider value.
    pub fn set_volume(&mut self, audio: &mut dyn AudioEngine, level: f64) {
        if let Some(volume) = Self::apply_volume(audio, level) {
            self.set_status(&format!("Volume: {}%", (volume * 100.0).round() as u16));
        }
    }

    /// Startup volume; leaves the listing status in place.
    pub fn apply_initial_volume(&mut self, audio: &mut dyn AudioEngine) {
        Self::apply_volume(audio, f64::from(self.settings.initial_volume));
        self.dirty = true;
    }

    fn apply_volume(audio: &mut dyn AudioEngine, level: f64) -> Option<f32> {
        if !level.is_finite() {
            return None;
        }
        let volume = (level.clamp(0.0, 100.0) / 100.0) as f32;
        audio.set_volume(volume);
        Some(volume)
    }

    pub fn on_metadata_loaded(&mut self, audio: &dyn AudioEngine) {
        if let Some(total) = audio.duration() {
            self.progress.total = Some(total);
            self.dirty = true;
        }
    }

    pub fn on_time_updated(&mut self, audio: &dyn AudioEngine) {
        if audio.duration().is_none() {
            return;
        }
        let elapsed = audio.position();
        if self.progress.elapsed != elapsed {
            self.progress.elapsed = elapsed;
            self.dirty = true;
        }
    }

    pub fn source_url(&self, track: &Track) -> Result<String> {
        let base = Url::parse(&self.settings.songs_url).map_err(|err| {
            PlayerError::Media(format!("invalid songs url {}: {err}", self.settings.songs_url))
        })?;
        let base = if base.path().ends_with('/') {
            base
        } else {
            let mut with_slash = base.clone();
            with_slash.set_path(&format!("{}/", base.path()));
            with_slash
        };
        base.join(&format!("./{}", track.file_name()))
            .map(String::from)
            .map_err(|err| {
                PlayerError::Media(format!("invalid track url {}: {err}", track.file_name()))
            })
    }

    fn resume_or_start(&mut self, audio: &mut dyn AudioEngine) -> Result<()> {
        if audio.current_source().is_none() {
            return self.toggle_from_transport_button(audio);
        }
        self.resume(audio);
        Ok(())
    }

    fn resume(&mut self, audio: &mut dyn AudioEngine) {
        audio.resume();
        self.state.is_playing = self.state.current_index.is_some();
        self.set_status("Resumed");
    }

    fn set_status(&mut self, message: &str) {
        self.status = message.to_string();
        self.dirty = true;
    }
}
