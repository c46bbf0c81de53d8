use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SONGS_URL: &str = "http://127.0.0.1:5500/songs/";
pub const DEFAULT_ARTIST: &str = "Jatin";
pub const DEFAULT_AUDIO_EXTENSION: &str = "mp3";

/// A playlist entry, stored as the percent-encoded file name taken from the
/// directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track(String);

impl Track {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self(file_name.into())
    }

    pub fn file_name(&self) -> &str {
        &self.0
    }

    pub fn display_name(&self) -> String {
        match urlencoding::decode(&self.0) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => self.0.replace("%20", " "),
        }
    }
}

impl From<&str> for Track {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerState {
    pub tracks: Vec<Track>,
    pub current_index: Option<usize>,
    pub is_playing: bool,
}

impl PlayerState {
    pub fn with_tracks(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            current_index: None,
            is_playing: false,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.get(self.current_index?)
    }

    pub fn is_consistent(&self) -> bool {
        let index_ok = self
            .current_index
            .is_none_or(|index| index < self.tracks.len());
        let playing_ok = !self.is_playing || self.current_index.is_some();
        index_ok && playing_ok
    }
}

/// Timeline values reported by the playback engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub elapsed: Option<Duration>,
    pub total: Option<Duration>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_songs_url")]
    pub songs_url: String,
    #[serde(default = "default_artist")]
    pub artist: String,
    #[serde(default = "default_audio_extension")]
    pub audio_extension: String,
    #[serde(default = "default_initial_volume")]
    pub initial_volume: u8,
}

fn default_songs_url() -> String {
    DEFAULT_SONGS_URL.to_string()
}

fn default_artist() -> String {
    DEFAULT_ARTIST.to_string()
}

fn default_audio_extension() -> String {
    DEFAULT_AUDIO_EXTENSION.to_string()
}

fn default_initial_volume() -> u8 {
    100
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            songs_url: default_songs_url(),
            artist: default_artist(),
            audio_extension: default_audio_extension(),
            initial_volume: default_initial_volume(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_decodes_escapes() {
        let track = Track::new("My%20Song%20%26%20More.mp3");
        assert_eq!(track.display_name(), "My Song & More.mp3");
    }

    #[test]
    fn display_name_falls_back_on_invalid_utf8() {
        let track = Track::new("bad%FF%20name.mp3");
        assert_eq!(track.display_name(), "bad%FF name.mp3");
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"artist":"Someone"}"#).expect("parse settings");
        assert_eq!(settings.artist, "Someone");
        assert_eq!(settings.songs_url, DEFAULT_SONGS_URL);
        assert_eq!(settings.audio_extension, "mp3");
        assert_eq!(settings.initial_volume, 100);
    }

    #[test]
    fn playing_without_track_is_inconsistent() {
        let state = PlayerState {
            tracks: vec![Track::from("a.mp3")],
            current_index: None,
            is_playing: true,
        };
        assert!(!state.is_consistent());
    }
}
