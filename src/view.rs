//! Projection of player state onto what the transport bar and track list show.

use crate::audio::AudioEngine;
use crate::model::{PlayerState, Progress, Settings};
use std::time::Duration;

pub const NO_SELECTION_TITLE: &str = "Select a song";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayIcon {
    Play,
    Pause,
}

impl PlayIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Play => "▶",
            Self::Pause => "⏸",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub icon: PlayIcon,
    pub active_index: Option<usize>,
    pub elapsed_text: String,
    pub total_text: String,
    pub seek_percent: f64,
    pub volume_percent: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRow {
    pub index: usize,
    pub title: String,
    pub artist: String,
    pub active: bool,
    pub icon: PlayIcon,
}

pub fn project(
    state: &PlayerState,
    progress: &Progress,
    audio: &dyn AudioEngine,
    settings: &Settings,
) -> NowPlaying {
    let title = state
        .current_track()
        .map(|track| track.display_name())
        .unwrap_or_else(|| NO_SELECTION_TITLE.to_string());
    let icon = if state.is_playing {
        PlayIcon::Pause
    } else {
        PlayIcon::Play
    };

    let seek_percent = match (progress.elapsed, progress.total) {
        (Some(elapsed), Some(total)) if !total.is_zero() => {
            (elapsed.as_secs_f64() / total.as_secs_f64() * 100.0).clamp(0.0, 100.0)
        }
        _ => 0.0,
    };

    NowPlaying {
        title,
        artist: settings.artist.clone(),
        icon,
        active_index: state.current_index,
        elapsed_text: progress
            .elapsed
            .map(format_clock)
            .unwrap_or_else(|| String::from("0:00")),
        total_text: progress
            .total
            .map(format_clock)
            .unwrap_or_else(|| String::from("0:00")),
        seek_percent,
        volume_percent: (audio.volume() * 100.0).round() as u16,
    }
}

/// One row per track; only the current track is marked active, and only the
/// playing row shows a pause glyph.
pub fn track_rows(state: &PlayerState, settings: &Settings) -> Vec<TrackRow> {
    state
        .tracks
        .iter()
        .enumerate()
        .map(|(index, track)| {
            let active = state.current_index == Some(index);
            TrackRow {
                index,
                title: track.display_name(),
                artist: settings.artist.clone(),
                active,
                icon: if active && state.is_playing {
                    PlayIcon::Pause
                } else {
                    PlayIcon::Play
                },
            }
        })
        .collect()
}

/// `m:ss`, minutes unpadded.
pub fn format_clock(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullAudioEngine;
    use crate::model::Track;

    fn state(current_index: Option<usize>, is_playing: bool) -> PlayerState {
        PlayerState {
            tracks: vec![Track::from("One%20Love.mp3"), Track::from("Two.mp3")],
            current_index,
            is_playing,
        }
    }

    #[test]
    fn empty_selection_shows_placeholder() {
        let audio = NullAudioEngine::new();
        let view = project(
            &state(None, false),
            &Progress::default(),
            &audio,
            &Settings::default(),
        );
        assert_eq!(view.title, NO_SELECTION_TITLE);
        assert_eq!(view.artist, "Jatin");
        assert_eq!(view.icon, PlayIcon::Play);
        assert_eq!(view.active_index, None);
        assert_eq!(view.volume_percent, 100);
    }

    #[test]
    fn projection_is_idempotent() {
        let audio = NullAudioEngine::new();
        let progress = Progress {
            elapsed: Some(Duration::from_secs(45)),
            total: Some(Duration::from_secs(180)),
        };
        let state = state(Some(0), true);
        let first = project(&state, &progress, &audio, &Settings::default());
        let second = project(&state, &progress, &audio, &Settings::default());

        assert_eq!(first, second);
        assert_eq!(first.title, "One Love.mp3");
        assert_eq!(first.icon, PlayIcon::Pause);
        assert_eq!(first.elapsed_text, "0:45");
        assert_eq!(first.total_text, "3:00");
        assert!((first.seek_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn exactly_one_row_is_active() {
        let rows = track_rows(&state(Some(1), false), &Settings::default());
        let active: Vec<usize> = rows
            .iter()
            .filter(|row| row.active)
            .map(|row| row.index)
            .collect();
        assert_eq!(active, vec![1]);
        assert!(rows.iter().all(|row| row.icon == PlayIcon::Play));

        let rows = track_rows(&state(Some(0), true), &Settings::default());
        assert_eq!(rows[0].icon, PlayIcon::Pause);
        assert!(!rows[1].active);
    }

    #[test]
    fn clock_pads_seconds_only() {
        assert_eq!(format_clock(Duration::from_secs(5)), "0:05");
        assert_eq!(format_clock(Duration::from_secs(754)), "12:34");
    }
}
