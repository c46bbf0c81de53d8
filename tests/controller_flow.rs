use std::time::Duration;

use playbar::audio::{AudioEngine, NullAudioEngine};
use playbar::core::{PlayerController, PlayerEvent};
use playbar::model::{Settings, Track};
use playbar::view::{self, PlayIcon};

fn controller() -> PlayerController {
    PlayerController::new(
        vec![
            Track::from("First%20Light.mp3"),
            Track::from("Second.mp3"),
            Track::from("Third.mp3"),
        ],
        Settings {
            songs_url: String::from("http://music.test/songs/"),
            artist: String::from("House Band"),
            ..Settings::default()
        },
    )
}

#[test]
fn transport_session_keeps_view_in_sync() {
    let mut core = controller();
    let mut audio = NullAudioEngine::with_track_duration(Some(Duration::from_secs(200)));

    core.dispatch(&mut audio, PlayerEvent::TogglePlayback);
    assert_eq!(
        audio.current_source(),
        Some("http://music.test/songs/First%20Light.mp3")
    );

    core.dispatch(&mut audio, PlayerEvent::MetadataLoaded);
    core.dispatch(&mut audio, PlayerEvent::Seek(50.0));
    core.dispatch(&mut audio, PlayerEvent::TogglePlayback);

    let now = view::project(&core.state, &core.progress, &audio, &core.settings);
    assert_eq!(now.title, "First Light.mp3");
    assert_eq!(now.artist, "House Band");
    assert_eq!(now.icon, PlayIcon::Play);
    assert_eq!(now.active_index, Some(0));
    assert_eq!(now.total_text, "3:20");
    assert_eq!(now.elapsed_text, "1:40");
    assert!((now.seek_percent - 50.0).abs() < 1e-9);

    core.dispatch(&mut audio, PlayerEvent::Previous);
    let rows = view::track_rows(&core.state, &core.settings);
    assert!(rows[2].active);
    assert_eq!(rows.iter().filter(|row| row.active).count(), 1);
    assert_eq!(rows[2].icon, PlayIcon::Pause);
}

#[test]
fn ended_playback_wraps_and_volume_survives() {
    let mut core = controller();
    let mut audio = NullAudioEngine::new();

    core.dispatch(&mut audio, PlayerEvent::SetVolume(30.0));
    core.dispatch(&mut audio, PlayerEvent::SelectTrack(2));
    core.dispatch(&mut audio, PlayerEvent::PlaybackEnded);

    assert_eq!(core.state.current_index, Some(0));
    assert!(core.state.is_playing);
    assert!((audio.volume() - 0.3).abs() < f32::EPSILON);
}

#[test]
fn resuming_after_pause_keeps_position() {
    let mut core = controller();
    let mut audio = NullAudioEngine::with_track_duration(Some(Duration::from_secs(60)));

    core.dispatch(&mut audio, PlayerEvent::SelectTrack(1));
    core.dispatch(&mut audio, PlayerEvent::Seek(25.0));
    core.dispatch(&mut audio, PlayerEvent::Pause);
    core.dispatch(&mut audio, PlayerEvent::SelectTrack(1));

    let position = audio.position().expect("position");
    assert!(position >= Duration::from_secs(15));
    assert!(core.state.is_playing);

    let state = core.into_state();
    assert_eq!(state.current_index, Some(1));
}
