#![no_main]

use libfuzzer_sys::fuzz_target;
use playbar::audio::{AudioEngine, NullAudioEngine};
use playbar::core::{PlayerController, PlayerEvent};
use playbar::model::{Settings, Track};
use playbar::view;
use std::time::Duration;

fuzz_target!(|data: &[u8]| {
    let len = data.first().map_or(0, |byte| usize::from(*byte % 16));
    let tracks = (0..len)
        .map(|idx| Track::new(format!("track_{idx}.mp3")))
        .collect();
    let mut core = PlayerController::new(tracks, Settings::default());
    let mut audio = NullAudioEngine::with_track_duration(Some(Duration::from_secs(180)));

    for pair in data.chunks(2) {
        let arg = pair.get(1).copied().unwrap_or_default();
        let event = match pair[0] % 12 {
            0 => PlayerEvent::Play,
            1 => PlayerEvent::Pause,
            2 => PlayerEvent::TogglePlayback,
            3 => PlayerEvent::Next,
            4 => PlayerEvent::Previous,
            5 => PlayerEvent::SelectTrack(usize::from(arg % 20)),
            6 => PlayerEvent::ToggleTrack(usize::from(arg % 20)),
            7 => PlayerEvent::Seek(f64::from(arg) - 20.0),
            8 => PlayerEvent::SetVolume(f64::from(arg) - 20.0),
            9 => PlayerEvent::PlaybackEnded,
            10 => PlayerEvent::MetadataLoaded,
            _ => PlayerEvent::TimeUpdated,
        };
        core.dispatch(&mut audio, event);

        assert!(core.state.is_consistent());
        assert!((0.0..=1.0).contains(&audio.volume()));
        let now = view::project(&core.state, &core.progress, &audio, &core.settings);
        assert_eq!(now.active_index, core.state.current_index);
    }
});
