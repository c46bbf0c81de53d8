use crate::audio::{AudioEngine, NullAudioEngine, RodioAudioEngine};
use crate::core::{PlayerController, PlayerEvent};
use crate::listing;
use crate::model::Settings;
use crate::ui::{self, Regions};
use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use reqwest::blocking::Client;
use std::io::stdout;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const SEEK_STEP_PERCENT: f64 = 5.0;
const VOLUME_STEP_PERCENT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Quit,
    CursorUp,
    CursorDown,
    Player(PlayerEvent),
}

pub fn run(settings: Settings) -> Result<()> {
    let client = Client::builder()
        .build()
        .context("failed to build HTTP client")?;

    let tracks = listing::load_tracks(&client, &settings);
    if tracks.is_empty() {
        info!("no songs found or failed to fetch");
    }
    let mut core = PlayerController::new(tracks, settings);

    let mut audio: Box<dyn AudioEngine> = match RodioAudioEngine::new(client) {
        Ok(engine) => Box::new(engine),
        Err(err) => {
            warn!(error = %err, "falling back to silent playback");
            Box::new(NullAudioEngine::new())
        }
    };
    core.apply_initial_volume(&mut *audio);

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut list_state = ListState::default();
    list_state.select((!core.state.tracks.is_empty()).then_some(0));
    let mut regions = Regions::default();
    let mut last_tick = Instant::now();

    let result: Result<()> = loop {
        poll_playback(&mut core, &mut *audio);

        if core.dirty || last_tick.elapsed() > Duration::from_millis(250) {
            terminal.draw(|frame| {
                regions = ui::regions(frame.area());
                ui::draw(frame, &core, &*audio, &mut list_state)
            })?;
            core.dirty = false;
            last_tick = Instant::now();
        }

        if !event::poll(Duration::from_millis(33))? {
            continue;
        }

        let action = match event::read()? {
            Event::Mouse(mouse) => {
                map_mouse(mouse, &regions, &list_state, core.state.tracks.len())
            }
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                map_key(key, list_state.selected(), &*audio)
            }
            Event::Resize(_, _) => {
                core.dirty = true;
                None
            }
            _ => None,
        };

        match action {
            Some(Action::Quit) => break Ok(()),
            Some(Action::CursorUp) => move_cursor(&mut list_state, core.state.tracks.len(), -1),
            Some(Action::CursorDown) => move_cursor(&mut list_state, core.state.tracks.len(), 1),
            Some(Action::Player(event)) => {
                if let PlayerEvent::SelectTrack(index) | PlayerEvent::ToggleTrack(index) = event {
                    list_state.select(Some(index));
                }
                core.dispatch(&mut *audio, event);
            }
            None => continue,
        }
        core.dirty = true;
    };

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    audio.stop();
    result
}

/// Turns engine state into `MetadataLoaded`, `TimeUpdated` and
/// `PlaybackEnded` notifications.
fn poll_playback(core: &mut PlayerController, audio: &mut dyn AudioEngine) {
    if audio.current_source().is_none() {
        return;
    }

    if core.progress.total.is_none() && audio.duration().is_some() {
        core.dispatch(audio, PlayerEvent::MetadataLoaded);
    }

    if !core.state.is_playing {
        return;
    }

    core.dispatch(audio, PlayerEvent::TimeUpdated);
    if audio.is_finished() {
        core.dispatch(audio, PlayerEvent::PlaybackEnded);
    }
}

fn map_key(key: KeyEvent, cursor: Option<usize>, audio: &dyn AudioEngine) -> Option<Action> {
    let action = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Up | KeyCode::Char('k') => Action::CursorUp,
        KeyCode::Down | KeyCode::Char('j') => Action::CursorDown,
        KeyCode::Char(' ') => Action::Player(PlayerEvent::TogglePlayback),
        KeyCode::Enter => Action::Player(PlayerEvent::SelectTrack(cursor?)),
        KeyCode::Char('p') => Action::Player(PlayerEvent::ToggleTrack(cursor?)),
        KeyCode::Char('n') => Action::Player(PlayerEvent::Next),
        KeyCode::Char('b') => Action::Player(PlayerEvent::Previous),
        KeyCode::Left => {
            Action::Player(PlayerEvent::Seek(seek_percent(audio)? - SEEK_STEP_PERCENT))
        }
        KeyCode::Right => {
            Action::Player(PlayerEvent::Seek(seek_percent(audio)? + SEEK_STEP_PERCENT))
        }
        KeyCode::Char(digit @ '0'..='9') => {
            let tenths = digit.to_digit(10).map(f64::from)?;
            Action::Player(PlayerEvent::Seek(tenths * 10.0))
        }
        KeyCode::Char('+') | KeyCode::Char('=') => Action::Player(PlayerEvent::SetVolume(
            f64::from(audio.volume()) * 100.0 + VOLUME_STEP_PERCENT,
        )),
        KeyCode::Char('-') => Action::Player(PlayerEvent::SetVolume(
            f64::from(audio.volume()) * 100.0 - VOLUME_STEP_PERCENT,
        )),
        _ => return None,
    };
    Some(action)
}

fn map_mouse(
    mouse: MouseEvent,
    regions: &Regions,
    list_state: &ListState,
    track_count: usize,
) -> Option<Action> {
    let (x, y) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::ScrollDown if point_in_rect(x, y, regions.track_list) => {
            Some(Action::CursorDown)
        }
        MouseEventKind::ScrollUp if point_in_rect(x, y, regions.track_list) => {
            Some(Action::CursorUp)
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if point_in_rect(x, y, regions.track_list) {
                let index = list_state.offset() + usize::from(y - regions.track_list.y);
                (index < track_count).then_some(Action::Player(PlayerEvent::ToggleTrack(index)))
            } else if let Some(value) = ui::slider_value(regions.seek_bar, x)
                && point_in_rect(x, y, regions.seek_bar)
            {
                Some(Action::Player(PlayerEvent::Seek(value)))
            } else if let Some(value) = ui::slider_value(regions.volume_bar, x)
                && point_in_rect(x, y, regions.volume_bar)
            {
                Some(Action::Player(PlayerEvent::SetVolume(value)))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn seek_percent(audio: &dyn AudioEngine) -> Option<f64> {
    let total = audio.duration()?.as_secs_f64();
    if total <= 0.0 {
        return None;
    }
    let elapsed = audio.position().unwrap_or_default().as_secs_f64();
    Some((elapsed / total * 100.0).clamp(0.0, 100.0))
}

fn move_cursor(list_state: &mut ListState, len: usize, delta: isize) {
    if len == 0 {
        list_state.select(None);
        return;
    }
    let current = list_state.selected().unwrap_or(0);
    let next = current.saturating_add_signed(delta).min(len - 1);
    list_state.select(Some(next));
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}
