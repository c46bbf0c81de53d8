use crate::error::{PlayerError, Result};
use reqwest::blocking::Client;
use rodio::Source;
use rodio::cpal::traits::HostTrait;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
#[cfg(unix)]
use std::ffi::CString;
use std::io::Cursor;
use std::time::{Duration, Instant};

const MAX_VOLUME: f32 = 1.0;

/// The single media resource the player drives. Sources are URLs.
pub trait AudioEngine {
    fn play(&mut self, source: &str) -> Result<()>;
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
    fn is_paused(&self) -> bool;
    fn current_source(&self) -> Option<&str>;
    fn position(&self) -> Option<Duration>;
    fn duration(&self) -> Option<Duration>;
    fn seek_to(&mut self, position: Duration) -> Result<()>;
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    fn output_name(&self) -> Option<String>;
    fn is_finished(&self) -> bool;
}

pub struct RodioAudioEngine {
    stream: OutputStream,
    sink: Sink,
    client: Client,
    current: Option<String>,
    track_duration: Option<Duration>,
    volume: f32,
}

impl RodioAudioEngine {
    pub fn new(client: Client) -> Result<Self> {
        let (stream, sink) = Self::open_output_stream()?;

        Ok(Self {
            stream,
            sink,
            client,
            current: None,
            track_duration: None,
            volume: 1.0,
        })
    }

    fn download(&self, source: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(source)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| PlayerError::Media(format!("failed to download {source}: {err}")))?;
        let bytes = response
            .bytes()
            .map_err(|err| PlayerError::Media(format!("failed to read {source}: {err}")))?;
        Ok(bytes.to_vec())
    }

    fn open_output_stream() -> Result<(OutputStream, Sink)> {
        let mut stream = with_silenced_stderr(|| {
            let host = rodio::cpal::default_host();
            match OutputStreamBuilder::from_default_device()
                .and_then(|builder| builder.with_error_callback(|_| {}).open_stream_or_fallback())
            {
                Ok(stream) => Ok(stream),
                Err(default_err) => host
                    .output_devices()
                    .ok()
                    .into_iter()
                    .flatten()
                    .find_map(|device| {
                        OutputStreamBuilder::from_device(device)
                            .and_then(|builder| {
                                builder
                                    .with_error_callback(|_| {})
                                    .open_stream_or_fallback()
                            })
                            .ok()
                    })
                    .ok_or_else(|| {
                        PlayerError::Media(format!(
                            "unable to start any audio output stream after default failed: {default_err}"
                        ))
                    }),
            }
        })?;
        stream.log_on_drop(false);
        let sink = Sink::connect_new(stream.mixer());
        Ok((stream, sink))
    }
}

impl AudioEngine for RodioAudioEngine {
    fn play(&mut self, source: &str) -> Result<()> {
        let bytes = self.download(source)?;
        let byte_len = bytes.len() as u64;
        let mut builder = Decoder::builder()
            .with_data(Cursor::new(bytes))
            .with_byte_len(byte_len)
            .with_seekable(true);
        if let Some(ext) = source
            .rsplit('/')
            .next()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
        {
            builder = builder.with_hint(&ext);
        }
        let decoder = builder
            .build()
            .map_err(|err| PlayerError::Media(format!("failed to decode {source}: {err}")))?;

        self.sink.stop();
        self.sink = Sink::connect_new(self.stream.mixer());
        self.track_duration = decoder
            .total_duration()
            .filter(|duration| !duration.is_zero());
        self.sink.append(decoder);
        self.sink.set_volume(self.volume);
        self.current = Some(source.to_string());
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn resume(&mut self) {
        self.sink.play();
    }

    fn stop(&mut self) {
        self.sink.stop();
        self.current = None;
        self.track_duration = None;
    }

    fn is_paused(&self) -> bool {
        self.sink.is_paused()
    }

    fn current_source(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn position(&self) -> Option<Duration> {
        self.current.as_ref()?;
        Some(self.sink.get_pos())
    }

    fn duration(&self) -> Option<Duration> {
        self.track_duration
    }

    fn seek_to(&mut self, position: Duration) -> Result<()> {
        if self.current.is_none() {
            return Err(PlayerError::Media(String::from("no active track")));
        }

        self.sink
            .try_seek(position)
            .map_err(|err| PlayerError::Media(format!("failed to seek current track: {err:?}")))
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, MAX_VOLUME);
        self.sink.set_volume(self.volume);
    }

    fn output_name(&self) -> Option<String> {
        Some(String::from("System default output"))
    }

    fn is_finished(&self) -> bool {
        self.current.is_some() && !self.sink.is_paused() && self.sink.empty()
    }
}

#[cfg(unix)]
fn with_silenced_stderr<T>(operation: impl FnOnce() -> T) -> T {
    let saved = unsafe { libc::dup(libc::STDERR_FILENO) };
    if saved < 0 {
        return operation();
    }

    let devnull = CString::new("/dev/null")
        .ok()
        .map(|path| unsafe { libc::open(path.as_ptr(), libc::O_WRONLY) })
        .unwrap_or(-1);

    if devnull >= 0 {
        unsafe {
            libc::dup2(devnull, libc::STDERR_FILENO);
            libc::close(devnull);
        }
    }

    let result = operation();

    unsafe {
        libc::dup2(saved, libc::STDERR_FILENO);
        libc::close(saved);
    }

    result
}

#[cfg(not(unix))]
fn with_silenced_stderr<T>(operation: impl FnOnce() -> T) -> T {
    operation()
}

/// Silent engine driven by a wall clock. Used when no output device opens.
pub struct NullAudioEngine {
    paused: bool,
    current: Option<String>,
    volume: f32,
    started_at: Option<Instant>,
    position_offset: Duration,
    fixed_duration: Option<Duration>,
    track_duration: Option<Duration>,
}

impl NullAudioEngine {
    pub fn new() -> Self {
        Self::with_track_duration(None)
    }

    /// Every played source reports `duration` once loaded.
    pub fn with_track_duration(duration: Option<Duration>) -> Self {
        Self {
            paused: false,
            current: None,
            volume: 1.0,
            started_at: None,
            position_offset: Duration::ZERO,
            fixed_duration: duration.filter(|duration| !duration.is_zero()),
            track_duration: None,
        }
    }

    fn current_position(&self) -> Duration {
        let mut position = self.position_offset;
        if !self.paused
            && self.current.is_some()
            && let Some(started_at) = self.started_at
        {
            position = position.saturating_add(started_at.elapsed());
        }
        if let Some(duration) = self.track_duration {
            return position.min(duration);
        }
        position
    }
}

impl Default for NullAudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngine for NullAudioEngine {
    fn play(&mut self, source: &str) -> Result<()> {
        self.paused = false;
        self.current = Some(source.to_string());
        self.started_at = Some(Instant::now());
        self.position_offset = Duration::ZERO;
        self.track_duration = self.fixed_duration;
        Ok(())
    }

    fn pause(&mut self) {
        self.position_offset = self.current_position();
        self.started_at = None;
        self.paused = true;
    }

    fn resume(&mut self) {
        if self.current.is_some() {
            self.started_at = Some(Instant::now());
        }
        self.paused = false;
    }

    fn stop(&mut self) {
        self.current = None;
        self.paused = false;
        self.started_at = None;
        self.position_offset = Duration::ZERO;
        self.track_duration = None;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn current_source(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn position(&self) -> Option<Duration> {
        self.current.as_ref()?;
        Some(self.current_position())
    }

    fn duration(&self) -> Option<Duration> {
        self.track_duration
    }

    fn seek_to(&mut self, position: Duration) -> Result<()> {
        if self.current.is_none() {
            return Err(PlayerError::Media(String::from("no active track")));
        }

        self.position_offset = self
            .track_duration
            .map_or(position, |duration| position.min(duration));
        self.started_at = if self.paused {
            None
        } else {
            Some(Instant::now())
        };
        Ok(())
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, MAX_VOLUME);
    }

    fn output_name(&self) -> Option<String> {
        Some(String::from("Null audio engine"))
    }

    fn is_finished(&self) -> bool {
        let Some(duration) = self.track_duration else {
            return false;
        };
        self.current.is_some() && !self.paused && self.current_position() >= duration
    }
}
