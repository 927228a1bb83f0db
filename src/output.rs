use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::{Context, Result, anyhow, bail};
use cpal::{
    FromSample, SampleFormat, SizedSample, Stream,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use tokio::{
    runtime::Runtime,
    sync::oneshot::{self, error::TryRecvError},
};

const OUTPUT_LIMIT: f32 = 0.98;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    /// The track ran out while playing.
    Finished,
}

/// Transport controls the frame loop needs from the audio side.
pub trait AudioDeck {
    fn state(&self) -> PlaybackState;
    /// Starts the loaded track from the beginning. Does nothing without a track.
    fn play(&mut self);
    fn stop(&mut self);
    fn set_volume(&mut self, gain: f32);
}

/// Decoded audio, interleaved.
#[derive(Clone, Debug)]
pub struct Track {
    samples: Vec<f32>,
    channels: usize,
    sample_rate: u32,
}

impl Track {
    pub fn new(samples: Vec<f32>, channels: usize, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            bail!("track has no channels");
        }
        if sample_rate == 0 {
            bail!("track has a sample rate of zero");
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("failed to open audio file {}", path.display()))?;
        let spec = reader.spec();
        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let full_scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|value| value as f32 / full_scale))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };
        Self::new(samples, spec.channels as usize, spec.sample_rate)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn duration_secs(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }
}

pub type SharedTransport = Arc<Mutex<Transport>>;

/// Locks the transport, recovering it if a previous holder panicked. The
/// poison flag is cleared so the failure is reported once.
fn lock_transport(transport: &SharedTransport) -> MutexGuard<'_, Transport> {
    transport.lock().unwrap_or_else(|poisoned| {
        log::error!("audio transport lock was poisoned, recovering");
        transport.clear_poison();
        poisoned.into_inner()
    })
}

/// Playback position and gain, shared between the frame loop and the output
/// stream callback.
pub struct Transport {
    track: Option<Track>,
    cursor: f64,
    state: PlaybackState,
    gain: f32,
    output_rate: f32,
}

impl Transport {
    pub fn new() -> Self {
        Self {
            track: None,
            cursor: 0.0,
            state: PlaybackState::Stopped,
            gain: 1.0,
            output_rate: 44_100.0,
        }
    }

    pub fn set_output_rate(&mut self, rate: f32) {
        self.output_rate = rate.max(1.0);
    }

    pub fn install(&mut self, track: Track) {
        self.track = Some(track);
        self.cursor = 0.0;
        self.state = PlaybackState::Stopped;
    }

    pub fn has_track(&self) -> bool {
        self.track.is_some()
    }

    /// Writes one output frame. Extra output channels repeat the last track
    /// channel.
    pub fn next_frame(&mut self, frame: &mut [f32]) {
        frame.fill(0.0);
        let Some(track) = self.track.as_ref() else {
            return;
        };
        if self.state != PlaybackState::Playing {
            return;
        }
        let index = self.cursor as usize;
        if index >= track.frames() {
            self.state = PlaybackState::Finished;
            return;
        }
        let source = &track.samples[index * track.channels..(index + 1) * track.channels];
        for (channel, slot) in frame.iter_mut().enumerate() {
            let sample = source[channel.min(track.channels - 1)];
            *slot = (sample * self.gain).clamp(-OUTPUT_LIMIT, OUTPUT_LIMIT);
        }
        self.cursor += track.sample_rate as f64 / self.output_rate as f64;
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDeck for Transport {
    fn state(&self) -> PlaybackState {
        self.state
    }

    fn play(&mut self) {
        if self.track.is_some() {
            self.cursor = 0.0;
            self.state = PlaybackState::Playing;
        }
    }

    fn stop(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Stopped;
        }
    }

    fn set_volume(&mut self, gain: f32) {
        self.gain = gain.clamp(0.0, 1.0);
    }
}

pub struct AudioEngine {
    _stream: Stream,
    transport: SharedTransport,
}

impl AudioEngine {
    pub fn start() -> Result<Self> {
        let host = cpal::default_host();
        log::info!("audio host: {}", host.id().name());
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No default audio output"))?;
        if let Ok(name) = device.name() {
            log::info!("audio device: {name}");
        }
        let supported = device.default_output_config()?;
        let config = supported.config();
        log::info!(
            "output stream: {} Hz, {} channels, {:?}",
            config.sample_rate.0,
            config.channels,
            supported.sample_format()
        );

        let transport = Arc::new(Mutex::new(Transport::new()));
        lock_transport(&transport).set_output_rate(config.sample_rate.0 as f32);
        let stream = match supported.sample_format() {
            SampleFormat::I16 => build_stream::<i16>(&device, &config, transport.clone())?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, transport.clone())?,
            _ => build_stream::<f32>(&device, &config, transport.clone())?,
        };
        stream.play()?;
        Ok(Self {
            _stream: stream,
            transport,
        })
    }

    pub fn install(&mut self, track: Track) {
        log::info!(
            "track ready: {:.1} s, {} channels, {} Hz",
            track.duration_secs(),
            track.channels(),
            track.sample_rate()
        );
        lock_transport(&self.transport).install(track);
    }
}

impl AudioDeck for AudioEngine {
    fn state(&self) -> PlaybackState {
        lock_transport(&self.transport).state()
    }

    fn play(&mut self) {
        let mut transport = lock_transport(&self.transport);
        if !transport.has_track() {
            log::debug!("play requested without a track");
        }
        transport.play();
    }

    fn stop(&mut self) {
        lock_transport(&self.transport).stop();
    }

    fn set_volume(&mut self, gain: f32) {
        lock_transport(&self.transport).set_volume(gain);
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    transport: SharedTransport,
) -> Result<Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut frame = vec![0.0_f32; channels];
    let stream = device.build_output_stream(
        config,
        move |output: &mut [T], _| fill_output_buffer(output, &mut frame, &transport),
        move |err| log::error!("audio stream error: {err}"),
        None,
    )?;
    Ok(stream)
}

fn fill_output_buffer<T>(output: &mut [T], frame: &mut [f32], transport: &SharedTransport)
where
    T: SizedSample + FromSample<f32>,
{
    let mut transport = lock_transport(transport);
    for chunk in output.chunks_mut(frame.len()) {
        transport.next_frame(frame);
        for (slot, sample) in chunk.iter_mut().zip(frame.iter()) {
            *slot = T::from_sample(*sample);
        }
    }
}

/// Decodes a track on a blocking task so the window comes up immediately.
pub struct TrackLoader {
    path: PathBuf,
    pending: Option<oneshot::Receiver<Result<Track>>>,
}

impl TrackLoader {
    pub fn spawn(runtime: &Runtime, path: PathBuf) -> Self {
        let (tx, rx) = oneshot::channel();
        let task_path = path.clone();
        runtime.spawn_blocking(move || {
            let _ = tx.send(Track::load(&task_path));
        });
        Self {
            path,
            pending: Some(rx),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the load result once, as soon as it is available.
    pub fn poll(&mut self) -> Option<Result<Track>> {
        let receiver = self.pending.as_mut()?;
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(anyhow!("audio loader stopped unexpectedly")),
        };
        self.pending = None;
        Some(result)
    }
}
