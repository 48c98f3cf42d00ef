//! Offline mixer — renders a pattern against a sample store into an interleaved buffer.
//!
//! There is no audio clock: every voice is placed at a frame offset computed
//! from its step index, shaped by its track's envelope, and summed into one
//! stereo buffer. The output is split into fixed-size chunks mixed on the
//! rayon pool; inside a chunk voices are added in pattern order, so the
//! result is the same on every run and memory stays at one buffer.

pub mod clock;
pub mod envelope;

pub use clock::StepClock;
pub use envelope::{envelope_gain, gain_curve};

use std::fmt;

use rayon::prelude::*;

use crate::pattern::{self, Pattern, Track, STEPS_PER_TRACK};
use crate::sample::SampleStore;
use crate::wav::{self, EncodeError};

/// Output channel count of every render.
pub const OUTPUT_CHANNELS: u16 = 2;

/// Errors that stop a render before any mixing happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A tempo of 0 BPM has no finite duration.
    InvalidTempo(u32),
    /// The sample store runs at 0 Hz.
    InvalidSampleRate(u32),
    /// The render would not fit in one WAV file.
    TooLong { frames: usize },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidTempo(bpm) => write!(f, "invalid tempo: {bpm} BPM"),
            RenderError::InvalidSampleRate(rate) => write!(f, "invalid sample rate: {rate} Hz"),
            RenderError::TooLong { frames } => write!(
                f,
                "pattern too long: {frames} frames, a WAV file holds at most {}",
                wav::max_frames(OUTPUT_CHANNELS)
            ),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<EncodeError> for RenderError {
    fn from(e: EncodeError) -> Self {
        match e {
            EncodeError::TooLong { frames, .. } => RenderError::TooLong { frames },
        }
    }
}

/// Interleaved f32 audio produced by [`render`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBuffer {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl RenderBuffer {
    /// `frames` frames of silence.
    pub fn silent(frames: usize, channels: u16, sample_rate: u32) -> Self {
        let channels = channels.max(1);
        Self {
            samples: vec![0.0; frames * channels as usize],
            channels,
            sample_rate,
        }
    }

    /// Wrap existing interleaved samples. A trailing partial frame is dropped.
    pub fn from_interleaved(mut samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        let channels = channels.max(1);
        let whole = samples.len() - samples.len() % channels as usize;
        samples.truncate(whole);
        Self {
            samples,
            channels,
            sample_rate,
        }
    }

    /// Interleaved samples, `frames() * channels()` long.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// One frame: a sample for each channel.
    pub fn frame(&self, index: usize) -> &[f32] {
        let channels = self.channels as usize;
        &self.samples[index * channels..(index + 1) * channels]
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    /// Whether every sample is exactly zero.
    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0.0)
    }
}

/// A track whose drum resolved, shaped and placed, ready to mix.
struct Voice {
    /// Envelope-shaped sample, one buffer per output channel.
    shaped: Vec<Vec<f32>>,
    /// Start frame of every trigger that lands inside the render, ascending.
    onsets: Vec<usize>,
}

impl Voice {
    fn frames(&self) -> usize {
        self.shaped.first().map_or(0, Vec::len)
    }
}

/// Render `pattern` against `store` into a stereo buffer at the store's sample rate.
///
/// Tracks whose drum is missing from the store are skipped with a warning.
/// Step arrays are repaired first. Triggers that land past the end of the
/// buffer (when `bars` is shorter than the step array) are dropped. A
/// pattern too long to fit in one WAV file is rejected before any audio is
/// allocated.
pub fn render(pattern: &Pattern, store: &SampleStore) -> Result<RenderBuffer, RenderError> {
    if pattern.bpm() == 0 {
        return Err(RenderError::InvalidTempo(pattern.bpm()));
    }
    let sample_rate = store.sample_rate();
    if sample_rate == 0 {
        return Err(RenderError::InvalidSampleRate(sample_rate));
    }

    let clock = StepClock::for_pattern(pattern, sample_rate);
    let frames = clock.frames_for(pattern.total_steps());
    if frames > wav::max_frames(OUTPUT_CHANNELS) {
        return Err(RenderError::TooLong { frames });
    }

    if pattern.total_steps() as usize != STEPS_PER_TRACK {
        log::warn!(
            "pattern has {} bars ({} steps) but tracks carry {STEPS_PER_TRACK} steps; rendering {} bars",
            pattern.bars(),
            pattern.total_steps(),
            pattern.bars()
        );
    }

    let channels = OUTPUT_CHANNELS as usize;
    log::debug!(
        "rendering {} tracks at {} BPM: {} frames ({:.3} s) @ {} Hz",
        pattern.tracks.len(),
        pattern.bpm(),
        frames,
        pattern.duration_secs(),
        sample_rate
    );

    let voices: Vec<Voice> = pattern
        .tracks
        .par_iter()
        .filter_map(|track| prepare(track, store, &clock, frames, channels))
        .collect();

    let mut buffer = RenderBuffer::silent(frames, OUTPUT_CHANNELS, sample_rate);
    buffer
        .samples
        .par_chunks_mut(MIX_CHUNK_FRAMES * channels)
        .enumerate()
        .for_each(|(index, chunk)| mix_chunk(chunk, index * MIX_CHUNK_FRAMES, &voices, channels));
    Ok(buffer)
}

/// Frames mixed per parallel work unit.
const MIX_CHUNK_FRAMES: usize = 4096;

fn prepare(
    track: &Track,
    store: &SampleStore,
    clock: &StepClock,
    frames: usize,
    channels: usize,
) -> Option<Voice> {
    let sample = match store.get(&track.drum) {
        Ok(sample) => sample,
        Err(e) => {
            log::warn!("skipping track \"{}\": {e}", track.id);
            return None;
        }
    };
    let (steps, repair) = pattern::repair_steps(&track.steps);
    pattern::log_repair(&track.id, repair);

    let mut onsets = Vec::new();
    for step in (0..STEPS_PER_TRACK).filter(|&i| steps[i] == 1) {
        let start = clock.frame_at(step);
        if start >= frames {
            log::debug!(
                "track \"{}\": step {step} starts past the end of the render, dropped",
                track.id
            );
            continue;
        }
        onsets.push(start);
    }

    let gains = gain_curve(&track.envelope, sample.frames(), clock.sample_rate());
    let shaped = (0..channels)
        .map(|c| {
            sample
                .channel(c)
                .iter()
                .zip(&gains)
                .map(|(&s, &g)| s * g)
                .collect()
        })
        .collect();

    Some(Voice { shaped, onsets })
}

/// Sum every voice overlapping `chunk`, in pattern order, then trigger order.
fn mix_chunk(chunk: &mut [f32], first_frame: usize, voices: &[Voice], channels: usize) {
    let end_frame = first_frame + chunk.len() / channels;
    for voice in voices {
        let len = voice.frames();
        for &start in &voice.onsets {
            if start >= end_frame {
                break;
            }
            let from = start.max(first_frame);
            let to = (start + len).min(end_frame);
            for frame in from..to {
                let offset = frame - start;
                let at = (frame - first_frame) * channels;
                for (c, out) in chunk[at..at + channels].iter_mut().enumerate() {
                    *out += voice.shaped[c][offset];
                }
            }
        }
    }
}
