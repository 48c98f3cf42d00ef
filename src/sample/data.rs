//! Sample data type — decoded PCM held as normalized per-channel f32 buffers.

use std::io::Read;

/// Errors that can occur when looking up, decoding, or converting samples.
#[derive(Debug)]
pub enum SampleError {
    /// No usable waveform is registered under this drum key.
    Unknown(String),
    /// The embedded text could not be turned back into bytes.
    Base64(base64::DecodeError),
    /// WAV decoding or I/O error.
    Wav(hound::Error),
    /// The WAV container holds no frames.
    Empty,
    /// Unsupported bit depth or format.
    UnsupportedFormat(String),
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleError::Unknown(key) => write!(f, "no sample registered for drum \"{key}\""),
            SampleError::Base64(e) => write!(f, "base64 error: {e}"),
            SampleError::Wav(e) => write!(f, "WAV error: {e}"),
            SampleError::Empty => write!(f, "WAV file contains no samples"),
            SampleError::UnsupportedFormat(s) => write!(f, "unsupported format: {s}"),
        }
    }
}

impl std::error::Error for SampleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SampleError::Base64(e) => Some(e),
            SampleError::Wav(e) => Some(e),
            _ => None,
        }
    }
}

impl From<hound::Error> for SampleError {
    fn from(e: hound::Error) -> Self {
        SampleError::Wav(e)
    }
}

impl From<base64::DecodeError> for SampleError {
    fn from(e: base64::DecodeError) -> Self {
        SampleError::Base64(e)
    }
}

/// An immutable, decoded PCM waveform.
///
/// Channels are stored separately; every channel has the same frame count.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl Sample {
    /// Create from raw mono f32 samples.
    pub fn from_mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            channels: vec![samples],
            sample_rate,
        }
    }

    /// Create from per-channel buffers. Channels longer than the shortest are truncated.
    pub fn from_channels(mut channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
        for channel in &mut channels {
            channel.truncate(frames);
        }
        if channels.is_empty() {
            channels.push(Vec::new());
        }
        Self {
            channels,
            sample_rate,
        }
    }

    /// Decode a WAV container from a reader into normalized f32 channels at `target_sample_rate`.
    ///
    /// Integer PCM of any bit depth is scaled by `2^(bits - 1)`; 32-bit float
    /// passes through. Interleaved frames are split per channel. If the source
    /// rate differs from `target_sample_rate`, each channel is resampled with
    /// linear interpolation.
    pub fn from_wav<R: Read>(reader: R, target_sample_rate: u32) -> Result<Self, SampleError> {
        let wav = hound::WavReader::new(reader)?;
        let spec = wav.spec();
        let channel_count = spec.channels as usize;
        let source_rate = spec.sample_rate;

        if channel_count == 0 {
            return Err(SampleError::UnsupportedFormat("zero channels".into()));
        }

        let raw_samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Int => {
                let bits = spec.bits_per_sample;
                if bits == 0 || bits > 32 {
                    return Err(SampleError::UnsupportedFormat(format!(
                        "{bits}-bit integer PCM"
                    )));
                }
                let max_val = (1u64 << (bits - 1)) as f32;
                wav.into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<Result<Vec<f32>, _>>()?
            }
            hound::SampleFormat::Float => {
                wav.into_samples::<f32>().collect::<Result<Vec<f32>, _>>()?
            }
        };

        if raw_samples.len() < channel_count {
            return Err(SampleError::Empty);
        }

        let frames = raw_samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in raw_samples.chunks_exact(channel_count) {
            for (channel, &s) in channels.iter_mut().zip(frame) {
                channel.push(s.clamp(-1.0, 1.0));
            }
        }

        let decoded = Self {
            channels,
            sample_rate: source_rate,
        };
        Ok(decoded.resampled(target_sample_rate))
    }

    /// Convert to `target_rate` with linear interpolation. A no-op when the rates match.
    pub fn resampled(self, target_rate: u32) -> Self {
        if self.sample_rate == target_rate {
            return self;
        }
        let channels = self
            .channels
            .iter()
            .map(|channel| resample_linear(channel, self.sample_rate, target_rate))
            .collect();
        Self {
            channels,
            sample_rate: target_rate,
        }
    }

    /// Samples for output channel `index`.
    ///
    /// Indices past the last channel map onto the last one, so a mono sample
    /// feeds every output channel.
    pub fn channel(&self, index: usize) -> &[f32] {
        let last = self.channels.len() - 1;
        &self.channels[index.min(last)]
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Natural length of the waveform in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Linear-interpolation resampling from `source_rate` to `target_rate`.
fn resample_linear(input: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if input.is_empty() || target_rate == 0 || source_rate == 0 {
        return Vec::new();
    }
    if input.len() == 1 {
        return vec![input[0]];
    }

    let ratio = source_rate as f64 / target_rate as f64;
    let output_len = ((input.len() as f64 / ratio).ceil()) as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 * ratio;
        let idx = src_pos as usize;
        let frac = (src_pos - idx as f64) as f32;

        let sample = if idx + 1 < input.len() {
            input[idx] * (1.0 - frac) + input[idx + 1] * frac
        } else {
            input[idx.min(input.len() - 1)]
        };
        output.push(sample);
    }

    output
}
