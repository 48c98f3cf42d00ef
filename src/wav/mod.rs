//! Container encoder — serializes a render buffer as a 16-bit PCM WAV file.

pub mod header;

pub use header::{max_frames, WavHeader, BITS_PER_SAMPLE, HEADER_LEN, MAX_DATA_LEN};

use std::fmt;
use std::io::{self, Write};

use crate::render::RenderBuffer;

/// A buffer that cannot be written as a single WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The 16-bit payload is larger than a RIFF chunk can describe.
    TooLong { frames: usize, channels: u16 },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::TooLong { frames, channels } => write!(
                f,
                "{frames} frames of {channels}-channel audio exceed the WAV size limit ({} frames)",
                max_frames(*channels)
            ),
        }
    }
}

impl std::error::Error for EncodeError {}

impl From<EncodeError> for io::Error {
    fn from(e: EncodeError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, e)
    }
}

/// Exact encoded size of `buffer`: `44 + frames * channels * 2`.
pub fn encoded_len(buffer: &RenderBuffer) -> usize {
    HEADER_LEN + buffer.samples().len() * 2
}

/// Quantize one sample to signed 16-bit.
///
/// Clamped to [-1, 1]; negative values scale by 32768, non-negative by 32767,
/// truncating toward zero. NaN becomes 0.
#[inline]
pub fn quantize(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

fn header_for(buffer: &RenderBuffer) -> Result<WavHeader, EncodeError> {
    WavHeader::new(buffer.channels(), buffer.sample_rate(), buffer.frames()).ok_or(
        EncodeError::TooLong {
            frames: buffer.frames(),
            channels: buffer.channels(),
        },
    )
}

/// Encode `buffer` as a complete WAV file in memory.
///
/// Buffers returned by [`render`](crate::render::render) always fit; only a
/// hand-built buffer past [`max_frames`] is rejected.
pub fn encode(buffer: &RenderBuffer) -> Result<Vec<u8>, EncodeError> {
    let header = header_for(buffer)?;
    let mut out = Vec::with_capacity(encoded_len(buffer));
    out.extend_from_slice(&header.to_bytes());
    for &sample in buffer.samples() {
        out.extend_from_slice(&quantize(sample).to_le_bytes());
    }
    Ok(out)
}

/// Stream the same bytes as [`encode`] into `writer`.
///
/// An oversized buffer fails with [`io::ErrorKind::InvalidInput`] before
/// anything is written.
pub fn encode_to<W: Write>(buffer: &RenderBuffer, mut writer: W) -> io::Result<()> {
    let header = header_for(buffer)?;
    writer.write_all(&header.to_bytes())?;
    for chunk in buffer.samples().chunks(4096) {
        let bytes: Vec<u8> = chunk
            .iter()
            .flat_map(|&s| quantize(s).to_le_bytes())
            .collect();
        writer.write_all(&bytes)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn quantize_full_scale() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(1.0), 32767);
        assert_eq!(quantize(-1.0), -32768);
        assert_eq!(quantize(0.5), 16383);
        assert_eq!(quantize(-0.5), -16384);
    }

    #[test]
    fn quantize_saturates_instead_of_wrapping() {
        assert_eq!(quantize(1.5), 32767);
        assert_eq!(quantize(100.0), 32767);
        assert_eq!(quantize(-1.5), -32768);
        assert_eq!(quantize(f32::INFINITY), 32767);
        assert_eq!(quantize(f32::NEG_INFINITY), -32768);
    }

    #[test]
    fn quantize_nan_is_silence() {
        assert_eq!(quantize(f32::NAN), 0);
    }

    #[test]
    fn size_is_known_ahead_of_time() {
        let buffer = RenderBuffer::silent(1000, 2, 44100);
        assert_eq!(encoded_len(&buffer), 44 + 1000 * 2 * 2);
        assert_eq!(encode(&buffer).unwrap().len(), encoded_len(&buffer));
    }

    #[test]
    fn payload_is_interleaved_little_endian() {
        let buffer = RenderBuffer::from_interleaved(vec![1.0, -1.0, 0.5, 0.0], 2, 8000);
        let bytes = encode(&buffer).unwrap();
        assert_eq!(&bytes[44..], &[0xff, 0x7f, 0x00, 0x80, 0xff, 0x3f, 0x00, 0x00]);
    }

    #[test]
    fn hound_reads_it_back() {
        let buffer = RenderBuffer::from_interleaved(vec![0.25, -0.25, 2.0, -2.0], 2, 22050);
        let bytes = encode(&buffer).unwrap();
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        let samples: Vec<i16> = reader.into_samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(samples, vec![8191, -8192, 32767, -32768]);
    }

    #[test]
    fn empty_buffer_is_header_only() {
        let buffer = RenderBuffer::silent(0, 2, 44100);
        let bytes = encode(&buffer).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(&bytes[40..44], &0u32.to_le_bytes());
    }

    #[test]
    fn streamed_bytes_match_in_memory() {
        let samples: Vec<f32> = (0..10_000).map(|i| (i as f32 * 0.01).sin()).collect();
        let buffer = RenderBuffer::from_interleaved(samples, 2, 44100);
        let mut streamed = Vec::new();
        encode_to(&buffer, &mut streamed).unwrap();
        assert_eq!(streamed, encode(&buffer).unwrap());
    }

    #[test]
    fn too_long_error_names_the_limit() {
        let err = EncodeError::TooLong {
            frames: 1_200_000_000,
            channels: 2,
        };
        let message = err.to_string();
        assert!(message.contains("1200000000 frames"));
        assert!(message.contains(&max_frames(2).to_string()));
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidInput);
    }
}
