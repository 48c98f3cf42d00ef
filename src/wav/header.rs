//! The canonical 44-byte RIFF/WAVE header for 16-bit PCM.

/// Size of the header in bytes.
pub const HEADER_LEN: usize = 44;

/// Bit depth of every encoded sample.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Largest payload a RIFF chunk can describe once the rest of the header is counted.
pub const MAX_DATA_LEN: u32 = u32::MAX - (HEADER_LEN as u32 - 8);

const BYTES_PER_SAMPLE: u32 = BITS_PER_SAMPLE as u32 / 8;
const FMT_CHUNK_LEN: u32 = 16;

/// Most frames of `channels`-channel 16-bit audio a single WAV file can hold.
pub fn max_frames(channels: u16) -> usize {
    let frame_len = u32::from(channels.max(1)) * BYTES_PER_SAMPLE;
    (MAX_DATA_LEN / frame_len) as usize
}
const FORMAT_PCM: u16 = 1;

/// Header fields derived from the buffer shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    /// Size of the sample payload in bytes.
    pub data_len: u32,
}

impl WavHeader {
    /// Header for `frames` frames of `channels`-channel 16-bit audio.
    ///
    /// `None` when the payload is larger than [`MAX_DATA_LEN`].
    pub fn new(channels: u16, sample_rate: u32, frames: usize) -> Option<Self> {
        let data_len = u64::try_from(frames)
            .ok()?
            .checked_mul(u64::from(channels))?
            .checked_mul(u64::from(BYTES_PER_SAMPLE))?;
        let data_len = u32::try_from(data_len).ok().filter(|&len| len <= MAX_DATA_LEN)?;
        Some(Self {
            channels,
            sample_rate,
            data_len,
        })
    }

    pub fn block_align(&self) -> u16 {
        self.channels.saturating_mul(BYTES_PER_SAMPLE as u16)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate.saturating_mul(self.block_align() as u32)
    }

    /// RIFF chunk size: everything after the first 8 bytes.
    pub fn riff_len(&self) -> u32 {
        self.data_len + (HEADER_LEN as u32 - 8)
    }

    /// Serialize, little-endian.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(b"RIFF");
        out[4..8].copy_from_slice(&self.riff_len().to_le_bytes());
        out[8..12].copy_from_slice(b"WAVE");
        out[12..16].copy_from_slice(b"fmt ");
        out[16..20].copy_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
        out[20..22].copy_from_slice(&FORMAT_PCM.to_le_bytes());
        out[22..24].copy_from_slice(&self.channels.to_le_bytes());
        out[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.byte_rate().to_le_bytes());
        out[32..34].copy_from_slice(&self.block_align().to_le_bytes());
        out[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
        out[36..40].copy_from_slice(b"data");
        out[40..44].copy_from_slice(&self.data_len.to_le_bytes());
        out
    }
}
