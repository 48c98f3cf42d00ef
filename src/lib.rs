//! Stepwave — offline renderer for step-sequenced drum patterns.
//!
//! A [`Pattern`] and a [`SampleStore`] go in; a 16-bit stereo WAV file comes
//! out. Rendering is deterministic and needs no audio hardware.

pub mod config;
pub mod pattern;
pub mod render;
pub mod sample;
pub mod wav;

pub use pattern::{Envelope, Pattern, PatternError, Track};
pub use render::{render, RenderBuffer, RenderError};
pub use sample::{Sample, SampleError, SampleStore};
pub use wav::{encode, EncodeError};

/// Render `pattern` and encode the result as a WAV file in memory.
pub fn render_to_wav(pattern: &Pattern, store: &SampleStore) -> Result<Vec<u8>, RenderError> {
    let buffer = render(pattern, store)?;
    Ok(encode(&buffer)?)
}
