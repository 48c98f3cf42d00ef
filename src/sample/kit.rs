//! The compiled-in drum kit.
//!
//! Each entry is a short mono 16-bit WAV at [`KIT_SAMPLE_RATE`], stored as
//! base64 text. Some entries deliberately use the URL-safe alphabet or omit
//! padding; [`decode_text`](super::text::decode_text) normalizes both.

/// Native sample rate of every embedded waveform.
pub const KIT_SAMPLE_RATE: u32 = 44100;

/// Drum key → embedded base64 WAV.
pub const KIT: &[(&str, &str)] = &[
    ("kick", include_str!("kit/kick.b64")),
    ("snare", include_str!("kit/snare.b64")),
    ("hihat", include_str!("kit/hihat.b64")),
    ("open_hat", include_str!("kit/open_hat.b64")),
    ("clap", include_str!("kit/clap.b64")),
];
