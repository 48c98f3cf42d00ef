//! Pattern model — the validated, in-memory form of a step-sequenced beat.
//!
//! The wire shape matches what the pattern producer emits:
//!
//! ```json
//! {
//!   "meta": { "bpm": 120, "bars": 4 },
//!   "tracks": [
//!     { "id": "d_kick", "type": "drum", "drum": "kick",
//!       "steps": [1, 0, 0, 0, ...],
//!       "adsr": { "attack": 0.0, "decay": 0.1, "sustain": 0.8, "release": 0.05 } }
//!   ]
//! }
//! ```

pub mod steps;

pub use steps::{repair_steps, StepRepair, Steps, STEPS_PER_TRACK};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Steps per bar: one bar of sixteenth notes.
pub const STEPS_PER_BAR: u32 = 16;

/// Bar count assumed when the producer omits it.
pub const DEFAULT_BARS: u32 = 4;

/// Errors from parsing a pattern at the input boundary.
#[derive(Debug)]
pub enum PatternError {
    /// Malformed JSON or a missing required field.
    Json(serde_json::Error),
    /// A track has an empty `id`.
    EmptyTrackId { index: usize },
    /// Two tracks share an `id`.
    DuplicateTrackId(String),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Json(e) => write!(f, "invalid pattern JSON: {e}"),
            PatternError::EmptyTrackId { index } => write!(f, "track {index} has an empty id"),
            PatternError::DuplicateTrackId(id) => write!(f, "duplicate track id \"{id}\""),
        }
    }
}

impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PatternError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PatternError {
    fn from(e: serde_json::Error) -> Self {
        PatternError::Json(e)
    }
}

/// Attack-Decay-Sustain-Release shaping for every voice of a track.
///
/// Attack, decay and release are seconds; sustain is a level (0.0–1.0).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Envelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Envelope {
    /// Unity gain over the whole voice: no attack, decay, or release.
    pub const PASSTHROUGH: Envelope = Envelope {
        attack: 0.0,
        decay: 0.0,
        sustain: 1.0,
        release: 0.0,
    };
}

impl Default for Envelope {
    fn default() -> Self {
        Self::PASSTHROUGH
    }
}

/// The only track kind the renderer knows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    #[default]
    Drum,
}

/// One drum lane of a pattern.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Track {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: TrackKind,
    /// Key into the sample store.
    pub drum: String,
    /// Raw trigger values as received; see [`Track::steps`] for the repaired form.
    #[serde(deserialize_with = "steps::deserialize_steps", default)]
    pub steps: Vec<u8>,
    #[serde(rename = "adsr", alias = "envelope")]
    pub envelope: Envelope,
}

impl Track {
    /// A track from already-known parts.
    pub fn new(
        id: impl Into<String>,
        drum: impl Into<String>,
        steps: Vec<u8>,
        envelope: Envelope,
    ) -> Self {
        Self {
            id: id.into(),
            kind: TrackKind::Drum,
            drum: drum.into(),
            steps,
            envelope,
        }
    }

    /// The repaired 64-step trigger array.
    pub fn steps(&self) -> Steps {
        repair_steps(&self.steps).0
    }

    /// A copy of this track whose step array is exactly 64 strict 0/1 values.
    ///
    /// Logs a warning when the length was wrong.
    pub fn repaired(&self) -> Track {
        let (steps, repair) = repair_steps(&self.steps);
        log_repair(&self.id, repair);
        Track {
            steps: steps.to_vec(),
            ..self.clone()
        }
    }

    /// Indices of the steps that fire.
    pub fn triggers(&self) -> impl Iterator<Item = usize> {
        let steps = self.steps();
        (0..STEPS_PER_TRACK).filter(move |&i| steps[i] == 1)
    }
}

pub(crate) fn log_repair(track_id: &str, repair: StepRepair) {
    match repair {
        StepRepair::Intact => {}
        StepRepair::Coerced => {
            log::debug!("track \"{track_id}\": non-binary step values coerced to 0");
        }
        StepRepair::Resized { original_len } => {
            log::warn!(
                "track \"{track_id}\" has {original_len} steps, expected {STEPS_PER_TRACK}; correcting"
            );
        }
    }
}

/// Tempo and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Meta {
    pub bpm: u32,
    #[serde(default = "default_bars")]
    pub bars: u32,
}

fn default_bars() -> u32 {
    DEFAULT_BARS
}

/// A complete beat: tempo, length, and an ordered list of tracks.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Pattern {
    pub meta: Meta,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Pattern {
    /// An empty pattern.
    pub fn new(bpm: u32, bars: u32) -> Self {
        Self {
            meta: Meta { bpm, bars },
            tracks: Vec::new(),
        }
    }

    /// Append a track (builder style).
    pub fn with_track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }

    /// Parse the producer's JSON and check track ids.
    pub fn from_json(json: &str) -> Result<Self, PatternError> {
        let pattern: Pattern = serde_json::from_str(json)?;
        pattern.validate()?;
        Ok(pattern)
    }

    /// Serialize back to the producer's JSON shape.
    pub fn to_json(&self) -> Result<String, PatternError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every track id is non-empty and unique.
    pub fn validate(&self) -> Result<(), PatternError> {
        let mut seen = HashSet::new();
        for (index, track) in self.tracks.iter().enumerate() {
            if track.id.is_empty() {
                return Err(PatternError::EmptyTrackId { index });
            }
            if !seen.insert(track.id.as_str()) {
                return Err(PatternError::DuplicateTrackId(track.id.clone()));
            }
        }
        Ok(())
    }

    /// A copy with every track's steps repaired.
    pub fn repaired(&self) -> Pattern {
        Pattern {
            meta: self.meta,
            tracks: self.tracks.iter().map(Track::repaired).collect(),
        }
    }

    pub fn bpm(&self) -> u32 {
        self.meta.bpm
    }

    pub fn bars(&self) -> u32 {
        self.meta.bars
    }

    /// `bars * 16`.
    pub fn total_steps(&self) -> u32 {
        self.meta.bars.saturating_mul(STEPS_PER_BAR)
    }

    /// Length of one sixteenth-note step: `60 / bpm / 4`.
    pub fn seconds_per_step(&self) -> f64 {
        60.0 / self.meta.bpm as f64 / 4.0
    }

    /// Total render length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.total_steps() as f64 * self.seconds_per_step()
    }
}
