//! Step arrays — lenient wire decoding and fixed-length repair.

use serde::{Deserialize, Deserializer};

/// Every track carries exactly this many sixteenth-note steps.
pub const STEPS_PER_TRACK: usize = 64;

/// A repaired trigger array: `1` for a hit, `0` for silence.
pub type Steps = [u8; STEPS_PER_TRACK];

/// What [`repair_steps`] had to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepRepair {
    /// Already 64 strict 0/1 values.
    Intact,
    /// Right length, but some values were neither 0 nor 1.
    Coerced,
    /// Wrong length; truncated or zero-padded to 64.
    Resized { original_len: usize },
}

/// Bring a raw step array to exactly [`STEPS_PER_TRACK`] strict 0/1 values.
///
/// Positions below `min(64, raw.len())` are copied with any non-1 value
/// turned into 0; missing positions are 0. Pure and idempotent.
pub fn repair_steps(raw: &[u8]) -> (Steps, StepRepair) {
    let mut steps = [0u8; STEPS_PER_TRACK];
    let mut coerced = false;
    for (slot, &value) in steps.iter_mut().zip(raw) {
        *slot = u8::from(value == 1);
        coerced |= value > 1;
    }

    let repair = if raw.len() != STEPS_PER_TRACK {
        StepRepair::Resized {
            original_len: raw.len(),
        }
    } else if coerced {
        StepRepair::Coerced
    } else {
        StepRepair::Intact
    };
    (steps, repair)
}

/// Deserialize a step array from JSON numbers, booleans, or nulls.
///
/// `1`, `1.0` and `true` become 1. Other integers that fit in a byte are kept
/// as-is so repair can report them; everything else becomes 0.
///
/// A boolean grid is read as a trigger grid: `true` fires exactly like `1`.
pub(crate) fn deserialize_steps<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .iter()
        .map(|value| match value {
            serde_json::Value::Bool(true) => 1,
            serde_json::Value::Number(n) => match n.as_u64() {
                Some(v) => u8::try_from(v).unwrap_or(0),
                None => u8::from(n.as_f64() == Some(1.0)),
            },
            _ => 0,
        })
        .collect())
}
