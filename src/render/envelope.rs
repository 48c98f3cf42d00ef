//! Per-voice ADSR gain curve.

use crate::pattern::Envelope;

/// Gain applied to a voice `elapsed` seconds after its onset.
///
/// The curve spans the sample's natural length `sample_duration`:
///
/// - During `[0, attack)`: linear ramp from 0 to 1.
/// - During `[attack, attack+decay)`: linear ramp from 1 to sustain level.
/// - Afterwards: sustain level.
/// - During the final `release` seconds, `[duration-release, duration)`, the
///   level above is scaled by a linear ramp from 1 to 0.
/// - Outside `[0, duration)`: 0.
///
/// Negative or non-finite envelope fields count as 0.
pub fn envelope_gain(elapsed: f64, envelope: &Envelope, sample_duration: f64) -> f64 {
    if !(elapsed >= 0.0 && elapsed < sample_duration) {
        return 0.0;
    }

    let attack = non_negative(envelope.attack);
    let decay = non_negative(envelope.decay);
    let sustain = non_negative(envelope.sustain);
    let release = non_negative(envelope.release);

    let level = if elapsed < attack {
        elapsed / attack
    } else if elapsed < attack + decay {
        let decay_t = (elapsed - attack) / decay;
        1.0 - decay_t * (1.0 - sustain)
    } else {
        sustain
    };

    let remaining = sample_duration - elapsed;
    if remaining < release {
        level * (remaining / release)
    } else {
        level
    }
}

/// Gains for every frame of a voice `frames` long at `sample_rate`.
pub fn gain_curve(envelope: &Envelope, frames: usize, sample_rate: u32) -> Vec<f32> {
    let rate = sample_rate as f64;
    let duration = frames as f64 / rate;
    (0..frames)
        .map(|i| envelope_gain(i as f64 / rate, envelope, duration) as f32)
        .collect()
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
