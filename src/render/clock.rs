//! Step-to-frame conversion.
//!
//! Musical time is counted in whole sixteenth-note steps; conversion to
//! frame offsets happens only here, at the rendering boundary.

use crate::pattern::Pattern;

/// Maps step indices onto frame offsets for one pattern at one sample rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepClock {
    seconds_per_step: f64,
    sample_rate: u32,
}

impl StepClock {
    pub fn new(seconds_per_step: f64, sample_rate: u32) -> Self {
        Self {
            seconds_per_step,
            sample_rate,
        }
    }

    /// Clock for `pattern`'s tempo.
    pub fn for_pattern(pattern: &Pattern, sample_rate: u32) -> Self {
        Self::new(pattern.seconds_per_step(), sample_rate)
    }

    pub fn seconds_per_step(&self) -> f64 {
        self.seconds_per_step
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Onset time of `step` in seconds.
    pub fn step_time(&self, step: usize) -> f64 {
        step as f64 * self.seconds_per_step
    }

    /// First frame of `step`: `round(step * seconds_per_step * sample_rate)`.
    pub fn frame_at(&self, step: usize) -> usize {
        (self.step_time(step) * self.sample_rate as f64).round() as usize
    }

    /// Frames needed to hold `steps` steps: `ceil(sample_rate * duration)`.
    pub fn frames_for(&self, steps: u32) -> usize {
        let duration = steps as f64 * self.seconds_per_step;
        (self.sample_rate as f64 * duration).ceil() as usize
    }
}
