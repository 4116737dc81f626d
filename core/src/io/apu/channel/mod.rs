mod components;
mod pulse;
mod tone;
mod tone_sweep;
mod wave;
mod noise;

#[cfg(test)]
mod tests;

use std::convert::TryFrom;

use crate::error::{Error, Result};
use crate::io::MemoryHandler;

pub use tone::Tone;
pub use tone_sweep::ToneSweep;
pub use wave::Wave;
pub use noise::Noise;

/// The contract shared by the four sound channels.
pub trait Channel: MemoryHandler {
    /// Called on every frame sequencer advance.
    fn tick(&mut self, step: SequencerStep);
    /// Called once per master clock cycle.
    fn step(&mut self);
    fn trigger(&mut self);
    fn is_enabled(&self) -> bool;
    /// Linear amplitude in 0..=15, always 0 while the channel is disabled.
    fn output_amplitude(&self) -> u8;
    /// Clears the channel's registers and state when the APU powers down.
    fn power_off(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequencerStep(u8);

impl SequencerStep {
    pub const COUNT: u8 = 8;

    pub fn new(step: u8) -> Result<SequencerStep> {
        if step < SequencerStep::COUNT { Ok(SequencerStep(step)) }
        else { Err(Error::InvalidSequencerStep(step)) }
    }

    pub fn first() -> SequencerStep {
        SequencerStep(0)
    }

    pub fn next(self) -> SequencerStep {
        SequencerStep((self.0 + 1) % SequencerStep::COUNT)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    // 256 Hz
    pub fn clocks_length(self) -> bool {
        self.0 % 2 == 0
    }

    // 128 Hz
    pub fn clocks_sweep(self) -> bool {
        self.0 == 2 || self.0 == 6
    }

    // 64 Hz
    pub fn clocks_envelope(self) -> bool {
        self.0 == 7
    }
}

impl TryFrom<u8> for SequencerStep {
    type Error = Error;

    fn try_from(step: u8) -> Result<SequencerStep> {
        SequencerStep::new(step)
    }
}
