use super::pulse::Pulse;
use super::{Channel, SequencerStep};
use crate::io::apu::registers::{ChannelReg, ReadMask, REGS_CH2_START};
use crate::io::MemoryHandler;

/// Channel 2. FF15 is mapped but has no effect.
pub struct Tone {
    pulse: Pulse,
}

impl Tone {
    pub fn new() -> Tone {
        Tone {
            pulse: Pulse::new(),
        }
    }

    pub fn frequency(&self) -> u16 {
        self.pulse.frequency()
    }

    pub fn duty_position(&self) -> u8 {
        self.pulse.duty_position()
    }

    pub fn volume(&self) -> u8 {
        self.pulse.envelope.get_volume()
    }

    pub fn length(&self) -> u16 {
        self.pulse.length_counter.length()
    }
}

impl Channel for Tone {
    fn tick(&mut self, step: SequencerStep) {
        self.pulse.tick(step);
    }

    fn step(&mut self) {
        self.pulse.step();
    }

    fn trigger(&mut self) {
        self.pulse.trigger();
    }

    fn is_enabled(&self) -> bool {
        self.pulse.is_enabled()
    }

    fn output_amplitude(&self) -> u8 {
        self.pulse.output_amplitude()
    }

    fn power_off(&mut self) {
        self.pulse.power_off();
    }
}

impl MemoryHandler for Tone {
    fn read8(&self, addr: u16) -> Option<u8> {
        let reg = ChannelReg::from_addr(REGS_CH2_START, addr)?;
        Some(self.pulse.read(reg, ReadMask::SQUARE2[reg as usize]))
    }

    fn write8(&mut self, addr: u16, value: u8) {
        if let Some(reg) = ChannelReg::from_addr(REGS_CH2_START, addr) {
            if self.pulse.write(reg, value) { self.trigger() }
        }
    }
}
