use super::components::Sweep;
use super::pulse::Pulse;
use super::{Channel, SequencerStep};
use crate::io::apu::registers::{ChannelReg, ReadMask, REGS_CH1_START};
use crate::io::MemoryHandler;

/// Channel 1: a tone channel with a frequency sweep unit.
pub struct ToneSweep {
    pulse: Pulse,
    sweep: Sweep,
}

impl ToneSweep {
    pub fn new() -> ToneSweep {
        ToneSweep {
            pulse: Pulse::new(),
            sweep: Sweep::new(),
        }
    }

    pub fn frequency(&self) -> u16 {
        self.pulse.frequency()
    }

    pub fn sweep_shadow(&self) -> u16 {
        self.sweep.shadow()
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

impl Channel for ToneSweep {
    fn tick(&mut self, step: SequencerStep) {
        self.pulse.tick(step);
        if step.clocks_sweep() {
            if let Some(freq) = self.sweep.clock() { self.pulse.set_frequency(freq) }
        }
    }

    fn step(&mut self) {
        self.pulse.step();
    }

    fn trigger(&mut self) {
        self.pulse.trigger();
        self.sweep.trigger(self.pulse.frequency());
    }

    fn is_enabled(&self) -> bool {
        self.pulse.is_enabled() && self.sweep.should_play()
    }

    fn output_amplitude(&self) -> u8 {
        if self.sweep.should_play() { self.pulse.output_amplitude() } else { 0 }
    }

    fn power_off(&mut self) {
        self.pulse.power_off();
        self.sweep = Sweep::new();
    }
}

impl MemoryHandler for ToneSweep {
    fn read8(&self, addr: u16) -> Option<u8> {
        let reg = ChannelReg::from_addr(REGS_CH1_START, addr)?;
        Some(self.pulse.read(reg, ReadMask::SQUARE1[reg as usize]))
    }

    fn write8(&mut self, addr: u16, value: u8) {
        if let Some(reg) = ChannelReg::from_addr(REGS_CH1_START, addr) {
            if reg == ChannelReg::NR0 { self.sweep.write(value) }
            if self.pulse.write(reg, value) { self.trigger() }
        }
    }
}
