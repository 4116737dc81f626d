use super::components::*;
use super::SequencerStep;
use crate::io::apu::registers::{ChannelReg, RegisterFile};

/// Square wave generation shared by both tone channels.
pub struct Pulse {
    regs: RegisterFile<ChannelReg>,
    enabled: bool,
    pub envelope: Envelope,
    pub length_counter: LengthCounter,
    timer: Timer<u16>,
    duty_pos: u8,
}

impl Pulse {
    const DUTY: [u8; 4] = [0b0000_0001, 0b1000_0001, 0b1000_0111, 0b0111_1110];

    pub fn new() -> Pulse {
        Pulse {
            regs: RegisterFile::new(),
            enabled: false,
            envelope: Envelope::new(),
            length_counter: LengthCounter::new(64),
            timer: Timer::new(8192),
            duty_pos: 0,
        }
    }

    pub fn read(&self, reg: ChannelReg, mask: u8) -> u8 {
        self.regs.get(reg) | mask
    }

    /// Stores `value` and applies its side effects. Returns true if the write
    /// requests a trigger.
    pub fn write(&mut self, reg: ChannelReg, value: u8) -> bool {
        self.regs.set(reg, value);
        match reg {
            ChannelReg::NR0 | ChannelReg::NR3 => (),
            ChannelReg::NR1 => self.length_counter.load(value & 0x3F),
            ChannelReg::NR2 => {
                self.envelope.write(value);
                if !self.dac_enabled() { self.enabled = false }
            },
            ChannelReg::NR4 => return value & 0x80 != 0,
        }
        false
    }

    pub fn tick(&mut self, step: SequencerStep) {
        if step.clocks_length() && self.length_counter.clock(self.use_length()) {
            self.enabled = false;
        }
        if step.clocks_envelope() { self.envelope.clock() }
    }

    pub fn step(&mut self) {
        if self.timer.clock_with_reload(self.calc_reload()) {
            self.duty_pos = (self.duty_pos + 1) % 8;
        }
    }

    pub fn trigger(&mut self) {
        self.enabled = true;
        self.length_counter.reload_if_exhausted();
        self.timer.reload(self.calc_reload());
        self.duty_pos = 0;
        self.envelope.reset();
        if !self.dac_enabled() { self.enabled = false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.dac_enabled()
    }

    pub fn output_amplitude(&self) -> u8 {
        let duty = Pulse::DUTY[self.duty() as usize];
        if self.is_enabled() && duty >> self.duty_pos & 0x1 != 0 {
            self.envelope.get_volume()
        } else { 0 }
    }

    pub fn power_off(&mut self) {
        *self = Pulse::new();
    }

    pub fn frequency(&self) -> u16 {
        ((self.regs.get(ChannelReg::NR4) & 0x7) as u16) << 8 | self.regs.get(ChannelReg::NR3) as u16
    }

    pub fn set_frequency(&mut self, freq: u16) {
        self.regs.set(ChannelReg::NR3, freq as u8);
        let nr4 = self.regs.get(ChannelReg::NR4);
        self.regs.set(ChannelReg::NR4, nr4 & !0x7 | (freq >> 8) as u8 & 0x7);
    }

    pub fn duty_position(&self) -> u8 {
        self.duty_pos
    }

    fn duty(&self) -> u8 {
        self.regs.get(ChannelReg::NR1) >> 6 & 0x3
    }

    fn use_length(&self) -> bool {
        self.regs.get(ChannelReg::NR4) >> 6 & 0x1 != 0
    }

    fn dac_enabled(&self) -> bool {
        Envelope::dac_enabled(self.regs.get(ChannelReg::NR2))
    }

    fn calc_reload(&self) -> u16 {
        (2048 - self.frequency()) * 4
    }
}
