use super::components::*;
use super::{Channel, SequencerStep};
use crate::io::apu::registers::{ChannelReg, ReadMask, RegisterFile, REGS_CH4_START};
use crate::io::MemoryHandler;

pub struct Noise {
    // Registers
    regs: RegisterFile<ChannelReg>,
    enabled: bool,
    envelope: Envelope,
    // Sound Generation
    length_counter: LengthCounter,
    timer: Timer<u32>,
    lfsr: Lfsr,
}

impl Noise {
    const DIVISORS: [u32; 8] = [8, 16, 32, 48, 64, 80, 96, 112];

    pub fn new() -> Noise {
        Noise {
            // Registers
            regs: RegisterFile::new(),
            enabled: false,
            envelope: Envelope::new(),
            // Sound Generation
            length_counter: LengthCounter::new(64),
            timer: Timer::new(8),
            lfsr: Lfsr::new(),
        }
    }

    fn calc_reload(&self) -> u32 {
        Noise::DIVISORS[self.divisor_code()] << self.clock_shift()
    }

    fn divisor_code(&self) -> usize {
        (self.regs.get(ChannelReg::NR3) & 0x7) as usize
    }

    fn counter_7bit(&self) -> bool {
        self.regs.get(ChannelReg::NR3) >> 3 & 0x1 != 0
    }

    fn clock_shift(&self) -> u8 {
        self.regs.get(ChannelReg::NR3) >> 4 & 0xF
    }

    fn use_length(&self) -> bool {
        self.regs.get(ChannelReg::NR4) >> 6 & 0x1 != 0
    }

    fn dac_enabled(&self) -> bool {
        Envelope::dac_enabled(self.regs.get(ChannelReg::NR2))
    }

    pub fn lfsr(&self) -> u16 {
        self.lfsr.bits()
    }

    pub fn timer_counter(&self) -> u32 {
        self.timer.counter()
    }

    pub fn volume(&self) -> u8 {
        self.envelope.get_volume()
    }

    pub fn length(&self) -> u16 {
        self.length_counter.length()
    }
}

impl Channel for Noise {
    fn tick(&mut self, step: SequencerStep) {
        if step.clocks_length() && self.length_counter.clock(self.use_length()) {
            self.enabled = false;
        }
        if step.clocks_envelope() { self.envelope.clock() }
    }

    fn step(&mut self) {
        if self.timer.clock_with_reload(self.calc_reload()) {
            self.lfsr.shift(self.counter_7bit());
        }
    }

    fn trigger(&mut self) {
        self.enabled = true;
        self.length_counter.reload_if_exhausted();
        self.timer.reload(self.calc_reload());
        self.envelope.reset();
        self.lfsr.reset();
        if !self.dac_enabled() { self.enabled = false }
    }

    fn is_enabled(&self) -> bool {
        self.enabled && self.dac_enabled()
    }

    fn output_amplitude(&self) -> u8 {
        if self.is_enabled() && self.lfsr.audible() { self.envelope.get_volume() } else { 0 }
    }

    fn power_off(&mut self) {
        *self = Noise::new();
    }
}

impl MemoryHandler for Noise {
    fn read8(&self, addr: u16) -> Option<u8> {
        let reg = ChannelReg::from_addr(REGS_CH4_START, addr)?;
        Some(self.regs.get(reg) | ReadMask::NOISE[reg as usize])
    }

    fn write8(&mut self, addr: u16, value: u8) {
        let reg = match ChannelReg::from_addr(REGS_CH4_START, addr) {
            Some(reg) => reg,
            None => return,
        };
        self.regs.set(reg, value);
        match reg {
            ChannelReg::NR0 | ChannelReg::NR3 => (),
            ChannelReg::NR1 => self.length_counter.load(value & 0x3F),
            ChannelReg::NR2 => {
                self.envelope.write(value);
                if !self.dac_enabled() { self.enabled = false }
            },
            ChannelReg::NR4 => if value & 0x80 != 0 { self.trigger() },
        }
    }
}
