use std::cell::Cell;

use super::components::*;
use super::{Channel, SequencerStep};
use crate::io::apu::registers::*;
use crate::io::MemoryHandler;

pub struct Wave {
    // Registers
    regs: RegisterFile<ChannelReg>,
    enabled: bool,
    // Sound Generation
    length_counter: LengthCounter,
    wave_ram: [u8; WAVE_RAM_SIZE],
    wave_ram_i: usize,
    timer: Timer<u16>,
    ticks_since_access: Cell<u32>,
    output: u8,
}

impl Wave {
    const VOLUME_SHIFTS: [u8; 4] = [4, 0, 1, 2];
    const SAMPLES: usize = 2 * WAVE_RAM_SIZE;
    // Cycles after a sample fetch or CPU read during which the playing byte stays latched
    const ACCESS_WINDOW: u32 = 2;

    pub fn new() -> Wave {
        Wave {
            // Registers
            regs: RegisterFile::new(),
            enabled: false,
            // Sound Generation
            length_counter: LengthCounter::new(256),
            wave_ram: [0; WAVE_RAM_SIZE],
            wave_ram_i: 0,
            timer: Timer::new(4096),
            ticks_since_access: Cell::new(Wave::ACCESS_WINDOW),
            output: 0,
        }
    }

    fn calc_reload(&self) -> u16 {
        (2048 - self.frequency()) * 2
    }

    pub fn frequency(&self) -> u16 {
        ((self.regs.get(ChannelReg::NR4) & 0x7) as u16) << 8 | self.regs.get(ChannelReg::NR3) as u16
    }

    pub fn position(&self) -> usize {
        self.wave_ram_i
    }

    pub fn length(&self) -> u16 {
        self.length_counter.length()
    }

    fn dac_enabled(&self) -> bool {
        self.regs.get(ChannelReg::NR0) >> 7 & 0x1 != 0
    }

    fn volume_code(&self) -> usize {
        (self.regs.get(ChannelReg::NR2) >> 5 & 0x3) as usize
    }

    fn use_length(&self) -> bool {
        self.regs.get(ChannelReg::NR4) >> 6 & 0x1 != 0
    }

    fn playing_byte(&self) -> usize {
        self.wave_ram_i / 2
    }

    /// While playing, and for a couple of cycles after the last access, the
    /// CPU sees the byte being played instead of the addressed one.
    fn read_wave_ram(&self, offset: usize) -> u8 {
        if self.is_enabled() || self.ticks_since_access.get() < Wave::ACCESS_WINDOW {
            self.ticks_since_access.set(0);
            self.wave_ram[self.playing_byte()]
        } else { self.wave_ram[offset] }
    }
}

impl Channel for Wave {
    fn tick(&mut self, step: SequencerStep) {
        if step.clocks_length() && self.length_counter.clock(self.use_length()) {
            self.enabled = false;
        }
    }

    fn step(&mut self) {
        self.ticks_since_access.set(self.ticks_since_access.get().saturating_add(1));
        if self.timer.clock_with_reload(self.calc_reload()) {
            self.wave_ram_i = (self.wave_ram_i + 1) % Wave::SAMPLES;
            if self.is_enabled() {
                let byte = self.wave_ram[self.playing_byte()];
                let sample = if self.wave_ram_i % 2 == 0 { byte >> 4 } else { byte & 0xF };
                self.output = sample >> Wave::VOLUME_SHIFTS[self.volume_code()];
                self.ticks_since_access.set(0);
            } else { self.output = 0 }
        }
    }

    fn trigger(&mut self) {
        self.enabled = true;
        self.length_counter.reload_if_exhausted();
        self.timer.reload(self.calc_reload());
        self.wave_ram_i = 0;
        if !self.dac_enabled() { self.enabled = false }
    }

    fn is_enabled(&self) -> bool {
        self.enabled && self.dac_enabled()
    }

    fn output_amplitude(&self) -> u8 {
        if self.is_enabled() { self.output } else { 0 }
    }

    fn power_off(&mut self) {
        let wave_ram = self.wave_ram;
        *self = Wave::new();
        self.wave_ram = wave_ram;
    }
}

impl MemoryHandler for Wave {
    fn read8(&self, addr: u16) -> Option<u8> {
        match addr {
            WAVE_RAM_START ..= WAVE_RAM_END => Some(self.read_wave_ram((addr - WAVE_RAM_START) as usize)),
            _ => {
                let reg = ChannelReg::from_addr(REGS_CH3_START, addr)?;
                Some(self.regs.get(reg) | ReadMask::WAVE[reg as usize])
            },
        }
    }

    fn write8(&mut self, addr: u16, value: u8) {
        if let WAVE_RAM_START ..= WAVE_RAM_END = addr {
            self.wave_ram[(addr - WAVE_RAM_START) as usize] = value;
            return
        }
        let reg = match ChannelReg::from_addr(REGS_CH3_START, addr) {
            Some(reg) => reg,
            None => return,
        };
        self.regs.set(reg, value);
        match reg {
            ChannelReg::NR0 => if !self.dac_enabled() { self.enabled = false },
            ChannelReg::NR1 => self.length_counter.load(value),
            ChannelReg::NR2 | ChannelReg::NR3 => (),
            ChannelReg::NR4 => if value & 0x80 != 0 { self.trigger() },
        }
    }
}
