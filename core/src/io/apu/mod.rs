pub mod audio;
pub mod registers;
pub mod channel;


use std::mem;

use crate::error::Result;
use crate::gb::AudioConfig;
use super::MemoryHandler;

use audio::AudioSink;
use registers::*;
use channel::*;

pub struct APU<S: AudioSink> {
    // Channels
    tone_sweep: ToneSweep,
    tone: Tone,
    wave: Wave,
    noise: Noise,
    // Sound Control Registers
    regs: RegisterFile<ControlReg>,

    // Sound Generation
    sink: S,
    buffer: Vec<u8>,
    buffer_size: usize,
    sequencer_step: SequencerStep,
    sequencer_clock: u32,
    sequencer_reload: u32,
    sample_clock: u32,
    sample_reload: u32,
}

impl<S: AudioSink> APU<S> {
    pub fn new(config: AudioConfig, sink: S) -> Result<APU<S>> {
        config.validate()?;
        let mut regs = RegisterFile::new();
        regs.set(ControlReg::NR52, SoundStatus::POWER.bits());
        Ok(APU {
            // Channels
            tone_sweep: ToneSweep::new(),
            tone: Tone::new(),
            wave: Wave::new(),
            noise: Noise::new(),
            // Sound Control Registers
            regs,

            // Sound Generation
            sink,
            buffer: Vec::with_capacity(config.buffer_size),
            buffer_size: config.buffer_size,
            sequencer_step: SequencerStep::first(),
            sequencer_clock: config.sequencer_countdown(),
            sequencer_reload: config.sequencer_countdown(),
            sample_clock: config.sample_countdown(),
            sample_reload: config.sample_countdown(),
        })
    }

    /// Advances the APU by one master clock cycle.
    pub fn clock(&mut self) {
        if self.powered() {
            self.clock_sequencer();
            for channel in self.channels_mut().iter_mut() { channel.step() }
        }

        self.generate_sample();
    }

    fn clock_sequencer(&mut self) {
        self.sequencer_clock -= 1;
        if self.sequencer_clock == 0 {
            self.sequencer_clock = self.sequencer_reload;
            let step = self.sequencer_step;
            for channel in self.channels_mut().iter_mut() { channel.tick(step) }
            self.sequencer_step = step.next();
        }
    }

    fn generate_sample(&mut self) {
        self.sample_clock -= 1;
        if self.sample_clock == 0 {
            self.sample_clock = self.sample_reload;
            let left = self.mix(Side::Left);
            let right = self.mix(Side::Right);
            self.buffer.push(left);
            self.buffer.push(right);
            if self.buffer.len() >= self.buffer_size { self.flush() }
        }
    }

    fn mix(&self, side: Side) -> u8 {
        let routing = side.routing(self.regs.get(ControlReg::NR51));
        let volume = side.master_volume(self.regs.get(ControlReg::NR50)) as u16;
        let flags = [ChannelFlags::CH1, ChannelFlags::CH2, ChannelFlags::CH3, ChannelFlags::CH4];
        let sum: u16 = self.channels().iter().zip(flags.iter())
            .filter(|(_, flag)| routing.contains(**flag))
            .map(|(channel, _)| channel.output_amplitude() as u16)
            .sum();
        (sum / 4 * volume).min(u8::MAX as u16) as u8
    }

    fn flush(&mut self) {
        let buffer = mem::replace(&mut self.buffer, Vec::with_capacity(self.buffer_size));
        self.sink.queue(buffer);
    }

    /// Flushes any partial buffer, waits for the sink to play everything out
    /// and hands it back.
    pub fn shutdown(mut self) -> S {
        if !self.buffer.is_empty() { self.flush() }
        self.sink.drain();
        self.sink
    }

    pub fn sequencer_step(&self) -> SequencerStep {
        self.sequencer_step
    }

    pub fn tone_sweep(&self) -> &ToneSweep {
        &self.tone_sweep
    }

    pub fn tone(&self) -> &Tone {
        &self.tone
    }

    pub fn wave(&self) -> &Wave {
        &self.wave
    }

    pub fn noise(&self) -> &Noise {
        &self.noise
    }

    pub fn claims(&self, addr: u16) -> bool {
        (REGS_CH1_START ..= WAVE_RAM_END).contains(&addr)
    }

    fn channels(&self) -> [&dyn Channel; 4] {
        [&self.tone_sweep, &self.tone, &self.wave, &self.noise]
    }

    fn channels_mut(&mut self) -> [&mut dyn Channel; 4] {
        [&mut self.tone_sweep, &mut self.tone, &mut self.wave, &mut self.noise]
    }

    fn powered(&self) -> bool {
        SoundStatus::from_bits_truncate(self.regs.get(ControlReg::NR52)).contains(SoundStatus::POWER)
    }

    fn status(&self) -> SoundStatus {
        let mut status = SoundStatus::from_bits_truncate(self.regs.get(ControlReg::NR52)) & SoundStatus::POWER;
        status.set(SoundStatus::CH1_ON, self.tone_sweep.is_enabled());
        status.set(SoundStatus::CH2_ON, self.tone.is_enabled());
        status.set(SoundStatus::CH3_ON, self.wave.is_enabled());
        status.set(SoundStatus::CH4_ON, self.noise.is_enabled());
        status
    }

    fn write_status(&mut self, value: u8) {
        let power = SoundStatus::from_bits_truncate(value).contains(SoundStatus::POWER);
        match (self.powered(), power) {
            (true, false) => {
                debug!("APU powered off");
                for channel in self.channels_mut().iter_mut() { channel.power_off() }
                self.regs.clear();
            },
            (false, true) => {
                debug!("APU powered on");
                self.regs.set(ControlReg::NR52, SoundStatus::POWER.bits());
                self.sequencer_step = SequencerStep::first();
                self.sequencer_clock = self.sequencer_reload;
            },
            _ => (),
        }
    }
}

impl<S: AudioSink> MemoryHandler for APU<S> {
    fn read8(&self, addr: u16) -> Option<u8> {
        match addr {
            0xFF10 ..= 0xFF14 => self.tone_sweep.read8(addr),
            0xFF15 ..= 0xFF19 => self.tone.read8(addr),
            0xFF1A ..= 0xFF1E | 0xFF30 ..= 0xFF3F => self.wave.read8(addr),
            0xFF1F ..= 0xFF23 => self.noise.read8(addr),
            REG_NR50 => Some(self.regs.get(ControlReg::NR50)),
            REG_NR51 => Some(self.regs.get(ControlReg::NR51)),
            REG_NR52 => Some(self.status().bits() | ReadMask::NR52),
            REGS_UNUSED_START ..= REGS_UNUSED_END => Some(0xFF),
            _ => None,
        }
    }

    fn write8(&mut self, addr: u16, value: u8) {
        let wave_ram = (WAVE_RAM_START ..= WAVE_RAM_END).contains(&addr);
        if addr != REG_NR52 && !wave_ram && !self.powered() {
            trace!("Ignoring APU Write 0x{:04X} = {:02X} while powered off", addr, value);
            return
        }
        match addr {
            0xFF10 ..= 0xFF14 => self.tone_sweep.write8(addr, value),
            0xFF15 ..= 0xFF19 => self.tone.write8(addr, value),
            0xFF1A ..= 0xFF1E | 0xFF30 ..= 0xFF3F => self.wave.write8(addr, value),
            0xFF1F ..= 0xFF23 => self.noise.write8(addr, value),
            REG_NR50 => self.regs.set(ControlReg::NR50, value),
            REG_NR51 => self.regs.set(ControlReg::NR51, value),
            REG_NR52 => self.write_status(value),
            REGS_UNUSED_START ..= REGS_UNUSED_END => (),
            _ => warn!("Ignoring APU Write 0x{:04X} = {:02X}", addr, value),
        }
    }
}
