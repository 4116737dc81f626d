use crate::error::{Error, Result};
use crate::io::apu::audio::AudioSink;
use crate::io::IO;

pub const CLOCK_FREQ: u32 = 1 << 20;
pub const AUDIO_SAMPLE_RATE: u32 = 32768;
pub const AUDIO_BUFFER_SIZE: usize = 2048;
pub const SEQUENCER_FREQ: u32 = 512;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioConfig {
    pub clock_freq: u32,
    pub sample_rate: u32,
    /// Capacity of one PCM buffer in bytes (interleaved left/right).
    pub buffer_size: usize,
}

impl AudioConfig {
    pub fn validate(&self) -> Result<()> {
        if self.clock_freq < SEQUENCER_FREQ {
            return Err(Error::InvalidConfig(format!("clock of {} Hz is below the {} Hz sequencer",
                self.clock_freq, SEQUENCER_FREQ)))
        }
        if self.sample_rate == 0 || self.sample_rate > self.clock_freq {
            return Err(Error::InvalidConfig(format!("sample rate {} Hz must be in 1..={}",
                self.sample_rate, self.clock_freq)))
        }
        if self.buffer_size == 0 || self.buffer_size % 2 != 0 {
            return Err(Error::InvalidConfig(format!("buffer size {} must be even and non-zero",
                self.buffer_size)))
        }
        Ok(())
    }

    pub fn sequencer_countdown(&self) -> u32 {
        self.clock_freq / SEQUENCER_FREQ
    }

    pub fn sample_countdown(&self) -> u32 {
        self.clock_freq / self.sample_rate
    }
}

impl Default for AudioConfig {
    fn default() -> AudioConfig {
        AudioConfig {
            clock_freq: CLOCK_FREQ,
            sample_rate: AUDIO_SAMPLE_RATE,
            buffer_size: AUDIO_BUFFER_SIZE,
        }
    }
}

/// Master clock driver. Every peripheral in the system advances in lockstep
/// with `clock`; only the sound controller is modelled here.
pub struct GameBoy<S: AudioSink> {
    io: IO<S>,
    cycle: u64,
}

impl<S: AudioSink> GameBoy<S> {
    pub fn new(config: AudioConfig, sink: S) -> Result<GameBoy<S>> {
        Ok(GameBoy {
            io: IO::new(config, sink)?,
            cycle: 0,
        })
    }

    pub fn clock(&mut self) {
        self.io.clock();
        self.cycle += 1;
    }

    pub fn run(&mut self, cycles: u64) {
        for _ in 0..cycles { self.clock() }
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn read8(&self, addr: u32) -> Result<u8> {
        self.io.read8(addr)
    }

    pub fn write8(&mut self, addr: u32, value: u8) -> Result<()> {
        self.io.write8(addr, value)
    }

    pub fn io(&self) -> &IO<S> {
        &self.io
    }

    pub fn shutdown(self) -> S {
        info!("Shutting down after {} cycles", self.cycle);
        self.io.shutdown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::apu::audio::NullSink;
    use crate::io::apu::channel::Channel;

    #[test]
    fn test_default_config_divides_clock() {
        let config = AudioConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.sequencer_countdown(), 2048);
        assert_eq!(config.sample_countdown(), 32);
    }

    #[test]
    fn test_invalid_configs() {
        let odd = AudioConfig { buffer_size: 7, ..AudioConfig::default() };
        assert!(matches!(odd.validate(), Err(Error::InvalidConfig(_))));
        let silent = AudioConfig { sample_rate: 0, ..AudioConfig::default() };
        assert!(matches!(silent.validate(), Err(Error::InvalidConfig(_))));
        let fast = AudioConfig { sample_rate: CLOCK_FREQ * 2, ..AudioConfig::default() };
        assert!(matches!(fast.validate(), Err(Error::InvalidConfig(_))));
        let slow = AudioConfig { clock_freq: 100, sample_rate: 50, ..AudioConfig::default() };
        assert!(matches!(slow.validate(), Err(Error::InvalidConfig(_))));
        assert!(GameBoy::new(odd, NullSink).is_err());
    }

    #[test]
    fn test_run_counts_cycles() {
        let mut gb = GameBoy::new(AudioConfig::default(), NullSink).unwrap();
        gb.run(1000);
        assert_eq!(gb.cycle(), 1000);
        assert_eq!(gb.read8(0xFF26), Ok(0xF0));
        assert_eq!(gb.read8(0xC000), Ok(0xFF));
        assert_eq!(gb.write8(0xC000, 0x12), Ok(()));
        assert_eq!(gb.read8(0x1_0000), Err(Error::InvalidAddress(0x1_0000)));
        assert_eq!(gb.write8(0x1_0000, 0), Err(Error::InvalidAddress(0x1_0000)));
    }

    #[test]
    fn test_channel_state_visible_through_bus() {
        let mut gb = GameBoy::new(AudioConfig::default(), NullSink).unwrap();
        let writes = [
            (0xFF17, 0xF0), (0xFF18, 0x34), (0xFF19, 0x82),
            (0xFF1A, 0x80), (0xFF1D, 0x00), (0xFF1E, 0x84),
            (0xFF21, 0xF0), (0xFF22, 0x01), (0xFF23, 0x80),
        ];
        for &(addr, value) in writes.iter() { gb.write8(addr, value).unwrap() }

        let apu = gb.io().apu();
        assert!(apu.tone().is_enabled() && apu.wave().is_enabled() && apu.noise().is_enabled());
        assert!(!apu.tone_sweep().is_enabled());
        assert_eq!(apu.tone().frequency(), 0x234);
        assert_eq!(apu.wave().frequency(), 0x400);
        assert_eq!(apu.noise().timer_counter(), 16);
        assert_eq!(gb.read8(0xFF26), Ok(0xFE));
    }
}
