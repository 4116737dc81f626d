pub mod apu;

use std::convert::TryFrom;

use crate::error::{Error, Result};
use crate::gb::AudioConfig;
use apu::APU;
use apu::audio::AudioSink;

/// A component attached to the bus. `read8` returns `None` for addresses the
/// component does not claim so the dispatcher can try the next one.
pub trait MemoryHandler {
    fn read8(&self, addr: u16) -> Option<u8>;
    fn write8(&mut self, addr: u16, value: u8);
}

pub struct IO<S: AudioSink> {
    apu: APU<S>,
}

impl<S: AudioSink> IO<S> {
    const OPEN_BUS: u8 = 0xFF;

    pub fn new(config: AudioConfig, sink: S) -> Result<IO<S>> {
        Ok(IO {
            apu: APU::new(config, sink)?,
        })
    }

    pub fn clock(&mut self) {
        self.apu.clock();
    }

    pub fn apu(&self) -> &APU<S> {
        &self.apu
    }

    pub fn read8(&self, addr: u32) -> Result<u8> {
        let addr = IO::<S>::check_addr(addr)?;
        Ok(self.apu.read8(addr).unwrap_or_else(|| {
            trace!("Open bus read at 0x{:04X}", addr);
            IO::<S>::OPEN_BUS
        }))
    }

    pub fn write8(&mut self, addr: u32, value: u8) -> Result<()> {
        let addr = IO::<S>::check_addr(addr)?;
        if self.apu.claims(addr) { self.apu.write8(addr, value) }
        else { trace!("Ignoring write 0x{:04X} = {:02X}", addr, value) }
        Ok(())
    }

    pub fn shutdown(self) -> S {
        self.apu.shutdown()
    }

    fn check_addr(addr: u32) -> Result<u16> {
        u16::try_from(addr).map_err(|_| Error::InvalidAddress(addr))
    }
}
