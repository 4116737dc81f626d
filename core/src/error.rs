use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("address 0x{0:X} is outside the 16-bit address space")]
    InvalidAddress(u32),
    #[error("frame sequencer step {0} is outside 0..=7")]
    InvalidSequencerStep(u8),
    #[error("invalid audio configuration: {0}")]
    InvalidConfig(String),
    #[error("audio output unavailable: {0}")]
    AudioUnavailable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
