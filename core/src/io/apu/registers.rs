use std::marker::PhantomData;

pub const REGS_CH1_START: u16 = 0xFF10;
pub const REGS_CH2_START: u16 = 0xFF15;
pub const REGS_CH3_START: u16 = 0xFF1A;
pub const REGS_CH4_START: u16 = 0xFF1F;
pub const REG_NR50: u16 = 0xFF24;
pub const REG_NR51: u16 = 0xFF25;
pub const REG_NR52: u16 = 0xFF26;
pub const REGS_UNUSED_START: u16 = 0xFF27;
pub const REGS_UNUSED_END: u16 = 0xFF2F;
pub const WAVE_RAM_START: u16 = 0xFF30;
pub const WAVE_RAM_END: u16 = 0xFF3F;
pub const WAVE_RAM_SIZE: usize = 16;

pub trait Register: Copy {
    const COUNT: usize;
    fn index(self) -> usize;
}

/// Raw storage for a closed set of 8-bit registers. Writes always land here,
/// whatever their side effects; semantic decoding is up to the owner.
pub struct RegisterFile<R: Register> {
    values: Vec<u8>,
    _reg: PhantomData<R>,
}

impl<R: Register> RegisterFile<R> {
    pub fn new() -> RegisterFile<R> {
        RegisterFile {
            values: vec![0; R::COUNT],
            _reg: PhantomData,
        }
    }

    pub fn get(&self, reg: R) -> u8 {
        self.values[reg.index()]
    }

    pub fn set(&mut self, reg: R, value: u8) {
        self.values[reg.index()] = value;
    }

    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|value| *value = 0);
    }
}

/// The five sequential registers every channel maps (NRx0 ..= NRx4).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChannelReg {
    NR0,
    NR1,
    NR2,
    NR3,
    NR4,
}

impl ChannelReg {
    const ALL: [ChannelReg; 5] = [ChannelReg::NR0, ChannelReg::NR1, ChannelReg::NR2, ChannelReg::NR3,
        ChannelReg::NR4];

    /// Maps `addr` to a register of the channel whose block begins at `start`.
    pub fn from_addr(start: u16, addr: u16) -> Option<ChannelReg> {
        let offset = addr.checked_sub(start)? as usize;
        ChannelReg::ALL.get(offset).copied()
    }
}

impl Register for ChannelReg {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlReg {
    NR50,
    NR51,
    NR52,
}

impl Register for ControlReg {
    const COUNT: usize = 3;

    fn index(self) -> usize {
        self as usize
    }
}

/// Bits that always read back as 1, per register.
pub struct ReadMask;

impl ReadMask {
    pub const SQUARE1: [u8; 5] = [0x80, 0x3F, 0x00, 0xFF, 0xBF];
    pub const SQUARE2: [u8; 5] = [0xFF, 0x3F, 0x00, 0xFF, 0xBF];
    pub const WAVE: [u8; 5] = [0x7F, 0xFF, 0x9F, 0xFF, 0xBF];
    pub const NOISE: [u8; 5] = [0xFF, 0xFF, 0x00, 0x00, 0xBF];
    pub const NR52: u8 = 0x70;
}

bitflags! {
    /// One NR51 nibble: which channels are routed to a stereo side.
    pub struct ChannelFlags: u8 {
        const CH1 = 1 << 0;
        const CH2 = 1 << 1;
        const CH3 = 1 << 2;
        const CH4 = 1 << 3;
    }
}

bitflags! {
    pub struct SoundStatus: u8 {
        const CH1_ON = 1 << 0;
        const CH2_ON = 1 << 1;
        const CH3_ON = 1 << 2;
        const CH4_ON = 1 << 3;
        const POWER = 1 << 7;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn routing(self, nr51: u8) -> ChannelFlags {
        match self {
            Side::Left => ChannelFlags::from_bits_truncate(nr51 >> 4),
            Side::Right => ChannelFlags::from_bits_truncate(nr51),
        }
    }

    pub fn master_volume(self, nr50: u8) -> u8 {
        match self {
            Side::Left => nr50 >> 4 & 0x7,
            Side::Right => nr50 & 0x7,
        }
    }
}
