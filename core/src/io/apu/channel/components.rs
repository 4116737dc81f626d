use num_traits as num;
use num::{NumAssign, Unsigned};

pub struct Sweep {
    // Registers
    shift: u8,
    negate: bool,
    period: u8,
    // Sound Generation
    enabled: bool,
    timer: Timer<u8>,
    freq_shadow: u16,
    freq_overflowed: bool,
}

impl Sweep {
    const MAX_FREQ: u16 = 2047;

    pub fn new() -> Sweep {
        Sweep {
            // Registers
            shift: 0,
            negate: false,
            period: 0,
            // Sound Generation
            enabled: false,
            timer: Timer::new(8),
            freq_shadow: 0,
            freq_overflowed: false,
        }
    }

    /// Returns the new frequency when a sweep step commits one.
    pub fn clock(&mut self) -> Option<u16> {
        if !self.timer.clock_with_reload(self.timer_period()) { return None }
        if !self.enabled || self.period == 0 { return None }
        let new_freq = self.calc_new_freq();
        if new_freq <= Sweep::MAX_FREQ && self.shift != 0 {
            self.freq_shadow = new_freq;
            self.calc_new_freq();
            Some(new_freq)
        } else { None }
    }

    pub fn should_play(&self) -> bool {
        !self.freq_overflowed
    }

    pub fn trigger(&mut self, freq: u16) {
        self.freq_overflowed = false;
        self.freq_shadow = freq;
        self.timer.reload(self.timer_period());
        self.enabled = self.period != 0 || self.shift != 0;
        // Overflow check only, the result is not committed
        if self.shift != 0 { self.calc_new_freq(); }
    }

    pub fn write(&mut self, value: u8) {
        self.shift = value & 0x7;
        self.negate = value >> 3 & 0x1 != 0;
        self.period = value >> 4 & 0x7;
    }

    pub fn shadow(&self) -> u16 {
        self.freq_shadow
    }

    fn timer_period(&self) -> u8 {
        if self.period == 0 { 8 } else { self.period }
    }

    fn calc_new_freq(&mut self) -> u16 {
        let operand = self.freq_shadow >> self.shift;
        let new_freq = if self.negate {
            self.freq_shadow - operand
        } else {
            self.freq_shadow + operand
        };
        if new_freq > Sweep::MAX_FREQ { self.freq_overflowed = true }
        new_freq
    }
}

pub struct LengthCounter {
    length: u16,
    max: u16,
}

impl LengthCounter {
    pub fn new(max: u16) -> LengthCounter {
        LengthCounter {
            length: 0,
            max,
        }
    }

    /// Returns true on the clock that exhausts the counter.
    pub fn clock(&mut self, use_length: bool) -> bool {
        if !use_length || self.length == 0 { return false }
        self.length -= 1;
        self.length == 0
    }

    pub fn load(&mut self, length_load: u8) {
        self.length = self.max - (length_load as u16).min(self.max);
    }

    pub fn reload_if_exhausted(&mut self) {
        if self.length == 0 { self.length = self.max }
    }

    pub fn length(&self) -> u16 {
        self.length
    }
}

pub struct Envelope {
    // Registers
    step_period: u8,
    inc: bool,
    initial_volume: u8,
    // Sound Generation
    cur_volume: u8,
    timer: Timer<u8>,
    active: bool,
}

impl Envelope {
    pub fn new() -> Envelope {
        Envelope {
            // Registers
            step_period: 0,
            inc: false,
            initial_volume: 0,
            // Sound Generation
            cur_volume: 0,
            timer: Timer::new(8),
            active: false,
        }
    }

    pub fn clock(&mut self) {
        if self.step_period == 0 || !self.active { return }
        if self.timer.clock_with_reload(self.step_period) {
            if self.inc {
                if self.cur_volume == 15 { self.active = false }
                else { self.cur_volume += 1 }
            } else {
                if self.cur_volume == 0 { self.active = false }
                else { self.cur_volume -= 1 }
            }
        }
    }

    pub fn get_volume(&self) -> u8 {
        self.cur_volume
    }

    pub fn reset(&mut self) {
        self.cur_volume = self.initial_volume;
        self.timer.reload(if self.step_period == 0 { 8 } else { self.step_period });
        self.active = true;
    }

    pub fn write(&mut self, value: u8) {
        self.initial_volume = value >> 4;
        self.inc = value >> 3 & 0x1 != 0;
        self.step_period = value & 0x7;
    }

    /// NRx2 bits 3-7 all clear turns the channel's DAC off.
    pub fn dac_enabled(nrx2: u8) -> bool {
        nrx2 & 0xF8 != 0
    }
}

/// 15-bit noise shift register. It can only be advanced in place.
pub struct Lfsr {
    bits: u16,
}

impl Lfsr {
    const SEED: u16 = 0x7FFF;

    pub fn new() -> Lfsr {
        Lfsr {
            bits: Lfsr::SEED,
        }
    }

    pub fn reset(&mut self) {
        self.bits = Lfsr::SEED;
    }

    pub fn shift(&mut self, narrow: bool) {
        let feedback = (self.bits ^ self.bits >> 1) & 0x1;
        self.bits = feedback << 14 | self.bits >> 1;
        if narrow { self.bits = self.bits & !0x40 | feedback << 6 }
    }

    /// Bit 0 clear means the output is high.
    pub fn audible(&self) -> bool {
        self.bits & 0x1 == 0
    }

    pub fn bits(&self) -> u16 {
        self.bits
    }
}

pub struct Timer<T: NumAssign + Unsigned + Copy> {
    counter: T,
}

impl<T: NumAssign + Unsigned + Copy> Timer<T> {
    pub fn new(reload: T) -> Timer<T> {
        assert!(reload != num::zero());
        Timer {
            counter: reload,
        }
    }

    pub fn clock_with_reload(&mut self, reload: T) -> bool {
        self.counter -= num::one();
        if self.counter == num::zero() {
            self.counter = reload;
            true
        } else { false }
    }

    pub fn reload(&mut self, reload: T) {
        assert!(reload != num::zero());
        self.counter = reload;
    }

    pub fn counter(&self) -> T {
        self.counter
    }
}
