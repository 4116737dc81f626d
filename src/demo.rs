use gb_core::gb::{GameBoy, CLOCK_FREQ};
use gb_core::io::apu::audio::AudioSink;
use gb_core::Result;

const NR10: u32 = 0xFF10;
const NR11: u32 = 0xFF11;
const NR12: u32 = 0xFF12;
const NR13: u32 = 0xFF13;
const NR14: u32 = 0xFF14;
const NR21: u32 = 0xFF16;
const NR22: u32 = 0xFF17;
const NR23: u32 = 0xFF18;
const NR24: u32 = 0xFF19;
const NR30: u32 = 0xFF1A;
const NR32: u32 = 0xFF1C;
const NR33: u32 = 0xFF1D;
const NR34: u32 = 0xFF1E;
const NR42: u32 = 0xFF21;
const NR43: u32 = 0xFF22;
const NR44: u32 = 0xFF23;
const NR50: u32 = 0xFF24;
const NR51: u32 = 0xFF25;
const NR52: u32 = 0xFF26;
const WAVE_RAM: u32 = 0xFF30;

// Beats per second
const TEMPO: u64 = 4;
// C major arpeggio, then back down
const MELODY: [u32; 8] = [262, 330, 392, 523, 392, 330, 262, 196];
const BASS: [u32; 2] = [131, 98];

/// Frequency register for a pulse channel: one duty cycle is 32 timer reloads.
fn pulse_freq(hz: u32) -> u16 {
    2048 - (CLOCK_FREQ / (32 * hz)).min(2047) as u16
}

/// Frequency register for the wave channel: 32 samples of 2 cycles per reload.
fn wave_freq(hz: u32) -> u16 {
    2048 - (CLOCK_FREQ / (64 * hz)).min(2047) as u16
}

fn write_freq<S: AudioSink>(gb: &mut GameBoy<S>, lo: u32, hi: u32, freq: u16, control: u8) -> Result<()> {
    gb.write8(lo, freq as u8)?;
    gb.write8(hi, control | (freq >> 8) as u8 & 0x07)
}

fn power_on<S: AudioSink>(gb: &mut GameBoy<S>) -> Result<()> {
    gb.write8(NR52, 0x80)?;
    gb.write8(NR50, 0x77)?;
    gb.write8(NR51, 0xFF)?;
    // Triangle
    for i in 0..16u32 {
        let rise = (i as u8) & 0x0F;
        let (hi, lo) = if i < 8 { (rise * 2, rise * 2 + 1) } else { (31 - rise * 2, 30 - rise * 2) };
        gb.write8(WAVE_RAM + i, (hi.min(15) << 4) | lo.min(15))?;
    }
    gb.write8(NR30, 0x80)
}

fn beat<S: AudioSink>(gb: &mut GameBoy<S>, index: usize) -> Result<()> {
    // Lead on channel 2: 50% duty, decaying envelope
    gb.write8(NR21, 0x80)?;
    gb.write8(NR22, 0xF3)?;
    write_freq(gb, NR23, NR24, pulse_freq(MELODY[index % MELODY.len()]), 0x80)?;

    if index % 4 == 0 {
        gb.write8(NR32, 0x40)?;
        write_freq(gb, NR33, NR34, wave_freq(BASS[index / 4 % BASS.len()]), 0x80)?;
    }

    // Hi-hat on the off beats, kick on the down beats
    gb.write8(NR42, if index % 2 == 0 { 0xA2 } else { 0x51 })?;
    gb.write8(NR43, if index % 2 == 0 { 0x55 } else { 0x18 })?;
    gb.write8(NR44, 0x80)?;
    Ok(())
}

fn sweep_up<S: AudioSink>(gb: &mut GameBoy<S>) -> Result<()> {
    gb.write8(NR10, 0x16)?;
    gb.write8(NR11, 0x40)?;
    gb.write8(NR12, 0xF0)?;
    write_freq(gb, NR13, NR14, pulse_freq(262), 0x80)
}

/// Plays the sound test for `seconds` of emulated time, finishing with a
/// rising sweep on channel 1 once the tune has run out.
pub fn play<S: AudioSink>(gb: &mut GameBoy<S>, seconds: u64) -> Result<()> {
    let beat_cycles = CLOCK_FREQ as u64 / TEMPO;
    let total = seconds * CLOCK_FREQ as u64;
    power_on(gb)?;

    let mut index = 0;
    while gb.cycle() + 2 * beat_cycles <= total {
        trace!("Beat {} at cycle {}", index, gb.cycle());
        beat(gb, index)?;
        gb.run(beat_cycles);
        index += 1;
    }

    debug!("Sweeping out after {} beats", index);
    gb.write8(NR30, 0x00)?;
    sweep_up(gb)?;
    gb.run(total.saturating_sub(gb.cycle()));
    Ok(())
}
