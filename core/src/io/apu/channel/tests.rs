use super::*;

fn step(index: u8) -> SequencerStep {
    SequencerStep::new(index).unwrap()
}

macro_rules! write_regs { ($channel:expr, $($addr:expr => $value:expr),*) => { {
    $( $channel.write8($addr, $value); )*
} } }

fn run(channel: &mut dyn Channel, cycles: usize) {
    for _ in 0..cycles { channel.step() }
}

#[test]
fn test_sequencer_step_bounds() {
    assert_eq!(SequencerStep::new(8), Err(Error::InvalidSequencerStep(8)));
    assert_eq!(SequencerStep::try_from(7).map(SequencerStep::get), Ok(7));
    assert_eq!(step(7).next(), SequencerStep::first());
    assert!(step(0).clocks_length() && !step(1).clocks_length());
    assert!(step(2).clocks_sweep() && step(6).clocks_sweep() && !step(4).clocks_sweep());
    assert!(step(7).clocks_envelope() && !step(6).clocks_envelope());
}

#[test]
fn test_dac_off_silences_every_channel() {
    let mut tone_sweep = ToneSweep::new();
    write_regs!(tone_sweep, 0xFF11 => 0x00, 0xFF12 => 0x07, 0xFF14 => 0x80);
    let mut tone = Tone::new();
    write_regs!(tone, 0xFF16 => 0x00, 0xFF17 => 0x00, 0xFF19 => 0x80);
    let mut wave = Wave::new();
    write_regs!(wave, 0xFF30 => 0xFF, 0xFF1A => 0x7F, 0xFF1C => 0x20, 0xFF1E => 0x87);
    let mut noise = Noise::new();
    write_regs!(noise, 0xFF21 => 0x07, 0xFF23 => 0x80);

    let channels: [&mut dyn Channel; 4] = [&mut tone_sweep, &mut tone, &mut wave, &mut noise];
    for channel in channels {
        for _ in 0..10_000 {
            channel.step();
            assert!(!channel.is_enabled());
            assert_eq!(channel.output_amplitude(), 0);
        }
    }
}

#[test]
fn test_dac_off_write_disables_playing_channel() {
    let mut tone = Tone::new();
    write_regs!(tone, 0xFF17 => 0xF0, 0xFF19 => 0x80);
    assert!(tone.is_enabled());
    assert_eq!(tone.output_amplitude(), 15);

    tone.write8(0xFF17, 0x00);
    assert!(!tone.is_enabled());
    assert_eq!(tone.output_amplitude(), 0);
    // Turning the DAC back on does not restart the channel
    tone.write8(0xFF17, 0xF0);
    assert!(!tone.is_enabled());
}

#[test]
fn test_length_counter_expires_on_exact_tick() {
    let mut tone = Tone::new();
    // Length load 60 leaves 4 ticks
    write_regs!(tone, 0xFF16 => 60, 0xFF17 => 0xF0, 0xFF19 => 0x80);
    assert_eq!(tone.length(), 4);
    tone.write8(0xFF19, 0x40);

    for _ in 0..3 {
        tone.tick(step(0));
        tone.tick(step(1));
        assert!(tone.is_enabled());
    }
    tone.tick(step(2));
    assert_eq!(tone.length(), 0);
    assert!(!tone.is_enabled());
}

#[test]
fn test_length_counter_ignored_unless_enabled() {
    let mut noise = Noise::new();
    write_regs!(noise, 0xFF20 => 63, 0xFF21 => 0xF0, 0xFF23 => 0x80);
    for _ in 0..8 { noise.tick(step(4)) }
    assert!(noise.is_enabled());
    assert_eq!(noise.length(), 1);
}

#[test]
fn test_trigger_reloads_exhausted_length() {
    let mut wave = Wave::new();
    write_regs!(wave, 0xFF1A => 0x80, 0xFF1B => 255, 0xFF1E => 0xC0);
    assert_eq!(wave.length(), 1);
    wave.tick(step(6));
    assert!(!wave.is_enabled());
    wave.write8(0xFF1E, 0x80);
    assert_eq!(wave.length(), 256);
    assert!(wave.is_enabled());
}

#[test]
fn test_envelope_freezes_at_fifteen() {
    let mut tone = Tone::new();
    // Volume 12, increasing, period 1
    write_regs!(tone, 0xFF17 => 0xC9, 0xFF19 => 0x80);
    for _ in 0..3 { tone.tick(step(7)) }
    assert_eq!(tone.volume(), 15);
    for _ in 0..20 {
        tone.tick(step(7));
        assert_eq!(tone.volume(), 15);
    }
}

#[test]
fn test_envelope_freezes_at_zero() {
    let mut noise = Noise::new();
    // Volume 2, decreasing, period 2
    write_regs!(noise, 0xFF21 => 0x22, 0xFF23 => 0x80);
    for _ in 0..4 { noise.tick(step(7)) }
    assert_eq!(noise.volume(), 0);
    assert!(noise.is_enabled());
    for _ in 0..20 {
        noise.tick(step(7));
        assert_eq!(noise.volume(), 0);
    }
    noise.write8(0xFF23, 0x80);
    assert_eq!(noise.volume(), 2);
}

#[test]
fn test_envelope_only_clocks_on_step_seven() {
    let mut tone_sweep = ToneSweep::new();
    write_regs!(tone_sweep, 0xFF12 => 0x51, 0xFF14 => 0x80);
    for index in 0..7 { tone_sweep.tick(step(index)) }
    assert_eq!(tone_sweep.volume(), 5);
    tone_sweep.tick(step(7));
    assert_eq!(tone_sweep.volume(), 4);
}

#[test]
fn test_pulse_advances_one_phase_per_period() {
    let mut tone_sweep = ToneSweep::new();
    // Duty 2, volume 15, frequency 1024
    write_regs!(tone_sweep, 0xFF11 => 0x80, 0xFF12 => 0xF0, 0xFF13 => 0x00, 0xFF14 => 0x84);
    assert_eq!(tone_sweep.frequency(), 1024);

    run(&mut tone_sweep, 4095);
    assert_eq!(tone_sweep.duty_position(), 0);
    tone_sweep.step();
    assert_eq!(tone_sweep.duty_position(), 1);
    // 0b1000_0111 has bit 1 set
    assert_eq!(tone_sweep.output_amplitude(), 15);

    run(&mut tone_sweep, 2 * 4096);
    assert_eq!(tone_sweep.duty_position(), 3);
    assert_eq!(tone_sweep.output_amplitude(), 0);
}

#[test]
fn test_trigger_overflow_silences_until_next_trigger() {
    let mut tone_sweep = ToneSweep::new();
    // Period 1, add, shift 1: 1792 + 896 overflows
    write_regs!(tone_sweep, 0xFF10 => 0x11, 0xFF12 => 0xF0, 0xFF13 => 0x00, 0xFF14 => 0x87);
    assert!(!tone_sweep.is_enabled());
    assert_eq!(tone_sweep.output_amplitude(), 0);

    write_regs!(tone_sweep, 0xFF10 => 0x00, 0xFF12 => 0xF0, 0xFF13 => 0x00);
    run(&mut tone_sweep, 20_000);
    assert!(!tone_sweep.is_enabled());
    assert_eq!(tone_sweep.output_amplitude(), 0);

    tone_sweep.write8(0xFF14, 0x81);
    assert!(tone_sweep.is_enabled());
}

#[test]
fn test_periodic_sweep_commits_frequency() {
    let mut tone_sweep = ToneSweep::new();
    // Period 2, add, shift 1, frequency 256
    write_regs!(tone_sweep, 0xFF10 => 0x21, 0xFF12 => 0xF0, 0xFF13 => 0x00, 0xFF14 => 0x81);
    tone_sweep.tick(step(2));
    assert_eq!(tone_sweep.frequency(), 256);
    tone_sweep.tick(step(6));
    assert_eq!(tone_sweep.frequency(), 384);
    assert_eq!(tone_sweep.sweep_shadow(), 384);
    assert!(tone_sweep.is_enabled());
}

#[test]
fn test_periodic_sweep_overflow_is_permanent() {
    let mut tone_sweep = ToneSweep::new();
    // Period 1, add, shift 1, frequency 1024: commits 1536, then 2304 overflows
    write_regs!(tone_sweep, 0xFF10 => 0x11, 0xFF12 => 0xF0, 0xFF13 => 0x00, 0xFF14 => 0x84);
    assert!(tone_sweep.is_enabled());
    tone_sweep.tick(step(2));
    assert_eq!(tone_sweep.frequency(), 1536);
    assert!(!tone_sweep.is_enabled());

    for index in 0..8 { tone_sweep.tick(step(index)) }
    tone_sweep.write8(0xFF12, 0xF0);
    assert!(!tone_sweep.is_enabled());
    assert_eq!(tone_sweep.output_amplitude(), 0);
}

#[test]
fn test_negated_sweep_never_overflows() {
    let mut tone_sweep = ToneSweep::new();
    write_regs!(tone_sweep, 0xFF10 => 0x19, 0xFF12 => 0xF0, 0xFF13 => 0xFF, 0xFF14 => 0x87);
    for _ in 0..32 { tone_sweep.tick(step(2)) }
    assert!(tone_sweep.is_enabled());
    assert!(tone_sweep.frequency() < 2047);
}

#[test]
fn test_noise_shifts_once_after_eight_cycles() {
    let mut noise = Noise::new();
    write_regs!(noise, 0xFF21 => 0xF0, 0xFF22 => 0x00, 0xFF23 => 0x80);
    assert_eq!(noise.timer_counter(), 8);

    run(&mut noise, 7);
    assert_eq!(noise.lfsr(), 0x7FFF);
    noise.step();
    assert_eq!(noise.lfsr(), 0x3FFF);
}

#[test]
fn test_noise_lfsr_reaches_audible_state() {
    let mut noise = Noise::new();
    write_regs!(noise, 0xFF21 => 0xF0, 0xFF22 => 0x00, 0xFF23 => 0x80);
    assert_eq!(noise.output_amplitude(), 0);
    let audible = (0..16 * 8).any(|_| {
        noise.step();
        noise.output_amplitude() == 15
    });
    assert!(audible);
    assert_eq!(noise.lfsr() & 0x1, 0);
}

#[test]
fn test_noise_narrow_mode_copies_feedback() {
    let mut noise = Noise::new();
    write_regs!(noise, 0xFF21 => 0xF0, 0xFF22 => 0x08, 0xFF23 => 0x80);
    run(&mut noise, 8);
    assert_eq!(noise.lfsr(), 0x3FBF);
}

#[test]
fn test_noise_clock_shift_scales_period() {
    let mut noise = Noise::new();
    // Divisor code 3 (48) shifted by 2
    write_regs!(noise, 0xFF21 => 0xF0, 0xFF22 => 0x23, 0xFF23 => 0x80);
    assert_eq!(noise.timer_counter(), 192);
}

#[test]
fn test_wave_plays_nibbles_with_volume_shift() {
    let mut wave = Wave::new();
    write_regs!(wave, 0xFF30 => 0x1F, 0xFF31 => 0x8C);
    // DAC on, full volume, frequency 2047 (2 cycles per sample)
    write_regs!(wave, 0xFF1A => 0x80, 0xFF1C => 0x20, 0xFF1D => 0xFF, 0xFF1E => 0x87);

    run(&mut wave, 2);
    assert_eq!(wave.position(), 1);
    assert_eq!(wave.output_amplitude(), 0xF);
    run(&mut wave, 2);
    assert_eq!(wave.output_amplitude(), 0x8);

    // Half volume
    wave.write8(0xFF1C, 0x40);
    run(&mut wave, 2);
    assert_eq!(wave.output_amplitude(), 0xC >> 1);
    // Mute
    wave.write8(0xFF1C, 0x00);
    run(&mut wave, 2);
    assert_eq!(wave.output_amplitude(), 0);
}

#[test]
fn test_wave_trigger_reloads_standard_period() {
    let mut wave = Wave::new();
    write_regs!(wave, 0xFF1A => 0x80, 0xFF1C => 0x20, 0xFF1D => 0x00, 0xFF1E => 0x84);
    run(&mut wave, 2047);
    assert_eq!(wave.position(), 0);
    wave.step();
    assert_eq!(wave.position(), 1);
}

#[test]
fn test_wave_ram_access_while_playing() {
    let mut wave = Wave::new();
    for offset in 0..16 { wave.write8(0xFF30 + offset, 0x10 + offset as u8) }
    assert_eq!(wave.read8(0xFF35), Some(0x15));
    assert_eq!(wave.read8(0xFF35), Some(0x15));

    // 512 cycles per sample
    write_regs!(wave, 0xFF1A => 0x80, 0xFF1C => 0x20, 0xFF1D => 0x00, 0xFF1E => 0x87);
    run(&mut wave, 10);
    assert!(wave.is_enabled());
    assert_eq!(wave.position(), 0);
    assert_eq!(wave.read8(0xFF30), Some(0x10));
    assert_eq!(wave.read8(0xFF3A), Some(0x10));
    wave.write8(0xFF33, 0xAB);

    run(&mut wave, 502 + 2 * 512);
    assert_eq!(wave.position(), 3);
    assert_eq!(wave.read8(0xFF35), Some(0x11));

    // The playing byte stays latched for two cycles after the channel stops
    wave.write8(0xFF1A, 0x00);
    assert_eq!(wave.read8(0xFF35), Some(0x11));
    run(&mut wave, 2);
    assert_eq!(wave.read8(0xFF35), Some(0x15));
    assert_eq!(wave.read8(0xFF33), Some(0xAB));
}

#[test]
fn test_power_off_keeps_wave_ram() {
    let mut wave = Wave::new();
    write_regs!(wave, 0xFF30 => 0x42, 0xFF1A => 0x80, 0xFF1E => 0x80);
    assert!(wave.is_enabled());
    wave.power_off();
    assert!(!wave.is_enabled());
    assert_eq!(wave.read8(0xFF1A), Some(0x7F));
    assert_eq!(wave.read8(0xFF30), Some(0x42));
}

#[test]
fn test_channels_ignore_foreign_addresses() {
    let mut tone = Tone::new();
    assert_eq!(tone.read8(0xFF14), None);
    assert_eq!(tone.read8(0xFF1A), None);
    tone.write8(0xFF10, 0xFF);
    assert_eq!(tone.read8(0xFF15), Some(0xFF));
    assert_eq!(Noise::new().read8(0xFF30), None);
    assert_eq!(Wave::new().read8(0xFF1F), None);
}
