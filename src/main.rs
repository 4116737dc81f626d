#[macro_use]
extern crate log;

mod demo;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::thread;

use clap::Parser;
use flume::Receiver;
use simplelog::{Config, LevelFilter, TermLogger, TerminalMode};

use gb_core::gb::{AudioConfig, GameBoy, AUDIO_BUFFER_SIZE, AUDIO_SAMPLE_RATE, CLOCK_FREQ};
use gb_core::io::apu::audio::{AudioSink, ChannelSink};
use gb_core::{Error, Result};

#[derive(Parser)]
#[command(version, about = "Plays a register-level sound test through the Game Boy APU")]
struct Args {
    /// Output sample rate in Hz
    #[arg(long, default_value_t = AUDIO_SAMPLE_RATE)]
    sample_rate: u32,
    /// Bytes per PCM buffer (interleaved left/right)
    #[arg(long, default_value_t = AUDIO_BUFFER_SIZE)]
    buffer_size: usize,
    /// Buffers allowed in flight before emulation blocks
    #[arg(long, default_value_t = 4)]
    depth: usize,
    /// Emulated seconds to play
    #[arg(long, default_value_t = 4)]
    seconds: u64,
    /// Skip the audio device
    #[arg(long)]
    headless: bool,
    /// Write raw unsigned 8-bit stereo PCM to this file
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = TermLogger::init(level, Config::default(), TerminalMode::Mixed) {
        eprintln!("Unable to start logger: {}", e);
    }

    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = AudioConfig {
        clock_freq: CLOCK_FREQ,
        sample_rate: args.sample_rate,
        buffer_size: args.buffer_size,
    };
    config.validate()?;

    #[cfg(feature = "sdl")]
    {
        if !args.headless {
            let sink = gb_core::io::apu::audio::SdlSink::new(&config, args.depth)?;
            play(config, sink, args.seconds)?;
            return Ok(())
        }
    }
    #[cfg(not(feature = "sdl"))]
    {
        if !args.headless { warn!("Built without the sdl feature, running headless") }
    }

    let (sink, rx) = ChannelSink::bounded(args.depth.max(1));
    let out = args.out.clone();
    let writer = thread::spawn(move || write_pcm(rx, out));
    play(config, sink, args.seconds)?;
    match writer.join() {
        Ok(Ok(bytes)) => info!("Captured {} bytes of audio", bytes),
        Ok(Err(e)) => return Err(Error::AudioUnavailable(e.to_string())),
        Err(_) => return Err(Error::AudioUnavailable("PCM writer panicked".to_string())),
    }
    Ok(())
}

fn play<S: AudioSink>(config: AudioConfig, sink: S, seconds: u64) -> Result<S> {
    let mut gb = GameBoy::new(config, sink)?;
    info!("Playing {} s at {} Hz", seconds, config.sample_rate);
    demo::play(&mut gb, seconds)?;
    Ok(gb.shutdown())
}

/// Consumes buffers until the emulator hangs up, optionally writing them out.
fn write_pcm(rx: Receiver<Vec<u8>>, out: Option<PathBuf>) -> io::Result<usize> {
    let mut file = match out {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };
    let mut bytes = 0;
    for buffer in rx.iter() {
        if let Some(file) = file.as_mut() { file.write_all(&buffer)? }
        bytes += buffer.len();
    }
    if let Some(mut file) = file { file.flush()? }
    Ok(bytes)
}
