use flume::{Receiver, Sender};

/// Destination for finished PCM buffers: unsigned 8-bit, interleaved
/// left/right. `queue` may block; that is how playback paces emulation.
pub trait AudioSink {
    fn queue(&mut self, buffer: Vec<u8>);
    /// Blocks until everything queued so far has been played.
    fn drain(&mut self) {}
}

/// Discards audio and never blocks.
pub struct NullSink;

impl AudioSink for NullSink {
    fn queue(&mut self, _buffer: Vec<u8>) {}
}

/// Hands buffers to another thread. A bounded channel blocks the emulator
/// while `depth` buffers are waiting to be consumed.
pub struct ChannelSink {
    tx: Sender<Vec<u8>>,
}

impl ChannelSink {
    pub fn bounded(depth: usize) -> (ChannelSink, Receiver<Vec<u8>>) {
        let (tx, rx) = flume::bounded(depth);
        (ChannelSink { tx }, rx)
    }

    pub fn unbounded() -> (ChannelSink, Receiver<Vec<u8>>) {
        let (tx, rx) = flume::unbounded();
        (ChannelSink { tx }, rx)
    }
}

impl AudioSink for ChannelSink {
    fn queue(&mut self, buffer: Vec<u8>) {
        if self.tx.send(buffer).is_err() {
            warn!("Audio receiver disconnected, dropping buffer");
        }
    }
}

#[cfg(feature = "sdl")]
pub use sdl::SdlSink;

#[cfg(feature = "sdl")]
mod sdl {
    extern crate sdl2;

    use std::thread;
    use std::time::Duration;

    use sdl2::audio::{AudioQueue, AudioSpecDesired};

    use super::AudioSink;
    use crate::error::{Error, Result};
    use crate::gb::AudioConfig;

    pub struct SdlSink {
        queue: AudioQueue<u8>,
        max_queued: u32,
    }

    impl SdlSink {
        const POLL_INTERVAL: Duration = Duration::from_millis(1);

        pub fn new(config: &AudioConfig, depth: usize) -> Result<SdlSink> {
            let sdl_ctx = sdl2::init().map_err(Error::AudioUnavailable)?;
            let audio_subsystem = sdl_ctx.audio().map_err(Error::AudioUnavailable)?;
            let desired_spec = AudioSpecDesired {
                freq: Some(config.sample_rate as i32),
                channels: Some(2),
                samples: None,
            };

            let queue = audio_subsystem.open_queue::<u8, _>(None, &desired_spec)
                .map_err(Error::AudioUnavailable)?;
            info!("Opened audio queue at {} Hz", queue.spec().freq);
            queue.resume();
            Ok(SdlSink {
                queue,
                max_queued: (config.buffer_size * depth.max(1)) as u32,
            })
        }
    }

    impl AudioSink for SdlSink {
        fn queue(&mut self, buffer: Vec<u8>) {
            while self.queue.size() >= self.max_queued { thread::sleep(SdlSink::POLL_INTERVAL) }
            if !self.queue.queue(&buffer) {
                warn!("SDL refused {} bytes of audio", buffer.len());
            }
        }

        fn drain(&mut self) {
            while self.queue.size() > 0 { thread::sleep(SdlSink::POLL_INTERVAL) }
            self.queue.pause();
        }
    }
}
