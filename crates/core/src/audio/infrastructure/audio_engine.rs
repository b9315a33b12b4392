use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use alsa::pcm::PCM;
use thiserror::Error;

use crate::audio::domain::sample_source::{SampleSource, StreamStatus};
use crate::audio::infrastructure::alsa_device;
use crate::shared::constants::{PLAYBACK_CHANNELS, PLAYBACK_DEVICE, PLAYBACK_SAMPLE_RATE};

/// Consecutive failed writes tolerated before dropping the rest of a buffer.
const MAX_RECOVERY_RETRIES: u32 = 3;

/// Process-wide guard: at most one live engine at a time.
static ENGINE_LIVE: AtomicBool = AtomicBool::new(false);

#[derive(Error, Debug)]
pub enum AudioEngineError {
    #[error("audio engine is already initialized in this process")]
    AlreadyInitialized,
    #[error("a playback stream is already active")]
    StreamActive,
    #[error("playback device error: {0}")]
    Device(#[from] alsa::Error),
    #[error("device granted {granted} channels, need {needed}")]
    ChannelMismatch { granted: u32, needed: u32 },
    #[error("playback thread error: {0}")]
    Thread(#[from] std::io::Error),
}

/// Playback engine: lifecycle and stream-control glue over ALSA.
///
/// [`AudioEngine::init`] claims the process-wide engine slot; dropping the
/// engine (or calling [`AudioEngine::shutdown`]) releases it, so the
/// lifecycle terminates at most once. While live, the engine drives at most
/// one output stream at [`PLAYBACK_SAMPLE_RATE`] Hz stereo, calling the
/// host's [`SampleSource`] from a dedicated playback thread once per device
/// buffer. The pixelation filter never touches any of this.
pub struct AudioEngine {
    stream: Option<PlaybackStream>,
}

struct PlaybackStream {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
    result_rx: crossbeam_channel::Receiver<Result<(), AudioEngineError>>,
}

impl AudioEngine {
    /// Claims the process-wide engine slot.
    ///
    /// Fails while another engine is live; not reentrant-safe beyond that
    /// guarantee, so hosts juggling engines across threads must serialize
    /// init/shutdown themselves.
    pub fn init() -> Result<Self, AudioEngineError> {
        if ENGINE_LIVE.swap(true, Ordering::SeqCst) {
            return Err(AudioEngineError::AlreadyInitialized);
        }
        Ok(Self { stream: None })
    }

    /// Opens the output stream and starts driving `source` from the
    /// playback thread.
    ///
    /// Blocks until the device is open, so an unusable device surfaces here
    /// rather than as a silent stream. Fails when a stream is already
    /// active.
    pub fn begin_playback(
        &mut self,
        source: Box<dyn SampleSource>,
    ) -> Result<(), AudioEngineError> {
        if self.stream.is_some() {
            return Err(AudioEngineError::StreamActive);
        }

        let stop = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let (result_tx, result_rx) = crossbeam_channel::bounded(1);

        let thread_stop = stop.clone();
        let handle = std::thread::Builder::new()
            .name("audio-playback".into())
            .spawn(move || {
                let result = run_stream(source, &thread_stop, ready_tx);
                if let Err(ref e) = result {
                    log::error!("Playback stream failed: {e}");
                }
                let _ = result_tx.send(result);
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.stream = Some(PlaybackStream {
                    stop,
                    handle,
                    result_rx,
                });
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                // Thread died before signaling (panic during device open).
                let _ = handle.join();
                Err(AudioEngineError::Thread(std::io::Error::other(
                    "playback thread exited before opening the stream",
                )))
            }
        }
    }

    /// Stops the playback thread, closes the stream, and returns the
    /// thread's terminal result. A call with no active stream is a no-op.
    pub fn end_playback(&mut self) -> Result<(), AudioEngineError> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };

        stream.stop.store(true, Ordering::Relaxed);
        let _ = stream.handle.join();
        stream.result_rx.try_recv().unwrap_or(Ok(()))
    }

    /// Ends any active stream and releases the process-wide slot.
    pub fn shutdown(mut self) -> Result<(), AudioEngineError> {
        self.end_playback()
        // Drop releases the slot.
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        let _ = self.end_playback();
        ENGINE_LIVE.store(false, Ordering::SeqCst);
    }
}

fn run_stream(
    mut source: Box<dyn SampleSource>,
    stop: &AtomicBool,
    ready_tx: crossbeam_channel::Sender<Result<(), AudioEngineError>>,
) -> Result<(), AudioEngineError> {
    let opened =
        alsa_device::open_playback(PLAYBACK_DEVICE, PLAYBACK_SAMPLE_RATE, PLAYBACK_CHANNELS)
            .map_err(AudioEngineError::from)
            .and_then(|(pcm, params)| {
                if params.channels == PLAYBACK_CHANNELS {
                    Ok((pcm, params))
                } else {
                    Err(AudioEngineError::ChannelMismatch {
                        granted: params.channels,
                        needed: PLAYBACK_CHANNELS,
                    })
                }
            });

    let (pcm, params) = match opened {
        Ok(opened) => {
            let _ = ready_tx.send(Ok(()));
            opened
        }
        Err(e) => {
            // Open failures are reported through the ready channel; the
            // caller never registered this stream.
            let _ = ready_tx.send(Err(e));
            return Ok(());
        }
    };

    let io = pcm.io_i16()?;

    // All buffers are allocated here, before the callback loop starts; the
    // source's realtime contract holds because nothing in the loop
    // allocates.
    let samples_per_period = params.period_size * params.channels as usize;
    let mut frames = vec![0.0f32; samples_per_period];
    let mut pcm_out = vec![0i16; samples_per_period];

    while !stop.load(Ordering::Relaxed) {
        let status = source.fill(&mut frames);
        quantize(&frames, &mut pcm_out);
        write_interleaved(&pcm, &io, &pcm_out, params.channels as usize)?;
        if status == StreamStatus::Complete {
            break;
        }
    }

    pcm.drain()?;
    Ok(())
}

/// Quantizes normalized f32 samples to signed 16-bit, clamping out-of-range
/// input instead of wrapping.
fn quantize(input: &[f32], output: &mut [i16]) {
    for (out, &sample) in output.iter_mut().zip(input) {
        *out = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
    }
}

/// Write interleaved PCM with a retry loop to handle short writes and XRUN
/// recovery without losing frames.
fn write_interleaved(
    pcm: &PCM,
    io: &alsa::pcm::IO<i16>,
    samples: &[i16],
    channels: usize,
) -> Result<(), AudioEngineError> {
    let total_frames = samples.len() / channels;
    let mut frames_written = 0;
    let mut retries = 0u32;

    while frames_written < total_frames {
        let offset = frames_written * channels;
        match io.writei(&samples[offset..]) {
            Ok(n) => {
                frames_written += n;
                retries = 0;
            }
            Err(e) => {
                log::warn!("Playback underrun: {e}, recovering");
                retries += 1;
                pcm.prepare()?;

                if retries >= MAX_RECOVERY_RETRIES {
                    log::error!(
                        "Dropping {} unwritten frames after {} recovery attempts",
                        total_frames - frames_written,
                        retries,
                    );
                    break;
                }
            }
        }
    }
    Ok(())
}
