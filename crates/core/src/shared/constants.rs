/// Output sample rate of the playback engine, in Hz.
pub const PLAYBACK_SAMPLE_RATE: u32 = 44100;

/// Playback channel count (interleaved stereo).
pub const PLAYBACK_CHANNELS: u32 = 2;

/// ALSA device the playback engine opens.
pub const PLAYBACK_DEVICE: &str = "default";

/// Default edge length of the averaging tiles, in pixels.
pub const DEFAULT_BLOCK_SIZE: u32 = 16;
