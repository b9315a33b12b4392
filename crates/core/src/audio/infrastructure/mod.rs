pub mod alsa_device;
pub mod audio_engine;
