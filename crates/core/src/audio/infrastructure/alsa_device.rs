//! ALSA PCM device wrapper for audio playback.

use alsa::pcm::{Access, Format, HwParams, PCM};
use alsa::{Direction, ValueOr};

/// Parameters negotiated with the ALSA hardware.
#[derive(Debug, Clone)]
pub struct PcmParams {
    /// Actual sample rate after negotiation
    pub sample_rate: u32,
    /// Actual number of channels
    pub channels: u32,
    /// Period size in frames (one frame = one sample per channel)
    pub period_size: usize,
}

/// Open a PCM device for playback at the requested rate and channel count.
///
/// The returned params carry what the hardware actually granted; the rate
/// and channels are negotiated with `Nearest`, so callers that need exact
/// values must check them.
pub fn open_playback(
    device: &str,
    sample_rate: u32,
    channels: u32,
) -> Result<(PCM, PcmParams), alsa::Error> {
    let pcm = PCM::new(device, Direction::Playback, false)?;

    {
        let hwp = HwParams::any(&pcm)?;
        hwp.set_access(Access::RWInterleaved)?;
        hwp.set_format(Format::S16LE)?;
        hwp.set_channels(channels)?;
        hwp.set_rate_near(sample_rate, ValueOr::Nearest)?;
        pcm.hw_params(&hwp)?;
    }

    // Read back actual negotiated parameters
    let params = {
        let hwp = pcm.hw_params_current()?;
        PcmParams {
            sample_rate: hwp.get_rate()?,
            channels: hwp.get_channels()?,
            period_size: hwp.get_period_size()? as usize,
        }
    };

    log::info!(
        "ALSA playback: device={}, rate={}, channels={}, period_size={}",
        device,
        params.sample_rate,
        params.channels,
        params.period_size,
    );

    Ok((pcm, params))
}
