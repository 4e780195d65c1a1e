//! Sound cues emitted by the engine
//!
//! Playback is fire-and-forget: the engine never retries and never lets a
//! failed cue change simulation state.

use log::info;

use super::error::AudioUnavailable;

/// The three cues the map plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Rising sawtooth siren for a hazard alert
    AlertSiren,
    /// Short chirp acknowledging a reroute command
    RerouteConfirm,
    /// Two-note chime when a vehicle reaches the safe haven
    ArrivalChime,
}

/// Something that can play a [`SoundCue`]
pub trait AudioSink: Send {
    fn play(&mut self, cue: SoundCue) -> Result<(), AudioUnavailable>;
}

/// Writes cues to the log instead of a speaker (headless runs)
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: SoundCue) -> Result<(), AudioUnavailable> {
        info!("sound cue: {:?}", cue);
        Ok(())
    }
}

/// A sink with no output device
#[derive(Debug, Default)]
pub struct MutedAudio;

impl AudioSink for MutedAudio {
    fn play(&mut self, _cue: SoundCue) -> Result<(), AudioUnavailable> {
        Err(AudioUnavailable::new("no output device"))
    }
}
