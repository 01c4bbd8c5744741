// ==============================================================================
// audio.rs — ENGINE / HANDBRAKE AUDIO REACTOR
// ------------------------------------------------------------------------------
// Produces playback cues; the host owns the actual audio sources.
//
// - start():  starter clip, then the engine loop delayed by the clip length
// - update(): engine pitch from speed, handbrake screech on press/release edges
//
//     speed_kmh = |v| * 3.6
//     pitch     = lerp(min_pitch, max_pitch, clamp01(speed_kmh / max_speed_kmh))
// ==============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arcade::{lerp, DriveSignal, SignalListener};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineAudioConfig {
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub max_speed_kmh: f32,
    pub start_clip_secs: f32,
}

impl Default for EngineAudioConfig {
    fn default() -> Self {
        Self {
            min_pitch: 0.6,
            max_pitch: 2.2,
            max_speed_kmh: 180.0,
            start_clip_secs: 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum AudioCue {
    PlayStarter,
    PlayEngineLoop { delay_secs: f32 },
    SetEnginePitch { pitch: f32 },
    StartScreech,
    StopScreech,
}

#[derive(Debug, Clone, Default)]
pub struct EngineAudio {
    pub config: EngineAudioConfig,
    pub pitch: f32,
    pub speed_kmh: f32,
    handbraking: bool,
    accelerating: bool,
}

impl EngineAudio {
    pub fn new(config: EngineAudioConfig) -> Self {
        Self {
            config,
            pitch: config.min_pitch,
            ..Self::default()
        }
    }

    pub fn start(&self) -> Vec<AudioCue> {
        vec![
            AudioCue::PlayStarter,
            AudioCue::PlayEngineLoop { delay_secs: self.config.start_clip_secs },
        ]
    }

    pub fn pitch_for_speed(&self, speed_ms: f32) -> f32 {
        let kmh = speed_ms * 3.6;
        let t = if self.config.max_speed_kmh > 0.0 { kmh / self.config.max_speed_kmh } else { 1.0 };
        lerp(self.config.min_pitch, self.config.max_pitch, t)
    }

    pub fn update(&mut self, speed_ms: f32, handbrake_held: bool) -> Vec<AudioCue> {
        let mut cues = Vec::with_capacity(2);

        self.speed_kmh = speed_ms * 3.6;
        self.pitch = self.pitch_for_speed(speed_ms);
        cues.push(AudioCue::SetEnginePitch { pitch: self.pitch });

        if handbrake_held && !self.handbraking {
            cues.push(AudioCue::StartScreech);
        } else if !handbrake_held && self.handbraking {
            cues.push(AudioCue::StopScreech);
        }
        self.handbraking = handbrake_held;

        for cue in &cues[1..] {
            debug!(?cue, speed_kmh = self.speed_kmh, "audio cue");
        }
        cues
    }

    pub fn accelerating(&self) -> bool {
        self.accelerating
    }
}

impl SignalListener for EngineAudio {
    fn on_forward_pressed(&mut self, signal: &DriveSignal) -> bool {
        self.accelerating = signal.accelerating;
        true
    }
}

/// Lets the host keep reading the reactor while the emitter holds a handle.
impl SignalListener for Rc<RefCell<EngineAudio>> {
    fn on_forward_pressed(&mut self, signal: &DriveSignal) -> bool {
        self.borrow_mut().on_forward_pressed(signal)
    }
}
