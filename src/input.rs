// ==============================================================================
// input.rs — INPUT SAMPLING (RAW AXES → InputFrame)
// ------------------------------------------------------------------------------
// Sources hand back raw device values once per tick:
// - drive: 2D stick, x = steer, y = throttle
// - brake / handbrake: scalar triggers
// - headlight toggle (key-down edge) and brake-light key (held)
//
// InputSampler applies the bindings (handbrake trigger threshold) and clamps
// everything into an InputFrame.
//
// Sources:
// - ScriptedInput: timed segments loaded from JSON, for headless runs
// - NoisyInput:    wraps another source and jitters steering (seeded rng)
// ==============================================================================

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::arcade::InputFrame;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawInput {
    pub drive: [f32; 2],  // [steer, throttle]
    pub brake: f32,
    pub handbrake: f32,
    pub headlight_toggle: bool,
    pub brake_light: bool,
}

pub trait InputSource {
    /// Raw device state for the next tick.
    fn poll(&mut self) -> RawInput;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputBindings {
    pub handbrake_threshold: f32,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self { handbrake_threshold: 0.5 }
    }
}

pub struct InputSampler<S> {
    pub bindings: InputBindings,
    source: S,
    last_raw: RawInput,
}

impl<S: InputSource> InputSampler<S> {
    pub fn new(source: S, bindings: InputBindings) -> Self {
        Self { bindings, source, last_raw: RawInput::default() }
    }

    /// Poll the source once and build this tick's frame.
    pub fn sample(&mut self) -> InputFrame {
        let raw = self.source.poll();
        self.last_raw = raw;
        self.frame_from(&raw)
    }

    pub fn frame_from(&self, raw: &RawInput) -> InputFrame {
        InputFrame {
            steer: raw.drive[0],
            throttle: raw.drive[1],
            brake: raw.brake,
            handbrake: raw.handbrake > self.bindings.handbrake_threshold,
        }
        .clamped()
    }

    /// Raw values from the most recent `sample`, for the light/audio glue.
    pub fn last_raw(&self) -> &RawInput {
        &self.last_raw
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

// ============================================
// Scripted input
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptSegment {
    pub ticks: u32,
    #[serde(flatten)]
    pub input: RawInput,
}

/// Plays segments back in order, then holds neutral input.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    segments: Vec<ScriptSegment>,
    index: usize,
    elapsed: u32,
}

impl ScriptedInput {
    pub fn new(segments: Vec<ScriptSegment>) -> Self {
        Self { segments, index: 0, elapsed: 0 }
    }

    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        let segments: Vec<ScriptSegment> = serde_json::from_str(s)?;
        Ok(Self::new(segments))
    }

    /// Accelerate, carve a turn, yank the handbrake, then brake to a stop.
    pub fn demo_lap() -> Self {
        let seg = |ticks, steer, throttle, brake, handbrake, brake_light| ScriptSegment {
            ticks,
            input: RawInput {
                drive: [steer, throttle],
                brake,
                handbrake,
                headlight_toggle: false,
                brake_light,
            },
        };
        let mut lights_on = seg(1, 0.0, 0.0, 0.0, 0.0, false);
        lights_on.input.headlight_toggle = true;

        Self::new(vec![
            lights_on,
            seg(180, 0.0, 1.0, 0.0, 0.0, false),
            seg(120, 0.6, 1.0, 0.0, 0.0, false),
            seg(40, 1.0, 0.3, 0.0, 1.0, false),
            seg(90, -0.3, 0.8, 0.0, 0.0, false),
            seg(120, 0.0, 0.0, 1.0, 0.0, true),
            seg(60, 0.0, 0.0, 0.0, 0.0, false),
        ])
    }

    pub fn finished(&self) -> bool {
        self.index >= self.segments.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> RawInput {
        while let Some(seg) = self.segments.get(self.index) {
            if self.elapsed < seg.ticks {
                self.elapsed += 1;
                return seg.input;
            }
            self.index += 1;
            self.elapsed = 0;
        }
        RawInput::default()
    }
}

// ============================================
// Noise wrapper
// ============================================

pub struct NoisyInput<S> {
    inner: S,
    rng: StdRng,
    pub steer_jitter: f32,
}

impl<S: InputSource> NoisyInput<S> {
    pub fn new(inner: S, seed: u64, steer_jitter: f32) -> Self {
        Self {
            inner,
            rng: StdRng::seed_from_u64(seed),
            steer_jitter: steer_jitter.abs(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: InputSource> InputSource for NoisyInput<S> {
    fn poll(&mut self) -> RawInput {
        let mut raw = self.inner.poll();
        if self.steer_jitter > 0.0 {
            let j = self.rng.gen_range(-self.steer_jitter..=self.steer_jitter);
            raw.drive[0] = (raw.drive[0] + j).clamp(-1.0, 1.0);
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(RawInput);
    impl InputSource for Fixed {
        fn poll(&mut self) -> RawInput { self.0 }
    }

    #[test]
    fn handbrake_needs_trigger_past_threshold() {
        let mut raw = RawInput { handbrake: 0.5, ..RawInput::default() };
        let sampler = InputSampler::new(Fixed(raw), InputBindings::default());
        assert!(!sampler.frame_from(&raw).handbrake);
        raw.handbrake = 0.51;
        assert!(sampler.frame_from(&raw).handbrake);
    }

    #[test]
    fn sample_clamps_and_remembers_raw() {
        let raw = RawInput { drive: [2.0, -3.0], brake: 5.0, ..RawInput::default() };
        let mut sampler = InputSampler::new(Fixed(raw), InputBindings::default());
        let f = sampler.sample();
        assert_eq!((f.steer, f.throttle, f.brake), (1.0, -1.0, 1.0));
        assert_eq!(sampler.last_raw().drive, [2.0, -3.0]);
    }

    #[test]
    fn script_plays_segments_then_goes_neutral() {
        let json = r#"[
            {"ticks": 2, "drive": [0.0, 1.0]},
            {"ticks": 1, "brake": 1.0, "brake_light": true}
        ]"#;
        let mut s = ScriptedInput::from_json_str(json).unwrap();
        assert_eq!(s.poll().drive, [0.0, 1.0]);
        assert_eq!(s.poll().drive, [0.0, 1.0]);
        let third = s.poll();
        assert_eq!(third.brake, 1.0);
        assert!(third.brake_light);
        assert!(!s.finished());
        assert_eq!(s.poll(), RawInput::default());
        assert!(s.finished());
    }

    #[test]
    fn zero_length_segments_are_skipped() {
        let mut s = ScriptedInput::new(vec![
            ScriptSegment { ticks: 0, input: RawInput { brake: 1.0, ..RawInput::default() } },
            ScriptSegment { ticks: 1, input: RawInput { drive: [0.5, 0.0], ..RawInput::default() } },
        ]);
        assert_eq!(s.poll().drive, [0.5, 0.0]);
    }

    #[test]
    fn noise_is_seeded_and_bounded() {
        let base = RawInput { drive: [0.95, 1.0], ..RawInput::default() };
        let mut a = NoisyInput::new(Fixed(base), 7, 0.2);
        let mut b = NoisyInput::new(Fixed(base), 7, 0.2);
        for _ in 0..50 {
            let (ra, rb) = (a.poll(), b.poll());
            assert_eq!(ra, rb);
            assert!(ra.drive[0] <= 1.0 && ra.drive[0] >= 0.75);
            assert_eq!(ra.drive[1], 1.0);
        }
    }
}
