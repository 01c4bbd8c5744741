// ==============================================================================
// traction.rs — ARCADE TRACTION / DRIFT VELOCITY BLENDING
// ==============================================================================
// There is no tire model here. Each tick the chassis velocity is pulled toward
// its forward-facing component, which "de-sideslips" the body:
//
//     v_fwd   = F * (V · F)
//     v_right = R * (V · R)
//     angle   = ∠(F, V)                    degrees
//     ratio   = |V| / min_drift_speed
//     blend   = lerp(1, grip, clamp01(ratio - 1))
//
//   Drift (angle > threshold && |V| > min_drift_speed):
//     V = lerp(V, v_fwd, blend * dt) + (1 - blend) * dt * v_right
//   Grip:
//     V = lerp(V, v_fwd, grip * dt)
//
// Drift keeps part of the lateral velocity (controlled slide), Grip removes it.
// |V| ≈ 0 is a no-op.
// ==============================================================================

use serde::{Deserialize, Serialize};

use crate::arcade::state::{classify_regime, TractionRegime};
use crate::arcade::types::{angle_deg, clamp01, lerp, lerp_vec, Vec3, SPEED_EPSILON};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TractionConfig {
    pub grip_coefficient: f32,      // (0, 1]
    pub drift_angle_threshold: f32, // degrees
    pub min_drift_speed: f32,       // m/s, > 0
}

impl Default for TractionConfig {
    fn default() -> Self {
        Self {
            grip_coefficient: 1.0,
            drift_angle_threshold: 10.0,
            min_drift_speed: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TractionResult {
    pub velocity: Vec3,
    pub regime: TractionRegime,
    pub slip_angle: f32, // degrees
    pub blend: f32,
}

/// 1.0 at or below `min_drift_speed`, sliding to `grip` by twice that speed.
#[inline]
pub fn blend_factor(speed_ratio: f32, grip: f32) -> f32 {
    lerp(1.0, grip, clamp01(speed_ratio - 1.0))
}

pub fn blend_velocity(
    config: &TractionConfig,
    velocity: Vec3,
    forward: Vec3,
    right: Vec3,
    dt: f32,
) -> TractionResult {
    let speed = velocity.norm();

    if speed <= SPEED_EPSILON {
        return TractionResult {
            velocity,
            regime: TractionRegime::Grip,
            slip_angle: 0.0,
            blend: 1.0,
        };
    }

    let v_fwd = forward * velocity.dot(&forward);
    let v_right = right * velocity.dot(&right);

    let slip_angle = angle_deg(forward, velocity);
    let speed_ratio = speed / config.min_drift_speed;
    let blend = blend_factor(speed_ratio, config.grip_coefficient);

    let regime = classify_regime(
        slip_angle,
        speed,
        config.drift_angle_threshold,
        config.min_drift_speed,
    );

    let velocity = match regime {
        TractionRegime::Drift => {
            lerp_vec(velocity, v_fwd, blend * dt) + v_right * ((1.0 - blend) * dt)
        }
        TractionRegime::Grip => lerp_vec(velocity, v_fwd, config.grip_coefficient * dt),
    };

    TractionResult { velocity, regime, slip_angle, blend }
}
