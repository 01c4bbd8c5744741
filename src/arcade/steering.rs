// ==============================================================================
// steering.rs — STEER ANGLE SMOOTHING (FRONT AXLE)
// ==============================================================================
// Responsibilities:
// - Convert driver steering intent (-1..1) into a target wheel angle
// - Approach the target exponentially at a configurable response rate
// ------------------------------------------------------------------------------
//
//     θ_target = max_turn_angle * steer_input
//     θ       += (θ_target - θ) * clamp01(rate * dt)
//
// rate * dt >= 1 snaps straight to the target (instant steering).
// Angles are in degrees, sign convention: + = steer right.
// ==============================================================================

use crate::arcade::types::clamp01;

/// Steering configuration (per vehicle)
#[derive(Clone, Copy, Debug)]
pub struct SteeringConfig {
    pub max_turn_angle: f32, // degrees
    pub response_rate: f32,  // 1/s
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SteeringState {
    pub angle: f32,  // current angle (degrees)
    pub target: f32, // last target (degrees)
}

impl SteeringState {
    /// Advance one tick toward `max_turn_angle * steer_input`.
    pub fn update(&mut self, config: &SteeringConfig, steer_input: f32, dt: f32) -> f32 {
        self.target = config.max_turn_angle * steer_input.clamp(-1.0, 1.0);
        let t = clamp01(config.response_rate * dt);
        self.angle += (self.target - self.angle) * t;
        self.angle
    }
}
