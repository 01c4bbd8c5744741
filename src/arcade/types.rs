//! Core shared types for `arcade` (engine-agnostic).
// arcade/types.rs

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::Serialize;

pub type Vec3 = Vector3<f32>;

/// Velocities below this magnitude are treated as "at rest" by the blender.
pub const SPEED_EPSILON: f32 = 1e-4;

// ----- tiny scalar helpers -----
#[inline] pub fn clamp01(t: f32) -> f32 { t.clamp(0.0, 1.0) }
#[inline] pub fn lerp(a: f32, b: f32, t: f32) -> f32 { a + (b - a) * clamp01(t) }

#[inline]
pub fn lerp_vec(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * clamp01(t)
}

/// Angle between two vectors in degrees. Zero when either is degenerate.
#[inline]
pub fn angle_deg(a: Vec3, b: Vec3) -> f32 {
    let denom = a.norm() * b.norm();
    if denom <= SPEED_EPSILON * SPEED_EPSILON {
        return 0.0;
    }
    (a.dot(&b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

// ============================================
// Wheel role
// ============================================

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelRole { Front, Rear }

impl WheelRole {
    /// Role from the wheel's fixed local longitudinal offset (+Z is forward).
    /// A wheel sitting exactly on the axle line counts as Rear.
    pub fn from_longitudinal_offset(z: f32) -> Self {
        if z > 0.0 { WheelRole::Front } else { WheelRole::Rear }
    }

    pub fn is_front(&self) -> bool {
        matches!(self, WheelRole::Front)
    }

    pub fn is_rear(&self) -> bool {
        matches!(self, WheelRole::Rear)
    }
}

// ============================================
// ----- inputs -------------------------------
// ============================================

/// One tick of driver intent. Sampled fresh each tick, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    pub steer: f32,     // -1..1
    pub throttle: f32,  // -1..1
    pub brake: f32,     // 0..1
    pub handbrake: bool,
}

impl InputFrame {
    pub fn clamped(self) -> Self {
        Self {
            steer: self.steer.clamp(-1.0, 1.0),
            throttle: self.throttle.clamp(-1.0, 1.0),
            brake: self.brake.clamp(0.0, 1.0),
            handbrake: self.handbrake,
        }
    }
}

/// What the host physics body reports at the start of a tick. Default is the
/// rest pose: +Z forward, +Y up, -X right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChassisState {
    pub velocity: Vec3,
    pub forward: Vec3, // unit, world space
    pub right: Vec3,   // unit, world space
}

impl Default for ChassisState {
    fn default() -> Self {
        Self {
            velocity: Vec3::zeros(),
            forward: Vec3::new(0.0, 0.0, 1.0),
            right: Vec3::new(-1.0, 0.0, 0.0),
        }
    }
}

// ============================================
// ----- outputs ------------------------------
// ============================================

/// Per-wheel actuation for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WheelCommand {
    pub role: WheelRole,
    pub motor_torque: f32,
    pub brake_torque: f32,
    /// Degrees. `None` leaves the wheel's current steer angle untouched.
    pub steer_angle: Option<f32>,
}

/// Host-engine wheel pose (world space), as produced by the physics solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelPose {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl Default for WheelPose {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_follows_offset_sign() {
        assert_eq!(WheelRole::from_longitudinal_offset(1.4), WheelRole::Front);
        assert_eq!(WheelRole::from_longitudinal_offset(-1.4), WheelRole::Rear);
        assert_eq!(WheelRole::from_longitudinal_offset(0.0), WheelRole::Rear);
    }

    #[test]
    fn angle_is_zero_for_degenerate_vectors() {
        assert_eq!(angle_deg(Vec3::new(1.0, 0.0, 0.0), Vec3::zeros()), 0.0);
        let a = angle_deg(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 3.0));
        assert!((a - 90.0).abs() < 1e-4);
    }

    #[test]
    fn lerp_clamps_parameter() {
        assert_eq!(lerp(1.0, 0.5, 2.0), 0.5);
        assert_eq!(lerp(1.0, 0.5, -1.0), 1.0);
    }

    #[test]
    fn input_frame_clamps_axes() {
        let f = InputFrame { steer: -3.0, throttle: 2.0, brake: -1.0, handbrake: true }.clamped();
        assert_eq!(f.steer, -1.0);
        assert_eq!(f.throttle, 1.0);
        assert_eq!(f.brake, 0.0);
        assert!(f.handbrake);
    }
}
