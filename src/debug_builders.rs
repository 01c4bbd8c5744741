// ==============================================================================
// debug_builders.rs — DEBUG RAY PRIMITIVES (TELEMETRY OVERLAY)
// ------------------------------------------------------------------------------
// Serializable rays drawn from the chassis origin:
// - forward  (white): chassis heading
// - velocity (blue):  actual direction of travel, normalized
// - input    (green): raw stick direction (steer, 0, throttle), normalized
//
// Purely visualization scaffolding, no side effects on the simulation.
// ==============================================================================

use serde::Serialize;

use crate::arcade::{ChassisState, InputFrame, Vec3};

pub const RAY_LENGTH: f32 = 3.0;

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
const BLUE: [f32; 3] = [0.0, 0.0, 1.0];
const GREEN: [f32; 3] = [0.0, 1.0, 0.0];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DebugRay {
    pub origin: [f32; 3],
    pub direction: [f32; 3],
    pub length: f32,
    pub color: [f32; 3],
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DebugOverlay {
    pub rays: Vec<DebugRay>,
}

impl DebugOverlay {
    pub fn clear(&mut self) {
        self.rays.clear();
    }
}

#[inline] fn v3(v: Vec3) -> [f32; 3] { [v.x, v.y, v.z] }

#[inline]
fn unit_or_zero(v: Vec3) -> Vec3 {
    let m = v.norm();
    if m > 1e-6 { v / m } else { Vec3::zeros() }
}

pub fn push_chassis_rays(
    overlay: &mut DebugOverlay,
    origin: [f32; 3],
    chassis: &ChassisState,
    input: &InputFrame,
) {
    let input_dir = Vec3::new(input.steer, 0.0, input.throttle);

    for (dir, color) in [
        (chassis.forward, WHITE),
        (unit_or_zero(chassis.velocity), BLUE),
        (unit_or_zero(input_dir), GREEN),
    ] {
        overlay.rays.push(DebugRay {
            origin,
            direction: v3(dir),
            length: RAY_LENGTH,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_rays_with_unit_or_zero_directions() {
        let mut overlay = DebugOverlay::default();
        let chassis = ChassisState {
            velocity: Vec3::new(0.0, 0.0, 12.0),
            ..ChassisState::default()
        };
        push_chassis_rays(&mut overlay, [0.0; 3], &chassis, &InputFrame::default());

        assert_eq!(overlay.rays.len(), 3);
        assert_eq!(overlay.rays[1].direction, [0.0, 0.0, 1.0]);
        assert_eq!(overlay.rays[2].direction, [0.0, 0.0, 0.0]);

        overlay.clear();
        assert!(overlay.rays.is_empty());
    }
}
