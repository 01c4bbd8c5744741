// ==============================================================================
// drivetrain.rs — ARCADE DRIVETRAIN (MOTOR + BRAKE + HANDBRAKE PER WHEEL)
// ==============================================================================
// Turns one InputFrame into a WheelCommand per wheel:
// 1) Motor torque, front wheels only (front-wheel drive)
// 2) Optional engine braking when the throttle is released
// 3) Service brake, uniform on every wheel
// 4) Handbrake, rear wheels only, overrides whatever 1-3 produced
//
// Two policies share this code:
// - deceleration off: rear motor torque is always zero
// - deceleration on:  throttle released + moving => every wheel gets
//                     -rate * sign(V·F) (sign(0) = +1, -0.0 included);
//                     throttle released + (nearly) stopped => zero torque
//                     and the chassis is snapped to rest
// ==============================================================================

use serde::{Deserialize, Serialize};

use crate::arcade::types::{ChassisState, InputFrame, WheelCommand, WheelRole};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveTrainConfig {
    pub max_acceleration: f32,  // motor torque at full throttle
    pub max_brake_force: f32,   // brake torque while braking
    pub handbrake_torque: f32,  // rear brake torque under handbrake
    pub deceleration_enabled: bool,
    pub deceleration_rate: f32, // engine-braking torque
    pub throttle_deadzone: f32, // |throttle| above this counts as "on the gas"
    pub stop_speed: f32,        // m/s, below this a coasting car is parked
}

impl Default for DriveTrainConfig {
    fn default() -> Self {
        Self {
            max_acceleration: 500.0,
            max_brake_force: 300.0,
            handbrake_torque: 2000.0,
            deceleration_enabled: false,
            deceleration_rate: 10.0,
            throttle_deadzone: 0.1,
            stop_speed: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriveTrainOutput {
    pub wheels: Vec<WheelCommand>,
    /// Set when the deceleration policy parks the car this tick.
    pub snap_to_rest: bool,
    /// Motor torque the front axle actually received (first wheel when
    /// there is no front wheel).
    pub motor_torque: f32,
    /// Strongest brake torque applied to any wheel, handbrake included.
    pub brake_torque: f32,
}

/// Sign with zero (either sign bit) counted as positive.
#[inline]
fn sign_or_positive(x: f32) -> f32 {
    if x >= 0.0 { 1.0 } else { -1.0 }
}

/// Per-wheel targets for this tick. `steer_angle` is the already-smoothed
/// front angle in degrees.
pub fn solve_drivetrain(
    config: &DriveTrainConfig,
    input: &InputFrame,
    chassis: &ChassisState,
    roles: &[WheelRole],
    steer_angle: f32,
) -> DriveTrainOutput {
    let motor = config.max_acceleration * input.throttle;
    let brake = if input.brake > 0.0 { config.max_brake_force } else { 0.0 };

    let mut snap_to_rest = false;

    // -------------------------
    // MOTOR
    // -------------------------
    let on_throttle = input.throttle.abs() > config.throttle_deadzone;
    let speed = chassis.velocity.norm();

    let per_role_motor = |role: WheelRole| -> f32 {
        if !config.deceleration_enabled || on_throttle {
            return if role.is_front() { motor } else { 0.0 };
        }
        if speed > config.stop_speed {
            -config.deceleration_rate * sign_or_positive(chassis.velocity.dot(&chassis.forward))
        } else {
            0.0
        }
    };

    if config.deceleration_enabled && !on_throttle && speed <= config.stop_speed {
        snap_to_rest = true;
    }

    let wheels = roles
        .iter()
        .map(|&role| {
            let mut cmd = WheelCommand {
                role,
                motor_torque: per_role_motor(role),
                brake_torque: brake,
                steer_angle: role.is_front().then_some(steer_angle),
            };

            // -------------------------
            // HANDBRAKE (rear only, wins)
            // -------------------------
            if input.handbrake && role.is_rear() {
                cmd.brake_torque = config.handbrake_torque;
                cmd.motor_torque = 0.0;
            }
            cmd
        })
        .collect::<Vec<WheelCommand>>();

    let motor_torque = wheels
        .iter()
        .find(|w| w.role.is_front())
        .or_else(|| wheels.first())
        .map_or(0.0, |w| w.motor_torque);
    let brake_torque = wheels.iter().map(|w| w.brake_torque).fold(0.0, f32::max);

    DriveTrainOutput {
        wheels,
        snap_to_rest,
        motor_torque,
        brake_torque,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade::types::Vec3;

    const ROLES: [WheelRole; 4] = [
        WheelRole::Front,
        WheelRole::Front,
        WheelRole::Rear,
        WheelRole::Rear,
    ];

    fn moving(speed: f32) -> ChassisState {
        ChassisState {
            velocity: Vec3::new(0.0, 0.0, speed),
            ..ChassisState::default()
        }
    }

    fn input(throttle: f32, brake: f32, handbrake: bool) -> InputFrame {
        InputFrame { steer: 0.0, throttle, brake, handbrake }
    }

    #[test]
    fn base_policy_drives_front_only() {
        let out = solve_drivetrain(
            &DriveTrainConfig::default(),
            &input(0.5, 0.0, false),
            &moving(3.0),
            &ROLES,
            12.0,
        );
        for cmd in &out.wheels {
            match cmd.role {
                WheelRole::Front => {
                    assert_eq!(cmd.motor_torque, 250.0);
                    assert_eq!(cmd.steer_angle, Some(12.0));
                }
                WheelRole::Rear => {
                    assert_eq!(cmd.motor_torque, 0.0);
                    assert_eq!(cmd.steer_angle, None);
                }
            }
            assert_eq!(cmd.brake_torque, 0.0);
        }
        assert!(!out.snap_to_rest);
    }

    #[test]
    fn brake_applies_to_every_wheel() {
        let out = solve_drivetrain(
            &DriveTrainConfig::default(),
            &input(0.0, 0.2, false),
            &moving(3.0),
            &ROLES,
            0.0,
        );
        assert!(out.wheels.iter().all(|w| w.brake_torque == 300.0));
    }

    #[test]
    fn handbrake_overrides_rear_regardless_of_throttle() {
        for deceleration_enabled in [false, true] {
            let cfg = DriveTrainConfig { deceleration_enabled, ..DriveTrainConfig::default() };
            for throttle in [-1.0, 0.0, 1.0] {
                let out = solve_drivetrain(&cfg, &input(throttle, 1.0, true), &moving(8.0), &ROLES, 0.0);
                for cmd in out.wheels.iter().filter(|w| w.role.is_rear()) {
                    assert_eq!(cmd.motor_torque, 0.0);
                    assert_eq!(cmd.brake_torque, 2000.0);
                }
                for cmd in out.wheels.iter().filter(|w| w.role.is_front()) {
                    assert_eq!(cmd.brake_torque, 300.0);
                }
            }
        }
    }

    #[test]
    fn coasting_applies_engine_braking_against_motion() {
        let cfg = DriveTrainConfig { deceleration_enabled: true, ..DriveTrainConfig::default() };

        let fwd = solve_drivetrain(&cfg, &input(0.05, 0.0, false), &moving(6.0), &ROLES, 0.0);
        assert!(fwd.wheels.iter().all(|w| w.motor_torque == -10.0));

        let back = solve_drivetrain(&cfg, &input(0.0, 0.0, false), &moving(-6.0), &ROLES, 0.0);
        assert!(back.wheels.iter().all(|w| w.motor_torque == 10.0));
        assert!(!back.snap_to_rest);
    }

    #[test]
    fn sideways_motion_brakes_as_if_moving_forward() {
        let cfg = DriveTrainConfig { deceleration_enabled: true, ..DriveTrainConfig::default() };
        for velocity in [Vec3::new(5.0, 0.0, 0.0), Vec3::new(-3.0, -4.0, -0.0)] {
            let chassis = ChassisState { velocity, ..ChassisState::default() };
            let out = solve_drivetrain(&cfg, &input(0.0, 0.0, false), &chassis, &ROLES, 0.0);
            assert!(out.wheels.iter().all(|w| w.motor_torque == -10.0), "{velocity:?}");
            assert_eq!(out.motor_torque, -10.0);
        }
    }

    #[test]
    fn reported_torques_match_what_the_wheels_got() {
        let cfg = DriveTrainConfig { deceleration_enabled: true, ..DriveTrainConfig::default() };

        let coast = solve_drivetrain(&cfg, &input(0.05, 0.0, false), &moving(6.0), &ROLES, 0.0);
        assert_eq!(coast.motor_torque, -10.0);

        let parked = solve_drivetrain(&cfg, &input(0.0, 0.0, false), &moving(0.0), &ROLES, 0.0);
        assert_eq!(parked.motor_torque, 0.0);

        let pulled = solve_drivetrain(&cfg, &input(1.0, 0.0, true), &moving(6.0), &ROLES, 0.0);
        assert_eq!(pulled.motor_torque, 500.0);
        assert_eq!(pulled.brake_torque, 2000.0);

        let rear_only = solve_drivetrain(
            &DriveTrainConfig::default(),
            &input(1.0, 0.0, false),
            &moving(6.0),
            &[WheelRole::Rear, WheelRole::Rear],
            0.0,
        );
        assert_eq!(rear_only.motor_torque, 0.0);
    }

    #[test]
    fn coasting_at_crawl_snaps_to_rest() {
        let cfg = DriveTrainConfig { deceleration_enabled: true, ..DriveTrainConfig::default() };
        let out = solve_drivetrain(&cfg, &input(0.0, 0.0, false), &moving(0.05), &ROLES, 0.0);
        assert!(out.snap_to_rest);
        assert!(out.wheels.iter().all(|w| w.motor_torque == 0.0));
    }

    #[test]
    fn throttle_inside_deadzone_does_not_drive_under_deceleration_policy() {
        let cfg = DriveTrainConfig { deceleration_enabled: true, ..DriveTrainConfig::default() };
        let out = solve_drivetrain(&cfg, &input(0.1, 0.0, false), &moving(0.0), &ROLES, 0.0);
        assert!(out.wheels.iter().all(|w| w.motor_torque == 0.0));
        assert!(out.snap_to_rest);

        let base = solve_drivetrain(&DriveTrainConfig::default(), &input(0.1, 0.0, false), &moving(0.0), &ROLES, 0.0);
        assert_eq!(base.wheels[0].motor_torque, 50.0);
        assert!(!base.snap_to_rest);
    }
}
