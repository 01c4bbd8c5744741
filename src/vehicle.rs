use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arcade::{
    blend_velocity, solve_drivetrain, ChassisState, DriveSignal, DriveTrainConfig, InputFrame,
    RegimeTracker, SignalEmitter, SteeringConfig, SteeringState, TractionConfig, TractionRegime,
    Vec3, WheelCommand, WheelRole,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub drivetrain: DriveTrainConfig,
    pub max_turn_angle: f32,          // degrees
    pub steering_response_rate: f32,  // 1/s, rate * dt >= 1 is instant
    pub traction: Option<TractionConfig>, // None => no velocity blending
}

impl Default for VehicleConfig {
    fn default() -> Self {
        CLASSIC
    }
}

/// Front-wheel drive, instant steering, no engine braking, no traction blending.
///
/// Steering snaps while `steering_response_rate * dt >= 1`, i.e. for any tick
/// rate up to 1000 Hz. A zero (or non-finite) dt always holds the angle.
pub const CLASSIC: VehicleConfig = VehicleConfig {
    drivetrain: DriveTrainConfig {
        max_acceleration: 500.0,
        max_brake_force: 300.0,
        handbrake_torque: 2000.0,
        deceleration_enabled: false,
        deceleration_rate: 10.0,
        throttle_deadzone: 0.1,
        stop_speed: 0.1,
    },
    max_turn_angle: 30.0,
    steering_response_rate: 1000.0,
    traction: None,
};

/// Smoothed steering, engine braking and drift/grip velocity blending.
pub const DRIFT: VehicleConfig = VehicleConfig {
    drivetrain: DriveTrainConfig {
        max_acceleration: 500.0,
        max_brake_force: 300.0,
        handbrake_torque: 2000.0,
        deceleration_enabled: true,
        deceleration_rate: 10.0,
        throttle_deadzone: 0.1,
        stop_speed: 0.1,
    },
    max_turn_angle: 30.0,
    steering_response_rate: 5.0,
    traction: Some(TractionConfig {
        grip_coefficient: 1.0,
        drift_angle_threshold: 10.0,
        min_drift_speed: 10.0,
    }),
};

impl VehicleConfig {
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "classic" => Some(CLASSIC),
            "drift" => Some(DRIFT),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.drivetrain;
        non_negative("drivetrain.max_acceleration", d.max_acceleration)?;
        non_negative("drivetrain.max_brake_force", d.max_brake_force)?;
        non_negative("drivetrain.handbrake_torque", d.handbrake_torque)?;
        non_negative("drivetrain.deceleration_rate", d.deceleration_rate)?;
        non_negative("drivetrain.throttle_deadzone", d.throttle_deadzone)?;
        non_negative("drivetrain.stop_speed", d.stop_speed)?;
        non_negative("max_turn_angle", self.max_turn_angle)?;
        non_negative("steering_response_rate", self.steering_response_rate)?;

        if let Some(t) = &self.traction {
            finite("traction.grip_coefficient", t.grip_coefficient)?;
            if t.grip_coefficient <= 0.0 || t.grip_coefficient > 1.0 {
                return Err(ConfigError::InvalidConfig {
                    field: "traction.grip_coefficient",
                    value: t.grip_coefficient,
                    expected: "a value in (0, 1]",
                });
            }
            finite("traction.min_drift_speed", t.min_drift_speed)?;
            if t.min_drift_speed <= 0.0 {
                return Err(ConfigError::InvalidConfig {
                    field: "traction.min_drift_speed",
                    value: t.min_drift_speed,
                    expected: "a positive speed",
                });
            }
            finite("traction.drift_angle_threshold", t.drift_angle_threshold)?;
        }
        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidConfig { field, value, expected: "a finite number" })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::InvalidConfig { field, value, expected: "a non-negative number" });
    }
    Ok(())
}

/// Error type for vehicle construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidConfig {
        field: &'static str,
        value: f32,
        expected: &'static str,
    },
    NoWheels,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidConfig { field, value, expected } => {
                write!(f, "invalid config: {field} = {value}, expected {expected}")
            }
            ConfigError::NoWheels => write!(f, "vehicle has no wheels"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================
// Runtime state
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VehicleState {
    pub velocity: [f32; 3],
    pub forward: [f32; 3],
    pub right: [f32; 3],
    pub steer_angle: f32,  // degrees
    pub motor_torque: f32, // applied to the front axle this tick
    pub brake_torque: f32, // strongest wheel brake this tick, handbrake included
    pub handbrake: bool,
}

/// Everything the host has to apply for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlOutputs {
    pub wheels: Vec<WheelCommand>,
    /// New chassis velocity, when traction blending or a park snap changed it.
    pub velocity: Option<Vec3>,
    pub regime: Option<TractionRegime>,
    pub slip_angle: f32, // degrees
    pub steer_angle: f32,
    pub skid_trails: bool,
    pub signal: DriveSignal,
}

/// Engine-side glue for `CarController::run_tick`.
pub trait VehicleHost {
    fn sample_input(&mut self) -> InputFrame;
    fn chassis_state(&self) -> ChassisState;
    fn apply_controls(&mut self, outputs: &ControlOutputs);
    fn sync_wheel_visuals(&mut self, outputs: &ControlOutputs);
}

pub struct CarController {
    config: VehicleConfig,
    roles: Vec<WheelRole>,
    steering: SteeringState,
    regime: RegimeTracker,
    state: VehicleState,
    signals: SignalEmitter,
    ticks: u64,
}

impl CarController {
    /// `wheel_offsets_z` are the wheels' local longitudinal offsets in host
    /// order; roles are fixed from their sign here and never change.
    pub fn new(config: VehicleConfig, wheel_offsets_z: &[f32]) -> Result<Self, ConfigError> {
        config.validate()?;
        if wheel_offsets_z.is_empty() {
            return Err(ConfigError::NoWheels);
        }

        let roles = wheel_offsets_z
            .iter()
            .map(|&z| WheelRole::from_longitudinal_offset(z))
            .collect();

        Ok(Self {
            config,
            roles,
            steering: SteeringState::default(),
            regime: RegimeTracker::default(),
            state: VehicleState::default(),
            signals: SignalEmitter::new(),
            ticks: 0,
        })
    }

    pub fn config(&self) -> &VehicleConfig { &self.config }
    pub fn roles(&self) -> &[WheelRole] { &self.roles }
    pub fn state(&self) -> &VehicleState { &self.state }
    pub fn regime(&self) -> &RegimeTracker { &self.regime }
    pub fn ticks(&self) -> u64 { self.ticks }
    pub fn signals_mut(&mut self) -> &mut SignalEmitter { &mut self.signals }

    /// One fixed-timestep pass: drivetrain targets, then traction blending.
    /// Pure with respect to the host; nothing is applied or emitted.
    pub fn tick(&mut self, dt: f32, input: InputFrame, chassis: &ChassisState) -> ControlOutputs {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let input = input.clamped();

        let steer_cfg = SteeringConfig {
            max_turn_angle: self.config.max_turn_angle,
            response_rate: self.config.steering_response_rate,
        };
        let steer_angle = self.steering.update(&steer_cfg, input.steer, dt);

        let drive = solve_drivetrain(
            &self.config.drivetrain,
            &input,
            chassis,
            &self.roles,
            steer_angle,
        );

        let mut velocity = None;
        let mut regime = None;
        let mut slip_angle = 0.0;

        if let Some(traction) = &self.config.traction {
            let blended =
                blend_velocity(traction, chassis.velocity, chassis.forward, chassis.right, dt);

            if let Some(prev) = self.regime.observe(blended.regime) {
                debug!(
                    tick = self.ticks,
                    from = ?prev,
                    to = ?blended.regime,
                    slip_angle = blended.slip_angle,
                    "traction regime changed"
                );
            }

            velocity = Some(blended.velocity);
            regime = Some(blended.regime);
            slip_angle = blended.slip_angle;
        }

        if drive.snap_to_rest {
            velocity = Some(Vec3::zeros());
        }

        let resulting = velocity.unwrap_or(chassis.velocity);
        self.state = VehicleState {
            velocity: [resulting.x, resulting.y, resulting.z],
            forward: [chassis.forward.x, chassis.forward.y, chassis.forward.z],
            right: [chassis.right.x, chassis.right.y, chassis.right.z],
            steer_angle,
            motor_torque: drive.motor_torque,
            brake_torque: drive.brake_torque,
            handbrake: input.handbrake,
        };
        self.ticks += 1;

        ControlOutputs {
            wheels: drive.wheels,
            velocity,
            regime,
            slip_angle,
            steer_angle,
            skid_trails: input.handbrake,
            signal: DriveSignal::from_throttle(input.throttle),
        }
    }

    /// Full host-driven tick, in order: sample input, drivetrain + traction,
    /// apply, sync wheel visuals, notify listeners.
    pub fn run_tick<H: VehicleHost>(&mut self, dt: f32, host: &mut H) -> ControlOutputs {
        let input = host.sample_input();
        let chassis = host.chassis_state();
        let outputs = self.tick(dt, input, &chassis);
        host.apply_controls(&outputs);
        host.sync_wheel_visuals(&outputs);
        self.signals.emit(outputs.signal);
        outputs
    }
}
