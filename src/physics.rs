// src/physics.rs

use std::collections::HashMap;

use rapier3d::control::{DynamicRayCastVehicleController, WheelTuning};
use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::arcade::{ChassisState, WheelPose};
use crate::vehicle::ControlOutputs;

const GROUP_GROUND: Group  = Group::from_bits_truncate(0b0001);
const GROUP_CHASSIS: Group = Group::from_bits_truncate(0b0010);

/// Chassis + wheel layout and the unit mapping from controller torques to
/// rapier wheel forces. Axes: +Z forward, +Y up, -X right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostTuning {
    pub mass: f32,                      // kg
    pub chassis_half_extents: [f32; 3], // [hx, hy, hz] meters
    pub linear_damping: f32,
    pub angular_damping: f32,

    pub wheel_offsets: Vec<[f32; 3]>,   // chassis space, host order
    pub wheel_radius: f32,              // m
    pub suspension_rest_length: f32,    // m

    pub torque_to_force: f32,           // motor torque → engine force
    pub brake_scale: f32,               // brake torque → rapier brake
}

impl Default for HostTuning {
    fn default() -> Self {
        Self {
            mass: 1350.0,
            chassis_half_extents: [0.9, 0.4, 2.0],
            linear_damping: 0.08,
            angular_damping: 0.6,

            wheel_offsets: vec![
                [ 0.8, -0.3,  1.4], // FL
                [-0.8, -0.3,  1.4], // FR
                [ 0.8, -0.3, -1.4], // RL
                [-0.8, -0.3, -1.4], // RR
            ],
            wheel_radius: 0.35,
            suspension_rest_length: 0.35,

            torque_to_force: 1.0 / 0.35,
            brake_scale: 1.0,
        }
    }
}

pub struct CarRig {
    pub body: RigidBodyHandle,
    pub controller: DynamicRayCastVehicleController,
    pub tuning: HostTuning,
}

pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub integration: IntegrationParameters,
    pub pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    pub ccd: CCDSolver,
    pub query_pipeline: QueryPipeline,
    pub cars: HashMap<String, CarRig>, // vehicle id → rig
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        let gravity = vector![0.0, -9.81, 0.0];

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // Big static ground slab, top surface at y = 0.
        let ground_rb = RigidBodyBuilder::fixed()
            .translation(vector![0.0, -1.0, 0.0])
            .build();
        let ground_handle = bodies.insert(ground_rb);

        let ground_collider = ColliderBuilder::cuboid(500.0, 1.0, 500.0)
            .collision_groups(InteractionGroups::new(GROUP_GROUND, GROUP_CHASSIS))
            .friction(1.2)
            .restitution(0.0)
            .build();
        colliders.insert_with_parent(ground_collider, ground_handle, &mut bodies);

        info!(bodies = bodies.len(), colliders = colliders.len(), "ground inserted");

        let mut query_pipeline = QueryPipeline::new();
        query_pipeline.update(&colliders);

        Self {
            gravity,
            integration: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline,
            cars: HashMap::new(),
        }
    }

    /// Dynamic box chassis with ray-cast wheels, dropped at `position`.
    pub fn spawn_car(&mut self, id: &str, position: [f32; 3], tuning: HostTuning) -> RigidBodyHandle {
        let [hx, hy, hz] = tuning.chassis_half_extents;
        let volume = 8.0 * hx * hy * hz;
        let density = tuning.mass / volume.max(1e-3);

        let rb = RigidBodyBuilder::dynamic()
            .translation(vector![position[0], position[1], position[2]])
            .linear_damping(tuning.linear_damping)
            .angular_damping(tuning.angular_damping)
            .ccd_enabled(true)
            .build();

        let collider = ColliderBuilder::cuboid(hx, hy, hz)
            .collision_groups(InteractionGroups::new(GROUP_CHASSIS, GROUP_GROUND))
            .density(density)
            .friction(0.0) // wheels carry all the grip
            .restitution(0.0)
            .build();

        let handle = self.bodies.insert(rb);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);

        let mut controller = DynamicRayCastVehicleController::new(handle);
        controller.index_up_axis = 1;
        controller.index_forward_axis = 2;

        let wheel_tuning = WheelTuning::default();
        for o in &tuning.wheel_offsets {
            controller.add_wheel(
                point![o[0], o[1], o[2]],
                vector![0.0, -1.0, 0.0],
                // up x axle must come out as +Z for positive engine force to push forward
                vector![-1.0, 0.0, 0.0],
                tuning.suspension_rest_length,
                tuning.wheel_radius,
                &wheel_tuning,
            );
        }

        info!(id, wheels = tuning.wheel_offsets.len(), mass = tuning.mass, "car spawned");

        self.cars.insert(
            id.to_string(),
            CarRig { body: handle, controller, tuning },
        );
        handle
    }

    pub fn remove_car(&mut self, id: &str) {
        if let Some(rig) = self.cars.remove(id) {
            self.bodies.remove(
                rig.body,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.joints,
                &mut self.multibody_joints,
                true,
            );
        }
    }

    /// Local longitudinal offsets, in wheel order, for role assignment.
    pub fn wheel_offsets_z(&self, id: &str) -> Vec<f32> {
        self.cars
            .get(id)
            .map(|rig| rig.tuning.wheel_offsets.iter().map(|o| o[2]).collect())
            .unwrap_or_default()
    }

    pub fn chassis_state(&self, id: &str) -> Option<ChassisState> {
        let rig = self.cars.get(id)?;
        let body = self.bodies.get(rig.body)?;
        let rot = body.rotation();

        Some(ChassisState {
            velocity: *body.linvel(),
            forward: rot * vector![0.0, 0.0, 1.0],
            right: rot * vector![-1.0, 0.0, 0.0],
        })
    }

    pub fn chassis_position(&self, id: &str) -> Option<[f32; 3]> {
        let rig = self.cars.get(id)?;
        let t = self.bodies.get(rig.body)?.translation();
        Some([t.x, t.y, t.z])
    }

    /// Push one tick of controller output into the rapier wheels and body.
    pub fn apply_controls(&mut self, id: &str, outputs: &ControlOutputs) {
        let Some(rig) = self.cars.get_mut(id) else { return };

        let torque_to_force = rig.tuning.torque_to_force;
        let brake_scale = rig.tuning.brake_scale;

        for (wheel, cmd) in rig.controller.wheels_mut().iter_mut().zip(&outputs.wheels) {
            wheel.engine_force = cmd.motor_torque * torque_to_force;
            wheel.brake = cmd.brake_torque * brake_scale;
            if let Some(deg) = cmd.steer_angle {
                // + steers right, which is a negative turn about +Y here
                wheel.steering = -deg.to_radians();
            }
        }

        if let Some(v) = outputs.velocity {
            if let Some(body) = self.bodies.get_mut(rig.body) {
                body.set_linvel(v, true);
            }
        }
    }

    pub fn wheel_poses(&self, id: &str) -> Vec<WheelPose> {
        let Some(rig) = self.cars.get(id) else { return Vec::new() };
        let Some(body) = self.bodies.get(rig.body) else { return Vec::new() };
        let rot = *body.rotation();

        rig.controller
            .wheels()
            .iter()
            .map(|w| {
                let steer = UnitQuaternion::from_axis_angle(&Vector::y_axis(), w.steering);
                let spin = UnitQuaternion::from_axis_angle(&Vector::x_axis(), w.rotation);
                WheelPose {
                    position: w.center(),
                    rotation: rot * steer * spin,
                }
            })
            .collect()
    }

    pub fn step(&mut self, dt: Real) {
        // 1) Wheel raycasts, suspension and tire friction
        for rig in self.cars.values_mut() {
            let filter = QueryFilter::default().exclude_rigid_body(rig.body);
            rig.controller.update_vehicle(
                dt,
                &mut self.bodies,
                &self.colliders,
                &self.query_pipeline,
                filter,
            );
        }

        // 2) Integrate
        self.integration.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_car_reports_state_and_wheels() {
        let mut world = PhysicsWorld::new();
        world.spawn_car("car", [0.0, 1.5, 0.0], HostTuning::default());

        assert_eq!(world.wheel_offsets_z("car"), vec![1.4, 1.4, -1.4, -1.4]);
        assert_eq!(world.wheel_poses("car").len(), 4);

        let state = world.chassis_state("car").unwrap();
        assert!((state.forward - vector![0.0, 0.0, 1.0]).norm() < 1e-6);
        assert!(state.velocity.norm() < 1e-6);
        assert!(world.chassis_state("ghost").is_none());
    }

    #[test]
    fn car_settles_on_the_ground() {
        let mut world = PhysicsWorld::new();
        world.spawn_car("car", [0.0, 1.5, 0.0], HostTuning::default());
        for _ in 0..240 {
            world.step(1.0 / 60.0);
        }
        let y = world.chassis_position("car").unwrap()[1];
        assert!(y > 0.0 && y < 1.5, "chassis at y = {y}");
    }

    #[test]
    fn removed_car_is_gone() {
        let mut world = PhysicsWorld::new();
        world.spawn_car("car", [0.0, 1.5, 0.0], HostTuning::default());
        world.remove_car("car");
        assert!(world.cars.is_empty());
        assert!(world.chassis_position("car").is_none());
    }
}
