// ==============================================================================
// wheel_sync.rs — WHEEL MESH + SKID TRAIL VISUALS
// ------------------------------------------------------------------------------
// The physics host owns the wheels; this only mirrors their world pose onto
// the visual transforms and toggles the skid-trail emitters.
//
// - Wheel meshes are found by name prefix ("Wheel_") and paired with physics
//   wheels by index, in scene order.
// - Trails emit while the handbrake is held.
// ==============================================================================

use nalgebra::{Point3, UnitQuaternion};
use serde::Serialize;
use tracing::warn;

use crate::arcade::WheelPose;

pub const WHEEL_MESH_PREFIX: &str = "Wheel_";

#[derive(Debug, Clone, PartialEq)]
pub struct VisualTransform {
    pub name: String,
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl VisualTransform {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
        }
    }

    pub fn set_position_and_rotation(&mut self, pose: &WheelPose) {
        self.position = pose.position;
        self.rotation = pose.rotation;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SkidTrail {
    pub emitting: bool,
}

#[derive(Debug, Clone, Default)]
pub struct WheelPoseSync {
    pub meshes: Vec<VisualTransform>,
    pub trails: Vec<SkidTrail>,
    warned_mismatch: bool,
}

impl WheelPoseSync {
    /// Keeps the transforms whose name starts with `Wheel_`, in scene order.
    pub fn from_scene(transforms: impl IntoIterator<Item = VisualTransform>, trails: usize) -> Self {
        let meshes = transforms
            .into_iter()
            .filter(|t| t.name.starts_with(WHEEL_MESH_PREFIX))
            .collect();

        Self {
            meshes,
            trails: vec![SkidTrail::default(); trails],
            warned_mismatch: false,
        }
    }

    /// Copy physics poses onto the meshes. Extra poses or meshes are left
    /// alone.
    pub fn sync(&mut self, poses: &[WheelPose]) {
        if poses.len() != self.meshes.len() && !self.warned_mismatch {
            warn!(
                wheels = poses.len(),
                meshes = self.meshes.len(),
                "wheel/mesh count mismatch, syncing the common prefix"
            );
            self.warned_mismatch = true;
        }

        for (mesh, pose) in self.meshes.iter_mut().zip(poses) {
            mesh.set_position_and_rotation(pose);
        }
    }

    pub fn set_trails(&mut self, emitting: bool) {
        for trail in self.trails.iter_mut() {
            trail.emitting = emitting;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn pose(x: f32) -> WheelPose {
        WheelPose {
            position: Point3::new(x, 0.35, 0.0),
            rotation: UnitQuaternion::from_axis_angle(&Vector3::x_axis(), x),
        }
    }

    #[test]
    fn discovers_only_wheel_meshes() {
        let scene = ["Body", "Wheel_FL", "Light_L", "Wheel_FR", "Wheel_RL", "Wheel_RR"]
            .into_iter()
            .map(VisualTransform::named);
        let sync = WheelPoseSync::from_scene(scene, 2);
        let names: Vec<_> = sync.meshes.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Wheel_FL", "Wheel_FR", "Wheel_RL", "Wheel_RR"]);
        assert_eq!(sync.trails.len(), 2);
    }

    #[test]
    fn sync_pairs_by_index() {
        let scene = ["Wheel_A", "Wheel_B"].into_iter().map(VisualTransform::named);
        let mut sync = WheelPoseSync::from_scene(scene, 0);
        sync.sync(&[pose(1.0), pose(2.0), pose(3.0)]);
        assert_eq!(sync.meshes[0].position, Point3::new(1.0, 0.35, 0.0));
        assert_eq!(sync.meshes[1].position, Point3::new(2.0, 0.35, 0.0));
        assert_eq!(sync.meshes[1].rotation, pose(2.0).rotation);
    }

    #[test]
    fn trails_follow_flag() {
        let mut sync = WheelPoseSync::from_scene(Vec::new(), 4);
        sync.set_trails(true);
        assert!(sync.trails.iter().all(|t| t.emitting));
        sync.set_trails(false);
        assert!(sync.trails.iter().all(|t| !t.emitting));
    }
}
