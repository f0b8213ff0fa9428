use glam::{Mat4, Quat, Vec3};

use super::eye::PerEye;

/// Position + orientation of a tracked reference point, in meters.
///
/// A pose is valid for the frame it was queried for only.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pose {
    pub orientation: Quat,
    pub position: Vec3,
}

impl Pose {
    pub const IDENTITY: Pose = Pose { orientation: Quat::IDENTITY, position: Vec3::ZERO };

    #[inline]
    pub const fn new(orientation: Quat, position: Vec3) -> Self {
        Self { orientation, position }
    }

    /// Rigid transform from pose space to the tracking origin.
    #[inline]
    pub fn to_mat4(self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    pub fn is_finite(self) -> bool {
        self.orientation.is_finite() && self.position.is_finite()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Whether the tracking subsystem currently locates the HMD.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TrackingStatus {
    Tracking,
    /// HMD present but neither orientation nor position is tracked.
    NotTracking,
}

/// Per-eye poses reported for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TrackingState {
    pub status: TrackingStatus,
    pub poses: PerEye<Pose>,
}

impl TrackingState {
    pub fn tracking(poses: PerEye<Pose>) -> Self {
        Self { status: TrackingStatus::Tracking, poses }
    }

    /// Degraded state carrying identity poses.
    pub fn not_tracking() -> Self {
        Self {
            status: TrackingStatus::NotTracking,
            poses: PerEye::new(Pose::IDENTITY, Pose::IDENTITY),
        }
    }

    /// Poses safe to render with: identity for both eyes unless tracking.
    pub fn effective_poses(&self) -> PerEye<Pose> {
        match self.status {
            TrackingStatus::Tracking => self.poses,
            TrackingStatus::NotTracking => PerEye::new(Pose::IDENTITY, Pose::IDENTITY),
        }
    }
}
