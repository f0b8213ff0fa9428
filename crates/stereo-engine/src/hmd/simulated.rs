use glam::{Quat, Vec3};

use crate::time::FrameIndex;

use super::description::{FovPort, HmdCaps, HmdDescription, HmdProfile};
use super::device::{HmdDevice, TrackingSource};
use super::eye::PerEye;
use super::pose::{Pose, TrackingState};

/// Nominal refresh rate used to turn frame indices into simulated head motion.
const SIMULATED_REFRESH_HZ: f32 = 75.0;

/// Peak head yaw of the idle sway, in radians.
const SWAY_YAW: f32 = 0.2;

/// Period of the idle sway, in seconds.
const SWAY_PERIOD: f32 = 8.0;

/// Frames between pose query and scan-out, predicted ahead when dynamic prediction is on.
const PREDICTION_FRAMES: u64 = 1;

/// Debug HMD used when no hardware is attached.
///
/// Reports fixed display parameters for a profile and a slow, deterministic head sway
/// derived from the frame index, so the same index always yields the same pose.
pub struct SimulatedHmd {
    description: HmdDescription,
    caps: HmdCaps,
    tracking: bool,
    yaw_offset: f32,
    last_yaw: f32,
    pending: Option<HmdDescription>,
}

impl SimulatedHmd {
    pub fn new(profile: HmdProfile, ipd: f32) -> Self {
        Self {
            description: HmdDescription::for_profile(profile, ipd),
            caps: HmdCaps::default(),
            tracking: true,
            yaw_offset: 0.0,
            last_yaw: 0.0,
            pending: None,
        }
    }

    /// Enables or disables simulated head tracking.
    ///
    /// A disabled tracker behaves like an HMD whose sensor cannot be located.
    pub fn with_tracking(mut self, tracking: bool) -> Self {
        self.tracking = tracking;
        self
    }

    /// Changes the per-eye field of view, as a lens adjustment would.
    ///
    /// The new description is reported once through `take_reconfiguration`.
    pub fn set_default_fov(&mut self, fov: PerEye<FovPort>) {
        if self.description.default_fov == fov {
            return;
        }
        self.description.default_fov = fov;
        self.pending = Some(self.description.clone());
    }

    fn sway_yaw(frame: u64) -> f32 {
        let t = frame as f32 / SIMULATED_REFRESH_HZ;
        SWAY_YAW * (t * std::f32::consts::TAU / SWAY_PERIOD).sin()
    }
}

impl TrackingSource for SimulatedHmd {
    fn description(&self) -> &HmdDescription {
        &self.description
    }

    fn eye_poses(&mut self, frame: FrameIndex) -> TrackingState {
        if !self.tracking {
            return TrackingState::not_tracking();
        }

        let ahead = if self.caps.dynamic_prediction { PREDICTION_FRAMES } else { 0 };
        let yaw = Self::sway_yaw(frame.0.saturating_add(ahead));
        self.last_yaw = yaw;

        let head = Pose::new(Quat::from_rotation_y(yaw - self.yaw_offset), Vec3::ZERO);
        TrackingState::tracking(PerEye::new(head, head))
    }

    fn take_reconfiguration(&mut self) -> Option<HmdDescription> {
        self.pending.take()
    }
}

impl HmdDevice for SimulatedHmd {
    fn recenter(&mut self) {
        self.yaw_offset = self.last_yaw;
    }

    fn caps(&self) -> HmdCaps {
        self.caps
    }

    fn set_caps(&mut self, caps: HmdCaps) {
        self.caps = caps;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmd::{DEFAULT_IPD, TrackingStatus};

    #[test]
    fn dynamic_prediction_samples_ahead() {
        let mut hmd = SimulatedHmd::new(HmdProfile::Dk2, DEFAULT_IPD);
        let predicted = hmd.eye_poses(FrameIndex(40));

        hmd.set_caps(HmdCaps { dynamic_prediction: false, ..hmd.caps() });
        assert_eq!(hmd.eye_poses(FrameIndex(41)), predicted);
        assert_ne!(hmd.eye_poses(FrameIndex(40)), predicted);
    }

    #[test]
    fn same_frame_same_pose() {
        let mut hmd = SimulatedHmd::new(HmdProfile::Dk2, DEFAULT_IPD);
        let a = hmd.eye_poses(FrameIndex(40));
        let b = hmd.eye_poses(FrameIndex(40));
        assert_eq!(a, b);
        assert_eq!(a.status, TrackingStatus::Tracking);
    }

    #[test]
    fn disabled_tracking_reports_not_tracking() {
        let mut hmd = SimulatedHmd::new(HmdProfile::Dk2, DEFAULT_IPD).with_tracking(false);
        assert_eq!(hmd.eye_poses(FrameIndex(3)), TrackingState::not_tracking());
    }

    #[test]
    fn recenter_zeroes_current_yaw() {
        let mut hmd = SimulatedHmd::new(HmdProfile::Dk2, DEFAULT_IPD);
        let frame = FrameIndex(150);
        let before = hmd.eye_poses(frame).poses.left;
        assert!(before.orientation.angle_between(Quat::IDENTITY) > 0.01);

        hmd.recenter();
        let after = hmd.eye_poses(frame).poses.left;
        assert!(after.orientation.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn fov_change_is_reported_once() {
        let mut hmd = SimulatedHmd::new(HmdProfile::Dk2, DEFAULT_IPD);
        assert!(hmd.take_reconfiguration().is_none());

        let fov = FovPort::from_degrees(80.0, 90.0);
        hmd.set_default_fov(PerEye::new(fov, fov));

        let desc = hmd.take_reconfiguration().expect("reconfiguration pending");
        assert_eq!(desc.default_fov.left, fov);
        assert!(hmd.take_reconfiguration().is_none());
    }
}
