use crate::time::FrameIndex;

use super::description::{HmdCaps, HmdDescription};
use super::eye::EyeOrder;
use super::pose::TrackingState;

/// Source of display parameters and per-frame eye poses.
pub trait TrackingSource {
    /// Current display parameters.
    fn description(&self) -> &HmdDescription;

    /// Eye order for the current frame. The device-reported order is canonical.
    fn eye_render_order(&self) -> EyeOrder {
        self.description().eye_render_order
    }

    /// Poses for `frame`. Must be queried once per frame; never blocks.
    ///
    /// When the HMD cannot be located the state is `NotTracking`.
    fn eye_poses(&mut self, frame: FrameIndex) -> TrackingState;

    /// Returns the new description once after the HMD configuration changed
    /// (e.g. lens adjustment changed the field of view).
    fn take_reconfiguration(&mut self) -> Option<HmdDescription> {
        None
    }
}

/// A connected (or simulated) HMD.
pub trait HmdDevice: TrackingSource {
    /// Zeroes the current head yaw and position.
    fn recenter(&mut self);

    fn caps(&self) -> HmdCaps;

    fn set_caps(&mut self, caps: HmdCaps);

    /// Releases device resources. Called exactly once by the owning session.
    fn shutdown(&mut self) {}
}
