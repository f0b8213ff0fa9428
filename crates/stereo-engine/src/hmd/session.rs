use crate::error::PipelineError;
use crate::time::FrameIndex;

use super::description::{DEFAULT_IPD, HmdCaps, HmdDescription, HmdProfile};
use super::device::{HmdDevice, TrackingSource};
use super::eye::EyeOrder;
use super::pose::{TrackingState, TrackingStatus};
use super::simulated::SimulatedHmd;

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Open a simulated headset when no hardware is attached.
    pub allow_debug_device: bool,

    /// Profile used for the simulated headset.
    pub profile: HmdProfile,

    /// Inter-pupillary distance, in meters.
    pub ipd: f32,

    /// Enable head tracking on the simulated headset.
    pub tracking: bool,

    pub caps: HmdCaps,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            allow_debug_device: true,
            profile: HmdProfile::Dk2,
            ipd: DEFAULT_IPD,
            tracking: true,
            caps: HmdCaps::default(),
        }
    }
}

/// Owning handle to an HMD.
///
/// The session is passed explicitly to whoever needs the device and must be closed
/// with [`shutdown`](Self::shutdown). Dropping an open session shuts it down with a warning.
pub struct HmdSession {
    device: Box<dyn HmdDevice>,
    open: bool,
    last_status: Option<TrackingStatus>,
}

impl HmdSession {
    /// Opens the first available HMD.
    ///
    /// No hardware backend is built in; without `allow_debug_device` this fails with
    /// [`PipelineError::Setup`].
    pub fn open(config: &SessionConfig) -> Result<Self, PipelineError> {
        if !config.allow_debug_device {
            return Err(PipelineError::setup("no HMD detected and debug device disabled"));
        }

        if !(config.ipd.is_finite() && config.ipd > 0.0) {
            return Err(PipelineError::setup(format!("invalid ipd {}", config.ipd)));
        }

        log::warn!("no HMD detected; opening simulated {:?}", config.profile);

        let mut device = SimulatedHmd::new(config.profile, config.ipd).with_tracking(config.tracking);
        device.set_caps(config.caps);
        Ok(Self::with_device(Box::new(device)))
    }

    /// Wraps an already opened device.
    pub fn with_device(device: Box<dyn HmdDevice>) -> Self {
        let desc = device.description();
        log::info!(
            "hmd session opened: {} ({}x{}), render order {:?} -> {:?}",
            desc.product_name,
            desc.resolution.width,
            desc.resolution.height,
            desc.eye_render_order.first(),
            desc.eye_render_order.second(),
        );
        Self { device, open: true, last_status: None }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn recenter(&mut self) {
        log::info!("recentering head pose");
        self.device.recenter();
    }

    pub fn caps(&self) -> HmdCaps {
        self.device.caps()
    }

    pub fn set_caps(&mut self, caps: HmdCaps) {
        log::debug!("hmd caps: {caps:?}");
        self.device.set_caps(caps);
    }

    /// Applies `f` to the current caps and returns the result.
    pub fn update_caps(&mut self, f: impl FnOnce(&mut HmdCaps)) -> HmdCaps {
        let mut caps = self.caps();
        f(&mut caps);
        self.set_caps(caps);
        caps
    }

    /// Closes the device.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.device.shutdown();
        self.open = false;
        log::info!("hmd session closed");
    }
}

impl TrackingSource for HmdSession {
    fn description(&self) -> &HmdDescription {
        self.device.description()
    }

    fn eye_render_order(&self) -> EyeOrder {
        self.device.eye_render_order()
    }

    fn eye_poses(&mut self, frame: FrameIndex) -> TrackingState {
        let state = self.device.eye_poses(frame);

        if self.last_status != Some(state.status) {
            match state.status {
                TrackingStatus::Tracking => log::info!("head tracking active"),
                TrackingStatus::NotTracking => {
                    log::warn!("unable to locate HMD sensor; rendering with default pose")
                }
            }
            self.last_status = Some(state.status);
        }

        state
    }

    fn take_reconfiguration(&mut self) -> Option<HmdDescription> {
        self.device.take_reconfiguration()
    }
}

impl Drop for HmdSession {
    fn drop(&mut self) {
        if self.open {
            log::warn!("hmd session dropped without shutdown");
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingDevice {
        inner: SimulatedHmd,
        shutdowns: Rc<Cell<u32>>,
    }

    impl TrackingSource for CountingDevice {
        fn description(&self) -> &HmdDescription {
            self.inner.description()
        }

        fn eye_poses(&mut self, frame: FrameIndex) -> TrackingState {
            self.inner.eye_poses(frame)
        }
    }

    impl HmdDevice for CountingDevice {
        fn recenter(&mut self) {}

        fn caps(&self) -> HmdCaps {
            self.inner.caps()
        }

        fn set_caps(&mut self, caps: HmdCaps) {
            self.inner.set_caps(caps);
        }

        fn shutdown(&mut self) {
            self.shutdowns.set(self.shutdowns.get() + 1);
        }
    }

    fn counting_session() -> (HmdSession, Rc<Cell<u32>>) {
        let shutdowns = Rc::new(Cell::new(0));
        let device = CountingDevice {
            inner: SimulatedHmd::new(HmdProfile::Dk2, DEFAULT_IPD),
            shutdowns: shutdowns.clone(),
        };
        (HmdSession::with_device(Box::new(device)), shutdowns)
    }

    #[test]
    fn open_without_debug_device_is_a_setup_error() {
        let config = SessionConfig { allow_debug_device: false, ..SessionConfig::default() };
        assert!(matches!(HmdSession::open(&config), Err(PipelineError::Setup(_))));
    }

    #[test]
    fn open_applies_configured_caps() {
        let caps = HmdCaps { no_vsync: true, ..HmdCaps::default() };
        let session = HmdSession::open(&SessionConfig { caps, ..SessionConfig::default() }).unwrap();
        assert_eq!(session.caps(), caps);
        session.shutdown();
    }

    #[test]
    fn shutdown_runs_once() {
        let (session, shutdowns) = counting_session();
        session.shutdown();
        assert_eq!(shutdowns.get(), 1);
    }

    #[test]
    fn drop_shuts_down_open_session() {
        let (session, shutdowns) = counting_session();
        drop(session);
        assert_eq!(shutdowns.get(), 1);
    }

    #[test]
    fn update_caps_toggles_flag() {
        let (mut session, _) = counting_session();
        let before = session.caps().low_persistence;
        let after = session.update_caps(|c| c.low_persistence = !c.low_persistence);
        assert_eq!(after.low_persistence, !before);
        assert_eq!(session.caps(), after);
        session.shutdown();
    }
}
