//! HMD access: display description, per-frame tracking and the owning session.
//!
//! Hardware backends implement [`HmdDevice`]; the pipeline only sees
//! [`TrackingSource`]. [`SimulatedHmd`] stands in when no headset is attached.

mod description;
mod device;
mod eye;
mod pose;
mod session;
mod simulated;

pub use description::{
    DEFAULT_EYE_HEIGHT, DEFAULT_IPD, FovPort, HmdCaps, HmdDescription, HmdProfile, TargetSize,
};
pub use device::{HmdDevice, TrackingSource};
pub use eye::{Eye, EyeOrder, PerEye};
pub use pose::{Pose, TrackingState, TrackingStatus};
pub use session::{HmdSession, SessionConfig};
pub use simulated::SimulatedHmd;
