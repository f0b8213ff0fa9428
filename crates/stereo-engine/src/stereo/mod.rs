//! Stereo frame pipeline.
//!
//! [`FrameSubmitter`] owns per-eye geometry and render targets and runs the
//! begin / render / end protocol against a [`TrackingSource`](crate::hmd::TrackingSource),
//! a [`Compositor`] and a [`SceneRenderer`]. [`StereoLoop`] adds the window and the
//! frame clock around it.

mod compositor;
mod config;
mod driver;
mod geometry;
mod scene;
mod submitter;
mod surface;
mod target;

#[cfg(test)]
pub(crate) mod testing;

pub use compositor::Compositor;
pub use config::StereoConfig;
pub use driver::{LoopControl, LoopSummary, StereoLoop};
pub use geometry::{ClipRange, EyeGeometry, fov_projection};
pub use scene::{EyeView, SceneRenderer};
pub use submitter::{FrameState, FrameSubmitter};
pub use surface::DisplaySurface;
pub use target::{EyeTargets, RenderTarget, TargetBackend};
