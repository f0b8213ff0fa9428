//! Stereo engine crate.
//!
//! Renders a scene once per eye into offscreen targets and hands the pair to a
//! compositor, in lockstep with HMD tracking.
//!
//! - [`hmd`]: display description, tracking and the owning session
//! - [`stereo`]: eye geometry, render targets and the frame protocol
//! - [`device`] / [`window`]: the wgpu and winit implementations

pub mod device;
pub mod error;
pub mod hmd;
pub mod logging;
pub mod stereo;
pub mod time;
pub mod window;

pub use error::PipelineError;
