//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Adapter/Device/Queue and the window Surface
//! - allocating per-eye offscreen targets ([`WgpuTargets`])
//! - compositing finished eye targets onto the window ([`MirrorCompositor`])

mod context;
mod error;
mod frame;
mod init;
mod mirror;
mod surface;
mod targets;

pub use context::{Gpu, GpuContext};
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use init::GpuInit;
pub use mirror::MirrorCompositor;
pub use targets::{EYE_COLOR_FORMAT, EYE_DEPTH_FORMAT, WgpuEyePass, WgpuEyeTarget, WgpuTargets};
