//! Window surface.
//!
//! Owns the `winit` EventLoop and Window and polls them once per frame.

mod surface;

pub use surface::{RuntimeConfig, WinitSurface};
pub use winit::dpi::{LogicalSize, PhysicalSize};
pub use winit::keyboard::KeyCode;
