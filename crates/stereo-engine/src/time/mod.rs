//! Time subsystem.
//!
//! Provides frame timing and frame numbering without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per render loop
//! - call `tick()` once per frame; use its `frame_index` for both the pose query
//!   and the submission of that frame

mod frame_clock;

pub use frame_clock::{FrameClock, FrameIndex, FrameIndexMode, FrameTime};
