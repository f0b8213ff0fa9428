use std::fmt;

use crate::hmd::{Eye, TargetSize};
use crate::time::FrameIndex;

/// Errors raised by the stereo frame pipeline.
///
/// Every variant is terminal for the render loop; degraded tracking is reported
/// through [`TrackingStatus`](crate::hmd::TrackingStatus) instead.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// HMD or display unavailable. Raised before the render loop starts.
    Setup(String),

    /// A per-eye render target could not be created.
    TargetAllocation {
        eye: Eye,
        size: TargetSize,
        reason: String,
    },

    /// The compositor refused a submitted frame.
    CompositorRejected { frame: FrameIndex, reason: String },

    /// A frame index was submitted out of order.
    FrameOrder { previous: FrameIndex, next: FrameIndex },

    /// A protocol step was called in the wrong frame state.
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// Field-of-view tangents are non-finite or describe an empty frustum.
    InvalidFov { eye: Eye },

    /// Near/far planes are non-finite, non-positive, or out of order.
    InvalidClipRange { near: f32, far: f32 },

    /// Target quality scale is non-finite or not positive.
    InvalidPixelDensity(f32),
}

impl PipelineError {
    pub(crate) fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    pub fn rejected(frame: FrameIndex, reason: impl Into<String>) -> Self {
        Self::CompositorRejected { frame, reason: reason.into() }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup(msg) => write!(f, "hmd setup failed: {msg}"),
            Self::TargetAllocation { eye, size, reason } => write!(
                f,
                "failed to allocate {eye} eye render target ({}x{}): {reason}",
                size.width, size.height
            ),
            Self::CompositorRejected { frame, reason } => {
                write!(f, "compositor rejected frame {frame}: {reason}")
            }
            Self::FrameOrder { previous, next } => {
                write!(f, "frame {next} submitted after frame {previous}")
            }
            Self::InvalidState { operation, state } => {
                write!(f, "`{operation}` called while {state}")
            }
            Self::InvalidFov { eye } => write!(f, "invalid field of view for {eye} eye"),
            Self::InvalidClipRange { near, far } => {
                write!(f, "invalid clip range: near {near}, far {far}")
            }
            Self::InvalidPixelDensity(density) => write!(f, "invalid pixel density {density}"),
        }
    }
}

impl std::error::Error for PipelineError {}
