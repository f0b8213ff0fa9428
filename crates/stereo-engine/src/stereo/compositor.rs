use crate::error::PipelineError;
use crate::hmd::{PerEye, Pose};
use crate::time::FrameIndex;

/// Consumer of finished eye targets.
///
/// Applies lens correction (or whatever the backend does) and presents. `T` is the
/// target type of the [`TargetBackend`](super::TargetBackend) in use.
pub trait Compositor<T> {
    /// Marks the start of `frame`. Called once per frame before poses are queried.
    fn begin_frame(&mut self, frame: FrameIndex) -> Result<(), PipelineError>;

    /// Hands over both rendered targets with the poses they were rendered from.
    ///
    /// An error aborts the render loop.
    fn end_frame(
        &mut self,
        frame: FrameIndex,
        poses: &PerEye<Pose>,
        targets: &PerEye<T>,
    ) -> Result<(), PipelineError>;

    /// Whether presentation happens inside `end_frame`.
    ///
    /// While this is `true` the display surface is never asked to swap buffers.
    fn owns_presentation(&self) -> bool {
        true
    }
}
