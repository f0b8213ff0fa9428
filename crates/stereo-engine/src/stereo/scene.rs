use glam::Mat4;

use crate::hmd::{Eye, TargetSize};
use crate::time::FrameTime;

/// Everything a scene needs to draw one eye.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EyeView {
    pub eye: Eye,
    pub projection: Mat4,
    pub view: Mat4,
    /// Extent of the active target; the viewport already covers it.
    pub size: TargetSize,
}

impl EyeView {
    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Draws scene content into the active eye target.
///
/// `P` is the pass type of the target backend. Implementations may assume the
/// eye's target is bound and the viewport set.
pub trait SceneRenderer<P> {
    fn render(&mut self, pass: &mut P, view: &EyeView);

    /// Advances animation. Called once per frame before any eye is rendered.
    fn update(&mut self, _time: &FrameTime) {}

    /// Camera transform applied after the head pose.
    fn base_view(&self) -> Mat4 {
        Mat4::IDENTITY
    }
}
