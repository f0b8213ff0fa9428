use crate::time::FrameIndexMode;

use super::geometry::ClipRange;

/// Stereo pipeline parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StereoConfig {
    pub clip: ClipRange,

    /// Scale applied to the HMD's recommended per-eye target size.
    ///
    /// `1.0` matches the panel's pixel density at the lens center.
    pub pixel_density: f32,

    pub index_mode: FrameIndexMode,
}

impl Default for StereoConfig {
    fn default() -> Self {
        Self {
            clip: ClipRange::default(),
            pixel_density: 1.0,
            index_mode: FrameIndexMode::Increasing,
        }
    }
}
