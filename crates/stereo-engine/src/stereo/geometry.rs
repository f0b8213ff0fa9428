use glam::{Mat4, Vec3, Vec4};

use crate::error::PipelineError;
use crate::hmd::{Eye, FovPort, Pose};

/// Near/far clip distances in world units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClipRange {
    pub near: f32,
    pub far: f32,
}

impl ClipRange {
    #[inline]
    pub const fn new(near: f32, far: f32) -> Self {
        Self { near, far }
    }

    pub fn is_valid(self) -> bool {
        self.near.is_finite() && self.far.is_finite() && self.near > 0.0 && self.far > self.near
    }
}

impl Default for ClipRange {
    fn default() -> Self {
        Self::new(0.01, 10000.0)
    }
}

/// Right-handed projection for an asymmetric field of view.
///
/// Clip space follows wgpu: x/y in `[-1, 1]`, depth `0` at `near` and `1` at `far`,
/// camera looking down -Z.
pub fn fov_projection(fov: &FovPort, clip: ClipRange) -> Mat4 {
    let x_scale = 2.0 / (fov.left_tan + fov.right_tan);
    let x_offset = (fov.right_tan - fov.left_tan) / (fov.left_tan + fov.right_tan);
    let y_scale = 2.0 / (fov.up_tan + fov.down_tan);
    let y_offset = (fov.up_tan - fov.down_tan) / (fov.up_tan + fov.down_tan);

    let ClipRange { near, far } = clip;
    let z_scale = far / (near - far);
    let z_offset = near * far / (near - far);

    Mat4::from_cols(
        Vec4::new(x_scale, 0.0, 0.0, 0.0),
        Vec4::new(0.0, y_scale, 0.0, 0.0),
        Vec4::new(x_offset, y_offset, z_scale, -1.0),
        Vec4::new(0.0, 0.0, z_offset, 0.0),
    )
}

/// Per-eye projection and view offset.
///
/// Computed once at setup and recomputed only when the eye's field of view changes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EyeGeometry {
    eye: Eye,
    fov: FovPort,
    clip: ClipRange,
    offset: Vec3,
    projection: Mat4,
    view_offset: Mat4,
}

impl EyeGeometry {
    /// `offset` is the translation from the tracked head point to the eye, in view space.
    pub fn new(eye: Eye, fov: FovPort, offset: Vec3, clip: ClipRange) -> Result<Self, PipelineError> {
        if !fov.is_valid() {
            return Err(PipelineError::InvalidFov { eye });
        }
        if !clip.is_valid() {
            return Err(PipelineError::InvalidClipRange { near: clip.near, far: clip.far });
        }

        Ok(Self {
            eye,
            fov,
            clip,
            offset,
            projection: fov_projection(&fov, clip),
            view_offset: Mat4::from_translation(offset),
        })
    }

    /// Recomputes the projection if `fov` or `offset` differ from the current ones.
    ///
    /// Returns `true` when anything changed.
    pub fn refresh(&mut self, fov: FovPort, offset: Vec3) -> Result<bool, PipelineError> {
        if self.fov == fov && self.offset == offset {
            return Ok(false);
        }
        *self = Self::new(self.eye, fov, offset, self.clip)?;
        Ok(true)
    }

    pub fn eye(&self) -> Eye {
        self.eye
    }

    pub fn fov(&self) -> &FovPort {
        &self.fov
    }

    pub fn clip(&self) -> ClipRange {
        self.clip
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view_offset(&self) -> Mat4 {
        self.view_offset
    }

    /// Final view matrix for this eye: eye offset, then inverse head pose, then the
    /// scene's base view.
    pub fn view_matrix(&self, head: Pose, base_view: Mat4) -> Mat4 {
        self.view_offset * head.to_mat4().inverse() * base_view
    }
}
