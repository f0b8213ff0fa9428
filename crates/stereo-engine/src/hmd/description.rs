use glam::Vec3;

use super::eye::{EyeOrder, PerEye};

/// Default standing eye height above the floor, in meters.
pub const DEFAULT_EYE_HEIGHT: f32 = 1.675;

/// Default inter-pupillary distance, in meters.
pub const DEFAULT_IPD: f32 = 0.064;

/// Field of view of one eye as tangents of the half-angles.
///
/// All four values are positive for a frustum that contains the view axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FovPort {
    pub up_tan: f32,
    pub down_tan: f32,
    pub left_tan: f32,
    pub right_tan: f32,
}

impl FovPort {
    /// Symmetric port from full horizontal/vertical angles in degrees.
    pub fn from_degrees(horizontal: f32, vertical: f32) -> Self {
        let h = (horizontal.to_radians() * 0.5).tan();
        let v = (vertical.to_radians() * 0.5).tan();
        Self { up_tan: v, down_tan: v, left_tan: h, right_tan: h }
    }

    /// True when every tangent is finite and the frustum has positive extent on both axes.
    pub fn is_valid(&self) -> bool {
        let all = [self.up_tan, self.down_tan, self.left_tan, self.right_tan];
        all.iter().all(|t| t.is_finite())
            && self.left_tan + self.right_tan > 0.0
            && self.up_tan + self.down_tan > 0.0
    }

    /// Horizontal mirror, used to derive the right eye from the left eye.
    pub fn mirrored(self) -> Self {
        Self { left_tan: self.right_tan, right_tan: self.left_tan, ..self }
    }
}

/// Pixel dimensions of a render target.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Known headset layouts.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HmdProfile {
    /// 1280x800 panel, scans out left to right.
    Dk1,
    /// 1920x1080 low-persistence panel mounted rotated; the right eye scans out first.
    Dk2,
}

/// HMD feature switches the application may toggle at runtime.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct HmdCaps {
    /// Display-side strobing. Forwarded to hardware backends; the simulated
    /// device only reports it.
    pub low_persistence: bool,
    /// Predict poses at scan-out time instead of query time.
    pub dynamic_prediction: bool,
    /// Present without waiting for vertical blank.
    pub no_vsync: bool,
}

impl Default for HmdCaps {
    fn default() -> Self {
        Self {
            low_persistence: true,
            dynamic_prediction: true,
            no_vsync: false,
        }
    }
}

/// Static display parameters of an HMD.
#[derive(Debug, Clone, PartialEq)]
pub struct HmdDescription {
    pub product_name: String,
    /// Native panel resolution (both eyes).
    pub resolution: TargetSize,
    /// Recommended field of view per eye.
    pub default_fov: PerEye<FovPort>,
    /// Translation from the tracked head point to each eye, applied to the view.
    pub eye_view_offset: PerEye<Vec3>,
    /// Render order preferred by the display scan-out.
    pub eye_render_order: EyeOrder,
    /// Render-target pixels per unit of FOV tangent at the lens center (x, y).
    pub pixels_per_tan_angle: (f32, f32),
}

impl HmdDescription {
    /// Parameters of a headset profile for the given IPD.
    pub fn for_profile(profile: HmdProfile, ipd: f32) -> Self {
        let half_ipd = ipd * 0.5;
        let eye_view_offset = PerEye::new(Vec3::new(half_ipd, 0.0, 0.0), Vec3::new(-half_ipd, 0.0, 0.0));

        match profile {
            HmdProfile::Dk1 => {
                let left = FovPort { up_tan: 1.9, down_tan: 1.9, left_tan: 1.37, right_tan: 1.03 };
                Self {
                    product_name: "Simulated DK1".to_string(),
                    resolution: TargetSize::new(1280, 800),
                    default_fov: PerEye::new(left, left.mirrored()),
                    eye_view_offset,
                    eye_render_order: EyeOrder::LEFT_FIRST,
                    pixels_per_tan_angle: (373.0, 373.0),
                }
            }
            HmdProfile::Dk2 => {
                let left = FovPort { up_tan: 1.3292, down_tan: 1.3292, left_tan: 1.0586, right_tan: 1.0924 };
                Self {
                    product_name: "Simulated DK2".to_string(),
                    resolution: TargetSize::new(1920, 1080),
                    default_fov: PerEye::new(left, left.mirrored()),
                    eye_view_offset,
                    eye_render_order: EyeOrder::RIGHT_FIRST,
                    pixels_per_tan_angle: (549.618, 549.618),
                }
            }
        }
    }

    /// Render-target size that keeps roughly one target pixel per panel pixel at the
    /// lens center for `fov`, scaled by `pixel_density`.
    ///
    /// Each axis is at least one pixel.
    pub fn recommended_target_size(&self, fov: &FovPort, pixel_density: f32) -> TargetSize {
        let (ppt_x, ppt_y) = self.pixels_per_tan_angle;
        let density = pixel_density.max(0.0);
        let w = (ppt_x * (fov.left_tan + fov.right_tan) * density).ceil();
        let h = (ppt_y * (fov.up_tan + fov.down_tan) * density).ceil();
        TargetSize::new((w as u32).max(1), (h as u32).max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dk2_recommended_size_at_unit_density() {
        let desc = HmdDescription::for_profile(HmdProfile::Dk2, DEFAULT_IPD);
        let size = desc.recommended_target_size(&desc.default_fov.left, 1.0);
        assert_eq!(size, TargetSize::new(1183, 1462));
    }

    #[test]
    fn pixel_density_scales_target() {
        let desc = HmdDescription::for_profile(HmdProfile::Dk2, DEFAULT_IPD);
        let full = desc.recommended_target_size(&desc.default_fov.right, 1.0);
        let half = desc.recommended_target_size(&desc.default_fov.right, 0.5);
        assert!(half.width * 2 >= full.width - 1 && half.width * 2 <= full.width + 1);
        assert!(half.height * 2 >= full.height - 1 && half.height * 2 <= full.height + 1);
    }

    #[test]
    fn zero_density_clamps_to_one_pixel() {
        let desc = HmdDescription::for_profile(HmdProfile::Dk1, DEFAULT_IPD);
        let size = desc.recommended_target_size(&desc.default_fov.left, 0.0);
        assert_eq!(size, TargetSize::new(1, 1));
    }

    #[test]
    fn eye_offsets_are_symmetric() {
        let desc = HmdDescription::for_profile(HmdProfile::Dk2, 0.07);
        assert_eq!(desc.eye_view_offset.left.x, 0.035);
        assert_eq!(desc.eye_view_offset.right.x, -0.035);
    }

    #[test]
    fn fov_validity() {
        assert!(FovPort::from_degrees(90.0, 90.0).is_valid());
        let bad = FovPort { up_tan: f32::NAN, ..FovPort::from_degrees(90.0, 90.0) };
        assert!(!bad.is_valid());
        let flat = FovPort { left_tan: 0.0, right_tan: 0.0, ..FovPort::from_degrees(90.0, 90.0) };
        assert!(!flat.is_valid());
    }
}
