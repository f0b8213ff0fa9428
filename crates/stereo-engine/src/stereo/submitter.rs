use crate::error::PipelineError;
use crate::hmd::{Eye, EyeOrder, HmdDescription, PerEye, Pose, TargetSize, TrackingSource, TrackingStatus};
use crate::time::{FrameIndex, FrameIndexMode};

use super::compositor::Compositor;
use super::config::StereoConfig;
use super::geometry::EyeGeometry;
use super::scene::{EyeView, SceneRenderer};
use super::target::{EyeTargets, TargetBackend};

/// Where the submitter is within the per-frame protocol.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameState {
    Idle,
    FrameBegun,
    EyeRendering(Eye),
    FrameEnded,
}

impl FrameState {
    fn name(self) -> &'static str {
        match self {
            FrameState::Idle => "idle",
            FrameState::FrameBegun => "frame begun",
            FrameState::EyeRendering(Eye::Left) => "rendering left eye",
            FrameState::EyeRendering(Eye::Right) => "rendering right eye",
            FrameState::FrameEnded => "frame ended",
        }
    }
}

/// Data scoped to the frame between `begin_frame` and `end_frame`.
#[derive(Debug, Copy, Clone)]
struct ActiveFrame {
    index: FrameIndex,
    order: EyeOrder,
    poses: PerEye<Pose>,
}

/// Drives one stereo frame: poses, per-eye rendering, submission.
///
/// Owns the eye geometry and render targets. Both are built once from the HMD
/// description and only rebuilt through [`reconfigure`](Self::reconfigure).
pub struct FrameSubmitter<B: TargetBackend> {
    desc: HmdDescription,
    config: StereoConfig,
    geometry: PerEye<EyeGeometry>,
    targets: EyeTargets<B>,
    state: FrameState,
    frame: Option<ActiveFrame>,
    last_index: Option<FrameIndex>,
}

impl<B: TargetBackend> FrameSubmitter<B> {
    pub fn new(desc: &HmdDescription, config: StereoConfig, backend: B) -> Result<Self, PipelineError> {
        check_pixel_density(config.pixel_density)?;
        let geometry = PerEye::try_from_fn(|eye| {
            EyeGeometry::new(eye, desc.default_fov[eye], desc.eye_view_offset[eye], config.clip)
        })?;
        let sizes = Self::target_sizes(desc, &config);
        let targets = EyeTargets::allocate(backend, sizes)?;

        log::info!(
            "stereo pipeline ready: left {}x{}, right {}x{}, clip {}..{}",
            sizes.left.width,
            sizes.left.height,
            sizes.right.width,
            sizes.right.height,
            config.clip.near,
            config.clip.far,
        );

        Ok(Self {
            desc: desc.clone(),
            config,
            geometry,
            targets,
            state: FrameState::Idle,
            frame: None,
            last_index: None,
        })
    }

    fn target_sizes(desc: &HmdDescription, config: &StereoConfig) -> PerEye<TargetSize> {
        PerEye::from_fn(|eye| desc.recommended_target_size(&desc.default_fov[eye], config.pixel_density))
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn config(&self) -> &StereoConfig {
        &self.config
    }

    pub fn geometry(&self, eye: Eye) -> &EyeGeometry {
        &self.geometry[eye]
    }

    pub fn targets(&self) -> &EyeTargets<B> {
        &self.targets
    }

    /// Rescales both eye targets between frames.
    ///
    /// The density is kept for later reconfiguration. Returns `true` if a target
    /// was reallocated.
    pub fn set_pixel_density(&mut self, density: f32) -> Result<bool, PipelineError> {
        self.expect_between_frames("set_pixel_density")?;
        check_pixel_density(density)?;

        let config = StereoConfig { pixel_density: density, ..self.config };
        let resized = self.targets.resize(Self::target_sizes(&self.desc, &config))?;
        self.config = config;

        log::info!("pixel density set to {density}");
        Ok(resized)
    }

    /// Applies a changed HMD description between frames.
    ///
    /// Geometry is recomputed for eyes whose FOV or offset changed; targets are
    /// reallocated when their recommended size changed. Nothing is committed unless
    /// every eye succeeds. Returns `true` if anything was rebuilt.
    pub fn reconfigure(&mut self, desc: &HmdDescription) -> Result<bool, PipelineError> {
        self.expect_between_frames("reconfigure")?;

        let mut geometry = self.geometry;
        let rebuilt = PerEye::try_from_fn(|eye| {
            geometry[eye].refresh(desc.default_fov[eye], desc.eye_view_offset[eye])
        })?;
        let resized = self.targets.resize(Self::target_sizes(desc, &self.config))?;

        self.geometry = geometry;
        self.desc = desc.clone();
        for (eye, rebuilt) in rebuilt.iter() {
            if *rebuilt {
                log::info!("{eye} eye geometry recomputed");
            }
        }

        Ok(resized || rebuilt.left || rebuilt.right)
    }

    /// Starts `index`: notifies the compositor, then queries poses for this frame.
    pub fn begin_frame<T, C>(
        &mut self,
        index: FrameIndex,
        tracking: &mut T,
        compositor: &mut C,
    ) -> Result<TrackingStatus, PipelineError>
    where
        T: TrackingSource + ?Sized,
        C: Compositor<B::Target> + ?Sized,
    {
        self.expect_between_frames("begin_frame")?;
        self.check_order(index)?;

        compositor.begin_frame(index)?;
        self.last_index = Some(index);

        let state = tracking.eye_poses(index);
        self.frame = Some(ActiveFrame {
            index,
            order: tracking.eye_render_order(),
            poses: state.effective_poses(),
        });
        self.state = FrameState::FrameBegun;

        Ok(state.status)
    }

    /// Renders both eyes in the order reported for this frame.
    pub fn render_eyes<S>(&mut self, scene: &mut S) -> Result<(), PipelineError>
    where
        S: SceneRenderer<B::Pass> + ?Sized,
    {
        let frame = match (self.state, self.frame) {
            (FrameState::FrameBegun, Some(frame)) => frame,
            (state, _) => {
                return Err(PipelineError::InvalidState { operation: "render_eyes", state: state.name() });
            }
        };

        let base_view = scene.base_view();

        for eye in frame.order.iter() {
            self.state = FrameState::EyeRendering(eye);

            let geometry = &self.geometry[eye];
            let projection = geometry.projection();
            let view = geometry.view_matrix(frame.poses[eye], base_view);

            self.targets.with_active(eye, |pass, size| {
                scene.render(pass, &EyeView { eye, projection, view, size });
            });
        }

        Ok(())
    }

    /// Hands both targets and the frame's poses to the compositor.
    pub fn end_frame<C>(&mut self, compositor: &mut C) -> Result<(), PipelineError>
    where
        C: Compositor<B::Target> + ?Sized,
    {
        let frame = match (self.state, self.frame) {
            (FrameState::EyeRendering(eye), Some(frame)) if eye == frame.order.second() => frame,
            (state, _) => {
                return Err(PipelineError::InvalidState { operation: "end_frame", state: state.name() });
            }
        };

        self.frame = None;
        let result = compositor.end_frame(frame.index, &frame.poses, self.targets.targets());
        self.state = match result {
            Ok(()) => FrameState::FrameEnded,
            Err(_) => FrameState::Idle,
        };
        result
    }

    /// Runs one full frame: begin, render both eyes, end.
    pub fn submit_frame<T, C, S>(
        &mut self,
        index: FrameIndex,
        tracking: &mut T,
        compositor: &mut C,
        scene: &mut S,
    ) -> Result<TrackingStatus, PipelineError>
    where
        T: TrackingSource + ?Sized,
        C: Compositor<B::Target> + ?Sized,
        S: SceneRenderer<B::Pass> + ?Sized,
    {
        let status = self.begin_frame(index, tracking, compositor)?;
        self.render_eyes(scene)?;
        self.end_frame(compositor)?;
        Ok(status)
    }

    fn expect_between_frames(&self, operation: &'static str) -> Result<(), PipelineError> {
        match self.state {
            FrameState::Idle | FrameState::FrameEnded => Ok(()),
            state => Err(PipelineError::InvalidState { operation, state: state.name() }),
        }
    }

    fn check_order(&self, next: FrameIndex) -> Result<(), PipelineError> {
        let Some(previous) = self.last_index else {
            return Ok(());
        };

        let in_order = match self.config.index_mode {
            FrameIndexMode::Increasing => next > previous,
            FrameIndexMode::Constant => next == previous,
        };

        if in_order { Ok(()) } else { Err(PipelineError::FrameOrder { previous, next }) }
    }
}

fn check_pixel_density(density: f32) -> Result<(), PipelineError> {
    if density.is_finite() && density > 0.0 {
        Ok(())
    } else {
        Err(PipelineError::InvalidPixelDensity(density))
    }
}
