use crate::error::PipelineError;
use crate::hmd::{TrackingSource, TrackingStatus};
use crate::time::{FrameClock, FrameIndex};

use super::compositor::Compositor;
use super::scene::SceneRenderer;
use super::submitter::FrameSubmitter;
use super::surface::DisplaySurface;
use super::target::TargetBackend;

/// Outcome of one loop iteration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopControl {
    /// A frame was submitted.
    Continue(TrackingStatus),
    /// The surface requested close; nothing was rendered.
    Exit,
}

/// Totals reported when [`StereoLoop::run`] returns normally.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LoopSummary {
    pub frames: u64,
    pub untracked_frames: u64,
    pub last_frame: Option<FrameIndex>,
}

/// Single-threaded render loop.
///
/// Each iteration polls the surface, applies pending HMD reconfiguration, then
/// submits one frame. The surface swaps buffers only when the compositor does not
/// present on its own.
pub struct StereoLoop<S, T, B, C, R>
where
    B: TargetBackend,
{
    surface: S,
    tracking: T,
    submitter: FrameSubmitter<B>,
    compositor: C,
    scene: R,
    clock: FrameClock,
    summary: LoopSummary,
}

impl<S, T, B, C, R> StereoLoop<S, T, B, C, R>
where
    S: DisplaySurface,
    T: TrackingSource,
    B: TargetBackend,
    C: Compositor<B::Target>,
    R: SceneRenderer<B::Pass>,
{
    pub fn new(surface: S, tracking: T, submitter: FrameSubmitter<B>, compositor: C, scene: R) -> Self {
        let clock = FrameClock::new(submitter.config().index_mode);
        Self {
            surface,
            tracking,
            submitter,
            compositor,
            scene,
            clock,
            summary: LoopSummary::default(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn tracking(&self) -> &T {
        &self.tracking
    }

    pub fn tracking_mut(&mut self) -> &mut T {
        &mut self.tracking
    }

    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    pub fn compositor_mut(&mut self) -> &mut C {
        &mut self.compositor
    }

    pub fn scene(&self) -> &R {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut R {
        &mut self.scene
    }

    pub fn submitter(&self) -> &FrameSubmitter<B> {
        &self.submitter
    }

    /// Between iterations the submitter is idle, so its setters are safe to call.
    pub fn submitter_mut(&mut self) -> &mut FrameSubmitter<B> {
        &mut self.submitter
    }

    pub fn summary(&self) -> LoopSummary {
        self.summary
    }

    /// Runs one iteration.
    pub fn step(&mut self) -> Result<LoopControl, PipelineError> {
        self.surface.poll_events();
        if self.surface.should_close() {
            return Ok(LoopControl::Exit);
        }

        if let Some(desc) = self.tracking.take_reconfiguration() {
            log::info!("hmd reconfigured; updating eye geometry and targets");
            self.submitter.reconfigure(&desc)?;
        }

        let time = self.clock.tick();
        self.scene.update(&time);

        let status = self
            .submitter
            .submit_frame(time.frame_index, &mut self.tracking, &mut self.compositor, &mut self.scene)
            .inspect_err(|err| log::error!("render loop aborted at frame {}: {err}", time.frame_index))?;

        if !self.compositor.owns_presentation() {
            self.surface.swap_buffers();
        }

        self.summary.frames += 1;
        self.summary.last_frame = Some(time.frame_index);
        if status == TrackingStatus::NotTracking {
            self.summary.untracked_frames += 1;
        }

        Ok(LoopControl::Continue(status))
    }

    /// Steps until the surface closes or `max_frames` frames were submitted.
    pub fn run(&mut self, max_frames: Option<u64>) -> Result<LoopSummary, PipelineError> {
        self.clock.reset();

        while max_frames.is_none_or(|max| self.summary.frames < max) {
            if self.step()? == LoopControl::Exit {
                log::info!("display closed after {} frames", self.summary.frames);
                break;
            }
        }

        Ok(self.summary)
    }

    /// Releases the loop's parts. Targets are dropped with the submitter.
    pub fn into_parts(self) -> (S, T, C, R) {
        (self.surface, self.tracking, self.compositor, self.scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmd::{EyeOrder, FovPort, TrackingState};
    use crate::stereo::StereoConfig;
    use crate::stereo::testing::{
        CountingBackend, RecordingCompositor, RecordingScene, RecordingSurface, ScriptedTracking,
    };
    use crate::time::FrameIndexMode;

    type TestLoop = StereoLoop<RecordingSurface, ScriptedTracking, CountingBackend, RecordingCompositor, RecordingScene>;

    fn test_loop(tracking: ScriptedTracking, compositor: RecordingCompositor, config: StereoConfig) -> TestLoop {
        let submitter = FrameSubmitter::new(&tracking.description, config, CountingBackend::default()).unwrap();
        StereoLoop::new(RecordingSurface::default(), tracking, submitter, compositor, RecordingScene::default())
    }

    // ── frame sequencing ──────────────────────────────────────────────────

    #[test]
    fn n_frames_pair_begin_and_end_with_increasing_indices() {
        let mut lp = test_loop(ScriptedTracking::identity(), RecordingCompositor::presenting(), StereoConfig::default());

        let summary = lp.run(Some(10)).unwrap();
        assert_eq!(summary.frames, 10);
        assert_eq!(summary.last_frame, Some(FrameIndex(9)));

        let begins = lp.compositor().begins();
        assert_eq!(begins, lp.compositor().ends());
        assert_eq!(begins.len(), 10);
        assert!(begins.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(lp.tracking().queried, begins);
        assert_eq!(lp.scene().updates, begins);
        assert_eq!(lp.scene().views.len(), 20);
    }

    #[test]
    fn constant_mode_submits_same_index_every_frame() {
        let config = StereoConfig { index_mode: FrameIndexMode::Constant, ..StereoConfig::default() };
        let mut lp = test_loop(ScriptedTracking::identity(), RecordingCompositor::presenting(), config);

        lp.run(Some(6)).unwrap();
        assert_eq!(lp.compositor().begins(), vec![FrameIndex(0); 6]);
        assert_eq!(lp.compositor().ends(), vec![FrameIndex(0); 6]);
    }

    #[test]
    fn close_request_stops_before_rendering() {
        let mut lp = test_loop(ScriptedTracking::identity(), RecordingCompositor::presenting(), StereoConfig::default());
        lp.surface_mut().close_after = Some(3);

        let summary = lp.run(None).unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(lp.surface().polls, 4);
        assert_eq!(lp.compositor().begins().len(), 3);
    }

    // ── presentation ownership ────────────────────────────────────────────

    #[test]
    fn surface_never_swaps_while_compositor_presents() {
        let mut lp = test_loop(ScriptedTracking::identity(), RecordingCompositor::presenting(), StereoConfig::default());
        lp.run(Some(5)).unwrap();
        assert_eq!(lp.surface().swaps, 0);
    }

    #[test]
    fn surface_swaps_once_per_frame_otherwise() {
        let mut lp = test_loop(ScriptedTracking::identity(), RecordingCompositor::default(), StereoConfig::default());
        lp.run(Some(5)).unwrap();
        assert_eq!(lp.surface().swaps, 5);
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn compositor_failure_on_fifth_frame_stops_loop() {
        let mut lp = test_loop(ScriptedTracking::identity(), RecordingCompositor::failing_on(5), StereoConfig::default());

        let err = lp.run(Some(10)).unwrap_err();
        assert!(matches!(err, PipelineError::CompositorRejected { frame: FrameIndex(4), .. }));
        assert_eq!(err.to_string(), "compositor rejected frame 4: invalid texture set");

        assert_eq!(lp.compositor().begins().len(), 5);
        assert_eq!(lp.compositor().ends().len(), 5);
        assert_eq!(lp.tracking().queried.len(), 5);
        assert_eq!(lp.summary().frames, 4);
    }

    #[test]
    fn lost_tracking_is_counted_but_not_fatal() {
        let mut tracking = ScriptedTracking::identity();
        tracking.script.extend([TrackingState::not_tracking(), TrackingState::not_tracking()]);
        let mut lp = test_loop(tracking, RecordingCompositor::presenting(), StereoConfig::default());

        assert_eq!(lp.step().unwrap(), LoopControl::Continue(TrackingStatus::NotTracking));
        let summary = lp.run(Some(4)).unwrap();
        assert_eq!(summary.frames, 4);
        assert_eq!(summary.untracked_frames, 2);
    }

    // ── reconfiguration ───────────────────────────────────────────────────

    #[test]
    fn pending_reconfiguration_is_applied_before_next_frame() {
        let mut lp = test_loop(ScriptedTracking::identity(), RecordingCompositor::presenting(), StereoConfig::default());
        lp.step().unwrap();

        let mut desc = lp.tracking().description.clone();
        desc.default_fov.left = FovPort::from_degrees(70.0, 80.0);
        desc.eye_render_order = EyeOrder::LEFT_FIRST;
        lp.tracking_mut().pending = Some(desc.clone());

        lp.step().unwrap();
        let expected = desc.recommended_target_size(&desc.default_fov.left, 1.0);
        let last_left = lp.scene().views.iter().rev().find(|v| v.eye == crate::hmd::Eye::Left).unwrap();
        assert_eq!(last_left.size, expected);
        assert_eq!(lp.scene().views[2].eye, crate::hmd::Eye::Left);
    }

    #[test]
    fn pixel_density_change_applies_to_next_frame() {
        let mut lp = test_loop(ScriptedTracking::identity(), RecordingCompositor::presenting(), StereoConfig::default());
        lp.step().unwrap();

        assert!(lp.submitter_mut().set_pixel_density(0.5).unwrap());
        lp.step().unwrap();

        let desc = lp.tracking().description.clone();
        let last = lp.scene().views.last().unwrap();
        assert_eq!(last.size, desc.recommended_target_size(&desc.default_fov[last.eye], 0.5));
    }
}
