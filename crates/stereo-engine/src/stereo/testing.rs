//! In-memory collaborators for exercising the pipeline without a GPU or headset.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::Mat4;

use crate::error::PipelineError;
use crate::hmd::{
    DEFAULT_IPD, Eye, EyeOrder, HmdDescription, HmdProfile, PerEye, Pose, TargetSize,
    TrackingSource, TrackingState,
};
use crate::time::FrameIndex;

use super::compositor::Compositor;
use super::scene::{EyeView, SceneRenderer};
use super::surface::DisplaySurface;
use super::target::{RenderTarget, TargetBackend};

// ── target backend ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Counters {
    pub allocated: Cell<u32>,
    pub released: Cell<u32>,
    pub activations: Cell<u32>,
    pub deactivations: Cell<u32>,
}

#[derive(Debug)]
pub struct CountingTarget {
    size: TargetSize,
    counters: Rc<Counters>,
}

impl RenderTarget for CountingTarget {
    fn size(&self) -> TargetSize {
        self.size
    }
}

impl Drop for CountingTarget {
    fn drop(&mut self) {
        self.counters.released.set(self.counters.released.get() + 1);
    }
}

#[derive(Debug)]
pub struct StubPass {
    pub eye: Eye,
    pub size: TargetSize,
}

/// Backend that counts allocations and releases. Empty sizes fail to allocate.
#[derive(Debug, Default)]
pub struct CountingBackend {
    counters: Rc<Counters>,
}

impl CountingBackend {
    pub fn counters(&self) -> Rc<Counters> {
        self.counters.clone()
    }
}

impl TargetBackend for CountingBackend {
    type Target = CountingTarget;
    type Pass = StubPass;

    fn allocate(&mut self, eye: Eye, size: TargetSize) -> Result<CountingTarget, PipelineError> {
        if size.is_empty() {
            return Err(PipelineError::TargetAllocation { eye, size, reason: "empty extent".into() });
        }
        self.counters.allocated.set(self.counters.allocated.get() + 1);
        Ok(CountingTarget { size, counters: self.counters.clone() })
    }

    fn activate(&mut self, eye: Eye, target: &CountingTarget) -> StubPass {
        self.counters.activations.set(self.counters.activations.get() + 1);
        StubPass { eye, size: target.size }
    }

    fn deactivate(&mut self, _pass: StubPass) {
        self.counters.deactivations.set(self.counters.deactivations.get() + 1);
    }
}

// ── tracking ──────────────────────────────────────────────────────────────

/// Tracking source replaying scripted states, then repeating `fallback`.
pub struct ScriptedTracking {
    pub description: HmdDescription,
    pub script: VecDeque<TrackingState>,
    pub fallback: TrackingState,
    pub queried: Vec<FrameIndex>,
    pub pending: Option<HmdDescription>,
}

impl ScriptedTracking {
    pub fn new(fallback: TrackingState) -> Self {
        Self {
            description: HmdDescription::for_profile(HmdProfile::Dk2, DEFAULT_IPD),
            script: VecDeque::new(),
            fallback,
            queried: Vec::new(),
            pending: None,
        }
    }

    pub fn identity() -> Self {
        Self::new(TrackingState::tracking(PerEye::new(Pose::IDENTITY, Pose::IDENTITY)))
    }

    pub fn with_order(mut self, order: EyeOrder) -> Self {
        self.description.eye_render_order = order;
        self
    }
}

impl TrackingSource for ScriptedTracking {
    fn description(&self) -> &HmdDescription {
        &self.description
    }

    fn eye_poses(&mut self, frame: FrameIndex) -> TrackingState {
        self.queried.push(frame);
        self.script.pop_front().unwrap_or(self.fallback)
    }

    fn take_reconfiguration(&mut self) -> Option<HmdDescription> {
        let desc = self.pending.take()?;
        self.description = desc.clone();
        Some(desc)
    }
}

// ── compositor ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum CompositorEvent {
    Begin(FrameIndex),
    End {
        frame: FrameIndex,
        poses: PerEye<Pose>,
        sizes: PerEye<TargetSize>,
    },
}

/// Compositor recording every call. Rejects the `fail_on_end`-th `end_frame` (1-based).
#[derive(Debug, Default)]
pub struct RecordingCompositor {
    pub events: Vec<CompositorEvent>,
    pub fail_on_end: Option<usize>,
    pub presents_itself: bool,
    ends: usize,
}

impl RecordingCompositor {
    pub fn presenting() -> Self {
        Self { presents_itself: true, ..Self::default() }
    }

    pub fn failing_on(end: usize) -> Self {
        Self { fail_on_end: Some(end), ..Self::presenting() }
    }

    pub fn begins(&self) -> Vec<FrameIndex> {
        self.events
            .iter()
            .filter_map(|e| match e {
                CompositorEvent::Begin(frame) => Some(*frame),
                CompositorEvent::End { .. } => None,
            })
            .collect()
    }

    pub fn ends(&self) -> Vec<FrameIndex> {
        self.events
            .iter()
            .filter_map(|e| match e {
                CompositorEvent::End { frame, .. } => Some(*frame),
                CompositorEvent::Begin(_) => None,
            })
            .collect()
    }
}

impl<T: RenderTarget> Compositor<T> for RecordingCompositor {
    fn begin_frame(&mut self, frame: FrameIndex) -> Result<(), PipelineError> {
        self.events.push(CompositorEvent::Begin(frame));
        Ok(())
    }

    fn end_frame(
        &mut self,
        frame: FrameIndex,
        poses: &PerEye<Pose>,
        targets: &PerEye<T>,
    ) -> Result<(), PipelineError> {
        self.ends += 1;
        self.events.push(CompositorEvent::End {
            frame,
            poses: *poses,
            sizes: PerEye::new(targets.left.size(), targets.right.size()),
        });

        if self.fail_on_end == Some(self.ends) {
            return Err(PipelineError::rejected(frame, "invalid texture set"));
        }
        Ok(())
    }

    fn owns_presentation(&self) -> bool {
        self.presents_itself
    }
}

// ── scene ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingScene {
    pub views: Vec<EyeView>,
    pub updates: Vec<FrameIndex>,
    pub base: Option<Mat4>,
}

impl SceneRenderer<StubPass> for RecordingScene {
    fn render(&mut self, pass: &mut StubPass, view: &EyeView) {
        assert_eq!(pass.eye, view.eye);
        assert_eq!(pass.size, view.size);
        self.views.push(*view);
    }

    fn update(&mut self, time: &crate::time::FrameTime) {
        self.updates.push(time.frame_index);
    }

    fn base_view(&self) -> Mat4 {
        self.base.unwrap_or(Mat4::IDENTITY)
    }
}

// ── surface ───────────────────────────────────────────────────────────────

/// Surface that requests close after `close_after` polls.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub polls: u32,
    pub swaps: u32,
    pub close_after: Option<u32>,
}

impl DisplaySurface for RecordingSurface {
    fn poll_events(&mut self) {
        self.polls += 1;
    }

    fn should_close(&self) -> bool {
        self.close_after.is_some_and(|n| self.polls > n)
    }

    fn swap_buffers(&mut self) {
        self.swaps += 1;
    }
}
