use crate::error::PipelineError;
use crate::hmd::{Eye, PerEye, TargetSize};

/// An offscreen color + depth target for one eye.
///
/// Dropping the target releases its GPU resources.
pub trait RenderTarget {
    fn size(&self) -> TargetSize;
}

/// Creates per-eye targets and directs rendering into them.
pub trait TargetBackend {
    type Target: RenderTarget;

    /// Handle the scene renderer draws through while a target is active.
    type Pass;

    /// Creates a color + depth target of exactly `size`.
    fn allocate(&mut self, eye: Eye, size: TargetSize) -> Result<Self::Target, PipelineError>;

    /// Binds `target` for rendering with the viewport covering its full extent.
    fn activate(&mut self, eye: Eye, target: &Self::Target) -> Self::Pass;

    /// Finishes the pass and restores the default target.
    fn deactivate(&mut self, pass: Self::Pass);
}

/// The backend together with one target per eye.
pub struct EyeTargets<B: TargetBackend> {
    backend: B,
    targets: PerEye<B::Target>,
}

impl<B: TargetBackend> EyeTargets<B> {
    pub fn allocate(mut backend: B, sizes: PerEye<TargetSize>) -> Result<Self, PipelineError> {
        let targets = PerEye::try_from_fn(|eye| {
            let size = sizes[eye];
            log::debug!("allocating {eye} eye target {}x{}", size.width, size.height);
            backend.allocate(eye, size)
        })?;

        Ok(Self { backend, targets })
    }

    pub fn targets(&self) -> &PerEye<B::Target> {
        &self.targets
    }

    pub fn get(&self, eye: Eye) -> &B::Target {
        &self.targets[eye]
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Replaces the target for `eye` with one of `size`.
    ///
    /// The new target is created before the old one is dropped; on failure the old
    /// target stays in place. Returns `false` when the size is unchanged.
    pub fn reallocate(&mut self, eye: Eye, size: TargetSize) -> Result<bool, PipelineError> {
        let mut sizes = self.targets.as_ref().map(|_, target| target.size());
        sizes[eye] = size;
        self.resize(sizes)
    }

    /// Brings both targets to `sizes`.
    ///
    /// Every replacement is allocated before any is committed, so a failure leaves
    /// both eyes on their previous targets. Returns `false` when nothing changed.
    pub fn resize(&mut self, sizes: PerEye<TargetSize>) -> Result<bool, PipelineError> {
        let replacements = PerEye::try_from_fn(|eye| {
            let size = sizes[eye];
            if self.targets[eye].size() == size {
                return Ok(None);
            }
            self.backend.allocate(eye, size).map(Some)
        })?;

        let mut changed = false;
        replacements.map(|eye, target| {
            if let Some(target) = target {
                let size = target.size();
                log::info!("reallocated {eye} eye target {}x{}", size.width, size.height);
                self.targets[eye] = target;
                changed = true;
            }
        });

        Ok(changed)
    }

    /// Runs `f` with the target for `eye` active.
    pub fn with_active<R>(&mut self, eye: Eye, f: impl FnOnce(&mut B::Pass, TargetSize) -> R) -> R {
        let target = &self.targets[eye];
        let size = target.size();
        let mut pass = self.backend.activate(eye, target);
        let out = f(&mut pass, size);
        self.backend.deactivate(pass);
        out
    }
}
