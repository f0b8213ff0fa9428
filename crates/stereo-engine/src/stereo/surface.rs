/// On-screen window the loop polls once per iteration.
pub trait DisplaySurface {
    /// Processes pending window events without blocking.
    fn poll_events(&mut self);

    fn should_close(&self) -> bool;

    /// Presents the surface's back buffer.
    ///
    /// Only called when the compositor does not own presentation.
    fn swap_buffers(&mut self);
}
