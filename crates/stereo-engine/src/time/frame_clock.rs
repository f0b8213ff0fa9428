use std::fmt;
use std::time::{Duration, Instant};

/// Frame number shared by pose queries and frame submission.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FrameIndex(pub u64);

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How frame indices advance across the loop.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FrameIndexMode {
    /// Strictly increasing, one step per completed frame.
    #[default]
    Increasing,
    /// Always zero. Only valid for compositors that do not use the index for prediction.
    Constant,
}

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Index to use for every pose query and submission of this frame.
    pub frame_index: FrameIndex,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// One clock drives one render loop. Delta time is clamped to avoid pathological
/// values when the application is paused by the debugger or stalls.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    next_index: u64,
    mode: FrameIndexMode,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a new clock with default clamps.
    ///
    /// Clamp rationale:
    /// - minimum prevents zero-dt behavior from tight loops on some platforms
    /// - maximum prevents animation jumps after long stalls
    pub fn new(mode: FrameIndexMode) -> Self {
        Self::with_clamps(mode, Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(mode: FrameIndexMode, dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            next_index: 0,
            mode,
            dt_min,
            dt_max,
        }
    }

    /// Resets the time baseline. Frame indices are not rewound.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        let frame_index = match self.mode {
            FrameIndexMode::Increasing => {
                let index = FrameIndex(self.next_index);
                self.next_index += 1;
                index
            }
            FrameIndexMode::Constant => FrameIndex(0),
        };

        FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(FrameIndexMode::default())
    }
}
