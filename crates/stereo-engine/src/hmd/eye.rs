use std::fmt;
use std::ops::{Index, IndexMut};

/// One of the two eyes of a stereo display.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    #[inline]
    pub fn other(self) -> Eye {
        match self {
            Eye::Left => Eye::Right,
            Eye::Right => Eye::Left,
        }
    }
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eye::Left => f.write_str("left"),
            Eye::Right => f.write_str("right"),
        }
    }
}

/// Fixed-size pair of values keyed by [`Eye`].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PerEye<T> {
    pub left: T,
    pub right: T,
}

impl<T> PerEye<T> {
    #[inline]
    pub const fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    /// Builds both entries from a per-eye constructor.
    pub fn from_fn(mut f: impl FnMut(Eye) -> T) -> Self {
        Self { left: f(Eye::Left), right: f(Eye::Right) }
    }

    /// Like [`from_fn`](Self::from_fn) but stops at the first error.
    pub fn try_from_fn<E>(mut f: impl FnMut(Eye) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self { left: f(Eye::Left)?, right: f(Eye::Right)? })
    }

    pub fn map<U>(self, mut f: impl FnMut(Eye, T) -> U) -> PerEye<U> {
        PerEye { left: f(Eye::Left, self.left), right: f(Eye::Right, self.right) }
    }

    pub fn as_ref(&self) -> PerEye<&T> {
        PerEye { left: &self.left, right: &self.right }
    }

    /// Iterates `(eye, value)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Eye, &T)> {
        [(Eye::Left, &self.left), (Eye::Right, &self.right)].into_iter()
    }
}

impl<T> Index<Eye> for PerEye<T> {
    type Output = T;

    #[inline]
    fn index(&self, eye: Eye) -> &T {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }
}

impl<T> IndexMut<Eye> for PerEye<T> {
    #[inline]
    fn index_mut(&mut self, eye: Eye) -> &mut T {
        match eye {
            Eye::Left => &mut self.left,
            Eye::Right => &mut self.right,
        }
    }
}

/// Order in which the two eyes are rendered within a frame.
///
/// Some displays scan out one eye first; rendering that eye first shortens its latency.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EyeOrder([Eye; 2]);

impl EyeOrder {
    pub const LEFT_FIRST: EyeOrder = EyeOrder([Eye::Left, Eye::Right]);
    pub const RIGHT_FIRST: EyeOrder = EyeOrder([Eye::Right, Eye::Left]);

    /// Order starting with `first`.
    #[inline]
    pub fn starting_with(first: Eye) -> Self {
        Self([first, first.other()])
    }

    #[inline]
    pub fn first(self) -> Eye {
        self.0[0]
    }

    #[inline]
    pub fn second(self) -> Eye {
        self.0[1]
    }

    pub fn iter(self) -> impl Iterator<Item = Eye> {
        self.0.into_iter()
    }
}

impl Default for EyeOrder {
    fn default() -> Self {
        Self::LEFT_FIRST
    }
}
