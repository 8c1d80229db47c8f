use core::ops::{
    Bound, Range, RangeBounds, RangeFrom, RangeFull, RangeInclusive, RangeTo, RangeToInclusive,
};

use crate::{Error, Result};

/// Strided range along one axis.
///
/// Bounds may be negative, counting from the end of the axis, and are
/// clamped into the axis when resolved. A negative step walks backwards
/// from `start`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Slice {
    pub(crate) start: Bound<isize>,
    pub(crate) end: Bound<isize>,
    pub(crate) step: isize,
}

macro_rules! impl_from_range {
    ($( $range:ty ),*) => {
        $(
            impl From<$range> for Slice {
                fn from(v: $range) -> Self {
                    Self {
                        start: v.start_bound().cloned(),
                        end: v.end_bound().cloned(),
                        step: 1,
                    }
                }
            }
        )*
    };
}

impl_from_range!(
    Range<isize>,
    RangeFrom<isize>,
    RangeFull,
    RangeInclusive<isize>,
    RangeTo<isize>,
    RangeToInclusive<isize>
);

impl Slice {
    /// Half-open `lo..hi` with the given step.
    pub const fn new(lo: isize, hi: isize, step: isize) -> Self {
        Self {
            start: Bound::Included(lo),
            end: Bound::Excluded(hi),
            step,
        }
    }

    pub const fn full() -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
            step: 1,
        }
    }

    pub const fn step_by(self, step: isize) -> Self {
        Self { step, ..self }
    }

    pub const fn step(&self) -> isize {
        self.step
    }

    pub const fn is_full(&self) -> bool {
        matches!(
            (self.start, self.end, self.step),
            (Bound::Unbounded, Bound::Unbounded, 1)
        )
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.step == 0 {
            return Err(Error::BadSlice("slice step cannot be zero".into()));
        }
        Ok(())
    }

    /// First visited position and exclusive stop on an axis of size `dim`.
    ///
    /// Walking forward the start lies in `0..=dim` and the stop in
    /// `-1..=dim`; walking backward the start lies in `-1..dim`.
    fn bounds(&self, dim: usize) -> (isize, isize) {
        debug_assert_ne!(self.step, 0);

        let dim = dim as isize;
        let forward = self.step > 0;
        let wrap = |x: isize| if x < 0 { x + dim } else { x };
        let (lo, hi) = if forward { (0, dim) } else { (-1, dim - 1) };

        let start = match self.start {
            Bound::Included(x) => wrap(x).clamp(lo, hi),
            Bound::Excluded(x) => wrap(x + self.step.signum()).clamp(lo, hi),
            Bound::Unbounded if forward => 0,
            Bound::Unbounded => dim - 1,
        };
        let end = match self.end {
            Bound::Excluded(x) => wrap(x).clamp(-1, dim),
            Bound::Included(x) => (wrap(x) + self.step.signum()).clamp(-1, dim),
            Bound::Unbounded if forward => dim,
            Bound::Unbounded => -1,
        };
        (start, end)
    }

    /// First position and number of positions visited on an axis of size `dim`.
    pub(crate) fn resolve(&self, dim: usize) -> (isize, usize) {
        let (start, end) = self.bounds(dim);
        let span = (end - start) * self.step.signum();
        let len = if span > 0 {
            (span as usize).div_ceil(self.step.unsigned_abs())
        } else {
            0
        };
        (start, len)
    }
}
