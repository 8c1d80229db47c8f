use core::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo, RangeToInclusive};

use crate::{Error, Result, Slice};

/// One entry of a slicing specification.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ArrayIndex {
    /// Selects a single position and drops the axis.
    Index(isize),
    /// Keeps the axis, restricted to a strided range.
    Slice(Slice),
}

impl ArrayIndex {
    /// Keeps the axis unchanged.
    pub const fn full() -> Self {
        Self::Slice(Slice::full())
    }

    pub const fn is_index(&self) -> bool {
        matches!(self, Self::Index(_))
    }

    pub const fn is_slice(&self) -> bool {
        matches!(self, Self::Slice(_))
    }
}

impl From<isize> for ArrayIndex {
    fn from(v: isize) -> Self {
        Self::Index(v)
    }
}

impl From<Range<isize>> for ArrayIndex {
    fn from(v: Range<isize>) -> Self {
        Self::from(Slice::from(v))
    }
}

impl From<RangeFrom<isize>> for ArrayIndex {
    fn from(v: RangeFrom<isize>) -> Self {
        Self::from(Slice::from(v))
    }
}

impl From<RangeFull> for ArrayIndex {
    fn from(v: RangeFull) -> Self {
        Self::from(Slice::from(v))
    }
}

impl From<RangeInclusive<isize>> for ArrayIndex {
    fn from(v: RangeInclusive<isize>) -> Self {
        Self::from(Slice::from(v))
    }
}

impl From<RangeToInclusive<isize>> for ArrayIndex {
    fn from(v: RangeToInclusive<isize>) -> Self {
        Self::from(Slice::from(v))
    }
}

impl From<RangeTo<isize>> for ArrayIndex {
    fn from(v: RangeTo<isize>) -> Self {
        Self::from(Slice::from(v))
    }
}

impl From<Slice> for ArrayIndex {
    fn from(v: Slice) -> Self {
        Self::Slice(v)
    }
}

/// `[i]` selects, `[lo, hi]` and `[lo, hi, step]` slice.
impl TryFrom<&[isize]> for ArrayIndex {
    type Error = Error;

    fn try_from(v: &[isize]) -> Result<Self> {
        match *v {
            [index] => Ok(Self::Index(index)),
            [lo, hi] => Ok(Self::Slice(Slice::new(lo, hi, 1))),
            [lo, hi, step] => Ok(Self::Slice(Slice::new(lo, hi, step))),
            _ => Err(Error::BadSlice(format!(
                "slice entry must have 1, 2 or 3 elements, got {}",
                v.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ArrayIndex;
    use crate::{slice::Slice, Error, Result};

    #[test]
    fn convert_from_index() {
        assert!(ArrayIndex::from(3).is_index());
        assert!(ArrayIndex::from(-1).is_index());
    }

    #[test]
    fn convert_from_ranges() {
        assert!(ArrayIndex::from(2..3).is_slice());
        assert!(ArrayIndex::from(2..).is_slice());
        assert!(ArrayIndex::from(..).is_slice());
        assert!(ArrayIndex::from(2..=3).is_slice());
        assert!(ArrayIndex::from(..=3).is_slice());
        assert!(ArrayIndex::from(..3).is_slice());
        assert!(ArrayIndex::from(Slice::from(3..5)).is_slice());
        assert_eq!(ArrayIndex::from(..), ArrayIndex::full());
    }

    #[test]
    fn convert_from_lists() -> Result<()> {
        assert_eq!(ArrayIndex::try_from(&[4_isize][..])?, ArrayIndex::Index(4));
        assert_eq!(
            ArrayIndex::try_from(&[0, 2_isize][..])?,
            ArrayIndex::Slice(Slice::from(0..2))
        );
        assert_eq!(
            ArrayIndex::try_from(&[5, 1, -2_isize][..])?,
            ArrayIndex::Slice(Slice::from(5..1).step_by(-2))
        );

        Ok(())
    }

    #[test]
    fn convert_from_malformed_lists() {
        let empty: &[isize] = &[];

        assert!(matches!(
            ArrayIndex::try_from(empty),
            Err(Error::BadSlice(_))
        ));
        assert!(matches!(
            ArrayIndex::try_from(&[1, 2, 3, 4_isize][..]),
            Err(Error::BadSlice(_))
        ));
    }
}
