use crate::{ArrayIndex, Result};

/// Ordered slicing specification, one entry per leading axis.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct SliceInfo {
    indices: Vec<ArrayIndex>,
}

impl AsRef<[ArrayIndex]> for SliceInfo {
    fn as_ref(&self) -> &[ArrayIndex] {
        &self.indices
    }
}

impl From<Vec<ArrayIndex>> for SliceInfo {
    fn from(indices: Vec<ArrayIndex>) -> Self {
        Self { indices }
    }
}

impl SliceInfo {
    /// Builds a specification from integer lists, `None` keeping an axis.
    ///
    /// Each list follows [`ArrayIndex`]'s `TryFrom<&[isize]>` rules.
    pub fn from_lists(entries: &[Option<&[isize]>]) -> Result<Self> {
        let indices = entries
            .iter()
            .map(|entry| match entry {
                Some(list) => ArrayIndex::try_from(*list),
                None => Ok(ArrayIndex::full()),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { indices })
    }

    /// Change in rank produced by applying this specification.
    pub fn dim_diff(&self) -> isize {
        self.indices.iter().fold(0_isize, |acc, index| match index {
            ArrayIndex::Index(_) => acc - 1,
            ArrayIndex::Slice(_) => acc,
        })
    }

    pub fn is_all_indices(&self) -> bool {
        self.indices.iter().all(ArrayIndex::is_index)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Builds a [`SliceInfo`].
///
/// Entries are integers or ranges over `isize`; `range;step` sets a step.
///
/// ```
/// use kasane::s;
///
/// let info = s![1, 0..4;2, ..];
/// assert_eq!(info.dim_diff(), -1);
/// ```
#[macro_export]
macro_rules! s {
    (@fold [$( $idx:tt )*] $r:expr;$s:expr) => {
        $crate::SliceInfo::from(vec![
            $( $idx )* $crate::ArrayIndex::from($crate::Slice::from($r).step_by($s))
        ])
    };
    (@fold [$( $idx:tt )*] $r:expr) => {
        $crate::SliceInfo::from(vec![$( $idx )* $crate::ArrayIndex::from($r)])
    };
    (@fold [$( $idx:tt )*] $r:expr;$s:expr, $( $t:tt )*) => {
        $crate::s!(@fold
            [$( $idx )* $crate::ArrayIndex::from($crate::Slice::from($r).step_by($s)),]
            $( $t )*
        )
    };
    (@fold [$( $idx:tt )*] $r:expr, $( $t:tt )*) => {
        $crate::s!(@fold
            [$( $idx )* $crate::ArrayIndex::from($r),]
            $( $t )*
        )
    };
    () => {
        $crate::SliceInfo::default()
    };
    ($( $t:tt )*) => {
        $crate::s!(@fold [] $( $t )*)
    };
}

#[cfg(test)]
mod tests {
    use super::SliceInfo;
    use crate::{ArrayIndex, Error, Result, Slice};

    #[test]
    fn from_vec() {
        let subject = SliceInfo::from(vec![Slice::from(..).into(), 1.into()]);

        assert!(subject.as_ref()[0].is_slice());
        assert!(subject.as_ref()[1].is_index());
        assert_eq!(subject.dim_diff(), -1);
        assert!(!subject.is_all_indices());
    }

    #[test]
    fn s_with_index() {
        let info = s![1];

        assert_eq!(info.dim_diff(), -1);
        assert_eq!(info.as_ref()[0], ArrayIndex::Index(1));
        assert!(info.is_all_indices());
    }

    #[test]
    fn s_with_variable() {
        let x = 2_isize;
        let info = s![x, -x];

        assert_eq!(info.as_ref(), &[ArrayIndex::Index(2), ArrayIndex::Index(-2)]);
    }

    #[test]
    fn s_with_ranges() {
        let info = s![2..3, 1.., ..2, 2..=3, ..=4, .., 2..7;2, 1..;-3];

        assert_eq!(info.dim_diff(), 0);
        assert_eq!(info.len(), 8);
        assert_eq!(info.as_ref()[0], ArrayIndex::Slice((2..3).into()));
        assert_eq!(info.as_ref()[1], ArrayIndex::Slice((1..).into()));
        assert_eq!(info.as_ref()[2], ArrayIndex::Slice((..2).into()));
        assert_eq!(info.as_ref()[3], ArrayIndex::Slice((2..=3).into()));
        assert_eq!(info.as_ref()[4], ArrayIndex::Slice((..=4).into()));
        assert_eq!(info.as_ref()[5], ArrayIndex::full());
        assert_eq!(
            info.as_ref()[6],
            ArrayIndex::Slice(Slice::from(2..7).step_by(2))
        );
        assert_eq!(
            info.as_ref()[7],
            ArrayIndex::Slice(Slice::from(1..).step_by(-3))
        );
    }

    #[test]
    fn s_empty() {
        let info = s![];

        assert!(info.is_empty());
        assert_eq!(info, SliceInfo::default());
    }

    #[test]
    fn from_lists() -> Result<()> {
        let info = SliceInfo::from_lists(&[None, Some(&[1_isize][..]), Some(&[0, 4, 2_isize][..])])?;

        assert_eq!(
            info.as_ref(),
            &[
                ArrayIndex::full(),
                ArrayIndex::Index(1),
                ArrayIndex::Slice(Slice::new(0, 4, 2)),
            ]
        );

        Ok(())
    }

    #[test]
    fn from_malformed_lists() {
        let result = SliceInfo::from_lists(&[Some(&[1, 2, 3, 4_isize][..])]);

        assert!(matches!(result, Err(Error::BadSlice(_))));
    }
}
