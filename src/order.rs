/// One axis of a traversal plan.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AxisWalk {
    pub axis: usize,
    /// Whether the axis is walked from its last position to its first.
    pub reversed: bool,
}

/// Enumeration order of the coordinates of a view.
pub trait Order: 'static {
    /// Axes from slowest to fastest varying.
    fn plan(shape: &[usize], strides: &[isize]) -> Vec<AxisWalk>;
    fn name<'a>() -> &'a str;
}

/// Lexicographic coordinate order, last axis fastest.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct IndexOrder;

impl Order for IndexOrder {
    fn plan(shape: &[usize], _strides: &[isize]) -> Vec<AxisWalk> {
        (0..shape.len())
            .map(|axis| AxisWalk {
                axis,
                reversed: false,
            })
            .collect()
    }

    fn name<'a>() -> &'a str {
        "index order"
    }
}

/// Ascending physical position in the buffer.
///
/// Axes with the smallest absolute stride vary fastest; axes with a negative
/// stride are walked backwards so positions never decrease.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DataOrder;

impl Order for DataOrder {
    fn plan(shape: &[usize], strides: &[isize]) -> Vec<AxisWalk> {
        debug_assert_eq!(shape.len(), strides.len());

        let mut axes = (0..shape.len()).collect::<Vec<_>>();
        // stable: equal strides keep index order among themselves
        axes.sort_by(|&a, &b| strides[b].unsigned_abs().cmp(&strides[a].unsigned_abs()));
        axes.into_iter()
            .map(|axis| AxisWalk {
                axis,
                reversed: strides[axis] < 0,
            })
            .collect()
    }

    fn name<'a>() -> &'a str {
        "data order"
    }
}
