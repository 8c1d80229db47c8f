use core::iter::FusedIterator;

use crate::{
    order::{AxisWalk, Order},
    shape,
    storage::Storage,
    IndexOrder, Result, ShapeError,
};

/// Rectangular sub-region of a view: `lower <= coord < upper`, every `step`th position.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Region {
    lower: Vec<usize>,
    upper: Vec<usize>,
    step: Vec<usize>,
}

impl Region {
    /// The whole of `shape`.
    pub fn full(shape: &[usize]) -> Self {
        Self {
            lower: vec![0; shape.len()],
            upper: shape.to_vec(),
            step: vec![1; shape.len()],
        }
    }

    pub fn new(shape: &[usize], lower: &[usize], upper: &[usize], step: &[usize]) -> Result<Self> {
        let region = Self {
            lower: lower.to_vec(),
            upper: upper.to_vec(),
            step: step.to_vec(),
        };
        region.check_fits(shape)?;
        Ok(region)
    }

    /// Fails unless this region has one bound per axis of `shape` and lies
    /// inside it.
    pub(crate) fn check_fits(&self, shape: &[usize]) -> Result<()> {
        let n_dims = shape.len();
        if self.lower.len() != n_dims || self.upper.len() != n_dims || self.step.len() != n_dims {
            return Err(ShapeError::IncompatibleShape(format!(
                "region bounds must have {n_dims} entries"
            ))
            .into());
        }
        for (axis, &dim) in shape.iter().enumerate() {
            let (lower, upper, step) = (self.lower[axis], self.upper[axis], self.step[axis]);
            if upper > dim || lower > upper || step == 0 {
                return Err(ShapeError::IncompatibleShape(format!(
                    "region [{lower}, {upper}) step {step} does not fit axis {axis} with size {dim}"
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Number of positions visited along each axis.
    pub fn extents(&self) -> Vec<usize> {
        self.lower
            .iter()
            .zip(&self.upper)
            .zip(&self.step)
            .map(|((&lo, &hi), &step)| (hi - lo).div_ceil(step))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.extents().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ndims(&self) -> usize {
        self.lower.len()
    }
}

#[derive(Clone, Debug)]
struct Walk {
    axis: usize,
    extent: usize,
    first: usize,
    delta: isize,
    stride: isize,
}

/// Incremental traversal state shared by every iterator of this module.
#[derive(Clone, Debug)]
struct Cursor {
    walks: Vec<Walk>,
    counters: Vec<usize>,
    coords: Vec<usize>,
    first_position: isize,
    position: isize,
    len: usize,
    remaining: usize,
}

impl Cursor {
    fn new<O>(strides: &[isize], offset: usize, region: &Region) -> Self
    where
        O: Order,
    {
        debug_assert_eq!(strides.len(), region.ndims());

        let extents = region.extents();
        let plan = O::plan(&extents, strides);
        let walks = plan
            .iter()
            .map(|&AxisWalk { axis, reversed }| {
                let extent = extents[axis];
                let step = region.step[axis];
                let (first, delta) = if reversed && extent > 0 {
                    (region.lower[axis] + (extent - 1) * step, -(step as isize))
                } else {
                    (region.lower[axis], step as isize)
                };
                Walk {
                    axis,
                    extent,
                    first,
                    delta,
                    stride: strides[axis] * delta,
                }
            })
            .collect::<Vec<_>>();

        let mut coords = vec![0; strides.len()];
        for walk in &walks {
            coords[walk.axis] = walk.first;
        }
        let first_position = coords
            .iter()
            .zip(strides)
            .fold(offset as isize, |acc, (&c, &s)| acc + c as isize * s);
        let len = extents.iter().product();

        Self {
            counters: vec![0; walks.len()],
            walks,
            coords,
            first_position,
            position: first_position,
            len,
            remaining: len,
        }
    }

    fn restart(&mut self) {
        for (counter, walk) in self.counters.iter_mut().zip(&self.walks) {
            *counter = 0;
            self.coords[walk.axis] = walk.first;
        }
        self.position = self.first_position;
        self.remaining = self.len;
    }

    #[inline]
    fn next_with<R>(&mut self, f: impl FnOnce(usize, &[usize]) -> R) -> Option<R> {
        if self.remaining == 0 {
            return None;
        }

        debug_assert!(self.position >= 0);
        let ret = f(self.position as usize, &self.coords);
        self.advance();
        Some(ret)
    }

    #[inline]
    fn advance(&mut self) {
        self.remaining -= 1;
        if self.remaining == 0 {
            return;
        }

        for (counter, walk) in self.counters.iter_mut().zip(&self.walks).rev() {
            *counter += 1;
            if *counter < walk.extent {
                self.coords[walk.axis] = (self.coords[walk.axis] as isize + walk.delta) as usize;
                self.position += walk.stride;
                return;
            }
            *counter = 0;
            self.coords[walk.axis] = walk.first;
            self.position -= walk.stride * (walk.extent as isize - 1);
        }
    }
}

macro_rules! iterator {
    ($name:ident, $item:ty, |$self_:ident, $pos:ident, $coords:ident| $body:expr) => {
        impl $name {
            /// Rewinds to the first element.
            pub fn restart(&mut self) {
                self.cursor.restart();
            }
        }

        impl ExactSizeIterator for $name {
            #[inline]
            fn len(&self) -> usize {
                self.cursor.remaining
            }
        }

        impl FusedIterator for $name {}

        impl Iterator for $name {
            type Item = $item;

            #[inline]
            fn next(&mut self) -> Option<Self::Item> {
                let $self_ = &mut *self;
                $self_.cursor.next_with(|$pos, $coords| $body)
            }

            #[inline]
            fn size_hint(&self) -> (usize, Option<usize>) {
                (self.cursor.remaining, Some(self.cursor.remaining))
            }
        }
    };
}

/// Coordinate tuples of a region.
///
/// As an [`Iterator`] every step returns a fresh `Vec`; [`Indices::next_slice`]
/// lends the coordinates from a reused buffer instead.
#[derive(Clone, Debug)]
pub struct Indices {
    cursor: Cursor,
    scratch: Vec<usize>,
}

impl Indices {
    pub(crate) fn new<O>(strides: &[isize], offset: usize, region: &Region) -> Self
    where
        O: Order,
    {
        Self {
            cursor: Cursor::new::<O>(strides, offset, region),
            scratch: vec![0; strides.len()],
        }
    }

    /// Advances like [`Iterator::next`] without allocating.
    pub fn next_slice(&mut self) -> Option<&[usize]> {
        let Self { cursor, scratch } = self;
        cursor.next_with(|_, coords| scratch.copy_from_slice(coords))?;
        Some(scratch.as_slice())
    }

    /// Every coordinate of `shape` in index order.
    pub fn over(shape: &[usize]) -> Self {
        let strides = shape::stride_from_shape(shape);
        Self::new::<IndexOrder>(&strides, 0, &Region::full(shape))
    }
}

iterator!(Indices, Vec<usize>, |this, _pos, coords| coords.to_vec());

/// Flat buffer positions of a region.
#[derive(Clone, Debug)]
pub struct Positions {
    cursor: Cursor,
}

impl Positions {
    pub(crate) fn new<O>(strides: &[isize], offset: usize, region: &Region) -> Self
    where
        O: Order,
    {
        Self {
            cursor: Cursor::new::<O>(strides, offset, region),
        }
    }
}

iterator!(Positions, usize, |this, pos, _coords| pos);

/// Element values of a region, widened to `f64`.
///
/// Holds its own handle to the buffer, so writes made through other views
/// while iterating are observed by later reads.
#[derive(Clone, Debug)]
pub struct Values {
    storage: Storage,
    cursor: Cursor,
}

impl Values {
    pub(crate) fn new<O>(storage: Storage, strides: &[isize], offset: usize, region: &Region) -> Self
    where
        O: Order,
    {
        Self {
            storage,
            cursor: Cursor::new::<O>(strides, offset, region),
        }
    }
}

iterator!(Values, f64, |this, pos, _coords| this.storage.read(pos));
