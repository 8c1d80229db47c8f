mod construct;
pub use construct::ArrayOptions;

mod fmt;

mod iter;
pub use iter::{Indices, Positions, Region, Values};

mod linarg;

mod nested;
pub use nested::{ArrayData, Nested};

mod ops;
pub use ops::{Broadcast, Pairs};

mod reduce;

mod routine;

use tracing::{debug, trace};

use crate::{
    shape,
    storage::{RawBuffer, Storage},
    ArrayIndex, DType, DataOrder, Error, IndexOrder, Order, Result, ShapeError,
};

/// Strided view over a shared, typed buffer.
///
/// Every array is a view: `shape`, `strides` and `offset` map coordinates to
/// positions in a buffer that may be shared with other arrays. Slicing and
/// broadcasting produce new views over the same buffer, so a write through
/// one is visible through all of them. Cloning an array clones the view, not
/// the data; use [`Array::copy`] for an independent duplicate.
///
/// Element values cross the API as `f64` and are converted on write
/// according to the array's [`DType`].
#[derive(Clone)]
pub struct Array {
    storage: Storage,
    shape: Vec<usize>,
    strides: Vec<isize>,
    offset: usize,
}

/// Right-hand side of [`Array::set`].
#[derive(Clone, Copy, Debug)]
pub enum Operand<'a> {
    Scalar(f64),
    Array(&'a Array),
}

impl From<f64> for Operand<'_> {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl<'a> From<&'a Array> for Operand<'a> {
    fn from(v: &'a Array) -> Self {
        Self::Array(v)
    }
}

impl PartialEq for Array {
    /// Same dtype, same shape and same values in index order; layout is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.dtype() == other.dtype()
            && self.shape == other.shape
            && self.index_order_values().eq(other.index_order_values())
    }
}

impl Array {
    /// Dense array over a fresh buffer. `buf` must hold exactly the elements of `shape`.
    pub(crate) fn from_buffer(buf: RawBuffer, shape: Vec<usize>) -> Self {
        debug_assert_eq!(buf.len(), shape.iter().product::<usize>());

        Self {
            strides: shape::stride_from_shape(&shape),
            storage: Storage::from(buf),
            shape,
            offset: 0,
        }
    }

    /// Dense array of `dtype` with every element zero.
    pub(crate) fn allocate(shape: &[usize], dtype: DType) -> Self {
        let len = shape.iter().product();
        Self::from_buffer(RawBuffer::filled(dtype, len, 0.0), shape.to_vec())
    }

    /// Dense array of `shape` whose index-order values are `values`.
    pub(crate) fn from_index_order<I>(values: I, shape: &[usize], dtype: DType) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let out = Self::allocate(shape, dtype);
        for (pos, value) in out.index_order_positions().zip(values) {
            out.storage.write(pos, value);
        }
        out
    }

    fn view(&self, shape: Vec<usize>, strides: Vec<isize>, offset: usize) -> Self {
        Self {
            storage: self.storage.clone(),
            shape,
            strides,
            offset,
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn ndims(&self) -> usize {
        self.shape.len()
    }

    /// Whether the view covers its elements densely in first-axis-major order.
    pub fn is_contiguous(&self) -> bool {
        shape::is_contiguous(&self.shape, &self.strides)
    }

    /// Whether both arrays view the same buffer.
    pub fn shares_buffer(&self, other: &Array) -> bool {
        self.storage.ptr_eq(&other.storage)
    }

    /// Logical equality plus identical strides and offset.
    pub fn same_layout(&self, other: &Array) -> bool {
        self == other && self.strides == other.strides && self.offset == other.offset
    }

    /// Resolves possibly negative `coords` against the shape.
    fn resolve_coords(&self, coords: &[isize]) -> Result<Vec<usize>> {
        if coords.len() != self.ndims() {
            return Err(ShapeError::IncompatibleAxis(format!(
                "expected {} coordinates, got {}",
                self.ndims(),
                coords.len()
            ))
            .into());
        }

        coords
            .iter()
            .zip(&self.shape)
            .enumerate()
            .map(|(axis, (&index, &dim))| resolve_index(index, axis, dim))
            .collect()
    }

    pub fn get(&self, coords: &[isize]) -> Result<f64> {
        let coords = self.resolve_coords(coords)?;
        Ok(self
            .storage
            .read(shape::flat_index(&coords, &self.strides, self.offset)))
    }

    /// Writes a single element.
    pub fn set_at(&self, coords: &[isize], value: f64) -> Result<()> {
        let coords = self.resolve_coords(coords)?;
        self.storage
            .write(shape::flat_index(&coords, &self.strides, self.offset), value);
        Ok(())
    }

    /// Overwrites the region selected by `info` with `values`.
    ///
    /// A scalar with one integer per axis writes a single element. Otherwise
    /// `info` selects a destination view and `values` is broadcast to its
    /// shape, then copied element by element in index order. When `values`
    /// views the same buffer, the regions read and written must be disjoint
    /// or the result is unspecified.
    pub fn set<'a, I>(&self, values: impl Into<Operand<'a>>, info: I) -> Result<()>
    where
        I: AsRef<[ArrayIndex]>,
    {
        let info = info.as_ref();
        let values = values.into();

        if let Operand::Scalar(value) = values {
            if info.len() == self.ndims() && info.iter().all(ArrayIndex::is_index) {
                let coords = info
                    .iter()
                    .map(|index| match index {
                        ArrayIndex::Index(i) => *i,
                        ArrayIndex::Slice(_) => 0,
                    })
                    .collect::<Vec<_>>();
                return self.set_at(&coords, value);
            }
        }

        let dest = self.slice(info)?;
        match values {
            Operand::Scalar(value) => dest.fill(value),
            Operand::Array(src) => {
                let src = src.broadcast_to(&dest.shape)?;
                for (pos, value) in dest.index_order_positions().zip(src.index_order_values()) {
                    self.storage.write(pos, value);
                }
            }
        }
        Ok(())
    }

    /// Sets every element of this view to `value`.
    pub fn fill(&self, value: f64) {
        for pos in self.index_order_positions() {
            self.storage.write(pos, value);
        }
    }

    /// Aliasing view selected by `info`.
    ///
    /// Each entry applies to the next leading axis; axes past the end of
    /// `info` are kept whole. Integer entries drop their axis. Selecting a
    /// single element from every axis yields a view of shape `[1]`.
    pub fn slice<I>(&self, info: I) -> Result<Array>
    where
        I: AsRef<[ArrayIndex]>,
    {
        let (offset, shape, strides) = self.compute_sliced_parts(info.as_ref())?;
        Ok(self.view(shape, strides, offset))
    }

    fn compute_sliced_parts(&self, info: &[ArrayIndex]) -> Result<(usize, Vec<usize>, Vec<isize>)> {
        let n_dims = self.ndims();
        if info.len() > n_dims {
            return Err(Error::BadSlice(format!(
                "too many indices for array: array is {}-dimensional, but {} were indexed",
                n_dims,
                info.len()
            )));
        }

        let mut out_shape = Vec::with_capacity(n_dims);
        let mut out_strides = Vec::with_capacity(n_dims);
        let mut out_offset = self.offset as isize;
        for (in_idx, array_index) in info.iter().enumerate() {
            let dim = self.shape[in_idx];
            let stride = self.strides[in_idx];
            match array_index {
                ArrayIndex::Index(index) => {
                    let index = resolve_index(*index, in_idx, dim)?;
                    out_offset += stride * index as isize;
                }
                ArrayIndex::Slice(slice) => {
                    slice.validate()?;
                    let (start, len) = slice.resolve(dim);
                    if len > 0 {
                        out_offset += stride * start;
                    }
                    out_shape.push(len);
                    out_strides.push(stride * slice.step());
                }
            }
        }
        out_shape.extend_from_slice(&self.shape[info.len()..]);
        out_strides.extend_from_slice(&self.strides[info.len()..]);

        if out_shape.is_empty() {
            out_shape.push(1);
            out_strides.push(1);
        }

        debug_assert!(out_offset >= 0);
        Ok((out_offset as usize, out_shape, out_strides))
    }

    /// Read-oriented view of this array stretched to `shape`.
    ///
    /// Axes of size 1 repeat with a zero stride. Leading axes of this array
    /// beyond the rank of `shape` must have size 1.
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Array> {
        let unbroadcastable = |axis| -> Error {
            ShapeError::Unbroadcastable {
                axis,
                lhs: self.shape.clone(),
                rhs: shape.to_vec(),
            }
            .into()
        };

        let surplus = self.ndims().saturating_sub(shape.len());
        if let Some(axis) = self.shape[..surplus].iter().position(|&dim| dim != 1) {
            return Err(unbroadcastable(axis));
        }

        let mut strides = vec![0_isize; shape.len()];
        for (axis, (stride, dim)) in strides.iter_mut().zip(shape).enumerate().rev() {
            let Some(in_axis) = (axis + self.ndims()).checked_sub(shape.len()) else {
                break;
            };
            let in_dim = self.shape[in_axis];
            if in_dim == *dim {
                *stride = self.strides[in_axis];
            } else if in_dim != 1 {
                return Err(unbroadcastable(axis));
            }
        }

        Ok(self.view(shape.to_vec(), strides, self.offset))
    }

    /// Copies the index-order values into a dense array of `shape`.
    pub fn reshape(&self, shape: &[usize]) -> Result<Array> {
        if shape::size(shape)? != self.len() {
            return Err(ShapeError::IncompatibleShape(format!(
                "cannot reshape array of size {} into shape {:?}",
                self.len(),
                shape
            ))
            .into());
        }

        debug!(from = ?self.shape, to = ?shape, "reshape copies");
        Ok(Array::from_index_order(
            self.index_order_values(),
            shape,
            self.dtype(),
        ))
    }

    pub fn flatten(&self) -> Array {
        let buf = RawBuffer::from_values(self.dtype(), self.index_order_values());
        Array::from_buffer(buf, vec![self.len()])
    }

    /// Dense copy with the axis order reversed.
    pub fn transpose(&self) -> Array {
        let shape = self.shape.iter().rev().copied().collect::<Vec<_>>();
        debug!(from = ?self.shape, to = ?shape, "transpose copies");

        let out = Array::allocate(&shape, self.dtype());
        let mut reversed = vec![0; self.ndims()];
        let mut indices = self.indices();
        let mut values = self.index_order_values();
        while let (Some(coords), Some(value)) = (indices.next_slice(), values.next()) {
            for (dst, src) in reversed.iter_mut().zip(coords.iter().rev()) {
                *dst = *src;
            }
            out.storage
                .write(shape::flat_index(&reversed, &out.strides, 0), value);
        }
        out
    }

    /// Aliasing view without the axes of size 1.
    pub fn drop_unit_dimensions(&self) -> Array {
        let (mut shape, mut strides): (Vec<_>, Vec<_>) = self
            .shape
            .iter()
            .zip(&self.strides)
            .filter(|(&dim, _)| dim != 1)
            .map(|(&dim, &stride)| (dim, stride))
            .unzip();
        if shape.is_empty() {
            shape.push(1);
            strides.push(1);
        }
        self.view(shape, strides, self.offset)
    }

    /// Dense duplicate over a new buffer, optionally converted to `dtype`.
    pub fn copy(&self, dtype: Option<DType>) -> Array {
        let dtype = dtype.unwrap_or_else(|| self.dtype());
        debug!(shape = ?self.shape, %dtype, "copy");
        Array::from_index_order(self.index_order_values(), &self.shape, dtype)
    }

    pub fn astype(&self, dtype: DType) -> Array {
        self.copy(Some(dtype))
    }

    /// Index-order values collected into a `Vec`.
    pub fn to_vec(&self) -> Vec<f64> {
        self.index_order_values().collect()
    }

    pub fn indices(&self) -> Indices {
        Indices::new::<IndexOrder>(&self.strides, self.offset, &Region::full(&self.shape))
    }

    pub fn index_order_positions(&self) -> Positions {
        Positions::new::<IndexOrder>(&self.strides, self.offset, &Region::full(&self.shape))
    }

    pub fn index_order_values(&self) -> Values {
        self.values_over::<IndexOrder>(&Region::full(&self.shape))
    }

    pub fn data_order_indices(&self) -> Indices {
        Indices::new::<DataOrder>(&self.strides, self.offset, &Region::full(&self.shape))
    }

    pub fn data_order_positions(&self) -> Positions {
        Positions::new::<DataOrder>(&self.strides, self.offset, &Region::full(&self.shape))
    }

    pub fn data_order_values(&self) -> Values {
        self.values_over::<DataOrder>(&Region::full(&self.shape))
    }

    fn values_over<O>(&self, region: &Region) -> Values
    where
        O: Order,
    {
        Values::new::<O>(self.storage.clone(), &self.strides, self.offset, region)
    }

    fn check_region<O>(&self, region: &Region) -> Result<()>
    where
        O: Order,
    {
        region.check_fits(&self.shape).inspect_err(|e| {
            debug!(shape = ?self.shape, order = O::name(), "{e}");
        })?;
        trace!(shape = ?self.shape, order = O::name(), len = region.len(), "region walk");
        Ok(())
    }

    /// Coordinates of `region` in the order `O`.
    ///
    /// Fails with [`ShapeError::IncompatibleShape`] unless `region` lies
    /// inside this array.
    pub fn indices_in<O>(&self, region: &Region) -> Result<Indices>
    where
        O: Order,
    {
        self.check_region::<O>(region)?;
        Ok(Indices::new::<O>(&self.strides, self.offset, region))
    }

    /// Buffer positions of `region` in the order `O`.
    pub fn positions_in<O>(&self, region: &Region) -> Result<Positions>
    where
        O: Order,
    {
        self.check_region::<O>(region)?;
        Ok(Positions::new::<O>(&self.strides, self.offset, region))
    }

    /// Values of `region` in the order `O`.
    pub fn values_in<O>(&self, region: &Region) -> Result<Values>
    where
        O: Order,
    {
        self.check_region::<O>(region)?;
        Ok(self.values_over::<O>(region))
    }

    /// Region of this array, validated against its shape.
    pub fn region(&self, lower: &[usize], upper: &[usize], step: &[usize]) -> Result<Region> {
        Region::new(&self.shape, lower, upper, step)
    }
}

fn resolve_index(index: isize, axis: usize, dim: usize) -> Result<usize> {
    let resolved = if index < 0 {
        index + dim as isize
    } else {
        index
    };
    if resolved < 0 || resolved >= dim as isize {
        return Err(Error::IndexOutOfBounds { index, axis, dim });
    }
    Ok(resolved as usize)
}
