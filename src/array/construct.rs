use super::Array;
use crate::{shape, storage::RawBuffer, DType, Element, Error, Result};

/// Per-call construction settings for [`Array::array`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ArrayOptions {
    dtype: Option<DType>,
    disable_checks: bool,
}

impl ArrayOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts the data to `dtype` instead of keeping the element type's own.
    pub fn dtype(mut self, dtype: DType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    /// Skips scanning the data for NaN.
    pub fn disable_checks(mut self, disable: bool) -> Self {
        self.disable_checks = disable;
        self
    }
}

impl<T> From<Vec<T>> for Array
where
    T: Element,
{
    fn from(data: Vec<T>) -> Self {
        Self::from_vec(data)
    }
}

impl Array {
    /// Dense array over `data`, laid out as `shape` (default: one axis).
    ///
    /// Fails with [`Error::BadData`] if checks are enabled and `data` holds
    /// NaN, and with [`Error::MismatchedShapeSize`] if `shape` does not hold
    /// exactly `data.len()` elements.
    pub fn array<T>(data: Vec<T>, shape: Option<&[usize]>, options: ArrayOptions) -> Result<Self>
    where
        T: Element,
    {
        let shape = match shape {
            Some(shape) => shape.to_vec(),
            None => vec![data.len()],
        };
        let expected = shape::size(&shape)?;
        if expected != data.len() {
            return Err(Error::MismatchedShapeSize {
                shape,
                expected,
                actual: data.len(),
            });
        }
        if !options.disable_checks {
            if let Some(pos) = data.iter().position(|x| x.as_f64().is_nan()) {
                return Err(Error::BadData(format!("element {pos} is not a number")));
            }
        }

        let buf = match options.dtype {
            None => T::into_buffer(data),
            Some(dtype) if dtype == T::DTYPE => T::into_buffer(data),
            Some(DType::Uint8Clamped) if T::DTYPE == DType::Uint8 => {
                T::into_buffer(data).into_clamped()
            }
            Some(dtype) => RawBuffer::from_values(dtype, data.iter().map(|x| x.as_f64())),
        };
        Ok(Self::from_buffer(buf, shape))
    }

    /// One-axis array owning `data`, with the element type's dtype.
    pub fn from_vec<T>(data: Vec<T>) -> Self
    where
        T: Element,
    {
        let shape = vec![data.len()];
        Self::from_buffer(T::into_buffer(data), shape)
    }

    pub fn zeros(shape: &[usize], dtype: Option<DType>) -> Result<Self> {
        Self::filled(0.0, shape, dtype)
    }

    pub fn ones(shape: &[usize], dtype: Option<DType>) -> Result<Self> {
        Self::filled(1.0, shape, dtype)
    }

    pub fn filled(value: f64, shape: &[usize], dtype: Option<DType>) -> Result<Self> {
        let len = shape::size(shape)?;
        let buf = RawBuffer::filled(dtype.unwrap_or_default(), len, value);
        Ok(Self::from_buffer(buf, shape.to_vec()))
    }

    /// Dense array of `shape` filled from `values` in index order.
    ///
    /// The sequence must yield exactly as many values as `shape` holds. At
    /// most one value past the end is pulled, so an unbounded sequence fails
    /// with `actual == expected + 1` instead of being drained.
    pub fn from_iterable<I>(values: I, shape: &[usize], dtype: Option<DType>) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let expected = shape::size(shape)?;
        let mut values = values.into_iter();
        let taken = values.by_ref().take(expected).collect::<Vec<_>>();
        let actual = taken.len() + usize::from(values.next().is_some());
        if actual != expected {
            return Err(Error::MismatchedShapeSize {
                shape: shape.to_vec(),
                expected,
                actual,
            });
        }

        Ok(Self::from_index_order(taken, shape, dtype.unwrap_or_default()))
    }

    /// `n` by `n` identity matrix.
    pub fn eye(n: usize, dtype: Option<DType>) -> Self {
        let out = Self::allocate(&[n, n], dtype.unwrap_or_default());
        for i in 0..n {
            out.storage
                .write(shape::flat_index(&[i, i], &out.strides, 0), 1.0);
        }
        out
    }

    /// `Int32` range `0..stop`.
    pub fn arange(stop: i32) -> Self {
        Self::from_vec((0..stop.max(0)).collect::<Vec<i32>>())
    }

    /// `Int32` range from `start` toward `stop` (exclusive) by `step`.
    pub fn arange_step(start: i32, stop: i32, step: i32) -> Result<Self> {
        if step == 0 {
            return Err(Error::BadData("arange step cannot be zero".into()));
        }

        let len = ((stop as i64 - start as i64) as f64 / step as f64).ceil().max(0.0) as usize;
        let data = (0..len)
            .map(|i| (start as i64 + i as i64 * step as i64) as i32)
            .collect::<Vec<_>>();
        Ok(Self::from_vec(data))
    }
}
