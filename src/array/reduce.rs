use super::{iter::Indices, routine::normalize_axis, Array, Region, Values};
use crate::{DType, IndexOrder, Result};

/// Population variance of `values`; NaN when empty.
fn variance_of(values: Values) -> f64 {
    let n = values.len() as f64;
    let mean = values.clone().sum::<f64>() / n;
    values.map(|x| (x - mean) * (x - mean)).sum::<f64>() / n
}

impl Array {
    pub fn sum(&self) -> f64 {
        self.index_order_values().sum()
    }

    /// Product of every element; `1` when empty.
    pub fn prod(&self) -> f64 {
        self.index_order_values().product()
    }

    /// Largest element, ignoring NaN; `-inf` when empty.
    pub fn max(&self) -> f64 {
        self.index_order_values().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Smallest element, ignoring NaN; `inf` when empty.
    pub fn min(&self) -> f64 {
        self.index_order_values().fold(f64::INFINITY, f64::min)
    }

    pub fn mean(&self) -> f64 {
        self.sum() / self.len() as f64
    }

    /// Population variance: the mean squared deviation from the mean.
    pub fn variance(&self) -> f64 {
        variance_of(self.index_order_values())
    }

    pub fn stdev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Whether every element is nonzero.
    pub fn all(&self) -> bool {
        self.index_order_values().all(|x| x != 0.0)
    }

    /// Whether some element is nonzero.
    pub fn any(&self) -> bool {
        self.index_order_values().any(|x| x != 0.0)
    }

    /// Coordinates of every nonzero element, in index order.
    pub fn nonzero(&self) -> Vec<Vec<usize>> {
        self.indices()
            .zip(self.index_order_values())
            .filter(|&(_, x)| x != 0.0)
            .map(|(coords, _)| coords)
            .collect()
    }

    /// One region per lane along `axis`, ordered by the index order of the
    /// remaining axes.
    fn lanes(&self, axis: usize) -> Result<Vec<Region>> {
        let n_dims = self.ndims();
        let mut rest = self.shape.clone();
        rest.remove(axis);
        if rest.is_empty() {
            rest.push(1);
        }

        let mut lower = vec![0; n_dims];
        let mut upper = self.shape.clone();
        let step = vec![1; n_dims];
        Indices::over(&rest)
            .map(|coords| {
                for (i, &c) in (0..n_dims).filter(|&i| i != axis).zip(&coords) {
                    lower[i] = c;
                    upper[i] = c + 1;
                }
                Region::new(&self.shape, &lower, &upper, &step)
            })
            .collect()
    }

    /// Collapses `axis` by applying `f` to every lane along it.
    ///
    /// The result drops `axis` from the shape (a rank-1 input gives shape
    /// `[1]`) and keeps this array's dtype unless `dtype` is given.
    pub fn reduce_axis<F>(&self, axis: isize, mut f: F, dtype: Option<DType>) -> Result<Array>
    where
        F: FnMut(Values) -> f64,
    {
        let axis = normalize_axis(axis, self.ndims())?;

        let mut out_shape = self.shape.clone();
        out_shape.remove(axis);
        if out_shape.is_empty() {
            out_shape.push(1);
        }

        let values = self
            .lanes(axis)?
            .iter()
            .map(|lane| -> Result<f64> { Ok(f(self.values_in::<IndexOrder>(lane)?)) })
            .collect::<Result<Vec<_>>>()?;

        Ok(Array::from_index_order(
            values,
            &out_shape,
            dtype.unwrap_or_else(|| self.dtype()),
        ))
    }

    /// Running fold of `f` along `axis`; the result has this array's shape.
    ///
    /// The first element of each lane is copied and every later one is
    /// `f(previous, x)`. The accumulator is converted to the result dtype
    /// (this array's unless `dtype` is given) at every step, so narrow
    /// integer dtypes wrap as they go.
    pub fn accumulate_axis<F>(&self, axis: isize, mut f: F, dtype: Option<DType>) -> Result<Array>
    where
        F: FnMut(f64, f64) -> f64,
    {
        let axis = normalize_axis(axis, self.ndims())?;
        let dtype = dtype.unwrap_or_else(|| self.dtype());
        let out = Array::allocate(&self.shape, dtype);

        for lane in self.lanes(axis)? {
            let mut acc = None;
            let positions = out.positions_in::<IndexOrder>(&lane)?;
            for (pos, x) in positions.zip(self.values_in::<IndexOrder>(&lane)?) {
                let next = dtype.cast(match acc {
                    Some(prev) => f(prev, x),
                    None => x,
                });
                out.storage.write(pos, next);
                acc = Some(next);
            }
        }
        Ok(out)
    }

    pub fn sum_axis(&self, axis: isize) -> Result<Array> {
        self.reduce_axis(axis, |lane| lane.sum(), None)
    }

    pub fn prod_axis(&self, axis: isize) -> Result<Array> {
        self.reduce_axis(axis, |lane| lane.product(), None)
    }

    pub fn max_axis(&self, axis: isize) -> Result<Array> {
        self.reduce_axis(axis, |lane| lane.fold(f64::NEG_INFINITY, f64::max), None)
    }

    pub fn min_axis(&self, axis: isize) -> Result<Array> {
        self.reduce_axis(axis, |lane| lane.fold(f64::INFINITY, f64::min), None)
    }

    /// Always `Float64`.
    pub fn mean_axis(&self, axis: isize) -> Result<Array> {
        self.reduce_axis(
            axis,
            |lane| {
                let n = lane.len();
                lane.sum::<f64>() / n as f64
            },
            Some(DType::Float64),
        )
    }

    /// Always `Float64`.
    pub fn variance_axis(&self, axis: isize) -> Result<Array> {
        self.reduce_axis(axis, variance_of, Some(DType::Float64))
    }

    /// Always `Float64`.
    pub fn stdev_axis(&self, axis: isize) -> Result<Array> {
        self.reduce_axis(axis, |lane| variance_of(lane).sqrt(), Some(DType::Float64))
    }

    pub fn cumsum(&self, axis: isize, dtype: Option<DType>) -> Result<Array> {
        self.accumulate_axis(axis, |acc, x| acc + x, dtype)
    }

    pub fn cumprod(&self, axis: isize, dtype: Option<DType>) -> Result<Array> {
        self.accumulate_axis(axis, |acc, x| acc * x, dtype)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::{s, Array, DType, Error, Result, ShapeError};

    fn arange_i32(n: i32) -> Array {
        Array::arange(n)
    }

    #[test]
    fn whole_array() -> Result<()> {
        let a = arange_i32(6).reshape(&[2, 3])?;

        assert_eq!(a.sum(), 15.0);
        assert_eq!(a.max(), 5.0);
        assert_eq!(a.min(), 0.0);
        assert_relative_eq!(a.mean(), 2.5);
        assert!(!a.all());
        assert!(a.any());
        assert!(a.slice(s![.., 1..])?.all());

        Ok(())
    }

    #[test]
    fn empty_array() {
        let a = Array::from_vec(Vec::<f64>::new());

        assert_eq!(a.sum(), 0.0);
        assert_eq!(a.max(), f64::NEG_INFINITY);
        assert!(a.mean().is_nan());
        assert!(a.all());
        assert!(!a.any());
    }

    #[test]
    fn sum_axis() -> Result<()> {
        let a = arange_i32(6).reshape(&[2, 3])?;
        let s0 = a.sum_axis(0)?;

        assert_eq!(s0.shape(), &[3]);
        assert_eq!(s0.dtype(), DType::Int32);
        assert_eq!(s0.to_vec(), [3.0, 5.0, 7.0]);
        assert_eq!(a.sum_axis(1)?.to_vec(), [3.0, 12.0]);
        assert_eq!(a.sum_axis(-1)?, a.sum_axis(1)?);

        Ok(())
    }

    #[test]
    fn reduce_rank_1() -> Result<()> {
        let s = arange_i32(4).sum_axis(0)?;

        assert_eq!(s.shape(), &[1]);
        assert_eq!(s.get(&[0])?, 6.0);

        Ok(())
    }

    #[test]
    fn reduce_3d() -> Result<()> {
        let a = Array::from_iterable((0..24).map(f64::from), &[2, 3, 4], None)?;
        let m = a.max_axis(1)?;

        assert_eq!(m.shape(), &[2, 4]);
        assert_eq!(m.get(&[0, 0])?, 8.0);
        assert_eq!(m.get(&[1, 3])?, 23.0);
        assert_eq!(a.min_axis(2)?.get(&[1, 2])?, 20.0);

        Ok(())
    }

    #[test]
    fn mean_axis() -> Result<()> {
        let a = arange_i32(6).reshape(&[2, 3])?;
        let m = a.mean_axis(1)?;

        assert_eq!(m.dtype(), DType::Float64);
        assert_eq!(m.to_vec(), [1.0, 4.0]);
        assert_eq!(a.mean_axis(0)?.to_vec(), [1.5, 2.5, 3.5]);

        Ok(())
    }

    #[test]
    fn reduce_of_view() -> Result<()> {
        let a = arange_i32(6).reshape(&[2, 3])?.slice(s![.., ..;-1])?;

        assert_eq!(a.sum_axis(0)?.to_vec(), [7.0, 5.0, 3.0]);
        assert_eq!(a.max_axis(1)?.to_vec(), [2.0, 5.0]);

        Ok(())
    }

    #[test]
    fn prod() -> Result<()> {
        let a = Array::from_vec(vec![1, 2, 3, 4]).reshape(&[2, 2])?;
        let p0 = a.prod_axis(0)?;

        assert_eq!(a.prod(), 24.0);
        assert_eq!(p0.dtype(), DType::Int32);
        assert_eq!(p0.to_vec(), [3.0, 8.0]);
        assert_eq!(a.prod_axis(-1)?.to_vec(), [2.0, 12.0]);
        assert_eq!(Array::from_vec(Vec::<f64>::new()).prod(), 1.0);

        Ok(())
    }

    #[test]
    fn variance_and_stdev() {
        let a = Array::from_vec(vec![1, 2, 3, 4]);

        assert_relative_eq!(a.variance(), 1.25);
        assert_relative_eq!(a.stdev(), 1.25_f64.sqrt());
        assert_eq!(Array::from_vec(vec![5.0; 4]).variance(), 0.0);
        assert!(Array::from_vec(Vec::<f64>::new()).variance().is_nan());
    }

    #[test]
    fn variance_with_large_offset() {
        let a = Array::from_vec(vec![1e8 + 1.0, 1e8 + 2.0, 1e8 + 3.0, 1e8 + 4.0]);

        assert_relative_eq!(a.variance(), 1.25, epsilon = 1e-6);
    }

    #[test]
    fn variance_axis() -> Result<()> {
        let a = arange_i32(6).reshape(&[2, 3])?;
        let v1 = a.variance_axis(1)?;

        assert_eq!(v1.dtype(), DType::Float64);
        assert_relative_eq!(v1.get(&[0])?, 2.0 / 3.0);
        assert_relative_eq!(v1.get(&[1])?, 2.0 / 3.0);
        assert_eq!(a.variance_axis(0)?.to_vec(), [2.25, 2.25, 2.25]);
        assert_eq!(a.stdev_axis(0)?.to_vec(), [1.5, 1.5, 1.5]);

        Ok(())
    }

    #[test]
    fn cumsum() -> Result<()> {
        let a = arange_i32(6).reshape(&[2, 3])?;
        let c1 = a.cumsum(1, None)?;

        assert_eq!(c1.shape(), &[2, 3]);
        assert_eq!(c1.dtype(), DType::Int32);
        assert_eq!(c1.to_vec(), [0.0, 1.0, 3.0, 3.0, 7.0, 12.0]);
        assert_eq!(a.cumsum(0, None)?.to_vec(), [0.0, 1.0, 2.0, 3.0, 5.0, 7.0]);
        assert_eq!(a.cumsum(-1, None)?, c1);

        Ok(())
    }

    #[test]
    fn cumsum_of_view() -> Result<()> {
        let a = arange_i32(6).reshape(&[2, 3])?.slice(s![.., ..;-1])?;

        assert_eq!(a.cumsum(1, None)?.to_vec(), [2.0, 3.0, 3.0, 5.0, 9.0, 12.0]);

        Ok(())
    }

    #[test]
    fn cumsum_wraps_unless_widened() -> Result<()> {
        let a = Array::from_vec(vec![200_u8, 100]);

        assert_eq!(a.cumsum(0, None)?.to_vec(), [200.0, 44.0]);

        let wide = a.cumsum(0, Some(DType::Float64))?;

        assert_eq!(wide.dtype(), DType::Float64);
        assert_eq!(wide.to_vec(), [200.0, 300.0]);

        Ok(())
    }

    #[test]
    fn cumprod() -> Result<()> {
        let a = Array::from_vec(vec![1, 2, 3, 4]).reshape(&[2, 2])?;

        assert_eq!(a.cumprod(-1, None)?.to_vec(), [1.0, 2.0, 3.0, 12.0]);
        assert_eq!(a.cumprod(0, None)?.to_vec(), [1.0, 2.0, 3.0, 8.0]);
        assert!(a.cumprod(2, None).is_err());

        Ok(())
    }

    #[test]
    fn nonzero() -> Result<()> {
        let a = Array::from_vec(vec![0, 3, 0, 0, 5, 6]).reshape(&[2, 3])?;

        assert_eq!(a.nonzero(), [vec![0, 1], vec![1, 1], vec![1, 2]]);
        assert_eq!(a.transpose().nonzero(), [vec![1, 0], vec![1, 1], vec![2, 1]]);
        assert!(Array::zeros(&[3], None)?.nonzero().is_empty());

        Ok(())
    }

    #[test]
    fn reduce_invalid_axis() {
        let a = arange_i32(6).reshape(&[2, 3]).unwrap();

        assert!(matches!(
            a.sum_axis(2),
            Err(Error::Shape(ShapeError::IncompatibleAxis(_)))
        ));
        assert!(a.sum_axis(-3).is_err());
    }
}
