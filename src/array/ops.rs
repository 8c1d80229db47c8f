use core::{
    iter::FusedIterator,
    ops::{Add, Div, Mul, Neg, Rem, Sub},
};

use tracing::{debug, trace};

use super::{
    iter::{Indices, Values},
    Array,
};
use crate::{routine, DType, Result, ShapeError};

/// Two arrays stretched to a common shape.
#[derive(Clone, Debug)]
pub struct Broadcast {
    pub shape: Vec<usize>,
    /// Promotion of the operand dtypes.
    pub dtype: DType,
    pub pairs: Pairs,
}

/// `(lhs, rhs, coords)` triples over a broadcast shape, in index order.
#[derive(Clone, Debug)]
pub struct Pairs {
    lhs: Values,
    rhs: Values,
    indices: Indices,
}

impl Pairs {
    pub fn restart(&mut self) {
        self.lhs.restart();
        self.rhs.restart();
        self.indices.restart();
    }
}

impl ExactSizeIterator for Pairs {
    fn len(&self) -> usize {
        self.indices.len()
    }
}

impl FusedIterator for Pairs {}

impl Iterator for Pairs {
    type Item = (f64, f64, Vec<usize>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let coords = self.indices.next()?;
        let lhs = self.lhs.next()?;
        let rhs = self.rhs.next()?;
        Some((lhs, rhs, coords))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

#[inline]
fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

impl Array {
    /// Both operands stretched to their joint shape.
    fn broadcast_views(&self, rhs: &Array) -> Result<(Vec<usize>, Array, Array)> {
        let shape = routine::broadcast_shape(&self.shape, &rhs.shape).inspect_err(|e| {
            debug!(lhs = ?self.shape, rhs = ?rhs.shape, "{e}");
        })?;
        let lhs_view = self.broadcast_to(&shape)?;
        let rhs_view = rhs.broadcast_to(&shape)?;
        Ok((shape, lhs_view, rhs_view))
    }

    /// Pairs the elements of `self` and `rhs` over their broadcast shape.
    pub fn broadcast_pair(&self, rhs: &Array) -> Result<Broadcast> {
        let (shape, lhs_view, rhs_view) = self.broadcast_views(rhs)?;

        Ok(Broadcast {
            dtype: self.dtype().promote(rhs.dtype()),
            pairs: Pairs {
                lhs: lhs_view.index_order_values(),
                rhs: rhs_view.index_order_values(),
                indices: Indices::over(&shape),
            },
            shape,
        })
    }

    /// Applies `f` to every broadcast pair, producing a fresh array.
    ///
    /// The result has the promoted dtype of the operands unless `dtype`
    /// overrides it; every result of `f` is converted on write.
    pub fn binary_broadcast<F>(&self, rhs: &Array, mut f: F, dtype: Option<DType>) -> Result<Array>
    where
        F: FnMut(f64, f64) -> f64,
    {
        let (shape, lhs_view, rhs_view) = self.broadcast_views(rhs)?;
        let dtype = dtype.unwrap_or_else(|| self.dtype().promote(rhs.dtype()));
        trace!(lhs = ?self.shape, rhs = ?rhs.shape, out = ?shape, %dtype, "binary broadcast");

        let out = Array::allocate(&shape, dtype);
        let values = lhs_view
            .index_order_values()
            .zip(rhs_view.index_order_values());
        for (pos, (a, b)) in out.index_order_positions().zip(values) {
            out.storage.write(pos, f(a, b));
        }
        Ok(out)
    }

    /// Picks `on_true` where `condition` is nonzero and `on_false` elsewhere,
    /// broadcasting all three to their joint shape.
    ///
    /// The result has the promoted dtype of `on_true` and `on_false`.
    pub fn select(condition: &Array, on_true: &Array, on_false: &Array) -> Result<Array> {
        let (_, cond_view, true_view) = condition.broadcast_views(on_true)?;
        let (shape, cond_view, false_view) = cond_view.broadcast_views(on_false)?;
        let true_view = true_view.broadcast_to(&shape)?;
        let dtype = on_true.dtype().promote(on_false.dtype());
        trace!(out = ?shape, %dtype, "select");

        let out = Array::allocate(&shape, dtype);
        let values = cond_view
            .index_order_values()
            .zip(true_view.index_order_values().zip(false_view.index_order_values()));
        for (pos, (c, (t, f))) in out.index_order_positions().zip(values) {
            out.storage.write(pos, if c != 0.0 { t } else { f });
        }
        Ok(out)
    }

    /// Copy keeping the elements whose last two coordinates satisfy `keep`,
    /// zero elsewhere.
    fn keep_triangle<F>(&self, keep: F) -> Result<Array>
    where
        F: Fn(usize, usize) -> bool,
    {
        let n_dims = self.ndims();
        if n_dims < 2 {
            return Err(ShapeError::IncompatibleShape(format!(
                "triangle needs at least 2 axes, got shape {:?}",
                self.shape
            ))
            .into());
        }

        let out = Array::allocate(&self.shape, self.dtype());
        let mut indices = self.indices();
        let mut values = self.index_order_values().zip(out.index_order_positions());
        while let (Some(coords), Some((value, pos))) = (indices.next_slice(), values.next()) {
            if keep(coords[n_dims - 2], coords[n_dims - 1]) {
                out.storage.write(pos, value);
            }
        }
        Ok(out)
    }

    /// Upper triangle over the last two axes, including the diagonal.
    pub fn triu(&self) -> Result<Array> {
        self.keep_triangle(|row, col| row <= col)
    }

    /// Lower triangle over the last two axes, including the diagonal.
    pub fn tril(&self) -> Result<Array> {
        self.keep_triangle(|row, col| row >= col)
    }

    /// Applies `f` to every element; the result keeps this array's dtype
    /// unless `dtype` is given.
    pub fn map<F>(&self, f: F, dtype: Option<DType>) -> Array
    where
        F: FnMut(f64) -> f64,
    {
        let dtype = dtype.unwrap_or_else(|| self.dtype());
        Array::from_index_order(self.index_order_values().map(f), &self.shape, dtype)
    }

    /// Limits every element to `lo..=hi`.
    pub fn clip(&self, lo: f64, hi: f64) -> Array {
        self.map(|x| x.max(lo).min(hi), None)
    }

    /// Elementwise `|a - b| <= abs_tol + rel_tol * |b|`, as `Uint8` flags.
    pub fn is_close(&self, rhs: &Array, rel_tol: f64, abs_tol: f64) -> Result<Array> {
        self.binary_broadcast(
            rhs,
            |a, b| flag((a - b).abs() <= abs_tol + rel_tol * b.abs()),
            Some(DType::Uint8),
        )
    }

    /// [`Array::is_close`] with `rel_tol = 1e-5` and `abs_tol = 1e-8`.
    pub fn all_close(&self, rhs: &Array) -> Result<bool> {
        Ok(self
            .is_close(rhs, 1e-5, 1e-8)?
            .index_order_values()
            .all(|x| x != 0.0))
    }
}

macro_rules! impl_elementwise {
    ($( $(#[$meta:meta])* $name:ident($dtype:expr) => $f:expr; )*) => {
        #[allow(clippy::should_implement_trait)]
        impl Array {
            $(
                $(#[$meta])*
                pub fn $name(&self, rhs: &Array) -> Result<Array> {
                    self.binary_broadcast(rhs, $f, $dtype)
                }
            )*
        }
    };
}

impl_elementwise! {
    add(None) => |a, b| a + b;
    sub(None) => |a, b| a - b;
    mul(None) => |a, b| a * b;
    /// True division; always `Float64`.
    div(Some(DType::Float64)) => |a, b| a / b;
    /// Always `Float64`.
    pow(Some(DType::Float64)) => f64::powf;
    /// Remainder with the sign of the dividend.
    rem(None) => |a, b| a % b;
    /// Quotient rounded toward negative infinity.
    fdiv(None) => |a, b| (a / b).floor();
    /// Quotient rounded toward positive infinity.
    cdiv(None) => |a, b| (a / b).ceil();
    less(Some(DType::Uint8)) => |a, b| flag(a < b);
    greater(Some(DType::Uint8)) => |a, b| flag(a > b);
    less_equal(Some(DType::Uint8)) => |a, b| flag(a <= b);
    greater_equal(Some(DType::Uint8)) => |a, b| flag(a >= b);
    equal(Some(DType::Uint8)) => |a, b| flag(a == b);
    not_equal(Some(DType::Uint8)) => |a, b| flag(a != b);
    /// Elementwise maximum; NaN wins.
    take_max(None) => |a: f64, b: f64| if a.is_nan() || b.is_nan() { f64::NAN } else { a.max(b) };
    /// Elementwise minimum; NaN wins.
    take_min(None) => |a: f64, b: f64| if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) };
}

macro_rules! impl_binary_op {
    ($trait:ident, $op:ident) => {
        impl $trait<&Array> for &Array {
            type Output = Result<Array>;

            fn $op(self, rhs: &Array) -> Self::Output {
                Array::$op(self, rhs)
            }
        }

        impl $trait<f64> for &Array {
            type Output = Array;

            fn $op(self, rhs: f64) -> Self::Output {
                self.map(|x| $trait::$op(x, rhs), Some(DType::Float64))
            }
        }

        impl $trait<&Array> for f64 {
            type Output = Array;

            fn $op(self, rhs: &Array) -> Self::Output {
                rhs.map(|x| $trait::$op(self, x), Some(DType::Float64))
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Div, div);
impl_binary_op!(Mul, mul);
impl_binary_op!(Rem, rem);
impl_binary_op!(Sub, sub);

impl Neg for &Array {
    type Output = Array;

    fn neg(self) -> Self::Output {
        self.map(|x| -x, None)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::{s, Array, DType, Error, Result, ShapeError};

    fn arange_f64(n: usize) -> Array {
        Array::from_vec((0..n).map(|x| x as f64).collect())
    }

    #[test]
    fn broadcast_pair() -> Result<()> {
        let a = arange_f64(6).reshape(&[2, 3])?;
        let b = Array::from_vec(vec![10.0, 20.0, 30.0]);
        let broadcast = a.broadcast_pair(&b)?;

        assert_eq!(broadcast.shape, [2, 3]);
        assert_eq!(broadcast.dtype, DType::Float64);
        assert_eq!(broadcast.pairs.len(), 6);

        let pairs = broadcast.pairs.collect::<Vec<_>>();

        assert_eq!(pairs[0], (0.0, 10.0, vec![0, 0]));
        assert_eq!(pairs[4], (4.0, 20.0, vec![1, 1]));
        assert_eq!(pairs[5], (5.0, 30.0, vec![1, 2]));

        Ok(())
    }

    #[test]
    fn broadcast_pair_replays_unit_axes() -> Result<()> {
        let col = arange_f64(2).reshape(&[2, 1])?;
        let row = arange_f64(3).reshape(&[1, 3])?;
        let mut pairs = col.broadcast_pair(&row)?.pairs;
        let lhs = pairs.by_ref().map(|(l, _, _)| l).collect::<Vec<_>>();

        assert_eq!(lhs, [0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        assert_eq!(pairs.next(), None);

        pairs.restart();
        let rhs = pairs.map(|(_, r, _)| r).collect::<Vec<_>>();

        assert_eq!(rhs, [0.0, 1.0, 2.0, 0.0, 1.0, 2.0]);

        Ok(())
    }

    #[test]
    fn unbroadcastable() {
        let a = arange_f64(6).reshape(&[2, 3]).unwrap();
        let b = arange_f64(4);

        assert!(matches!(
            a.add(&b),
            Err(Error::Shape(ShapeError::Unbroadcastable { axis: 1, .. }))
        ));
    }

    #[test]
    fn arithmetic_keeps_promoted_dtype() -> Result<()> {
        let a = Array::from_vec(vec![1, 2, 3]);
        let b = Array::from_vec(vec![10, 20, 30]);
        let sum = a.add(&b)?;

        assert_eq!(sum.dtype(), DType::Int32);
        assert_eq!(sum.to_vec(), [11.0, 22.0, 33.0]);
        assert_eq!(b.sub(&a)?.to_vec(), [9.0, 18.0, 27.0]);
        assert_eq!(a.mul(&b)?.to_vec(), [10.0, 40.0, 90.0]);

        let c = Array::from_vec(vec![100_i8, -100]);
        let d = Array::from_vec(vec![200_u8, 200]);
        let mixed = c.add(&d)?;

        assert_eq!(mixed.dtype(), DType::Int16);
        assert_eq!(mixed.to_vec(), [300.0, 100.0]);

        Ok(())
    }

    #[test]
    fn arithmetic_wraps_in_narrow_dtypes() -> Result<()> {
        let a = Array::from_vec(vec![200_u8]);
        let sum = a.add(&a)?;

        assert_eq!(sum.dtype(), DType::Uint8);
        assert_eq!(sum.to_vec(), [144.0]);

        Ok(())
    }

    #[test]
    fn division_variants() -> Result<()> {
        let a = Array::from_vec(vec![7, -7]);
        let b = Array::from_vec(vec![2, 2]);
        let q = a.div(&b)?;

        assert_eq!(q.dtype(), DType::Float64);
        assert_eq!(q.to_vec(), [3.5, -3.5]);
        assert_eq!(a.fdiv(&b)?.to_vec(), [3.0, -4.0]);
        assert_eq!(a.cdiv(&b)?.to_vec(), [4.0, -3.0]);
        assert_eq!(a.rem(&b)?.to_vec(), [1.0, -1.0]);
        assert_eq!(a.fdiv(&b)?.dtype(), DType::Int32);

        Ok(())
    }

    #[test]
    fn pow() -> Result<()> {
        let base = Array::from_vec(vec![2, 3, 4]);
        let exp = Array::from_vec(vec![0.5]);
        let p = base.pow(&exp)?;

        assert_eq!(p.dtype(), DType::Float64);
        assert_abs_diff_eq!(p.get(&[0])?, 2_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(p.get(&[2])?, 2.0, epsilon = 1e-12);

        Ok(())
    }

    #[test]
    fn comparisons() -> Result<()> {
        let a = Array::from_vec(vec![1.0, 2.0, 3.0]);
        let b = Array::from_vec(vec![2.0]);

        assert_eq!(a.less(&b)?.dtype(), DType::Uint8);
        assert_eq!(a.less(&b)?.to_vec(), [1.0, 0.0, 0.0]);
        assert_eq!(a.greater(&b)?.to_vec(), [0.0, 0.0, 1.0]);
        assert_eq!(a.less_equal(&b)?.to_vec(), [1.0, 1.0, 0.0]);
        assert_eq!(a.greater_equal(&b)?.to_vec(), [0.0, 1.0, 1.0]);
        assert_eq!(a.equal(&b)?.to_vec(), [0.0, 1.0, 0.0]);
        assert_eq!(a.not_equal(&b)?.to_vec(), [1.0, 0.0, 1.0]);

        Ok(())
    }

    #[test]
    fn take_max_and_min() -> Result<()> {
        let a = Array::from_vec(vec![1.0, 5.0, f64::NAN]);
        let b = Array::from_vec(vec![3.0, 2.0, 0.0]);
        let max = a.take_max(&b)?;
        let min = a.take_min(&b)?;

        assert_eq!(max.to_vec()[..2], [3.0, 5.0]);
        assert!(max.get(&[2])?.is_nan());
        assert_eq!(min.to_vec()[..2], [1.0, 2.0]);
        assert!(min.get(&[2])?.is_nan());

        Ok(())
    }

    #[test]
    fn is_close() -> Result<()> {
        let a = Array::from_vec(vec![1.0, 1.0 + 1e-9, 1.1]);
        let b = Array::from_vec(vec![1.0]);
        let close = a.is_close(&b, 1e-5, 1e-8)?;

        assert_eq!(close.dtype(), DType::Uint8);
        assert_eq!(close.to_vec(), [1.0, 1.0, 0.0]);
        assert!(!a.all_close(&b)?);
        assert!(a.slice(crate::s![..2])?.all_close(&b)?);

        Ok(())
    }

    #[test]
    fn map_and_clip() -> Result<()> {
        let a = Array::from_vec(vec![-2, 0, 7]);

        assert_eq!(a.map(|x| x * 3.0, None).to_vec(), [-6.0, 0.0, 21.0]);
        assert_eq!(a.map(|x| x / 2.0, None).to_vec(), [-1.0, 0.0, 3.0]);
        assert_eq!(a.clip(-1.0, 5.0).to_vec(), [-1.0, 0.0, 5.0]);
        assert_eq!(a.clip(-1.0, 5.0).dtype(), DType::Int32);

        Ok(())
    }

    #[test]
    fn binary_ops() -> Result<()> {
        let a3 = arange_f64(24).reshape(&[2, 3, 4])?;
        let b3 = Array::from_iterable((10..34).map(f64::from), &[2, 3, 4], None)?;
        {
            let subject = (&a3 + &b3)?;

            assert_eq!(subject.len(), 24);
            for (i, (actual, expected)) in subject
                .index_order_values()
                .zip((10..).step_by(2).map(f64::from))
                .enumerate()
            {
                assert_eq!(actual, expected, "{}th element is not equal", i);
            }
        }
        {
            let subject = (&b3 - &a3)?;

            assert!(subject.index_order_values().all(|x| x == 10.0));
        }
        {
            let subject = &a3 + 3.0;

            for (i, (actual, expected)) in subject
                .index_order_values()
                .zip((3..).map(f64::from))
                .enumerate()
            {
                assert_eq!(actual, expected, "{}th element is not equal", i);
            }
        }
        {
            let subject = 1.0 - &a3;

            assert_eq!(subject.get(&[0, 0, 1])?, 0.0);
            assert_eq!(subject.get(&[1, 2, 3])?, -22.0);
        }
        {
            let subject = (&a3 * &b3.slice(crate::s![0, 0])?)?;

            assert_eq!(subject.shape(), &[2, 3, 4]);
            assert_eq!(subject.get(&[1, 0, 1])?, 13.0 * 11.0);
        }

        Ok(())
    }

    #[test]
    fn scalar_ops_produce_float64() -> Result<()> {
        let a = Array::from_vec(vec![1_u8, 2, 3]);

        assert_eq!((&a / 2.0).dtype(), DType::Float64);
        assert_eq!((&a / 2.0).to_vec(), [0.5, 1.0, 1.5]);
        assert_eq!((&a % 2.0).to_vec(), [1.0, 0.0, 1.0]);
        assert_eq!((2.0 * &a).to_vec(), [2.0, 4.0, 6.0]);
        assert_eq!((-&a).to_vec(), [255.0, 254.0, 253.0]);

        Ok(())
    }

    #[test]
    fn broadcast_is_symmetric_in_shape() -> Result<()> {
        let a = arange_f64(3).reshape(&[3, 1])?;
        let b = arange_f64(4).reshape(&[1, 4])?;
        let ab = a.binary_broadcast(&b, |x, y| x - y, None)?;
        let ba = b.binary_broadcast(&a, |y, x| x - y, None)?;

        assert_eq!(ab.shape(), ba.shape());
        assert_eq!(ab, ba);

        Ok(())
    }

    #[test]
    fn broadcast_over_reversed_view() -> Result<()> {
        let a = arange_f64(6).reshape(&[2, 3])?.slice(s![..;-1, ..;2])?;
        let b = Array::from_vec(vec![10.0, 100.0]);
        let sum = a.add(&b)?;

        assert_eq!(sum.shape(), &[2, 2]);
        assert_eq!(sum.to_vec(), [13.0, 105.0, 10.0, 102.0]);
        assert_eq!(a.to_vec(), [3.0, 5.0, 0.0, 2.0]);

        Ok(())
    }

    #[test]
    fn select() -> Result<()> {
        let cond = Array::from_vec(vec![1_u8, 0, 1]);
        let on_true = arange_f64(6).reshape(&[2, 3])?;
        let on_false = Array::from_vec(vec![-1, -2]).reshape(&[2, 1])?;
        let picked = Array::select(&cond, &on_true, &on_false)?;

        assert_eq!(picked.shape(), &[2, 3]);
        assert_eq!(picked.dtype(), DType::Float64);
        assert_eq!(picked.to_vec(), [0.0, -1.0, 2.0, 3.0, -2.0, 5.0]);

        Ok(())
    }

    #[test]
    fn select_keeps_promoted_dtype() -> Result<()> {
        let cond = Array::from_vec(vec![0.0, 2.5]);
        let picked = Array::select(
            &cond,
            &Array::from_vec(vec![7_u8]),
            &Array::from_vec(vec![1, 2]),
        )?;

        assert_eq!(picked.dtype(), DType::Int32);
        assert_eq!(picked.to_vec(), [1.0, 7.0]);
        assert!(matches!(
            Array::select(&cond, &arange_f64(3), &arange_f64(2)),
            Err(Error::Shape(ShapeError::Unbroadcastable { .. }))
        ));

        Ok(())
    }

    #[test]
    fn triangles() -> Result<()> {
        let a = Array::from_iterable((1..=9).map(f64::from), &[3, 3], Some(DType::Int32))?;
        let upper = a.triu()?;

        assert_eq!(upper.dtype(), DType::Int32);
        assert_eq!(upper.to_vec(), [1.0, 2.0, 3.0, 0.0, 5.0, 6.0, 0.0, 0.0, 9.0]);
        assert_eq!(a.tril()?.to_vec(), [1.0, 0.0, 0.0, 4.0, 5.0, 0.0, 7.0, 8.0, 9.0]);
        assert_eq!(a.transpose().triu()?, a.tril()?.transpose());

        Ok(())
    }

    #[test]
    fn triangles_over_last_axes() -> Result<()> {
        let a = Array::ones(&[2, 2, 3], None)?;
        let upper = a.triu()?;

        assert_eq!(upper.shape(), &[2, 2, 3]);
        assert_eq!(upper.sum(), 10.0);
        assert_eq!(upper.slice(s![1])?.to_vec(), [1.0, 1.0, 1.0, 0.0, 1.0, 1.0]);
        assert!(matches!(
            arange_f64(3).tril(),
            Err(Error::Shape(ShapeError::IncompatibleShape(_)))
        ));

        Ok(())
    }
}
