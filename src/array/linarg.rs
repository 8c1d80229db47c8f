use tracing::trace;

use super::{iter::Indices, Array};
use crate::{routine, s, shape, ArrayIndex, DType, Dot, Error, Result, SliceInfo};

impl Dot<&Array> for Array {
    type Output = Result<f64>;

    /// Sum of the pairwise products of the index-order values.
    fn dot(&self, rhs: &Array) -> Self::Output {
        if self.len() != rhs.len() {
            return Err(Error::MismatchedSizes {
                lhs: self.len(),
                rhs: rhs.len(),
            });
        }

        Ok(self
            .index_order_values()
            .zip(rhs.index_order_values())
            .map(|(a, b)| a * b)
            .sum())
    }
}

impl Array {
    /// Matrix product of two rank-2 arrays, as `Float64`.
    pub fn matmul_2d(&self, rhs: &Array) -> Result<Array> {
        if self.ndims() != 2 || rhs.ndims() != 2 || self.shape[1] != rhs.shape[0] {
            return Err(Error::MismatchedShapes {
                lhs: self.shape.clone(),
                rhs: rhs.shape.clone(),
            });
        }

        let (n_rows, n_cols) = (self.shape[0], rhs.shape[1]);
        let out = Array::allocate(&[n_rows, n_cols], DType::Float64);
        for i in 0..n_rows {
            let row = self.slice(s![i as isize])?;
            for j in 0..n_cols {
                let col = rhs.slice(s![.., j as isize])?;
                out.storage
                    .write(shape::flat_index(&[i, j], &out.strides, 0), row.dot(&col)?);
            }
        }
        Ok(out)
    }

    /// Matrix product over the last two axes, broadcasting the leading ones.
    pub fn broadcast_matmul(&self, rhs: &Array) -> Result<Array> {
        let (lhs_n_dims, rhs_n_dims) = (self.ndims(), rhs.ndims());
        if lhs_n_dims < 2
            || rhs_n_dims < 2
            || self.shape[lhs_n_dims - 1] != rhs.shape[rhs_n_dims - 2]
        {
            return Err(Error::MismatchedShapes {
                lhs: self.shape.clone(),
                rhs: rhs.shape.clone(),
            });
        }

        if lhs_n_dims == 2 && rhs_n_dims == 2 {
            return self.matmul_2d(rhs);
        }

        let lead = routine::broadcast_shape(
            &self.shape[..lhs_n_dims - 2],
            &rhs.shape[..rhs_n_dims - 2],
        )?;
        let (n_rows, n_inner, n_cols) = (
            self.shape[lhs_n_dims - 2],
            self.shape[lhs_n_dims - 1],
            rhs.shape[rhs_n_dims - 1],
        );
        let lhs = self.broadcast_to(&[&lead[..], &[n_rows, n_inner]].concat())?;
        let rhs = rhs.broadcast_to(&[&lead[..], &[n_inner, n_cols]].concat())?;
        let out = Array::allocate(&[&lead[..], &[n_rows, n_cols]].concat(), DType::Float64);
        trace!(lhs = ?lhs.shape, rhs = ?rhs.shape, out = ?out.shape, "broadcast matmul");

        for coords in Indices::over(&lead) {
            let info = SliceInfo::from(
                coords
                    .iter()
                    .map(|&c| ArrayIndex::Index(c as isize))
                    .collect::<Vec<_>>(),
            );
            let batch = lhs.slice(&info)?.matmul_2d(&rhs.slice(&info)?)?;
            out.set(&batch, &info)?;
        }
        Ok(out)
    }
}
