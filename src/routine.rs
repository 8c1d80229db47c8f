use crate::{Result, ShapeError};

/// Joint shape of two operands under right-aligned broadcasting.
///
/// Aligned axes must be equal or one of them must be 1; missing leading axes
/// count as 1. The failing axis is reported as a position in the result.
pub fn broadcast_shape(lhs_shape: &[usize], rhs_shape: &[usize]) -> Result<Vec<usize>> {
    let lhs_n_dims = lhs_shape.len();
    let rhs_n_dims = rhs_shape.len();
    let n_dims = lhs_n_dims.max(rhs_n_dims);
    let mut ret = vec![0_usize; n_dims];

    let mut compose_shape = |long: &[usize], short: &[usize], diff: usize| -> Result<()> {
        ret[..diff].copy_from_slice(&long[..diff]);
        for (axis, (l, s)) in long.iter().skip(diff).zip(short).enumerate() {
            ret[axis + diff] = if l == s || *s == 1 {
                *l
            } else if *l == 1 {
                *s
            } else {
                return Err(ShapeError::Unbroadcastable {
                    axis: axis + diff,
                    lhs: lhs_shape.to_vec(),
                    rhs: rhs_shape.to_vec(),
                }
                .into());
            };
        }
        Ok(())
    };

    if lhs_n_dims > rhs_n_dims {
        compose_shape(lhs_shape, rhs_shape, lhs_n_dims - rhs_n_dims)?;
    } else {
        compose_shape(rhs_shape, lhs_shape, rhs_n_dims - lhs_n_dims)?;
    }

    Ok(ret)
}
