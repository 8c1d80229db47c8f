//! Pure functions relating shapes, strides and flat buffer positions.
//!
//! Buffers are laid out first-axis-major: axis 0 varies fastest in memory.

use crate::{Result, ShapeError};

/// Number of elements held by `shape`.
///
/// A shape with no axes is rejected; the minimum supported rank is 1.
pub fn size(shape: &[usize]) -> Result<usize> {
    if shape.is_empty() {
        return Err(ShapeError::IncompatibleShape("shape must have at least one axis".into()).into());
    }
    Ok(shape.iter().product())
}

/// Default strides for a dense buffer of `shape`.
pub fn stride_from_shape(shape: &[usize]) -> Vec<isize> {
    let mut strides = vec![0_isize; shape.len()];
    strides
        .iter_mut()
        .zip(shape.iter())
        .fold(1_isize, |acc, (stride, &dim)| {
            *stride = acc;
            acc * dim as isize
        });
    strides
}

/// Flat position of `coords`. Callers validate the coordinates beforehand.
#[inline]
pub fn flat_index(coords: &[usize], strides: &[isize], offset: usize) -> usize {
    debug_assert_eq!(coords.len(), strides.len());

    let pos = coords
        .iter()
        .zip(strides)
        .fold(offset as isize, |acc, (&index, &stride)| {
            acc + index as isize * stride
        });
    debug_assert!(pos >= 0);
    pos as usize
}

/// Whether `strides` describe exactly the dense first-axis-major layout of `shape`.
pub fn is_contiguous(shape: &[usize], strides: &[isize]) -> bool {
    let len = shape.iter().product::<usize>();
    if len == 0 || len == 1 {
        return true;
    }

    let mut stride_expected = 1_usize;
    for (&dim, &stride) in shape.iter().zip(strides) {
        if dim == 1 {
            continue;
        }
        if stride != stride_expected as isize {
            return false;
        }
        stride_expected *= dim;
    }

    true
}
