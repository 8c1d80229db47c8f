use crate::{Result, ShapeError};

/// Resolves an axis number, negative ones counting back from `n_dims`.
pub(crate) fn normalize_axis(axis: isize, n_dims: usize) -> Result<usize> {
    let resolved = if axis < 0 { axis + n_dims as isize } else { axis };
    usize::try_from(resolved)
        .ok()
        .filter(|&resolved| resolved < n_dims)
        .ok_or_else(|| {
            ShapeError::IncompatibleAxis(format!(
                "axis {axis} does not exist in an array of rank {n_dims}"
            ))
            .into()
        })
}
