use core::fmt;

use super::Array;
use crate::{s, DType};

const NUM_EDGE_ELEMENTS: usize = 3;
const TRUNCATION_THRESHOLD: usize = 1_000;

struct FormatOption {
    num_edge_elements: usize,
}

impl Default for FormatOption {
    fn default() -> Self {
        Self {
            num_edge_elements: NUM_EDGE_ELEMENTS,
        }
    }
}

impl FormatOption {
    fn new(array_len: usize, truncate: bool) -> Self {
        Self::default().without_truncation(truncate || array_len < TRUNCATION_THRESHOLD)
    }

    fn without_truncation(mut self, valid: bool) -> Self {
        if valid {
            self.num_edge_elements = usize::MAX / 2;
        }
        self
    }
}

fn format_elem(value: f64, dtype: DType, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if dtype.is_integer() {
        write!(f, "{value}")
    } else {
        write!(f, "{value:?}")
    }
}

fn format_item(
    array: &Array,
    index: isize,
    indent: usize,
    option: &FormatOption,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    if array.ndims() == 1 {
        let value = array.get(&[index]).map_err(|_| fmt::Error)?;
        format_elem(value, array.dtype(), f)
    } else {
        let sub = array.slice(s![index]).map_err(|_| fmt::Error)?;
        format_array(&sub, indent + 1, option, f)
    }
}

fn format_array(
    array: &Array,
    indent: usize,
    option: &FormatOption,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let n_dims = array.ndims();
    if array.is_empty() {
        write!(f, "{}{}", "[".repeat(n_dims), "]".repeat(n_dims))?;
        return Ok(());
    }

    f.write_str("[")?;
    let len = array.shape[0];
    if len > option.num_edge_elements * 2 {
        for i in 0..option.num_edge_elements {
            fmt_indent(i, n_dims, indent, f)?;
            format_item(array, i as isize, indent, option, f)?;
        }
        fmt_indent(1, n_dims, indent, f)?;
        f.write_str("...")?;
        fmt_indent(1, n_dims, indent, f)?;
        for i in 0..option.num_edge_elements {
            fmt_indent(i, n_dims, indent, f)?;
            let index = i as isize - option.num_edge_elements as isize;
            format_item(array, index, indent, option, f)?;
        }
    } else {
        for i in 0..len {
            fmt_indent(i, n_dims, indent, f)?;
            format_item(array, i as isize, indent, option, f)?;
        }
    }
    f.write_str("]")?;

    Ok(())
}

fn fmt_indent(i: usize, n_dims: usize, indent: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if i != 0 {
        f.write_str(",")?;
        if n_dims > 1 {
            write!(f, "{}", "\n".repeat(n_dims - 1))?;
            write!(f, "{}", " ".repeat(indent))?;
        } else {
            f.write_str(" ")?;
        }
    }
    Ok(())
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let option = FormatOption::new(self.len(), f.alternate());
        format_array(self, 1, &option, f)?;
        write!(
            f,
            ", shape={:?}, strides={:?}, offset={}, dtype={}",
            self.shape,
            self.strides,
            self.offset,
            self.dtype(),
        )?;
        Ok(())
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let option = FormatOption::new(self.len(), f.alternate());
        format_array(self, 1, &option, f)?;
        Ok(())
    }
}
