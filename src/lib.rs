//! N-dimensional numeric arrays over shared, typed buffers.
//!
//! An [`Array`] is a view: a shape, per-axis strides and an offset into a
//! flat buffer whose element type is chosen at run time by a [`DType`].
//! Slicing and broadcasting create further views over the same buffer
//! without copying; reshaping, transposing and arithmetic produce fresh
//! arrays.
//!
//! ```
//! use kasane::{s, Array};
//!
//! let a = Array::arange(16).reshape(&[4, 4])?;
//! let block = a.slice(s![0..2, 1..3])?;
//! assert_eq!(block.to_vec(), [1.0, 2.0, 5.0, 6.0]);
//! # Ok::<(), kasane::Error>(())
//! ```

mod array;
pub use array::{
    Array, ArrayData, ArrayOptions, Broadcast, Indices, Nested, Operand, Pairs, Positions,
    Region, Values,
};

mod array_index;
pub use array_index::ArrayIndex;

mod dtype;
pub use dtype::{DType, Element};

mod error;
pub use error::{Error, Result, ShapeError};

mod linalg;
pub use linalg::Dot;

mod order;
pub use order::{AxisWalk, DataOrder, IndexOrder, Order};

mod routine;
pub use routine::broadcast_shape;

mod slice;
pub use slice::Slice;

mod slice_info;
pub use slice_info::SliceInfo;

pub mod shape;

pub mod storage;
