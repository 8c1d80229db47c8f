use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("bad data: {0}")]
    BadData(String),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error("shape {shape:?} holds {expected} elements but {actual} were supplied")]
    MismatchedShapeSize {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },
    #[error("operand sizes differ: {lhs} != {rhs}")]
    MismatchedSizes { lhs: usize, rhs: usize },
    #[error("operand shapes are not aligned: {lhs:?} and {rhs:?}")]
    MismatchedShapes { lhs: Vec<usize>, rhs: Vec<usize> },
    #[error("index {index} is out of bounds for axis {axis} with size {dim}")]
    IndexOutOfBounds { index: isize, axis: usize, dim: usize },
    #[error("bad slice: {0}")]
    BadSlice(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ShapeError {
    #[error("operands cannot be broadcast together at axis {axis}: {lhs:?} and {rhs:?}")]
    Unbroadcastable {
        axis: usize,
        lhs: Vec<usize>,
        rhs: Vec<usize>,
    },
    #[error("{0}")]
    IncompatibleAxis(String),
    #[error("{0}")]
    IncompatibleShape(String),
}
