use serde::{Deserialize, Serialize};

use super::{iter::Indices, Array};
use crate::{DType, Error, Result};

/// Arbitrarily nested lists of numbers.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Nested {
    Scalar(f64),
    List(Vec<Nested>),
}

impl From<f64> for Nested {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<i32> for Nested {
    fn from(v: i32) -> Self {
        Self::Scalar(v.into())
    }
}

impl<T> From<Vec<T>> for Nested
where
    T: Into<Nested>,
{
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl Nested {
    /// Shape found by following the first element of every level.
    fn shape(&self) -> Vec<usize> {
        let mut shape = Vec::new();
        let mut level = self;
        while let Nested::List(items) = level {
            shape.push(items.len());
            match items.first() {
                Some(first) => level = first,
                None => break,
            }
        }
        if shape.is_empty() {
            shape.push(1);
        }
        shape
    }

    fn value_at(&self, coords: &[usize]) -> Result<f64> {
        let mut level = self;
        for (depth, &index) in coords.iter().enumerate() {
            level = match level {
                Nested::List(items) => items.get(index).ok_or_else(|| {
                    Error::BadData(format!(
                        "nested list at depth {depth} has no element {index}"
                    ))
                })?,
                Nested::Scalar(v) if coords.len() == 1 && depth == 0 => return Ok(*v),
                Nested::Scalar(_) => {
                    return Err(Error::BadData(format!(
                        "expected a list at depth {depth}, found a number"
                    )))
                }
            };
        }
        match level {
            Nested::Scalar(v) => Ok(*v),
            Nested::List(_) => Err(Error::BadData(format!(
                "expected a number at depth {}, found a list",
                coords.len()
            ))),
        }
    }
}

/// Plain-data form of an array.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ArrayData {
    pub data: Nested,
    pub shape: Vec<usize>,
    pub dtype: DType,
}

impl Array {
    /// Array from nested lists, shaped by the first element of each level.
    ///
    /// Uniformity is not checked up front; a missing element fails with
    /// [`Error::BadData`] while copying. A bare number gives shape `[1]`.
    pub fn from_nested(nested: &Nested, dtype: Option<DType>) -> Result<Self> {
        let shape = nested.shape();
        let values = Indices::over(&shape)
            .map(|coords| nested.value_at(&coords))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_index_order(values, &shape, dtype.unwrap_or_default()))
    }

    pub fn to_nested(&self) -> Nested {
        fn build(values: &mut impl Iterator<Item = f64>, shape: &[usize]) -> Nested {
            match shape {
                [] => Nested::Scalar(values.next().unwrap_or_default()),
                [dim, rest @ ..] => Nested::List((0..*dim).map(|_| build(values, rest)).collect()),
            }
        }

        build(&mut self.index_order_values(), &self.shape)
    }

    pub fn to_data(&self) -> ArrayData {
        ArrayData {
            data: self.to_nested(),
            shape: self.shape.clone(),
            dtype: self.dtype(),
        }
    }

    /// Rebuilds an array, reshaping when the nesting alone cannot express
    /// the declared shape (for example a zero-length axis).
    pub fn from_data(data: &ArrayData) -> Result<Self> {
        let array = Self::from_nested(&data.data, Some(data.dtype))?;
        if array.shape == data.shape {
            Ok(array)
        } else {
            array.reshape(&data.shape)
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_data())?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let data = serde_json::from_str::<ArrayData>(json)?;
        Self::from_data(&data)
    }
}
