mod shared;
pub use shared::Storage;

use crate::DType;

/// Flat typed element block backing one or more arrays.
#[derive(Clone, Debug, PartialEq)]
pub enum RawBuffer {
    Int8(Vec<i8>),
    Uint8(Vec<u8>),
    Uint8Clamped(Vec<u8>),
    Int16(Vec<i16>),
    Uint16(Vec<u16>),
    Int32(Vec<i32>),
    Uint32(Vec<u32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

macro_rules! dispatch {
    ($buf:expr, $v:ident => $body:expr) => {
        match $buf {
            RawBuffer::Int8($v) => $body,
            RawBuffer::Uint8($v) => $body,
            RawBuffer::Uint8Clamped($v) => $body,
            RawBuffer::Int16($v) => $body,
            RawBuffer::Uint16($v) => $body,
            RawBuffer::Int32($v) => $body,
            RawBuffer::Uint32($v) => $body,
            RawBuffer::Float32($v) => $body,
            RawBuffer::Float64($v) => $body,
        }
    };
}

impl RawBuffer {
    /// Allocates `len` elements of `dtype`, all set to `value`.
    pub fn filled(dtype: DType, len: usize, value: f64) -> Self {
        let value = dtype.cast(value);
        match dtype {
            DType::Int8 => Self::Int8(vec![value as i8; len]),
            DType::Uint8 => Self::Uint8(vec![value as u8; len]),
            DType::Uint8Clamped => Self::Uint8Clamped(vec![value as u8; len]),
            DType::Int16 => Self::Int16(vec![value as i16; len]),
            DType::Uint16 => Self::Uint16(vec![value as u16; len]),
            DType::Int32 => Self::Int32(vec![value as i32; len]),
            DType::Uint32 => Self::Uint32(vec![value as u32; len]),
            DType::Float32 => Self::Float32(vec![value as f32; len]),
            DType::Float64 => Self::Float64(vec![value; len]),
        }
    }

    /// Collects `values` into a buffer of `dtype`, converting each one.
    pub fn from_values<I>(dtype: DType, values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values.into_iter().map(|v| dtype.cast(v));
        match dtype {
            DType::Int8 => Self::Int8(values.map(|v| v as i8).collect()),
            DType::Uint8 => Self::Uint8(values.map(|v| v as u8).collect()),
            DType::Uint8Clamped => Self::Uint8Clamped(values.map(|v| v as u8).collect()),
            DType::Int16 => Self::Int16(values.map(|v| v as i16).collect()),
            DType::Uint16 => Self::Uint16(values.map(|v| v as u16).collect()),
            DType::Int32 => Self::Int32(values.map(|v| v as i32).collect()),
            DType::Uint32 => Self::Uint32(values.map(|v| v as u32).collect()),
            DType::Float32 => Self::Float32(values.map(|v| v as f32).collect()),
            DType::Float64 => Self::Float64(values.collect()),
        }
    }

    pub fn dtype(&self) -> DType {
        match self {
            Self::Int8(_) => DType::Int8,
            Self::Uint8(_) => DType::Uint8,
            Self::Uint8Clamped(_) => DType::Uint8Clamped,
            Self::Int16(_) => DType::Int16,
            Self::Uint16(_) => DType::Uint16,
            Self::Int32(_) => DType::Int32,
            Self::Uint32(_) => DType::Uint32,
            Self::Float32(_) => DType::Float32,
            Self::Float64(_) => DType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        dispatch!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn byte_len(&self) -> usize {
        self.len() * self.dtype().byte_width()
    }

    /// Reads the element at `pos`, widened to `f64`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of bounds.
    pub fn get(&self, pos: usize) -> f64 {
        dispatch!(self, v => v[pos] as f64)
    }

    /// Writes `value` at `pos` using the dtype's conversion rule.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of bounds.
    pub fn set(&mut self, pos: usize, value: f64) {
        let value = self.dtype().cast(value);
        match self {
            Self::Int8(v) => v[pos] = value as i8,
            Self::Uint8(v) | Self::Uint8Clamped(v) => v[pos] = value as u8,
            Self::Int16(v) => v[pos] = value as i16,
            Self::Uint16(v) => v[pos] = value as u16,
            Self::Int32(v) => v[pos] = value as i32,
            Self::Uint32(v) => v[pos] = value as u32,
            Self::Float32(v) => v[pos] = value as f32,
            Self::Float64(v) => v[pos] = value,
        }
    }

    /// Reinterprets a `Uint8` buffer as clamped, or returns the buffer unchanged.
    pub(crate) fn into_clamped(self) -> Self {
        match self {
            Self::Uint8(v) => Self::Uint8Clamped(v),
            other => other,
        }
    }
}
