//! Element types and the rules for combining them.

use core::{fmt, str::FromStr};

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::{storage::RawBuffer, Error};

/// Tag selecting the element width and write semantics of a buffer.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum DType {
    #[serde(rename = "int8")]
    Int8,
    #[serde(rename = "uint8")]
    Uint8,
    /// Unsigned 8-bit integer that clamps instead of wrapping.
    #[serde(rename = "uint8c")]
    Uint8Clamped,
    #[serde(rename = "int16")]
    Int16,
    #[serde(rename = "uint16")]
    Uint16,
    #[serde(rename = "int32")]
    Int32,
    #[serde(rename = "uint32")]
    Uint32,
    #[serde(rename = "float32")]
    Float32,
    #[serde(rename = "float64")]
    #[default]
    Float64,
}

impl DType {
    pub const ALL: [DType; 9] = [
        DType::Int8,
        DType::Uint8,
        DType::Uint8Clamped,
        DType::Int16,
        DType::Uint16,
        DType::Int32,
        DType::Uint32,
        DType::Float32,
        DType::Float64,
    ];

    #[inline]
    pub const fn byte_width(self) -> usize {
        match self {
            DType::Int8 | DType::Uint8 | DType::Uint8Clamped => 1,
            DType::Int16 | DType::Uint16 => 2,
            DType::Int32 | DType::Uint32 | DType::Float32 => 4,
            DType::Float64 => 8,
        }
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.byte_width() as u32 * 8
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    #[inline]
    pub const fn is_integer(self) -> bool {
        !self.is_float()
    }

    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            DType::Int8 | DType::Int16 | DType::Int32 | DType::Float32 | DType::Float64
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            DType::Int8 => "int8",
            DType::Uint8 => "uint8",
            DType::Uint8Clamped => "uint8c",
            DType::Int16 => "int16",
            DType::Uint16 => "uint16",
            DType::Int32 => "int32",
            DType::Uint32 => "uint32",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        }
    }

    /// Converts `value` to the nearest value this dtype can hold.
    ///
    /// Integer dtypes truncate toward zero and wrap modulo `2^bits`, mapping
    /// non-finite input to zero. `Uint8Clamped` saturates to `0..=255` and
    /// rounds half to even. `Float32` rounds to the nearest `f32`.
    pub fn cast(self, value: f64) -> f64 {
        match self {
            DType::Float64 => value,
            DType::Float32 => value as f32 as f64,
            DType::Uint8Clamped => {
                if value.is_nan() {
                    0.0
                } else {
                    value.clamp(0.0, 255.0).round_ties_even()
                }
            }
            _ => {
                if !value.is_finite() {
                    return 0.0;
                }
                let modulus = 2_f64.powi(self.bits() as i32);
                let wrapped = value.trunc().rem_euclid(modulus);
                if self.is_signed() && wrapped >= modulus / 2.0 {
                    wrapped - modulus
                } else {
                    wrapped
                }
            }
        }
    }

    /// Smallest dtype able to represent every value of both operands.
    ///
    /// Mixing integers with floats leans toward the float side: integers of
    /// at most 16 bits fit in `Float32`, wider ones need `Float64`.
    pub fn promote(self, other: DType) -> DType {
        if self == other {
            return self;
        }

        let (lhs, rhs) = (self.unclamped(), other.unclamped());
        if lhs == rhs {
            return lhs;
        }

        match (lhs.is_float(), rhs.is_float()) {
            (true, true) => wider(lhs, rhs),
            (true, false) => promote_float_with_integer(lhs, rhs),
            (false, true) => promote_float_with_integer(rhs, lhs),
            (false, false) if lhs.is_signed() == rhs.is_signed() => wider(lhs, rhs),
            (false, false) => {
                let (signed, unsigned) = if lhs.is_signed() {
                    (lhs, rhs)
                } else {
                    (rhs, lhs)
                };
                if signed.bits() > unsigned.bits() {
                    signed
                } else {
                    match unsigned {
                        DType::Uint8 => DType::Int16,
                        DType::Uint16 => DType::Int32,
                        _ => DType::Float64,
                    }
                }
            }
        }
    }

    fn unclamped(self) -> DType {
        match self {
            DType::Uint8Clamped => DType::Uint8,
            other => other,
        }
    }
}

fn wider(lhs: DType, rhs: DType) -> DType {
    if lhs.bits() >= rhs.bits() {
        lhs
    } else {
        rhs
    }
}

fn promote_float_with_integer(float: DType, integer: DType) -> DType {
    if float == DType::Float32 && integer.bits() <= 16 {
        DType::Float32
    } else {
        DType::Float64
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DType::ALL
            .iter()
            .copied()
            .find(|dtype| dtype.name() == s)
            .ok_or_else(|| Error::BadData(format!("unknown dtype {s:?}")))
    }
}

/// Rust scalar types that can seed an array buffer.
pub trait Element: Copy + ToPrimitive + 'static {
    const DTYPE: DType;

    fn into_buffer(data: Vec<Self>) -> RawBuffer;

    #[inline]
    fn as_f64(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

macro_rules! impl_element {
    ($ty:ty, $dtype:ident) => {
        impl Element for $ty {
            const DTYPE: DType = DType::$dtype;

            fn into_buffer(data: Vec<Self>) -> RawBuffer {
                RawBuffer::$dtype(data)
            }
        }
    };
}

impl_element!(i8, Int8);
impl_element!(u8, Uint8);
impl_element!(i16, Int16);
impl_element!(u16, Uint16);
impl_element!(i32, Int32);
impl_element!(u32, Uint32);
impl_element!(f32, Float32);
impl_element!(f64, Float64);
