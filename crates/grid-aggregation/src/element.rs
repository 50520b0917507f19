//! Storage element types and the numeric trait the kernels are generic over.
//!
//! Archived grids are stored in one of ten primitive widths. [`ElementType`]
//! names them, [`Scalar`] carries a single value of any of them (missing-value
//! tokens, typed attributes), and [`Sample`] is the bound the accumulation
//! kernels are monomorphized over.

use bytemuck::Pod;
use num_traits::{AsPrimitive, NumCast};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive storage type of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    #[serde(rename = "int8")]
    I8,
    #[serde(rename = "int16")]
    I16,
    #[serde(rename = "int32")]
    I32,
    #[serde(rename = "int64")]
    I64,
    #[serde(rename = "uint8")]
    U8,
    #[serde(rename = "uint16")]
    U16,
    #[serde(rename = "uint32")]
    U32,
    #[serde(rename = "uint64")]
    U64,
    #[serde(rename = "float32")]
    F32,
    #[serde(rename = "float64")]
    F64,
}

impl ElementType {
    /// All supported element types.
    pub const ALL: [ElementType; 10] = [
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
    ];

    /// Parse a storage dtype name (case-insensitive).
    ///
    /// Accepts the long names (`int16`, `float64`, `byte`, `double`, ...) and
    /// numpy type codes with an optional byte-order prefix (`<i2`, `|u1`, `f8`).
    /// Returns `None` for anything else.
    pub fn parse(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        let code = lower.trim_start_matches(['<', '>', '|', '=']);
        let parsed = match code {
            "int8" | "i1" | "sbyte" => Self::I8,
            "int16" | "i2" | "short" => Self::I16,
            "int32" | "i4" | "int" => Self::I32,
            "int64" | "i8" | "long" => Self::I64,
            "uint8" | "u1" | "byte" | "ubyte" => Self::U8,
            "uint16" | "u2" | "ushort" => Self::U16,
            "uint32" | "u4" | "uint" => Self::U32,
            "uint64" | "u8" | "ulong" => Self::U64,
            "float32" | "f4" | "float" | "single" => Self::F32,
            "float64" | "f8" | "double" => Self::F64,
            _ => return None,
        };
        Some(parsed)
    }

    /// Canonical name, as used in error messages and serialized metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::F32 => "float32",
            Self::F64 => "float64",
        }
    }

    /// Width of one element in bytes.
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single value of one of the supported element types.
///
/// Serialized adjacently tagged, e.g. `{"type": "int16", "value": -999}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Scalar {
    #[serde(rename = "int8")]
    I8(i8),
    #[serde(rename = "int16")]
    I16(i16),
    #[serde(rename = "int32")]
    I32(i32),
    #[serde(rename = "int64")]
    I64(i64),
    #[serde(rename = "uint8")]
    U8(u8),
    #[serde(rename = "uint16")]
    U16(u16),
    #[serde(rename = "uint32")]
    U32(u32),
    #[serde(rename = "uint64")]
    U64(u64),
    #[serde(rename = "float32")]
    F32(f32),
    #[serde(rename = "float64")]
    F64(f64),
}

impl Scalar {
    /// The element type this value is stored as.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::I8(_) => ElementType::I8,
            Self::I16(_) => ElementType::I16,
            Self::I32(_) => ElementType::I32,
            Self::I64(_) => ElementType::I64,
            Self::U8(_) => ElementType::U8,
            Self::U16(_) => ElementType::U16,
            Self::U32(_) => ElementType::U32,
            Self::U64(_) => ElementType::U64,
            Self::F32(_) => ElementType::F32,
            Self::F64(_) => ElementType::F64,
        }
    }

    /// Widen to f64 (lossy only for 64-bit integers beyond 2^53).
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::I8(v) => v.as_(),
            Self::I16(v) => v.as_(),
            Self::I32(v) => v.as_(),
            Self::I64(v) => v.as_(),
            Self::U8(v) => v.as_(),
            Self::U16(v) => v.as_(),
            Self::U32(v) => v.as_(),
            Self::U64(v) => v.as_(),
            Self::F32(v) => v.as_(),
            Self::F64(v) => v,
        }
    }

    /// Numeric conversion to another element type.
    ///
    /// Float to integer conversion truncates toward zero. Returns `None` when
    /// the value does not fit the target (out of range, or NaN/infinity into
    /// an integer type). A finite value that would round to infinity in
    /// `float32` is out of range too.
    pub fn cast_to(&self, target: ElementType) -> Option<Scalar> {
        match target {
            ElementType::I8 => self.cast::<i8>().map(Self::I8),
            ElementType::I16 => self.cast::<i16>().map(Self::I16),
            ElementType::I32 => self.cast::<i32>().map(Self::I32),
            ElementType::I64 => self.cast::<i64>().map(Self::I64),
            ElementType::U8 => self.cast::<u8>().map(Self::U8),
            ElementType::U16 => self.cast::<u16>().map(Self::U16),
            ElementType::U32 => self.cast::<u32>().map(Self::U32),
            ElementType::U64 => self.cast::<u64>().map(Self::U64),
            ElementType::F32 => self
                .cast::<f32>()
                .filter(|v| v.is_finite() || !self.as_f64().is_finite())
                .map(Self::F32),
            ElementType::F64 => self.cast::<f64>().map(Self::F64),
        }
    }

    fn cast<T: NumCast>(&self) -> Option<T> {
        match *self {
            Self::I8(v) => T::from(v),
            Self::I16(v) => T::from(v),
            Self::I32(v) => T::from(v),
            Self::I64(v) => T::from(v),
            Self::U8(v) => T::from(v),
            Self::U16(v) => T::from(v),
            Self::U32(v) => T::from(v),
            Self::U64(v) => T::from(v),
            Self::F32(v) => T::from(v),
            Self::F64(v) => T::from(v),
        }
    }

    /// Parse a textual attribute value into a scalar of the given type.
    ///
    /// Integers are tried first so that large 64-bit values survive exactly;
    /// everything else goes through f64 and [`Scalar::cast_to`].
    pub fn parse_as(text: &str, target: ElementType) -> Option<Scalar> {
        let text = text.trim();
        if let Ok(v) = text.parse::<i64>() {
            return Scalar::I64(v).cast_to(target);
        }
        if let Ok(v) = text.parse::<u64>() {
            return Scalar::U64(v).cast_to(target);
        }
        text.parse::<f64>().ok().and_then(|v| Scalar::F64(v).cast_to(target))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I8(v) => write!(f, "{v}i8"),
            Self::I16(v) => write!(f, "{v}i16"),
            Self::I32(v) => write!(f, "{v}i32"),
            Self::I64(v) => write!(f, "{v}i64"),
            Self::U8(v) => write!(f, "{v}u8"),
            Self::U16(v) => write!(f, "{v}u16"),
            Self::U32(v) => write!(f, "{v}u32"),
            Self::U64(v) => write!(f, "{v}u64"),
            Self::F32(v) => write!(f, "{v}f32"),
            Self::F64(v) => write!(f, "{v}f64"),
        }
    }
}

/// A primitive raster element the accumulation kernels can be instantiated for.
pub trait Sample: Pod + PartialEq + AsPrimitive<f64> + Send + Sync + 'static {
    const ELEMENT_TYPE: ElementType;

    /// Extract a value of this type, if the scalar carries exactly this type.
    fn from_scalar(scalar: Scalar) -> Option<Self>;

    fn into_scalar(self) -> Scalar;

    /// Whether this sample equals the missing-value token.
    #[inline(always)]
    fn matches(self, token: Self) -> bool {
        self == token
    }

    /// Lossless (for all but 64-bit integers) widening to f64.
    #[inline(always)]
    fn widen(self) -> f64 {
        self.as_()
    }
}

macro_rules! impl_sample {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl Sample for $ty {
                const ELEMENT_TYPE: ElementType = ElementType::$variant;

                #[inline]
                fn from_scalar(scalar: Scalar) -> Option<Self> {
                    match scalar {
                        Scalar::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                #[inline]
                fn into_scalar(self) -> Scalar {
                    Scalar::$variant(self)
                }
            }
        )+
    };
}

macro_rules! impl_float_sample {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl Sample for $ty {
                const ELEMENT_TYPE: ElementType = ElementType::$variant;

                #[inline]
                fn from_scalar(scalar: Scalar) -> Option<Self> {
                    match scalar {
                        Scalar::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                #[inline]
                fn into_scalar(self) -> Scalar {
                    Scalar::$variant(self)
                }

                // A NaN token flags NaN samples.
                #[inline(always)]
                fn matches(self, token: Self) -> bool {
                    self == token || (token.is_nan() && self.is_nan())
                }
            }
        )+
    };
}

impl_sample!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
);

impl_float_sample!(f32 => F32, f64 => F64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type_parse() {
        assert_eq!(ElementType::parse("int16"), Some(ElementType::I16));
        assert_eq!(ElementType::parse("FLOAT64"), Some(ElementType::F64));
        assert_eq!(ElementType::parse("<i2"), Some(ElementType::I16));
        assert_eq!(ElementType::parse("|u1"), Some(ElementType::U8));
        assert_eq!(ElementType::parse("f8"), Some(ElementType::F64));
        assert_eq!(ElementType::parse("byte"), Some(ElementType::U8));
        assert_eq!(ElementType::parse("float16"), None);
        assert_eq!(ElementType::parse("string"), None);
    }

    #[test]
    fn test_element_type_names_round_trip() {
        for ty in ElementType::ALL {
            assert_eq!(ElementType::parse(ty.as_str()), Some(ty));
        }
    }

    #[test]
    fn test_cast_float_to_int16_in_range() {
        assert_eq!(
            Scalar::F64(-999.0).cast_to(ElementType::I16),
            Some(Scalar::I16(-999))
        );
        // Truncation toward zero
        assert_eq!(
            Scalar::F64(-32767.9).cast_to(ElementType::I16),
            Some(Scalar::I16(-32767))
        );
    }

    #[test]
    fn test_cast_out_of_range_is_none() {
        assert_eq!(Scalar::F64(1.0e20).cast_to(ElementType::I16), None);
        assert_eq!(Scalar::I32(-1).cast_to(ElementType::U8), None);
        assert_eq!(Scalar::U16(300).cast_to(ElementType::U8), None);
        assert_eq!(Scalar::F64(f64::NAN).cast_to(ElementType::I32), None);
    }

    #[test]
    fn test_cast_beyond_float32_range_is_none() {
        assert_eq!(Scalar::F64(1.0e300).cast_to(ElementType::F32), None);
        assert_eq!(Scalar::F64(-1.0e39).cast_to(ElementType::F32), None);
        assert_eq!(
            Scalar::F64(f64::INFINITY).cast_to(ElementType::F32),
            Some(Scalar::F32(f32::INFINITY))
        );
        assert_eq!(Scalar::F64(-9999.0).cast_to(ElementType::F32), Some(Scalar::F32(-9999.0)));
    }

    #[test]
    fn test_cast_nan_to_float_is_kept() {
        match Scalar::F64(f64::NAN).cast_to(ElementType::F32) {
            Some(Scalar::F32(v)) => assert!(v.is_nan()),
            other => panic!("unexpected cast result {other:?}"),
        }
    }

    #[test]
    fn test_parse_as() {
        assert_eq!(
            Scalar::parse_as(" -999 ", ElementType::I16),
            Some(Scalar::I16(-999))
        );
        assert_eq!(
            Scalar::parse_as("1e3", ElementType::U16),
            Some(Scalar::U16(1000))
        );
        assert_eq!(
            Scalar::parse_as("18446744073709551615", ElementType::U64),
            Some(Scalar::U64(u64::MAX))
        );
        assert_eq!(Scalar::parse_as("n/a", ElementType::F32), None);
    }

    #[test]
    fn test_scalar_serde_tagged() {
        let json = r#"{"type":"int16","value":-999}"#;
        let scalar: Scalar = serde_json::from_str(json).unwrap();
        assert_eq!(scalar, Scalar::I16(-999));
        assert_eq!(serde_json::to_string(&scalar).unwrap(), json);
    }

    #[test]
    fn test_float_nan_token_matches_nan_sample() {
        assert!(f32::NAN.matches(f32::NAN));
        assert!(!1.0f64.matches(f64::NAN));
        assert!(5i16.matches(5));
        assert!(!5u8.matches(6));
    }

    #[test]
    fn test_from_scalar_requires_exact_type() {
        assert_eq!(i16::from_scalar(Scalar::I16(3)), Some(3));
        assert_eq!(i16::from_scalar(Scalar::I32(3)), None);
        assert_eq!(<f64 as Sample>::ELEMENT_TYPE, ElementType::F64);
    }
}
