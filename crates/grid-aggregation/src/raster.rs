//! Resident raster blocks.

use bytes::Bytes;

use crate::element::{ElementType, Sample};
use crate::error::{AggregationError, Result};

/// Typed storage of a raster block.
///
/// `Other` holds payloads the storage layer delivered with a dtype this crate
/// cannot aggregate (e.g. `float16`, strings). Such blocks can be carried
/// around, but every aggregation over them fails with
/// [`AggregationError::UnsupportedElementType`].
#[derive(Debug, Clone, PartialEq)]
pub enum RasterData {
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    Other { dtype: String, bytes: Bytes },
}

impl RasterData {
    /// Storage type, or the unrecognized dtype name.
    pub fn element_type(&self) -> std::result::Result<ElementType, &str> {
        Ok(match self {
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
            Self::Other { dtype, .. } => return Err(dtype.as_str()),
        })
    }

    /// Number of elements (`None` for unrecognized payloads).
    fn len(&self) -> Option<usize> {
        Some(match self {
            Self::I8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::Other { .. } => return None,
        })
    }
}

/// Element types that can back a [`RasterBlock`].
pub trait RasterElement: Sample {
    fn wrap(values: Vec<Self>) -> RasterData;

    fn view(data: &RasterData) -> Option<&[Self]>;
}

macro_rules! impl_raster_element {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl RasterElement for $ty {
                fn wrap(values: Vec<Self>) -> RasterData {
                    RasterData::$variant(values)
                }

                fn view(data: &RasterData) -> Option<&[Self]> {
                    match data {
                        RasterData::$variant(v) => Some(v.as_slice()),
                        _ => None,
                    }
                }
            }
        )+
    };
}

impl_raster_element!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
);

/// An owned, contiguous, row-major block of one variable.
///
/// `origin[axis]` is the coordinate, in the logical integration-point domain,
/// of the block's first element along `axis`. Integration-point indices are
/// translated into the block by subtracting the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterBlock {
    data: RasterData,
    shape: Vec<usize>,
    origin: Vec<i64>,
}

impl RasterBlock {
    /// Create a block from a typed buffer.
    pub fn new<T: RasterElement>(values: Vec<T>, shape: Vec<usize>, origin: Vec<i64>) -> Result<Self> {
        Self::from_data(T::wrap(values), shape, origin)
    }

    /// Create a block anchored at the origin of the logical domain.
    pub fn at_zero<T: RasterElement>(values: Vec<T>, shape: Vec<usize>) -> Result<Self> {
        let origin = vec![0; shape.len()];
        Self::new(values, shape, origin)
    }

    /// Create a block from raw bytes in native byte order, as delivered by
    /// the storage layer together with its dtype name.
    ///
    /// Unrecognized dtypes are kept as [`RasterData::Other`]; the failure is
    /// deferred to aggregation time.
    pub fn from_bytes(
        dtype: &str,
        bytes: Bytes,
        shape: Vec<usize>,
        origin: Vec<i64>,
    ) -> Result<Self> {
        let Some(element_type) = ElementType::parse(dtype) else {
            let data = RasterData::Other {
                dtype: dtype.to_string(),
                bytes,
            };
            return Self::from_data(data, shape, origin);
        };

        if bytes.len() % element_type.size_bytes() != 0 {
            return Err(AggregationError::invalid_shape(format!(
                "{} bytes is not a whole number of {} elements",
                bytes.len(),
                element_type
            )));
        }

        let data = match element_type {
            ElementType::I8 => RasterData::I8(bytemuck::pod_collect_to_vec(&bytes[..])),
            ElementType::I16 => RasterData::I16(bytemuck::pod_collect_to_vec(&bytes[..])),
            ElementType::I32 => RasterData::I32(bytemuck::pod_collect_to_vec(&bytes[..])),
            ElementType::I64 => RasterData::I64(bytemuck::pod_collect_to_vec(&bytes[..])),
            ElementType::U8 => RasterData::U8(bytes.to_vec()),
            ElementType::U16 => RasterData::U16(bytemuck::pod_collect_to_vec(&bytes[..])),
            ElementType::U32 => RasterData::U32(bytemuck::pod_collect_to_vec(&bytes[..])),
            ElementType::U64 => RasterData::U64(bytemuck::pod_collect_to_vec(&bytes[..])),
            ElementType::F32 => RasterData::F32(bytemuck::pod_collect_to_vec(&bytes[..])),
            ElementType::F64 => RasterData::F64(bytemuck::pod_collect_to_vec(&bytes[..])),
        };
        Self::from_data(data, shape, origin)
    }

    fn from_data(data: RasterData, shape: Vec<usize>, origin: Vec<i64>) -> Result<Self> {
        if shape.len() != origin.len() {
            return Err(AggregationError::invalid_shape(format!(
                "shape has {} axes but origin has {}",
                shape.len(),
                origin.len()
            )));
        }
        let Some(expected) = shape.iter().try_fold(1usize, |acc, &extent| acc.checked_mul(extent)) else {
            return Err(AggregationError::invalid_shape(format!(
                "shape {shape:?} has more elements than fit in memory"
            )));
        };
        if let Some(len) = data.len() {
            if expected != len {
                return Err(AggregationError::invalid_shape(format!(
                    "shape {shape:?} needs {expected} elements, buffer has {len}"
                )));
            }
        }
        Ok(Self { data, shape, origin })
    }

    pub fn data(&self) -> &RasterData {
        &self.data
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn origin(&self) -> &[i64] {
        &self.origin
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Storage type, or the unrecognized dtype name.
    pub fn element_type(&self) -> std::result::Result<ElementType, &str> {
        self.data.element_type()
    }

    /// Name of the storage type as reported by the storage layer.
    pub fn dtype_name(&self) -> &str {
        match self.element_type() {
            Ok(ty) => ty.as_str(),
            Err(name) => name,
        }
    }

    /// Borrow the buffer as a typed slice, if it has element type `T`.
    pub fn as_slice<T: RasterElement>(&self) -> Option<&[T]> {
        T::view(&self.data)
    }

    /// Row-major strides, in elements.
    pub fn strides(&self) -> Vec<usize> {
        row_major_strides(&self.shape)
    }
}

/// Row-major strides for `shape`, in elements.
pub(crate) fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_shape() {
        assert!(RasterBlock::at_zero(vec![0.0f32; 6], vec![2, 3]).is_ok());
        assert!(RasterBlock::at_zero(vec![0.0f32; 5], vec![2, 3]).is_err());
        assert!(RasterBlock::new(vec![0u8; 6], vec![2, 3], vec![0]).is_err());
    }

    #[test]
    fn test_overflowing_shape_is_rejected() {
        let err = RasterBlock::at_zero(Vec::<u8>::new(), vec![usize::MAX, 2]).unwrap_err();
        assert!(matches!(err, AggregationError::InvalidShape(_)));

        let err = RasterBlock::from_bytes("complex64", Bytes::new(), vec![usize::MAX, 3], vec![0, 0])
            .unwrap_err();
        assert!(matches!(err, AggregationError::InvalidShape(_)));
    }

    #[test]
    fn test_strides() {
        let block = RasterBlock::at_zero(vec![0i16; 24], vec![2, 3, 4]).unwrap();
        assert_eq!(block.strides(), vec![12, 4, 1]);
        assert_eq!(row_major_strides(&[]), Vec::<usize>::new());
    }

    #[test]
    fn test_typed_view() {
        let block = RasterBlock::at_zero(vec![1u16, 2, 3], vec![3]).unwrap();
        assert_eq!(block.as_slice::<u16>(), Some(&[1u16, 2, 3][..]));
        assert!(block.as_slice::<i16>().is_none());
        assert_eq!(block.element_type(), Ok(ElementType::U16));
    }

    #[test]
    fn test_from_bytes_known_dtype() {
        let values: [i16; 4] = [1, -2, 3, -999];
        let bytes = Bytes::copy_from_slice(bytemuck::cast_slice(&values));
        let block = RasterBlock::from_bytes("<i2", bytes, vec![2, 2], vec![10, 20]).unwrap();
        assert_eq!(block.as_slice::<i16>(), Some(&values[..]));
        assert_eq!(block.origin(), &[10, 20]);
    }

    #[test]
    fn test_from_bytes_ragged_length_fails() {
        let bytes = Bytes::from_static(&[0, 1, 2]);
        assert!(RasterBlock::from_bytes("int16", bytes, vec![1], vec![0]).is_err());
    }

    #[test]
    fn test_from_bytes_unknown_dtype_is_deferred() {
        let bytes = Bytes::from_static(&[0, 0, 0, 0]);
        let block = RasterBlock::from_bytes("float16", bytes, vec![2], vec![0]).unwrap();
        assert_eq!(block.element_type(), Err("float16"));
        assert_eq!(block.dtype_name(), "float16");
    }
}
