//! Weighted aggregation dispatcher.
//!
//! [`aggregate`] resolves the raster's storage type once, instantiates the
//! matching kernel and returns a lazy iterator producing one
//! [`AggregationResult`] per integration-point group.
//!
//! ```text
//! aggregate(raster, missing, groups)
//!      │
//!      ├─► match storage type (once per call)
//!      │         └─► unsupported: Err before any group is read
//!      │
//!      └─► Aggregation (pull-based)
//!               │
//!               ├─► None group        → (NaN, NaN)
//!               ├─► kernel Σw == 0    → (NaN, NaN)
//!               └─► kernel (Σwv, Σw)  → emitted unchanged
//! ```
//!
//! Dividing the integral by the weight is left to the caller
//! ([`AggregationResult::mean`]).

use std::fmt;

use tracing::debug;

use crate::element::{ElementType, Sample, Scalar};
use crate::error::{AggregationError, Result};
use crate::group::IntegrationPointGroup;
use crate::kernel::BlockView;
use crate::raster::{RasterBlock, RasterData, RasterElement};

/// Weighted integral and total contributing weight of one group.
///
/// Both fields are NaN when nothing contributed: the group was absent, its
/// cross product was empty, or every sample was the missing value. The two
/// situations are deliberately not distinguished.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationResult {
    pub integral: f64,
    pub weight: f64,
}

impl AggregationResult {
    pub const NO_DATA: AggregationResult = AggregationResult {
        integral: f64::NAN,
        weight: f64::NAN,
    };

    /// Wrap kernel sums, mapping a zero total weight to [`Self::NO_DATA`].
    pub fn from_sums(integral: f64, weight: f64) -> Self {
        if weight == 0.0 {
            Self::NO_DATA
        } else {
            Self { integral, weight }
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.weight.is_nan()
    }

    /// Weighted mean in raw storage units (NaN for no data).
    pub fn mean(&self) -> f64 {
        self.integral / self.weight
    }
}

/// Lazy sequence of aggregation results, one per input group.
///
/// Borrows the raster for its whole lifetime. Forward-only and single-pass:
/// aggregating the same groups again needs a fresh call. Dropping it early
/// leaves the remaining groups unprocessed.
pub struct Aggregation<'a> {
    element_type: ElementType,
    inner: Box<dyn Iterator<Item = Result<AggregationResult>> + 'a>,
}

impl Aggregation<'_> {
    /// Storage type the kernel was instantiated for.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }
}

impl Iterator for Aggregation<'_> {
    type Item = Result<AggregationResult>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl fmt::Debug for Aggregation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregation")
            .field("element_type", &self.element_type)
            .finish_non_exhaustive()
    }
}

/// Aggregate `groups` over `raster`.
///
/// Fails immediately, before any group is consumed, when the raster's
/// storage type is unsupported or when `missing_value` is not of the
/// raster's storage type. Per-group structural problems (wrong number of
/// axes, index outside the block) are reported as an `Err` item for that
/// group.
pub fn aggregate<'a, I>(
    raster: &'a RasterBlock,
    missing_value: Option<Scalar>,
    groups: I,
) -> Result<Aggregation<'a>>
where
    I: IntoIterator<Item = Option<IntegrationPointGroup>>,
    I::IntoIter: 'a,
{
    let element_type = raster
        .element_type()
        .map_err(AggregationError::unsupported)?;

    if let Some(token) = missing_value {
        if token.element_type() != element_type {
            return Err(AggregationError::MissingValueTypeMismatch {
                token: token.element_type().to_string(),
                raster: element_type.to_string(),
            });
        }
    }

    debug!(
        element_type = %element_type,
        shape = ?raster.shape(),
        masked = missing_value.is_some(),
        "aggregating raster block"
    );

    let groups = groups.into_iter();
    let inner = match raster.data() {
        RasterData::I8(v) => launch(v, raster, missing_value, groups),
        RasterData::I16(v) => launch(v, raster, missing_value, groups),
        RasterData::I32(v) => launch(v, raster, missing_value, groups),
        RasterData::I64(v) => launch(v, raster, missing_value, groups),
        RasterData::U8(v) => launch(v, raster, missing_value, groups),
        RasterData::U16(v) => launch(v, raster, missing_value, groups),
        RasterData::U32(v) => launch(v, raster, missing_value, groups),
        RasterData::U64(v) => launch(v, raster, missing_value, groups),
        RasterData::F32(v) => launch(v, raster, missing_value, groups),
        RasterData::F64(v) => launch(v, raster, missing_value, groups),
        RasterData::Other { dtype, .. } => return Err(AggregationError::unsupported(dtype.as_str())),
    };

    Ok(Aggregation {
        element_type,
        inner,
    })
}

fn launch<'a, T, I>(
    data: &'a [T],
    raster: &'a RasterBlock,
    missing_value: Option<Scalar>,
    groups: I,
) -> Box<dyn Iterator<Item = Result<AggregationResult>> + 'a>
where
    T: RasterElement,
    I: Iterator<Item = Option<IntegrationPointGroup>> + 'a,
{
    let view = BlockView::new(data, raster.shape(), raster.origin());
    match missing_value.and_then(T::from_scalar) {
        Some(token) => Box::new(TypedAggregation {
            view,
            groups,
            keep: move |v: T| !v.matches(token),
        }),
        None => Box::new(TypedAggregation {
            view,
            groups,
            keep: |_: T| true,
        }),
    }
}

/// The monomorphized per-call iterator: one storage type, one filter.
struct TypedAggregation<'a, T, I, F> {
    view: BlockView<'a, T>,
    groups: I,
    keep: F,
}

impl<T, I, F> Iterator for TypedAggregation<'_, T, I, F>
where
    T: Sample,
    I: Iterator<Item = Option<IntegrationPointGroup>>,
    F: Fn(T) -> bool + Copy,
{
    type Item = Result<AggregationResult>;

    fn next(&mut self) -> Option<Self::Item> {
        let group = self.groups.next()?;
        let Some(group) = group else {
            return Some(Ok(AggregationResult::NO_DATA));
        };
        Some(
            self.view
                .accumulate_with(&group, self.keep)
                .map(|(integral, weight)| AggregationResult::from_sums(integral, weight)),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.groups.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::AxisPoints;

    fn square(range: std::ops::Range<i64>) -> IntegrationPointGroup {
        IntegrationPointGroup::new(vec![
            AxisPoints::uniform(range.clone(), 1.0),
            AxisPoints::uniform(range, 1.0),
        ])
    }

    #[test]
    fn test_absent_group_is_nan() {
        let raster = RasterBlock::at_zero(vec![1.0f32; 4], vec![2, 2]).unwrap();
        let results: Vec<_> = aggregate(&raster, None, vec![None, Some(square(0..2))])
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert!(results[0].integral.is_nan() && results[0].weight.is_nan());
        assert_eq!(results[1], AggregationResult { integral: 4.0, weight: 4.0 });
    }

    #[test]
    fn test_all_missing_is_nan() {
        let raster = RasterBlock::at_zero(vec![-9i16; 4], vec![2, 2]).unwrap();
        let mut results = aggregate(&raster, Some(Scalar::I16(-9)), vec![Some(square(0..2))]).unwrap();
        let result = results.next().unwrap().unwrap();
        assert!(result.is_no_data());
        assert!(result.integral.is_nan());
        assert!(results.next().is_none());
    }

    #[test]
    fn test_unsupported_type_fails_before_groups() {
        let raster = RasterBlock::from_bytes(
            "float16",
            bytes::Bytes::from_static(&[0, 0]),
            vec![1],
            vec![0],
        )
        .unwrap();

        let mut pulled = 0;
        let groups = std::iter::from_fn(|| {
            pulled += 1;
            Some(None)
        });
        let err = aggregate(&raster, None, groups).unwrap_err();
        assert!(matches!(err, AggregationError::UnsupportedElementType(ref t) if t == "float16"));
        assert_eq!(pulled, 0);
    }

    #[test]
    fn test_mismatched_missing_value_type() {
        let raster = RasterBlock::at_zero(vec![0i16; 4], vec![4]).unwrap();
        let err = aggregate(&raster, Some(Scalar::F64(-999.0)), Vec::new()).unwrap_err();
        assert!(matches!(err, AggregationError::MissingValueTypeMismatch { .. }));
    }

    #[test]
    fn test_results_are_lazy_and_ordered() {
        let raster = RasterBlock::at_zero((0..16).map(|v| v as u32).collect(), vec![4, 4]).unwrap();
        let groups = (0..4).map(|row| {
            Some(IntegrationPointGroup::new(vec![
                AxisPoints::single(row),
                AxisPoints::uniform(0..4, 0.25),
            ]))
        });
        let mut aggregation = aggregate(&raster, None, groups).unwrap();
        assert_eq!(aggregation.element_type(), ElementType::U32);
        assert_eq!(aggregation.size_hint(), (4, Some(4)));

        let means: Vec<f64> = aggregation
            .by_ref()
            .take(2)
            .map(|r| r.unwrap().mean())
            .collect();
        assert_eq!(means, vec![1.5, 5.5]);
        assert_eq!(aggregation.count(), 2);
    }

    #[test]
    fn test_bad_group_is_an_error_item() {
        let raster = RasterBlock::at_zero(vec![1u8; 4], vec![2, 2]).unwrap();
        let results: Vec<_> = aggregate(&raster, None, vec![Some(square(1..3)), Some(square(0..1))])
            .unwrap()
            .collect();
        assert!(matches!(results[0], Err(AggregationError::IndexOutOfBounds { .. })));
        assert_eq!(results[1].as_ref().unwrap().weight, 1.0);
    }

    #[test]
    fn test_from_sums() {
        assert!(AggregationResult::from_sums(0.0, 0.0).is_no_data());
        assert!(AggregationResult::from_sums(3.0, -0.0).is_no_data());
        let r = AggregationResult::from_sums(-3.0, 1.5);
        assert_eq!(r.mean(), -2.0);
    }
}
