//! The per-type weighted accumulation primitive.
//!
//! Given a borrowed block, its shape and origin, and one integration-point
//! group, the kernel returns `(Σ w·v, Σ w)` over the cross product of the
//! group's per-axis lists. Values are widened to f64 before multiplication.
//! Samples rejected by the `keep` predicate (the missing-value test)
//! contribute to neither sum.
//!
//! The kernel is generic over [`Sample`] and the predicate, so every storage
//! type and both the masked and unmasked variants compile to their own loop
//! with no dynamic dispatch per sample.

use crate::element::Sample;
use crate::error::{AggregationError, Result};
use crate::group::IntegrationPointGroup;
use crate::raster::row_major_strides;

/// A read-only view of a block, with strides precomputed for repeated calls.
#[derive(Debug, Clone)]
pub struct BlockView<'a, T> {
    data: &'a [T],
    shape: &'a [usize],
    origin: &'a [i64],
    strides: Vec<usize>,
}

impl<'a, T: Sample> BlockView<'a, T> {
    pub fn new(data: &'a [T], shape: &'a [usize], origin: &'a [i64]) -> Self {
        Self {
            data,
            shape,
            origin,
            strides: row_major_strides(shape),
        }
    }

    /// Translate the group into per-axis `(flat offset, weight)` lists,
    /// checking every index against the block.
    fn resolve(&self, group: &IntegrationPointGroup) -> Result<Vec<Vec<(usize, f64)>>> {
        if group.rank() != self.shape.len() {
            return Err(AggregationError::RankMismatch {
                group: group.rank(),
                raster: self.shape.len(),
            });
        }

        group
            .axes()
            .iter()
            .enumerate()
            .map(|(axis, points)| {
                let start = self.origin[axis];
                let extent = self.shape[axis];
                points
                    .iter()
                    .map(|(index, weight)| {
                        match index.checked_sub(start) {
                            Some(local) if local >= 0 && (local as u64) < extent as u64 => {
                                Ok((local as usize * self.strides[axis], weight))
                            }
                            _ => Err(AggregationError::IndexOutOfBounds {
                                axis,
                                index,
                                start,
                                end: start.saturating_add(extent as i64),
                            }),
                        }
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect()
    }

    /// Accumulate one group, keeping only samples for which `keep` holds.
    pub fn accumulate_with<F>(&self, group: &IntegrationPointGroup, keep: F) -> Result<(f64, f64)>
    where
        F: Fn(T) -> bool + Copy,
    {
        let axes = self.resolve(group)?;
        let mut acc = Accumulator::default();
        sum_axes(self.data, &axes, 0, 1.0, keep, &mut acc);
        Ok((acc.sum, acc.weight))
    }

    /// Accumulate one group, skipping samples equal to `missing` when given.
    pub fn accumulate(&self, group: &IntegrationPointGroup, missing: Option<T>) -> Result<(f64, f64)> {
        match missing {
            Some(token) => self.accumulate_with(group, move |v: T| !v.matches(token)),
            None => self.accumulate_with(group, |_| true),
        }
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    sum: f64,
    weight: f64,
}

#[inline]
fn sum_axes<T, F>(
    data: &[T],
    axes: &[Vec<(usize, f64)>],
    base: usize,
    weight: f64,
    keep: F,
    acc: &mut Accumulator,
) where
    T: Sample,
    F: Fn(T) -> bool + Copy,
{
    match axes {
        // Zero-dimensional block: a single sample.
        [] => {
            let value = data[base];
            if keep(value) {
                acc.sum += value.widen() * weight;
                acc.weight += weight;
            }
        }
        [last] => {
            for &(offset, w) in last {
                let value = data[base + offset];
                if keep(value) {
                    let combined = weight * w;
                    acc.sum += value.widen() * combined;
                    acc.weight += combined;
                }
            }
        }
        [first, rest @ ..] => {
            for &(offset, w) in first {
                sum_axes(data, rest, base + offset, weight * w, keep, acc);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::AxisPoints;

    #[test]
    fn test_accumulate_1d() {
        let data = [1.0f32, 2.0, 3.0, 4.0];
        let shape = [4];
        let origin = [10];
        let view = BlockView::new(&data, &shape, &origin);

        let group = IntegrationPointGroup::new(vec![AxisPoints::new(
            vec![11, 13],
            vec![0.5, 2.0],
        )
        .unwrap()]);
        let (sum, weight) = view.accumulate(&group, None).unwrap();
        assert_eq!(sum, 2.0 * 0.5 + 4.0 * 2.0);
        assert_eq!(weight, 2.5);
    }

    #[test]
    fn test_accumulate_cross_product_weights() {
        // 2x3 block, value = row * 10 + col
        let data: Vec<i32> = vec![0, 1, 2, 10, 11, 12];
        let shape = [2, 3];
        let origin = [0, 0];
        let view = BlockView::new(&data, &shape, &origin);

        let group = IntegrationPointGroup::new(vec![
            AxisPoints::new(vec![0, 1], vec![1.0, 3.0]).unwrap(),
            AxisPoints::new(vec![2], vec![0.5]).unwrap(),
        ]);
        let (sum, weight) = view.accumulate(&group, None).unwrap();
        assert_eq!(sum, 2.0 * 0.5 + 12.0 * 1.5);
        assert_eq!(weight, 2.0);
    }

    #[test]
    fn test_missing_samples_are_skipped() {
        let data: Vec<i16> = vec![5, -1, 5, -1];
        let shape = [4];
        let origin = [0];
        let view = BlockView::new(&data, &shape, &origin);
        let group = IntegrationPointGroup::new(vec![AxisPoints::uniform(0..4, 1.0)]);

        assert_eq!(view.accumulate(&group, Some(-1)).unwrap(), (10.0, 2.0));
        assert_eq!(view.accumulate(&group, None).unwrap(), (8.0, 4.0));
    }

    #[test]
    fn test_integers_widen_before_multiplying() {
        let data = [u64::MAX >> 11, u64::MAX >> 11];
        let shape = [2];
        let origin = [0];
        let view = BlockView::new(&data, &shape, &origin);
        let group = IntegrationPointGroup::new(vec![AxisPoints::uniform(0..2, 1.0)]);
        let (sum, _) = view.accumulate(&group, None).unwrap();
        assert_eq!(sum, 2.0 * (u64::MAX >> 11) as f64);
    }

    #[test]
    fn test_out_of_bounds_index() {
        let data = [0u8; 6];
        let shape = [2, 3];
        let origin = [5, -2];
        let view = BlockView::new(&data, &shape, &origin);

        let inside = IntegrationPointGroup::new(vec![AxisPoints::single(6), AxisPoints::single(0)]);
        assert!(view.accumulate(&inside, None).is_ok());

        let below = IntegrationPointGroup::new(vec![AxisPoints::single(4), AxisPoints::single(0)]);
        assert!(matches!(
            view.accumulate(&below, None),
            Err(AggregationError::IndexOutOfBounds { axis: 0, index: 4, start: 5, end: 7 })
        ));

        let above = IntegrationPointGroup::new(vec![AxisPoints::single(5), AxisPoints::single(1)]);
        assert!(matches!(
            view.accumulate(&above, None),
            Err(AggregationError::IndexOutOfBounds { axis: 1, index: 1, start: -2, end: 1 })
        ));
    }

    #[test]
    fn test_extreme_index_against_negative_origin() {
        let data = [1.0f64; 4];
        let shape = [4];
        let origin = [-1];
        let view = BlockView::new(&data, &shape, &origin);

        let far = IntegrationPointGroup::new(vec![AxisPoints::single(i64::MAX)]);
        assert!(matches!(
            view.accumulate(&far, None),
            Err(AggregationError::IndexOutOfBounds { axis: 0, index: i64::MAX, start: -1, end: 3 })
        ));

        let near_min = IntegrationPointGroup::new(vec![AxisPoints::single(i64::MIN)]);
        assert!(matches!(
            view.accumulate(&near_min, None),
            Err(AggregationError::IndexOutOfBounds { index: i64::MIN, .. })
        ));
    }

    #[test]
    fn test_rank_mismatch() {
        let data = [0u8; 6];
        let shape = [2, 3];
        let origin = [0, 0];
        let view = BlockView::new(&data, &shape, &origin);
        let group = IntegrationPointGroup::new(vec![AxisPoints::single(0)]);
        assert!(matches!(
            view.accumulate(&group, None),
            Err(AggregationError::RankMismatch { group: 1, raster: 2 })
        ));
    }

    #[test]
    fn test_empty_axis_gives_zero_weight() {
        let data = [1.0f64; 4];
        let shape = [2, 2];
        let origin = [0, 0];
        let view = BlockView::new(&data, &shape, &origin);
        let group = IntegrationPointGroup::new(vec![AxisPoints::default(), AxisPoints::single(0)]);
        assert_eq!(view.accumulate(&group, None).unwrap(), (0.0, 0.0));
    }
}
