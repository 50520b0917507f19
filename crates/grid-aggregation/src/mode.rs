//! Categorical mode extraction over byte rasters.
//!
//! Categorical variables (land cover classes, soil types) cannot be averaged;
//! each output cell instead takes the most frequent class among the selected
//! samples. Classes fit in a byte, so a dense 256-bin histogram is used:
//! O(|i|·|j|·|k|) per group to fill plus a fixed 256-bin scan.
//!
//! Only `uint8` storage with exactly three axes is supported; anything else
//! is rejected up front rather than truncated.

use std::fmt;

use tracing::debug;

use crate::element::ElementType;
use crate::error::{AggregationError, Result};
use crate::raster::RasterBlock;

/// Index lists along the three raster axes. Unlike integration-point groups
/// there are no weights: every sample in the cross product counts once.
pub type ModeSelection = [Vec<i64>; 3];

/// Most frequent byte value of a histogram.
///
/// Bins are scanned in increasing order and only a strictly greater count
/// replaces the current winner, so ties go to the smaller value. Returns
/// `None` when every bin is empty.
pub fn histogram_mode(histogram: &[u32; 256]) -> Option<u8> {
    let mut best: Option<(u8, u32)> = None;
    for (value, &count) in histogram.iter().enumerate() {
        if count == 0 {
            continue;
        }
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((value as u8, count)),
        }
    }
    best.map(|(value, _)| value)
}

/// Lazy sequence of modes, one per input selection. NaN marks absent
/// selections and selections with no valid sample.
pub struct ModeSequence<'a, I> {
    data: &'a [u8],
    shape: [usize; 3],
    origin: [i64; 3],
    missing_value: Option<u8>,
    groups: I,
}

/// Compute the categorical mode of every selection over `raster`.
///
/// `raster` must be a three-axis `uint8` block. The block's origin maps the
/// selection indices into the buffer.
pub fn mode_sequence<'a, I>(
    raster: &'a RasterBlock,
    missing_value: Option<u8>,
    groups: I,
) -> Result<ModeSequence<'a, I::IntoIter>>
where
    I: IntoIterator<Item = Option<ModeSelection>>,
{
    let Some(data) = raster.as_slice::<u8>() else {
        return Err(AggregationError::unsupported(format!(
            "{} (mode extraction requires {})",
            raster.dtype_name(),
            ElementType::U8
        )));
    };

    let (&[s0, s1, s2], &[o0, o1, o2]) = (raster.shape(), raster.origin()) else {
        return Err(AggregationError::invalid_shape(format!(
            "mode extraction requires 3 axes, raster has {}",
            raster.rank()
        )));
    };

    debug!(shape = ?raster.shape(), masked = missing_value.is_some(), "extracting categorical mode");

    Ok(ModeSequence {
        data,
        shape: [s0, s1, s2],
        origin: [o0, o1, o2],
        missing_value,
        groups: groups.into_iter(),
    })
}

impl<I> fmt::Debug for ModeSequence<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeSequence")
            .field("shape", &self.shape)
            .field("origin", &self.origin)
            .field("missing_value", &self.missing_value)
            .finish_non_exhaustive()
    }
}

impl<I> ModeSequence<'_, I> {
    /// Flat offset contributions of one axis' indices.
    fn offsets(&self, axis: usize, indices: &[i64], stride: usize) -> Result<Vec<usize>> {
        let start = self.origin[axis];
        let extent = self.shape[axis];
        indices
            .iter()
            .map(|&index| {
                match index.checked_sub(start) {
                    Some(local) if local >= 0 && (local as u64) < extent as u64 => {
                        Ok(local as usize * stride)
                    }
                    _ => Err(AggregationError::IndexOutOfBounds {
                        axis,
                        index,
                        start,
                        end: start.saturating_add(extent as i64),
                    }),
                }
            })
            .collect()
    }

    fn mode_of(&self, selection: &ModeSelection) -> Result<f64> {
        let [s1, s2] = [self.shape[1], self.shape[2]];
        let rows = self.offsets(0, &selection[0], s1 * s2)?;
        let cols = self.offsets(1, &selection[1], s2)?;
        let cells = self.offsets(2, &selection[2], 1)?;

        let mut histogram = [0u32; 256];
        for &i in &rows {
            for &j in &cols {
                let base = i + j;
                for &k in &cells {
                    let value = self.data[base + k];
                    if self.missing_value == Some(value) {
                        continue;
                    }
                    histogram[value as usize] += 1;
                }
            }
        }

        Ok(histogram_mode(&histogram).map_or(f64::NAN, f64::from))
    }
}

impl<I> Iterator for ModeSequence<'_, I>
where
    I: Iterator<Item = Option<ModeSelection>>,
{
    type Item = Result<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        let selection = self.groups.next()?;
        Some(match selection {
            None => Ok(f64::NAN),
            Some(selection) => self.mode_of(&selection),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.groups.size_hint()
    }
}
