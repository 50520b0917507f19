//! Integration-point groups.
//!
//! A group describes which raster elements contribute to one output cell:
//! for every raster axis a list of `(index, weight)` pairs. The contributing
//! samples are the cross product of the per-axis lists and each sample's
//! weight is the product of its per-axis weights. Indices live in the logical
//! (unbounded) domain; the raster block's origin maps them into the buffer.

use crate::error::{AggregationError, Result};

/// `(index, weight)` pairs along one axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisPoints {
    indices: Vec<i64>,
    weights: Vec<f64>,
}

impl AxisPoints {
    /// Build from parallel index and weight lists of equal length.
    pub fn new(indices: Vec<i64>, weights: Vec<f64>) -> Result<Self> {
        if indices.len() != weights.len() {
            return Err(AggregationError::invalid_shape(format!(
                "{} indices but {} weights",
                indices.len(),
                weights.len()
            )));
        }
        Ok(Self { indices, weights })
    }

    /// A single index with unit weight.
    pub fn single(index: i64) -> Self {
        Self {
            indices: vec![index],
            weights: vec![1.0],
        }
    }

    /// Every index of `range` with the same weight.
    pub fn uniform(range: std::ops::Range<i64>, weight: f64) -> Self {
        let indices: Vec<i64> = range.collect();
        let weights = vec![weight; indices.len()];
        Self { indices, weights }
    }

    pub fn indices(&self) -> &[i64] {
        &self.indices
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.indices.iter().copied().zip(self.weights.iter().copied())
    }
}

impl FromIterator<(i64, f64)> for AxisPoints {
    fn from_iter<I: IntoIterator<Item = (i64, f64)>>(iter: I) -> Self {
        let (indices, weights) = iter.into_iter().unzip();
        Self { indices, weights }
    }
}

/// The integration points of one output cell, one [`AxisPoints`] per axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrationPointGroup {
    axes: Vec<AxisPoints>,
}

impl IntegrationPointGroup {
    pub fn new(axes: Vec<AxisPoints>) -> Self {
        Self { axes }
    }

    pub fn axes(&self) -> &[AxisPoints] {
        &self.axes
    }

    pub fn rank(&self) -> usize {
        self.axes.len()
    }

    /// Number of samples in the cross product.
    pub fn sample_count(&self) -> usize {
        self.axes.iter().map(AxisPoints::len).product()
    }
}

impl From<Vec<AxisPoints>> for IntegrationPointGroup {
    fn from(axes: Vec<AxisPoints>) -> Self {
        Self::new(axes)
    }
}
