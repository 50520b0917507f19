//! Per-dataset aggregation facade.
//!
//! [`AggregationEngine`] is built once per dataset load. It owns the
//! representation and missing-value registries and routes raster blocks of a
//! named variable to the dispatcher or the mode extractor with the right
//! missing-value token. Everything it holds is immutable, so one engine can
//! be shared by concurrent requests.

use crate::aggregate::{aggregate, Aggregation, AggregationResult};
use crate::config::EngineConfig;
use crate::covariance::{
    CovarianceFactory, SpatialCovarianceFactory, TemporalCovarianceFactory, VariogramStore,
};
use crate::element::Scalar;
use crate::error::{AggregationError, Result};
use crate::group::IntegrationPointGroup;
use crate::metadata::DatasetMetadata;
use crate::missing::MissingValueRegistry;
use crate::mode::{mode_sequence, ModeSelection, ModeSequence};
use crate::raster::RasterBlock;
use crate::time_axis::TimeAxisDetector;
use crate::transform::TransformRegistry;

/// Registries and configuration of one dataset.
#[derive(Debug, Clone)]
pub struct AggregationEngine {
    metadata: DatasetMetadata,
    config: EngineConfig,
    transforms: TransformRegistry,
    missing_values: MissingValueRegistry,
}

impl AggregationEngine {
    /// Validate `config` and build the registries for `metadata`.
    ///
    /// Fails on invalid configuration or non-numeric scale/offset attributes.
    /// Missing-value problems never fail construction.
    pub fn new(metadata: DatasetMetadata, config: EngineConfig) -> Result<Self> {
        config.validate().map_err(AggregationError::config)?;
        let transforms = TransformRegistry::new(&metadata)?;
        let missing_values = MissingValueRegistry::with_config(&metadata, &config);

        tracing::info!(
            variables = metadata.variables.len(),
            missing_values = missing_values.len(),
            "aggregation engine ready"
        );

        Ok(Self {
            metadata,
            config,
            transforms,
            missing_values,
        })
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn transforms(&self) -> &TransformRegistry {
        &self.transforms
    }

    pub fn missing_values(&self) -> &MissingValueRegistry {
        &self.missing_values
    }

    /// Missing-value token of `variable`.
    pub fn missing_value(&self, variable: &str) -> Option<Scalar> {
        self.missing_values.get(variable)
    }

    /// Aggregate a block of `variable`, filtering its missing value.
    pub fn aggregate_variable<'a, I>(
        &self,
        variable: &str,
        raster: &'a RasterBlock,
        groups: I,
    ) -> Result<Aggregation<'a>>
    where
        I: IntoIterator<Item = Option<IntegrationPointGroup>>,
        I::IntoIter: 'a,
    {
        aggregate(raster, self.missing_value(variable), groups)
    }

    /// Categorical mode of a block of `variable`, filtering its missing value.
    pub fn mode_variable<'a, I>(
        &self,
        variable: &str,
        raster: &'a RasterBlock,
        groups: I,
    ) -> Result<ModeSequence<'a, I::IntoIter>>
    where
        I: IntoIterator<Item = Option<ModeSelection>>,
    {
        let missing = match self.missing_value(variable) {
            None => None,
            Some(Scalar::U8(token)) => Some(token),
            Some(other) => {
                return Err(AggregationError::MissingValueTypeMismatch {
                    token: other.element_type().to_string(),
                    raster: raster.dtype_name().to_string(),
                })
            }
        };
        mode_sequence(raster, missing, groups)
    }

    /// Decode a raw value of `variable` into physical units.
    pub fn decode(&self, value: f64, variable: &str) -> f64 {
        self.transforms.transform(value, variable)
    }

    /// Weighted mean of `result` in physical units (NaN for no data).
    pub fn mean_decoded(&self, result: &AggregationResult, variable: &str) -> f64 {
        self.decode(result.mean(), variable)
    }

    /// Build the temporal and spatial covariance factories for this dataset.
    pub fn covariance<S, T>(
        &self,
        store: &S,
        detector: &T,
    ) -> (TemporalCovarianceFactory<S::Handle>, SpatialCovarianceFactory<S::Handle>)
    where
        S: VariogramStore + ?Sized,
        T: TimeAxisDetector + ?Sized,
    {
        (
            CovarianceFactory::temporal(&self.metadata, store, detector, &self.config),
            CovarianceFactory::spatial(&self.metadata, store, &self.config),
        )
    }
}
