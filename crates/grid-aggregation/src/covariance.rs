//! Covariance description factories.
//!
//! The uncertainty evaluator needs, per variable and axis kind, a fitted
//! variogram together with the distance it was fitted against. Variograms
//! come from an external store as opaque handles; this module only attaches
//! the right distance semantics:
//!
//! - temporal: linear `|a - b|`, or circular when the time axis is periodic
//!   (day-of-year climatologies wrap from 365 to 1);
//! - spatial: great-circle distance between `(lat, lon)` points.
//!
//! Both factories scan the dataset once at construction. Lookups afterwards
//! are pure.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::distance::{DistanceMetric, GreatCircle, TimeDistance};
use crate::metadata::DatasetMetadata;
use crate::time_axis::TimeAxisDetector;

/// Source of materialized variograms, keyed by variable and axis key.
///
/// Temporal variograms are keyed by the position of the time dimension in
/// the variable's dimension list (`"0"`, `"1"`, ...); spatial ones by a fixed
/// key (`"spatial"` by default).
pub trait VariogramStore {
    type Handle;

    fn materialize(&self, variable: &str, axis_key: &str) -> Option<Self::Handle>;
}

/// In-memory store, mostly for tests and preloaded catalogs.
impl<H: Clone> VariogramStore for HashMap<(String, String), H> {
    type Handle = H;

    fn materialize(&self, variable: &str, axis_key: &str) -> Option<H> {
        self.get(&(variable.to_string(), axis_key.to_string())).cloned()
    }
}

/// A variogram handle paired with the distance it is evaluated against.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceDescription<D, H> {
    metric: D,
    variogram: H,
}

impl<D: DistanceMetric, H> CovarianceDescription<D, H> {
    pub fn new(metric: D, variogram: H) -> Self {
        Self { metric, variogram }
    }

    /// Distance between two points of this axis kind.
    pub fn distance(&self, a: &D::Point, b: &D::Point) -> f64 {
        self.metric.distance(a, b)
    }

    pub fn metric(&self) -> &D {
        &self.metric
    }

    pub fn variogram(&self) -> &H {
        &self.variogram
    }
}

pub type TemporalCovariance<H> = CovarianceDescription<TimeDistance, H>;
pub type SpatialCovariance<H> = CovarianceDescription<GreatCircle, H>;

/// Variable → covariance description map for one axis kind.
#[derive(Debug, Clone)]
pub struct CovarianceFactory<D, H> {
    descriptions: HashMap<String, CovarianceDescription<D, H>>,
}

pub type TemporalCovarianceFactory<H> = CovarianceFactory<TimeDistance, H>;
pub type SpatialCovarianceFactory<H> = CovarianceFactory<GreatCircle, H>;

impl<H> CovarianceFactory<TimeDistance, H> {
    /// Describe every variable defined over the dataset's time dimension.
    ///
    /// Distances are circular when `config.time_axis_period` is set. A
    /// dataset without a time dimension yields an empty factory.
    pub fn temporal<S, T>(
        dataset: &DatasetMetadata,
        store: &S,
        detector: &T,
        config: &EngineConfig,
    ) -> Self
    where
        S: VariogramStore<Handle = H> + ?Sized,
        T: TimeAxisDetector + ?Sized,
    {
        let mut descriptions = HashMap::new();
        let Some(time_dimension) = detector.time_dimension_name(dataset) else {
            info!("no time dimension found, temporal covariance unavailable");
            return Self { descriptions };
        };
        let metric = TimeDistance::for_period(config.time_axis_period);

        for (name, variable) in dataset.iter() {
            let Some(axis) = variable.dimension_index(&time_dimension) else {
                continue;
            };
            match store.materialize(name, &axis.to_string()) {
                Some(variogram) => {
                    descriptions.insert(name.to_string(), CovarianceDescription::new(metric, variogram));
                }
                None => debug!(variable = name, axis, "no temporal variogram stored"),
            }
        }

        info!(
            time_dimension = time_dimension.as_str(),
            variables = descriptions.len(),
            metric = ?metric,
            "temporal covariance descriptions built"
        );
        Self { descriptions }
    }
}

impl<H> CovarianceFactory<GreatCircle, H> {
    /// Describe every variable that has a spatial variogram.
    pub fn spatial<S>(dataset: &DatasetMetadata, store: &S, config: &EngineConfig) -> Self
    where
        S: VariogramStore<Handle = H> + ?Sized,
    {
        let metric = GreatCircle::new(config.earth_radius_km);
        let key = config.spatial_variogram_key.as_str();

        let descriptions: HashMap<_, _> = dataset
            .iter()
            .filter_map(|(name, _)| {
                store
                    .materialize(name, key)
                    .map(|variogram| (name.to_string(), CovarianceDescription::new(metric, variogram)))
            })
            .collect();

        info!(variables = descriptions.len(), "spatial covariance descriptions built");
        Self { descriptions }
    }
}

impl<D, H> CovarianceFactory<D, H> {
    /// Covariance description of `variable`, if a variogram was stored for it.
    pub fn describe(&self, variable: &str) -> Option<&CovarianceDescription<D, H>> {
        self.descriptions.get(variable)
    }

    /// Described variables, in no particular order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.descriptions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}
