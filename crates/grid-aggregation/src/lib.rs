//! Typed Raster Aggregation Engine
//!
//! Reduces resident blocks of gridded climate data to weighted integrals,
//! categorical modes and covariance descriptions. Raster storage arrives
//! type-erased (any of the ten numeric element types, or raw bytes tagged
//! with a dtype string); the engine picks a monomorphized kernel once per
//! call and never dispatches per sample.
//!
//! - **Representation transforms**: `scale_factor`/`add_offset` decoding of
//!   packed values
//! - **Missing values**: per-variable sentinel tokens, coerced to the
//!   variable's storage type
//! - **Weighted aggregation**: `Σ w·v` and `Σ w` over integration-point
//!   groups, skipping missing samples
//! - **Categorical mode**: most frequent class of `uint8` rasters
//! - **Covariance descriptions**: stored variograms paired with temporal or
//!   great-circle distance
//!
//! # Architecture
//!
//! ```text
//! DatasetMetadata (loaded once)
//!      │
//!      ▼
//! AggregationEngine::new(metadata, config)
//!      │
//!      ├─► TransformRegistry      (scale/offset per variable)
//!      ├─► MissingValueRegistry   (typed sentinel per variable)
//!      │
//!      ├─► aggregate_variable(var, block, groups)
//!      │         │
//!      │         └─► match element type once ─► BlockView<T>::accumulate
//!      │                                             │
//!      │                                             ▼
//!      │                                   lazy AggregationResult stream
//!      │
//!      ├─► mode_variable(var, block, selections)
//!      │         │
//!      │         └─► 256-bin histogram per selection
//!      │
//!      └─► covariance(store, detector)
//!                │
//!                ├─► temporal: TimeDistance (linear or circular)
//!                └─► spatial:  GreatCircle (haversine, km)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_aggregation::{AggregationEngine, AxisPoints, DatasetMetadata, EngineConfig,
//!     IntegrationPointGroup, RasterBlock};
//!
//! let metadata = DatasetMetadata::from_json(&json)?;
//! let engine = AggregationEngine::new(metadata, EngineConfig::from_env())?;
//!
//! let block = RasterBlock::from_bytes("int16", bytes, vec![4, 4], vec![0, 0])?;
//! let group = IntegrationPointGroup::new(vec![
//!     AxisPoints::uniform(1..3, 0.5),
//!     AxisPoints::uniform(1..3, 0.5),
//! ]);
//!
//! for result in engine.aggregate_variable("air", &block, vec![Some(group), None])? {
//!     let result = result?;
//!     println!("{}", engine.mean_decoded(&result, "air"));
//! }
//! ```

pub mod aggregate;
pub mod config;
pub mod covariance;
pub mod distance;
pub mod element;
pub mod engine;
pub mod error;
pub mod group;
pub mod kernel;
pub mod metadata;
pub mod missing;
pub mod mode;
pub mod raster;
pub mod time_axis;
pub mod transform;

// Re-export commonly used types at crate root
pub use aggregate::{aggregate, Aggregation, AggregationResult};
pub use config::{EngineConfig, DEFAULT_EARTH_RADIUS_KM};
pub use covariance::{
    CovarianceDescription, CovarianceFactory, SpatialCovariance, SpatialCovarianceFactory,
    TemporalCovariance, TemporalCovarianceFactory, VariogramStore,
};
pub use distance::{DistanceMetric, GeoPoint, GreatCircle, TimeDistance};
pub use element::{ElementType, Sample, Scalar};
pub use engine::AggregationEngine;
pub use error::{AggregationError, Result};
pub use group::{AxisPoints, IntegrationPointGroup};
pub use kernel::BlockView;
pub use metadata::{AttributeValue, DatasetMetadata, VariableMetadata};
pub use missing::{MissingValueIssue, MissingValueRegistry};
pub use mode::{histogram_mode, mode_sequence, ModeSelection, ModeSequence};
pub use raster::{RasterBlock, RasterData, RasterElement};
pub use time_axis::{CfTimeAxisDetector, FixedTimeAxis, TimeAxisDetector};
pub use transform::{Representation, TransformRegistry, ADD_OFFSET_KEY, SCALE_FACTOR_KEY};
