//! Representation transform registry.
//!
//! Packed variables store `raw` values that decode to physical units as
//! `raw * scale_factor + add_offset`. The registry reads both attributes once
//! per variable; lookups afterwards cannot fail.

use std::collections::HashMap;

use crate::error::{AggregationError, Result};
use crate::metadata::{AttributeValue, DatasetMetadata};

pub const SCALE_FACTOR_KEY: &str = "scale_factor";
pub const ADD_OFFSET_KEY: &str = "add_offset";

/// Affine decoding parameters of one variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Representation {
    pub scale: f64,
    pub offset: f64,
}

impl Representation {
    pub const IDENTITY: Representation = Representation {
        scale: 1.0,
        offset: 0.0,
    };

    #[inline]
    pub fn apply(&self, raw: f64) -> f64 {
        raw * self.scale + self.offset
    }

    #[inline]
    pub fn invert(&self, value: f64) -> f64 {
        (value - self.offset) / self.scale
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Representation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Per-variable `(scale, offset)` lookup.
#[derive(Debug, Clone, Default)]
pub struct TransformRegistry {
    entries: HashMap<String, Representation>,
}

impl TransformRegistry {
    /// Read `scale_factor`/`add_offset` for every variable.
    ///
    /// Fails on the first attribute that is present but not numeric.
    pub fn new(metadata: &DatasetMetadata) -> Result<Self> {
        let mut entries = HashMap::with_capacity(metadata.variables.len());

        for (name, variable) in metadata.iter() {
            let scale = read_number(name, SCALE_FACTOR_KEY, variable.attribute(SCALE_FACTOR_KEY))?
                .unwrap_or(1.0);
            let offset = read_number(name, ADD_OFFSET_KEY, variable.attribute(ADD_OFFSET_KEY))?
                .unwrap_or(0.0);
            entries.insert(name.to_string(), Representation { scale, offset });
        }

        Ok(Self { entries })
    }

    /// Decode a raw value of `variable` into physical units.
    pub fn transform(&self, value: f64, variable: &str) -> f64 {
        self.entry(variable).apply(value)
    }

    /// Encode a physical value of `variable` back into raw units.
    pub fn inverse(&self, value: f64, variable: &str) -> f64 {
        self.entry(variable).invert(value)
    }

    /// Decoding parameters; identity for unknown variables.
    pub fn entry(&self, variable: &str) -> Representation {
        self.entries.get(variable).copied().unwrap_or_default()
    }
}

fn read_number(
    variable: &str,
    attribute: &str,
    value: Option<&AttributeValue>,
) -> Result<Option<f64>> {
    let Some(value) = value else {
        return Ok(None);
    };
    value
        .to_f64()
        .map(Some)
        .ok_or_else(|| AggregationError::InvalidAttribute {
            variable: variable.to_string(),
            attribute: attribute.to_string(),
            value: value.to_string(),
        })
}
