//! Missing-value registry.
//!
//! Each variable may declare a raw sentinel meaning "no observation". The
//! token is normalized once to the variable's storage type so the kernels can
//! compare samples against it without conversion. Problems with the
//! declaration are never fatal: the variable is served unfiltered and the
//! problem is reported as a warning.

use std::collections::HashMap;

use tracing::{trace, warn};

use crate::config::EngineConfig;
use crate::element::{ElementType, Scalar};
use crate::metadata::{AttributeValue, DatasetMetadata, VariableMetadata};

/// A problem absorbed while reading missing-value declarations.
#[derive(Debug, Clone, PartialEq)]
pub enum MissingValueIssue {
    /// The token was converted to the storage type.
    Coerced {
        variable: String,
        original: String,
        coerced: Scalar,
    },
    /// The token cannot be represented in the storage type; dropped.
    Unconvertible {
        variable: String,
        value: String,
        target: ElementType,
    },
    /// The variable's storage type is not one the engine supports; dropped.
    UnsupportedStorage { variable: String, dtype: String },
}

impl MissingValueIssue {
    pub fn variable(&self) -> &str {
        match self {
            Self::Coerced { variable, .. }
            | Self::Unconvertible { variable, .. }
            | Self::UnsupportedStorage { variable, .. } => variable,
        }
    }

    /// Whether the declaration was dropped (as opposed to coerced).
    pub fn is_dropped(&self) -> bool {
        !matches!(self, Self::Coerced { .. })
    }
}

/// Per-variable missing-value tokens, typed as the variable's storage.
#[derive(Debug, Clone, Default)]
pub struct MissingValueRegistry {
    entries: HashMap<String, Scalar>,
    issues: Vec<MissingValueIssue>,
}

impl MissingValueRegistry {
    /// Build the registry using the default attribute keys.
    pub fn new(metadata: &DatasetMetadata) -> Self {
        Self::with_config(metadata, &EngineConfig::default())
    }

    /// Build the registry looking up `config.missing_value_keys` in order.
    pub fn with_config(metadata: &DatasetMetadata, config: &EngineConfig) -> Self {
        let mut registry = Self::default();

        for (name, variable) in metadata.iter() {
            let Some((key, value)) = config
                .missing_value_keys
                .iter()
                .find_map(|key| variable.attribute(key).map(|v| (key, v)))
            else {
                continue;
            };

            match normalize(name, variable, value) {
                Ok((token, issue)) => {
                    if let Some(issue) = issue {
                        registry.report(issue);
                    }
                    registry.entries.insert(name.to_string(), token);
                }
                Err(issue) => registry.report(issue),
            }
            trace!(variable = name, key = key.as_str(), "missing value declaration read");
        }

        registry
    }

    /// Missing-value token of `variable`, if it declares a usable one.
    pub fn get(&self, variable: &str) -> Option<Scalar> {
        self.entries.get(variable).copied()
    }

    /// Diagnostics recorded during construction.
    pub fn issues(&self) -> &[MissingValueIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn report(&mut self, issue: MissingValueIssue) {
        match &issue {
            MissingValueIssue::Coerced {
                variable,
                original,
                coerced,
            } => warn!(
                variable = variable.as_str(),
                original = original.as_str(),
                coerced = %coerced,
                "missing value converted to the variable's storage type"
            ),
            MissingValueIssue::Unconvertible {
                variable,
                value,
                target,
            } => warn!(
                variable = variable.as_str(),
                value = value.as_str(),
                target = %target,
                "missing value cannot be represented in the storage type, ignoring it"
            ),
            MissingValueIssue::UnsupportedStorage { variable, dtype } => warn!(
                variable = variable.as_str(),
                dtype = dtype.as_str(),
                "variable has an unsupported storage type, ignoring its missing value"
            ),
        }
        self.issues.push(issue);
    }
}

type Normalized = (Scalar, Option<MissingValueIssue>);

fn normalize(
    name: &str,
    variable: &VariableMetadata,
    value: &AttributeValue,
) -> Result<Normalized, MissingValueIssue> {
    let Some(target) = variable.element_type() else {
        return Err(MissingValueIssue::UnsupportedStorage {
            variable: name.to_string(),
            dtype: variable.dtype.clone(),
        });
    };

    let converted = match value {
        AttributeValue::Text(text) => Scalar::parse_as(text, target),
        other => match other.as_scalar() {
            Some(native) if native.element_type() == target => return Ok((native, None)),
            Some(native) => native.cast_to(target),
            None => None,
        },
    };

    match converted {
        Some(coerced) => Ok((
            coerced,
            Some(MissingValueIssue::Coerced {
                variable: name.to_string(),
                original: value.to_string(),
                coerced,
            }),
        )),
        None => Err(MissingValueIssue::Unconvertible {
            variable: name.to_string(),
            value: value.to_string(),
            target,
        }),
    }
}
