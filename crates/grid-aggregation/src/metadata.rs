//! Dataset metadata as exposed by the storage layer.
//!
//! The catalog/storage backend describes every variable with its storage
//! dtype, the dimensions it is defined over and a key/value attribute map
//! (netCDF-style `scale_factor`, `missing_value`, `units`, ...). The registries
//! in this crate only read this model; they never fetch it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::{ElementType, Scalar};
use crate::error::Result;

/// An attribute value.
///
/// JSON numbers carry no storage width, so a bare number is a float64
/// attribute. Attributes that must keep their native type are written as
/// tagged scalars: `{"type": "int16", "value": -999}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Typed(Scalar),
    Number(f64),
    Text(String),
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// The attribute as a typed scalar, if it is numeric.
    ///
    /// Lists yield their first element.
    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Self::Typed(s) => Some(*s),
            Self::Number(v) => Some(Scalar::F64(*v)),
            Self::Text(_) => None,
            Self::List(items) => items.first().and_then(Self::as_scalar),
        }
    }

    /// The attribute as a number, parsing text if needed.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Text(text) => text.trim().parse().ok(),
            other => other.as_scalar().map(|s| s.as_f64()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Typed(s) => write!(f, "{s}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(t) => write!(f, "\"{t}\""),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Metadata of one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableMetadata {
    /// Storage dtype name as reported by the backend (`"int16"`, `"<f4"`, ...).
    pub dtype: String,
    /// Names of the axes the variable is defined over, outermost first.
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl VariableMetadata {
    pub fn new(dtype: impl Into<String>, dimensions: &[&str]) -> Self {
        Self {
            dtype: dtype.into(),
            dimensions: dimensions.iter().map(|d| d.to_string()).collect(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Parsed storage element type, `None` if the dtype is not supported.
    pub fn element_type(&self) -> Option<ElementType> {
        ElementType::parse(&self.dtype)
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Position of `dimension` in this variable's dimension list.
    pub fn dimension_index(&self, dimension: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d == dimension)
    }
}

/// Metadata of a whole dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    #[serde(default)]
    pub variables: BTreeMap<String, VariableMetadata>,
}

impl DatasetMetadata {
    /// Decode metadata from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_variable(mut self, name: impl Into<String>, variable: VariableMetadata) -> Self {
        self.variables.insert(name.into(), variable);
        self
    }

    pub fn variable(&self, name: &str) -> Option<&VariableMetadata> {
        self.variables.get(name)
    }

    /// Iterate over `(name, metadata)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableMetadata)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }
}
