//! Time dimension detection.

use crate::metadata::DatasetMetadata;

/// Finds the dimension a dataset uses as its time axis.
pub trait TimeAxisDetector {
    fn time_dimension_name(&self, dataset: &DatasetMetadata) -> Option<String>;
}

impl<F> TimeAxisDetector for F
where
    F: Fn(&DatasetMetadata) -> Option<String>,
{
    fn time_dimension_name(&self, dataset: &DatasetMetadata) -> Option<String> {
        self(dataset)
    }
}

/// Always reports the same dimension name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedTimeAxis(pub String);

impl TimeAxisDetector for FixedTimeAxis {
    fn time_dimension_name(&self, _dataset: &DatasetMetadata) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Detects the time axis from CF-convention coordinate variables.
///
/// A dimension is the time axis when a coordinate variable of the same name
/// has `axis = "T"`, `standard_name = "time"`, or `units` of the form
/// `"<unit> since <epoch>"`. Failing that, a dimension literally named
/// `time` is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct CfTimeAxisDetector;

impl CfTimeAxisDetector {
    fn is_time_coordinate(dataset: &DatasetMetadata, dimension: &str) -> bool {
        let Some(coordinate) = dataset.variable(dimension) else {
            return false;
        };
        let text = |key: &str| coordinate.attribute(key).and_then(|v| v.as_text());

        text("axis").is_some_and(|a| a.eq_ignore_ascii_case("t"))
            || text("standard_name").is_some_and(|s| s == "time")
            || text("units").is_some_and(|u| u.to_lowercase().contains(" since "))
    }
}

impl TimeAxisDetector for CfTimeAxisDetector {
    fn time_dimension_name(&self, dataset: &DatasetMetadata) -> Option<String> {
        let mut dimensions: Vec<&str> = dataset
            .iter()
            .flat_map(|(_, v)| v.dimensions.iter().map(String::as_str))
            .collect();
        dimensions.sort_unstable();
        dimensions.dedup();

        dimensions
            .iter()
            .find(|d| Self::is_time_coordinate(dataset, d))
            .or_else(|| dimensions.iter().find(|d| d.eq_ignore_ascii_case("time")))
            .map(|d| d.to_string())
    }
}
