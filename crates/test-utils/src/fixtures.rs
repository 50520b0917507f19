//! Common test fixtures for grid-aggregation tests.
//!
//! This module provides pre-defined dataset descriptions that represent
//! common scenarios in archived climate data.

/// Packing parameters used by [`crate::create_packed_temperature_grid`].
pub mod packing {
    pub const SCALE_FACTOR: f64 = 0.01;
    pub const ADD_OFFSET: f64 = 273.15;

    /// Packed value reserved for missing observations.
    pub const MISSING: i16 = -32767;
}

/// Variable names used by [`metadata::CLIMATOLOGY_JSON`].
pub mod variables {
    /// Packed `int16` air temperature over `(doy, lat, lon)`.
    pub const AIR: &str = "air";

    /// `float32` precipitation rate over `(lat, lon, doy)` with a float fill value.
    pub const PRATE: &str = "prate";

    /// `uint8` land cover classes over `(band, lat, lon)`.
    pub const LANDCOVER: &str = "landcover";

    /// `int32` elevation over `(lat, lon)` with an out-of-range missing value.
    pub const ELEVATION: &str = "elev";

    /// Day-of-year coordinate variable.
    pub const DOY: &str = "doy";
}

/// Dataset metadata documents as emitted by the catalog backend.
pub mod metadata {
    /// A day-of-year climatology with one variable per supported scenario.
    ///
    /// - `air`: typed `int16` missing value with scale/offset packing
    /// - `prate`: bare-number `_FillValue` that is coerced to `float32`
    /// - `landcover`: `uint8` fill value, for the mode extractor
    /// - `elev`: missing value that does not fit `int32` and is dropped
    /// - `doy`: CF time coordinate (`axis = "T"`)
    pub const CLIMATOLOGY_JSON: &str = r#"{
        "attributes": {
            "title": "Synthetic day-of-year climatology",
            "Conventions": "CF-1.8"
        },
        "variables": {
            "air": {
                "dtype": "int16",
                "dimensions": ["doy", "lat", "lon"],
                "attributes": {
                    "units": "K",
                    "scale_factor": 0.01,
                    "add_offset": 273.15,
                    "missing_value": {"type": "int16", "value": -32767}
                }
            },
            "prate": {
                "dtype": "<f4",
                "dimensions": ["lat", "lon", "doy"],
                "attributes": {
                    "units": "kg m-2 s-1",
                    "_FillValue": -9999.0
                }
            },
            "landcover": {
                "dtype": "uint8",
                "dimensions": ["band", "lat", "lon"],
                "attributes": {
                    "_FillValue": {"type": "uint8", "value": 255}
                }
            },
            "elev": {
                "dtype": "int32",
                "dimensions": ["lat", "lon"],
                "attributes": {
                    "units": "m",
                    "missing_value": 1e12
                }
            },
            "doy": {
                "dtype": "int16",
                "dimensions": ["doy"],
                "attributes": {
                    "axis": "T",
                    "long_name": "day of year"
                }
            }
        }
    }"#;

    /// A dataset with a non-numeric scale factor, rejected at engine construction.
    pub const BAD_SCALE_JSON: &str = r#"{
        "variables": {
            "air": {
                "dtype": "int16",
                "dimensions": ["lat", "lon"],
                "attributes": {"scale_factor": "tenth"}
            }
        }
    }"#;
}

/// Common grid extents for testing.
pub mod grid {
    /// Days in the periodic climatology axis.
    pub const DAYS_PER_YEAR: f64 = 365.0;

    /// Small 4x4 block used by end-to-end scenarios.
    pub const SMALL: GridSpec = GridSpec { height: 4, width: 4 };

    /// Larger block for benchmarks.
    pub const BENCH: GridSpec = GridSpec {
        height: 512,
        width: 512,
    };

    /// Grid specification for testing.
    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub height: usize,
        pub width: usize,
    }

    impl GridSpec {
        /// Returns the total number of grid cells.
        pub fn size(&self) -> usize {
            self.width * self.height
        }

        /// Returns the shape as `[height, width]`.
        pub fn shape(&self) -> Vec<usize> {
            vec![self.height, self.width]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_spec_size() {
        assert_eq!(grid::SMALL.size(), 16);
        assert_eq!(grid::BENCH.shape(), vec![512, 512]);
    }

    #[test]
    fn test_climatology_mentions_every_variable() {
        for name in [
            variables::AIR,
            variables::PRATE,
            variables::LANDCOVER,
            variables::ELEVATION,
            variables::DOY,
        ] {
            assert!(
                metadata::CLIMATOLOGY_JSON.contains(&format!("\"{name}\": {{")),
                "missing {name}"
            );
        }
    }
}
