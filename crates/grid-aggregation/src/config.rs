//! Configuration for the aggregation engine.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
pub const DEFAULT_EARTH_RADIUS_KM: f64 = 6371.0;

/// Configuration for the aggregation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Period of the time axis (e.g. 365 for day-of-year climatologies).
    /// `None` means time distances are linear.
    pub time_axis_period: Option<f64>,

    /// Attribute keys holding a variable's missing value, in priority order.
    pub missing_value_keys: Vec<String>,

    /// Axis key under which spatial variograms are stored.
    pub spatial_variogram_key: String,

    /// Sphere radius used for great-circle distances, in kilometres.
    pub earth_radius_km: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_axis_period: None,
            missing_value_keys: vec!["missing_value".to_string(), "_FillValue".to_string()],
            spatial_variogram_key: "spatial".to_string(),
            earth_radius_km: DEFAULT_EARTH_RADIUS_KM,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("AGG_TIME_AXIS_PERIOD") {
            if let Ok(period) = val.parse() {
                config.time_axis_period = Some(period);
            }
        }

        if let Ok(val) = std::env::var("AGG_MISSING_VALUE_KEYS") {
            let keys: Vec<String> = val
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
            if !keys.is_empty() {
                config.missing_value_keys = keys;
            }
        }

        if let Ok(val) = std::env::var("AGG_SPATIAL_VARIOGRAM_KEY") {
            if !val.trim().is_empty() {
                config.spatial_variogram_key = val.trim().to_string();
            }
        }

        if let Ok(val) = std::env::var("AGG_EARTH_RADIUS_KM") {
            if let Ok(radius) = val.parse() {
                config.earth_radius_km = radius;
            }
        }

        config
    }

    /// Set a periodic time axis.
    pub fn with_time_axis_period(mut self, period: f64) -> Self {
        self.time_axis_period = Some(period);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(period) = self.time_axis_period {
            if !(period.is_finite() && period > 0.0) {
                return Err(format!("time_axis_period must be > 0, got {period}"));
            }
        }

        if self.missing_value_keys.is_empty() {
            return Err("missing_value_keys must not be empty".to_string());
        }

        if self.spatial_variogram_key.is_empty() {
            return Err("spatial_variogram_key must not be empty".to_string());
        }

        if !(self.earth_radius_km.is_finite() && self.earth_radius_km > 0.0) {
            return Err("earth_radius_km must be > 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.time_axis_period, None);
        assert_eq!(config.missing_value_keys, vec!["missing_value", "_FillValue"]);
        assert_eq!(config.spatial_variogram_key, "spatial");
        assert!((config.earth_radius_km - 6371.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default().with_time_axis_period(0.0);
        assert!(config.validate().is_err());

        config = EngineConfig::default().with_time_axis_period(f64::NAN);
        assert!(config.validate().is_err());

        config = EngineConfig::default();
        config.missing_value_keys.clear();
        assert!(config.validate().is_err());

        config = EngineConfig::default();
        config.earth_radius_km = -1.0;
        assert!(config.validate().is_err());

        config = EngineConfig::default().with_time_axis_period(365.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialize() {
        let json = r#"{
            "time_axis_period": 365.0,
            "missing_value_keys": ["_FillValue"],
            "spatial_variogram_key": "xy",
            "earth_radius_km": 6378.137
        }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.time_axis_period, Some(365.0));
        assert_eq!(config.missing_value_keys, vec!["_FillValue"]);
        assert_eq!(config.spatial_variogram_key, "xy");
    }
}
