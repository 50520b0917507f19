//! Distance metrics attached to covariance descriptions.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_EARTH_RADIUS_KM;

/// A distance between two points of one axis kind.
pub trait DistanceMetric: Send + Sync {
    type Point;

    fn distance(&self, a: &Self::Point, b: &Self::Point) -> f64;
}

/// Distance along the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum TimeDistance {
    /// `|a - b|`
    Linear,
    /// Shortest way around a periodic axis, e.g. day of year.
    Circular { period: f64 },
}

impl TimeDistance {
    /// Circular when a period is configured, linear otherwise.
    pub fn for_period(period: Option<f64>) -> Self {
        match period {
            Some(period) => Self::Circular { period },
            None => Self::Linear,
        }
    }

    pub fn between(&self, a: f64, b: f64) -> f64 {
        match *self {
            Self::Linear => (a - b).abs(),
            Self::Circular { period } => (a - b).rem_euclid(period).min((b - a).rem_euclid(period)),
        }
    }
}

impl DistanceMetric for TimeDistance {
    type Point = f64;

    fn distance(&self, a: &f64, b: &f64) -> f64 {
        self.between(*a, *b)
    }
}

/// A geographic location in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Great-circle distance on a sphere, in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreatCircle {
    pub radius_km: f64,
}

impl GreatCircle {
    pub fn new(radius_km: f64) -> Self {
        Self { radius_km }
    }

    /// Haversine distance between two points.
    pub fn between(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        let lat1 = a.lat.to_radians();
        let lat2 = b.lat.to_radians();
        let delta_lat = (b.lat - a.lat).to_radians();
        let delta_lon = (b.lon - a.lon).to_radians();

        let h = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        // Rounding can push h slightly above 1 for antipodal points.
        let c = 2.0 * h.min(1.0).sqrt().asin();

        self.radius_km * c
    }
}

impl Default for GreatCircle {
    fn default() -> Self {
        Self::new(DEFAULT_EARTH_RADIUS_KM)
    }
}

impl DistanceMetric for GreatCircle {
    type Point = GeoPoint;

    fn distance(&self, a: &GeoPoint, b: &GeoPoint) -> f64 {
        self.between(*a, *b)
    }
}
