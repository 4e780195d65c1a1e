//! Core types for the fleet simulation
//!
//! Identifiers, geographic points and the closed enums used by the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a vehicle, e.g. `"T-04"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub String);

/// Identifier of a risk zone, e.g. `"Z-03"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub String);

impl From<&str> for VehicleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for ZoneId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A geographic point in raw degrees
///
/// Distances are planar in degree units; the engine never needs geodesic accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Planar Euclidean distance in degrees
    pub fn planar_distance(&self, other: &GeoPoint) -> f64 {
        let d_lat = self.lat - other.lat;
        let d_lng = self.lng - other.lng;
        (d_lat * d_lat + d_lng * d_lng).sqrt()
    }

    /// Move towards `target` by `fraction` of the remaining delta
    pub fn approach(&self, target: &GeoPoint, fraction: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + (target.lat - self.lat) * fraction,
            lng: self.lng + (target.lng - self.lng) * fraction,
        }
    }

    /// True when both axis deltas to `target` are under `tolerance`
    pub fn within_box(&self, target: &GeoPoint, tolerance: f64) -> bool {
        (target.lat - self.lat).abs() < tolerance && (target.lng - self.lng).abs() < tolerance
    }

    /// Compass-style bearing in degrees (0 = north, 90 = east) on the lat/lng plane
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        let d_lat = other.lat - self.lat;
        let d_lng = other.lng - self.lng;
        if d_lat == 0.0 && d_lng == 0.0 {
            return 0.0;
        }
        d_lng.atan2(d_lat).to_degrees().rem_euclid(360.0)
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}

/// Status of a vehicle
///
/// Transitions are driven by the motion model and the reroute controller only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    /// Parked; only a reroute reactivates it
    Idle,
    Moving,
    /// Approaching its hazard target at reduced speed
    RiskWarning,
    /// Stopped at the hazard; terminal unless rerouted
    CriticalStop,
    /// Following the safe-haven path
    Rerouted,
    /// Reached the safe haven (terminal)
    SafeArrival,
}

impl VehicleStatus {
    /// Human readable label shown on vehicle cards
    pub fn label(&self) -> &'static str {
        match self {
            VehicleStatus::Idle => "Parked",
            VehicleStatus::Moving => "Moving (normal)",
            VehicleStatus::RiskWarning => "Risk watch",
            VehicleStatus::CriticalStop => "Emergency stop",
            VehicleStatus::Rerouted => "Rerouted",
            VehicleStatus::SafeArrival => "Reached safe zone",
        }
    }

    /// Single character used on the terminal map
    pub fn glyph(&self) -> char {
        match self {
            VehicleStatus::Idle => 'i',
            VehicleStatus::Moving => 'm',
            VehicleStatus::RiskWarning => 'w',
            VehicleStatus::CriticalStop => '!',
            VehicleStatus::Rerouted => 'r',
            VehicleStatus::SafeArrival => 's',
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category of a hazard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HazardKind {
    Flood,
    Storm,
    Congestion,
    Accident,
}

/// Severity of a risk zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    Warning,
    Moderate,
}

impl Severity {
    /// Only critical and warning zones raise proximity alerts
    pub fn raises_alerts(&self) -> bool {
        matches!(self, Severity::Critical | Severity::Warning)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical (red)",
            Severity::Warning => "Watch (yellow)",
            Severity::Moderate => "Moderate (orange)",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of a static point of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandmarkKind {
    Factory,
    Port,
    City,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approach_moves_a_fraction_of_the_remaining_delta() {
        let start = GeoPoint::new(13.15, 101.00);
        let target = GeoPoint::new(13.25, 101.08);
        let next = start.approach(&target, 0.02);
        assert!((next.lat - 13.152).abs() < 1e-12);
        assert!((next.lng - 101.0016).abs() < 1e-12);
    }

    #[test]
    fn bearing_points_north_west_for_the_haven() {
        let from = GeoPoint::new(13.25, 101.08);
        let haven = GeoPoint::new(13.40, 100.95);
        let bearing = from.bearing_to(&haven);
        assert!(bearing > 270.0 && bearing < 360.0, "bearing {bearing}");
    }

    #[test]
    fn status_serializes_in_screaming_snake_case() {
        let json = serde_json::to_string(&VehicleStatus::RiskWarning).unwrap();
        assert_eq!(json, "\"RISK_WARNING\"");
    }
}
