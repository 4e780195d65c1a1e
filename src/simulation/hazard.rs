//! Static map features: risk zones, the safe haven and landmarks
//!
//! All of these are created once from seed data and never change.

use serde::{Deserialize, Serialize};

use super::types::{GeoPoint, HazardKind, LandmarkKind, Severity, ZoneId};

/// A geofenced hazard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskZone {
    pub id: ZoneId,
    pub kind: HazardKind,
    pub position: GeoPoint,
    pub severity: Severity,
    /// Short headline, e.g. "Water 20cm"
    #[serde(default)]
    pub value: String,
    pub description: String,
    #[serde(default)]
    pub location_name: String,
    pub advice: String,
}

impl RiskZone {
    pub fn raises_alerts(&self) -> bool {
        self.severity.raises_alerts()
    }
}

/// The rally point rerouted vehicles are driven to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeHaven {
    pub name: String,
    pub position: GeoPoint,
}

/// A named point of interest drawn on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub name: String,
    pub kind: LandmarkKind,
    pub position: GeoPoint,
}
