//! Seed data for a simulation session
//!
//! A scenario is either the built-in Chonburi (EEC) demo or a JSON file with
//! the same shape.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{EngineError, EngineResult};
use super::hazard::{Landmark, RiskZone, SafeHaven};
use super::projection::BoundingBox;
use super::types::{
    GeoPoint, HazardKind, LandmarkKind, Severity, VehicleId, VehicleStatus, ZoneId,
};
use super::vehicle::Vehicle;

/// Everything the engine needs at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub bounds: BoundingBox,
    pub safe_haven: SafeHaven,
    pub zones: Vec<RiskZone>,
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl Scenario {
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check ids are unique and every hazard target exists
    ///
    /// Fixed points (haven and zones) must have finite coordinates. Vehicle
    /// positions are not checked here; a broken vehicle is skipped per tick.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.safe_haven.position.is_finite() {
            return Err(EngineError::Scenario(format!(
                "safe haven {} has a non-finite position",
                self.safe_haven.name
            )));
        }
        if let Some(zone) = self.zones.iter().find(|z| !z.position.is_finite()) {
            return Err(EngineError::Scenario(format!(
                "zone {} has a non-finite position",
                zone.id
            )));
        }

        let mut zone_ids: Vec<&ZoneId> = self.zones.iter().map(|z| &z.id).collect();
        zone_ids.sort();
        if let Some(dup) = zone_ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(EngineError::Configuration(format!(
                "duplicate zone id {}",
                dup[0]
            )));
        }

        let mut vehicle_ids: Vec<&VehicleId> = self.vehicles.iter().map(|v| &v.id).collect();
        vehicle_ids.sort();
        if let Some(dup) = vehicle_ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(EngineError::Configuration(format!(
                "duplicate vehicle id {}",
                dup[0]
            )));
        }

        for vehicle in &self.vehicles {
            if let Some(target) = &vehicle.hazard_target {
                if !self.zones.iter().any(|z| &z.id == target) {
                    return Err(EngineError::Configuration(format!(
                        "vehicle {} targets unknown zone {}",
                        vehicle.id, target
                    )));
                }
            }
        }

        Ok(())
    }

    /// The Chonburi / Eastern Economic Corridor demo
    ///
    /// T-04 is scripted to drive into the accident on Motorway 7 (Z-03); the
    /// other vehicles hold position and exist for clustering.
    pub fn chonburi() -> Self {
        let zone = |id: &str,
                    kind: HazardKind,
                    lat: f64,
                    lng: f64,
                    severity: Severity,
                    value: &str,
                    description: &str,
                    location_name: &str,
                    advice: &str| RiskZone {
            id: ZoneId::from(id),
            kind,
            position: GeoPoint::new(lat, lng),
            severity,
            value: value.to_string(),
            description: description.to_string(),
            location_name: location_name.to_string(),
            advice: advice.to_string(),
        };

        let zones = vec![
            zone(
                "Z-01",
                HazardKind::Congestion,
                13.08,
                100.90,
                Severity::Moderate,
                "Heavy traffic",
                "Dense traffic in front of Laem Chabang port phase 2",
                "Sukhumvit Rd (Laem Chabang)",
                "Take a bypass or allow an extra 30 minutes",
            ),
            zone(
                "Z-02",
                HazardKind::Flood,
                13.35,
                101.02,
                Severity::Warning,
                "Water 20cm",
                "Heavy rain exceeded drainage, standing water on the road",
                "Chonburi city bypass",
                "Small vehicles should avoid; use the motorway frontage road",
            ),
            zone(
                "Z-03",
                HazardKind::Accident,
                13.25,
                101.08,
                Severity::Critical,
                "Serious accident",
                "Overturned truck blocking the two right lanes",
                "Motorway 7 (km 85)",
                "Stop immediately or slow to 30 km/h",
            ),
        ];

        let vehicle = |id: &str,
                       plate: &str,
                       lat: f64,
                       lng: f64,
                       status: VehicleStatus,
                       driver: &str,
                       cargo: &str,
                       destination: &str,
                       speed: f64,
                       heading: f64| Vehicle {
            id: VehicleId::from(id),
            plate: plate.to_string(),
            position: GeoPoint::new(lat, lng),
            status,
            driver: driver.to_string(),
            cargo: cargo.to_string(),
            destination: destination.to_string(),
            speed,
            heading,
            hazard_target: None,
        };

        let mut vehicles = vec![
            vehicle("T-01", "70-4582", 13.15, 101.02, VehicleStatus::Moving, "Somchai M.", "Electronics", "Amata City", 85.0, 340.0),
            vehicle("T-02", "72-9914", 13.09, 100.89, VehicleStatus::Idle, "Wichai M.", "Container", "Port A2", 0.0, 180.0),
            vehicle("T-03", "64-1023", 13.19, 101.04, VehicleStatus::RiskWarning, "Amnat R.", "Chemicals", "Rayong", 20.0, 160.0),
            vehicle("T-04", "71-5567", 13.15, 101.00, VehicleStatus::Moving, "Piti S.", "Auto parts", "Bangkok (Motorway)", 90.0, 45.0),
            vehicle("T-05", "70-1111", 13.16, 101.03, VehicleStatus::Moving, "Test System", "Parcels", "Chonburi", 80.0, 330.0),
            vehicle("T-06", "70-2222", 13.085, 100.895, VehicleStatus::Idle, "Sommai", "Refrigerated", "Port", 0.0, 0.0),
        ];
        if let Some(t04) = vehicles.iter_mut().find(|v| v.id.0 == "T-04") {
            t04.hazard_target = Some(ZoneId::from("Z-03"));
        }

        let landmark = |name: &str, kind: LandmarkKind, lat: f64, lng: f64| Landmark {
            name: name.to_string(),
            kind,
            position: GeoPoint::new(lat, lng),
        };

        let landmarks = vec![
            landmark("Amata City", LandmarkKind::Factory, 13.42, 101.03),
            landmark("Laem Chabang Port", LandmarkKind::Port, 13.08, 100.88),
            landmark("Chonburi City", LandmarkKind::City, 13.36, 100.98),
            landmark("Pattaya City", LandmarkKind::City, 12.92, 100.88),
            landmark("Si Racha", LandmarkKind::City, 13.17, 100.93),
            landmark("Map Ta Phut", LandmarkKind::Factory, 12.85, 101.15),
        ];

        Self {
            bounds: BoundingBox::CHONBURI,
            safe_haven: SafeHaven {
                name: "Safe rest stop (Safe Zone)".to_string(),
                position: GeoPoint::new(13.40, 100.95),
            },
            zones,
            vehicles,
            landmarks,
        }
    }
}
