//! Hazard proximity detection and the single alert slot
//!
//! Only one alert exists at a time. When several vehicle/zone pairs qualify
//! in the same tick, the last pair scanned wins.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::hazard::RiskZone;
use super::reroute::ReroutedSet;
use super::types::{VehicleId, VehicleStatus, ZoneId};
use super::vehicle::Vehicle;

/// The active (vehicle, zone) alert pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertState {
    pub vehicle_id: VehicleId,
    pub zone_id: ZoneId,
}

/// How the alert slot changed after a proximity scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertChange {
    Unchanged,
    Raised(AlertState),
    /// A different pair replaced the previous one
    Switched {
        from: AlertState,
        to: AlertState,
    },
    Cleared(AlertState),
}

/// Find the alert pair for this tick
///
/// Vehicles on the haven path or already safe are ignored, as are zones that
/// are only moderate.
pub fn scan_proximity(
    vehicles: &[Vehicle],
    zones: &[RiskZone],
    rerouted: &ReroutedSet,
    radius_deg: f64,
) -> Option<AlertState> {
    let mut found = None;
    for vehicle in vehicles {
        if rerouted.contains(&vehicle.id) || vehicle.status == VehicleStatus::SafeArrival {
            continue;
        }
        for zone in zones.iter().filter(|z| z.raises_alerts()) {
            if vehicle.position.planar_distance(&zone.position) < radius_deg {
                found = Some(AlertState {
                    vehicle_id: vehicle.id.clone(),
                    zone_id: zone.id.clone(),
                });
            }
        }
    }
    found
}

/// Owner of the alert slot and the siren debounce timestamp
#[derive(Debug, Clone, Default)]
pub struct AlertManager {
    active: Option<AlertState>,
    last_siren: Option<Duration>,
}

impl AlertManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&AlertState> {
        self.active.as_ref()
    }

    /// Replace the slot with the result of this tick's scan
    pub fn apply_scan(&mut self, found: Option<AlertState>) -> AlertChange {
        let previous = std::mem::replace(&mut self.active, found.clone());
        match (previous, found) {
            (None, None) => AlertChange::Unchanged,
            (None, Some(to)) => AlertChange::Raised(to),
            (Some(from), None) => AlertChange::Cleared(from),
            (Some(from), Some(to)) if from == to => AlertChange::Unchanged,
            (Some(from), Some(to)) => AlertChange::Switched { from, to },
        }
    }

    /// Clear the slot if it points at `vehicle_id`
    pub fn clear_for(&mut self, vehicle_id: &VehicleId) -> Option<AlertState> {
        if self
            .active
            .as_ref()
            .is_some_and(|a| &a.vehicle_id == vehicle_id)
        {
            self.active.take()
        } else {
            None
        }
    }

    /// Returns true and records `now` when the siren may sound again
    pub fn siren_due(&mut self, now: Duration, debounce: Duration) -> bool {
        match self.last_siren {
            Some(last) if now.saturating_sub(last) < debounce => false,
            _ => {
                self.last_siren = Some(now);
                true
            }
        }
    }

    pub fn last_siren(&self) -> Option<Duration> {
        self.last_siren
    }
}
