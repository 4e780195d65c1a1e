//! Vehicle state and the per-tick motion model
//!
//! Vehicles close in on their goal by a fixed fraction of the remaining
//! delta each tick, so positions converge geometrically rather than at a
//! constant speed.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use super::config::EngineConfig;
use super::hazard::{RiskZone, SafeHaven};
use super::types::{GeoPoint, VehicleId, VehicleStatus, ZoneId};

/// Result of a vehicle update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionUpdate {
    /// Nothing changed this tick
    Unchanged,
    /// Position changed, status stayed the same
    Moved,
    /// Status changed (position may have changed too)
    Changed {
        from: VehicleStatus,
        to: VehicleStatus,
    },
}

/// A fleet vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub plate: String,
    pub position: GeoPoint,
    pub status: VehicleStatus,
    pub driver: String,
    pub cargo: String,
    pub destination: String,
    pub speed: f64,
    /// Degrees, 0 = north
    pub heading: f64,
    /// Zone the scenario drives this vehicle into when it is not rerouted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard_target: Option<ZoneId>,
}

impl Vehicle {
    /// Whether the motion model may move this vehicle at all
    pub fn is_active(&self, rerouted: bool) -> bool {
        match self.status {
            VehicleStatus::SafeArrival => false,
            VehicleStatus::Idle | VehicleStatus::CriticalStop => rerouted,
            VehicleStatus::Moving | VehicleStatus::RiskWarning | VehicleStatus::Rerouted => true,
        }
    }

    /// Advance the vehicle by one tick
    ///
    /// On error the vehicle is left untouched.
    pub fn advance(
        &mut self,
        rerouted: bool,
        haven: &SafeHaven,
        zones: &[RiskZone],
        config: &EngineConfig,
    ) -> Result<MotionUpdate> {
        if !self.is_active(rerouted) {
            return Ok(MotionUpdate::Unchanged);
        }
        if !self.position.is_finite() {
            bail!("vehicle {} has a non-finite position {}", self.id, self.position);
        }

        let previous = self.status;
        if rerouted {
            self.head_for_haven(haven, config);
        } else {
            let Some(target_id) = self.hazard_target.as_ref() else {
                // No scenario route: hold position
                return Ok(MotionUpdate::Unchanged);
            };
            let target = zones
                .iter()
                .find(|z| &z.id == target_id)
                .with_context(|| format!("hazard target {} not found", target_id))?;
            self.head_for_hazard(target, config);
        }

        if self.status != previous {
            Ok(MotionUpdate::Changed {
                from: previous,
                to: self.status,
            })
        } else {
            Ok(MotionUpdate::Moved)
        }
    }

    fn head_for_haven(&mut self, haven: &SafeHaven, config: &EngineConfig) {
        if self
            .position
            .within_box(&haven.position, config.arrival_tolerance_deg)
        {
            self.status = VehicleStatus::SafeArrival;
            self.speed = 0.0;
            return;
        }
        self.heading = self.position.bearing_to(&haven.position);
        if self.speed <= 0.0 {
            self.speed = config.reroute_resume_speed;
        }
        self.position = self
            .position
            .approach(&haven.position, config.reroute_approach_fraction);
        self.status = VehicleStatus::Rerouted;
    }

    fn head_for_hazard(&mut self, target: &RiskZone, config: &EngineConfig) {
        if self
            .position
            .within_box(&target.position, config.critical_stop_tolerance_deg)
        {
            self.status = VehicleStatus::CriticalStop;
            self.speed = 0.0;
            return;
        }
        self.position = self
            .position
            .approach(&target.position, config.hazard_approach_fraction);
        self.speed = config.risk_approach_speed;
        self.status = VehicleStatus::RiskWarning;
    }
}
