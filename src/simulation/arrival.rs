//! Arrival detection and the time-boxed arrival notice

use serde::Serialize;
use std::time::Duration;

use super::reroute::ReroutedSet;
use super::types::{VehicleId, VehicleStatus};
use super::vehicle::Vehicle;

/// A notice that a rerouted vehicle reached the safe haven
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrivalNotice {
    pub vehicle_id: VehicleId,
    pub plate: String,
    #[serde(with = "millis")]
    pub raised_at: Duration,
    #[serde(with = "millis")]
    pub expires_at: Duration,
}

impl ArrivalNotice {
    pub fn is_visible(&self, now: Duration) -> bool {
        now < self.expires_at
    }

    pub fn remaining(&self, now: Duration) -> Duration {
        self.expires_at.saturating_sub(now)
    }
}

/// Acknowledge every vehicle that has just reached the haven
///
/// Removes each arrived vehicle from the rerouted set and returns it, so a
/// vehicle is reported exactly once per reroute cycle.
pub fn acknowledge_arrivals<'a>(
    vehicles: &'a [Vehicle],
    rerouted: &mut ReroutedSet,
) -> Vec<&'a Vehicle> {
    vehicles
        .iter()
        .filter(|v| v.status == VehicleStatus::SafeArrival)
        .filter(|v| rerouted.remove(&v.id))
        .collect()
}

/// Single notice slot; a newer arrival replaces the one on screen
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    current: Option<ArrivalNotice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, vehicle: &Vehicle, now: Duration, ttl: Duration) -> ArrivalNotice {
        let notice = ArrivalNotice {
            vehicle_id: vehicle.id.clone(),
            plate: vehicle.plate.clone(),
            raised_at: now,
            expires_at: now + ttl,
        };
        self.current = Some(notice.clone());
        notice
    }

    /// Drop the notice once its time is up, returning it
    pub fn expire(&mut self, now: Duration) -> Option<ArrivalNotice> {
        if self.current.as_ref().is_some_and(|n| !n.is_visible(now)) {
            self.current.take()
        } else {
            None
        }
    }

    /// The notice still on screen at `now`, if any
    pub fn visible(&self, now: Duration) -> Option<&ArrivalNotice> {
        self.current.as_ref().filter(|n| n.is_visible(now))
    }

    pub fn current(&self) -> Option<&ArrivalNotice> {
        self.current.as_ref()
    }
}

pub(crate) mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
