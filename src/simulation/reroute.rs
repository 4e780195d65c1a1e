//! The set of vehicles following the safe-haven path

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

use super::types::VehicleId;

/// Outcome of a reroute command
///
/// None of these are failures; the command never errors back to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerouteOutcome {
    /// Vehicle added to the haven path
    Accepted,
    /// Already on the haven path; nothing changed
    AlreadyRerouted,
    /// Vehicle already reached the haven; nothing changed
    AlreadyArrived,
    /// No such vehicle; nothing changed
    UnknownVehicle,
}

impl RerouteOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RerouteOutcome::Accepted)
    }
}

/// Rerouted vehicle ids, ordered for stable iteration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReroutedSet {
    ids: BTreeSet<VehicleId>,
}

impl ReroutedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the id was already present
    pub fn insert(&mut self, id: VehicleId) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: &VehicleId) -> bool {
        self.ids.remove(id)
    }

    pub fn contains(&self, id: &VehicleId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VehicleId> {
        self.ids.iter()
    }
}

impl Serialize for ReroutedSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.ids.iter())
    }
}
