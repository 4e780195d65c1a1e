//! Greedy marker clustering for the map view
//!
//! Recomputed from scratch on every render. The grouping depends on input
//! order and is not distance-optimal; it only exists to declutter markers.

use serde::Serialize;

use super::projection::DisplayPoint;
use super::types::{VehicleId, VehicleStatus};

/// A vehicle marker in display coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleMarker {
    pub vehicle_id: VehicleId,
    pub plate: String,
    pub status: VehicleStatus,
    pub point: DisplayPoint,
}

/// One glyph on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClusterGroup {
    Single(VehicleMarker),
    Cluster {
        members: Vec<VehicleMarker>,
        anchor: DisplayPoint,
    },
}

impl ClusterGroup {
    pub fn member_count(&self) -> usize {
        match self {
            ClusterGroup::Single(_) => 1,
            ClusterGroup::Cluster { members, .. } => members.len(),
        }
    }

    pub fn anchor(&self) -> DisplayPoint {
        match self {
            ClusterGroup::Single(marker) => marker.point,
            ClusterGroup::Cluster { anchor, .. } => *anchor,
        }
    }
}

/// Group markers closer than `threshold` display units
///
/// Above `max_zoom` every marker is returned on its own.
pub fn cluster_markers(
    markers: &[VehicleMarker],
    zoom: f64,
    threshold: f64,
    max_zoom: f64,
) -> Vec<ClusterGroup> {
    if zoom > max_zoom {
        return markers.iter().cloned().map(ClusterGroup::Single).collect();
    }

    let mut processed = vec![false; markers.len()];
    let mut groups = Vec::new();

    for (i, seed) in markers.iter().enumerate() {
        if processed[i] {
            continue;
        }
        processed[i] = true;
        let mut members = vec![seed.clone()];

        for (j, other) in markers.iter().enumerate() {
            if processed[j] {
                continue;
            }
            if seed.point.distance(&other.point) < threshold {
                processed[j] = true;
                members.push(other.clone());
            }
        }

        if members.len() > 1 {
            groups.push(ClusterGroup::Cluster {
                members,
                anchor: seed.point,
            });
        } else {
            groups.push(ClusterGroup::Single(seed.clone()));
        }
    }

    groups
}
