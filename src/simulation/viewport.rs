//! Map viewport: zoom level and layer visibility
//!
//! The viewport only shapes what gets drawn. It never touches simulation state.

use serde::Serialize;

use super::cluster::{cluster_markers, ClusterGroup};
use super::hazard::RiskZone;
use super::projection::DisplayPoint;
use super::world::SimWorld;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 4.0;
pub const ZOOM_STEP: f64 = 0.4;
pub const DEFAULT_ZOOM: f64 = 1.2;

/// Which overlays are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Layers {
    pub fleet: bool,
    pub risk: bool,
    /// Carried for map front ends; the engine has no traffic overlay
    pub traffic: bool,
    /// Carried for map front ends; the engine has no weather overlay
    pub weather: bool,
}

impl Default for Layers {
    fn default() -> Self {
        Self {
            fleet: true,
            risk: true,
            traffic: true,
            weather: true,
        }
    }
}

/// A risk zone placed on the display plane
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneMarker<'a> {
    pub zone: &'a RiskZone,
    pub point: DisplayPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pub layers: Layers,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            layers: Layers::default(),
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = if zoom.is_finite() {
            zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            DEFAULT_ZOOM
        };
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn reset(&mut self) {
        self.zoom = DEFAULT_ZOOM;
    }

    /// Vehicle glyphs to draw, clustered for the current zoom
    pub fn visible_markers(&self, world: &SimWorld) -> Vec<ClusterGroup> {
        if !self.layers.fleet {
            return Vec::new();
        }
        let config = world.config();
        cluster_markers(
            &world.markers(),
            self.zoom,
            config.cluster_threshold,
            config.cluster_max_zoom,
        )
    }

    /// Risk zone glyphs to draw
    pub fn visible_zones<'a>(&self, world: &'a SimWorld) -> Vec<ZoneMarker<'a>> {
        if !self.layers.risk {
            return Vec::new();
        }
        world
            .zones()
            .iter()
            .map(|zone| ZoneMarker {
                zone,
                point: world.bounds().project(&zone.position),
            })
            .collect()
    }
}
