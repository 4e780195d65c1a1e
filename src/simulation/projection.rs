//! Geographic to display-plane projection
//!
//! Maps a lat/lng point into percentage coordinates of the map view.

use serde::{Deserialize, Serialize};

use super::error::{EngineError, EngineResult};
use super::types::GeoPoint;

/// A point on the display plane, both axes in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayPoint {
    pub top: f64,
    pub left: f64,
}

impl DisplayPoint {
    pub fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }

    pub fn distance(&self, other: &DisplayPoint) -> f64 {
        let d_top = self.top - other.top;
        let d_left = self.left - other.left;
        (d_top * d_top + d_left * d_left).sqrt()
    }
}

/// Geographic bounding box of the map view
///
/// Can only be built through [`BoundingBox::new`], so a degenerate box never
/// reaches the projector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBounds")]
pub struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

#[derive(Deserialize)]
struct RawBounds {
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

impl TryFrom<RawBounds> for BoundingBox {
    type Error = EngineError;

    fn try_from(raw: RawBounds) -> EngineResult<Self> {
        BoundingBox::new(raw.min_lat, raw.max_lat, raw.min_lng, raw.max_lng)
    }
}

impl BoundingBox {
    /// Sattahip to Chonburi city, Gulf coast to Ban Bueng
    pub const CHONBURI: BoundingBox = BoundingBox {
        min_lat: 12.80,
        max_lat: 13.50,
        min_lng: 100.80,
        max_lng: 101.20,
    };

    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> EngineResult<Self> {
        if [min_lat, max_lat, min_lng, max_lng]
            .iter()
            .any(|v| !v.is_finite())
        {
            return Err(EngineError::Configuration(
                "bounding box has a non-finite bound".to_string(),
            ));
        }
        if max_lat == min_lat {
            return Err(EngineError::Configuration(format!(
                "bounding box has zero latitude span at {min_lat}"
            )));
        }
        if max_lng == min_lng {
            return Err(EngineError::Configuration(format!(
                "bounding box has zero longitude span at {min_lng}"
            )));
        }
        Ok(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    pub fn min_lng(&self) -> f64 {
        self.min_lng
    }

    pub fn max_lng(&self) -> f64 {
        self.max_lng
    }

    /// Project a point onto the display plane, clamping points outside the box
    pub fn project(&self, point: &GeoPoint) -> DisplayPoint {
        let top = (self.max_lat - point.lat) / (self.max_lat - self.min_lat) * 100.0;
        let left = (point.lng - self.min_lng) / (self.max_lng - self.min_lng) * 100.0;
        DisplayPoint {
            top: top.clamp(0.0, 100.0),
            left: left.clamp(0.0, 100.0),
        }
    }
}
