//! Fleet simulation and geofenced risk-alerting engine
//!
//! This module holds the whole engine: vehicle motion, hazard proximity
//! alerts, operator reroutes, arrival detection and marker clustering. It has
//! no rendering dependencies and can be driven tick by tick from tests or by
//! the [`SimulationClock`] in real time.

mod alert;
mod arrival;
mod audio;
mod clock;
mod cluster;
mod config;
mod error;
mod hazard;
mod projection;
mod reroute;
mod scenario;
mod types;
mod vehicle;
mod viewport;
mod world;

pub use alert::{scan_proximity, AlertChange, AlertManager, AlertState};
pub use arrival::{acknowledge_arrivals, ArrivalNotice, NoticeBoard};
pub use audio::{AudioSink, LogAudio, MutedAudio, SoundCue};
pub use clock::{SimulationClock, TickListener};
pub use cluster::{cluster_markers, ClusterGroup, VehicleMarker};
pub use config::{
    EngineConfig, ALERT_DEBOUNCE, ALERT_RADIUS_DEG, ARRIVAL_NOTICE_TTL, ARRIVAL_TOLERANCE_DEG,
    CLUSTER_MAX_ZOOM, CLUSTER_THRESHOLD, CRITICAL_STOP_TOLERANCE_DEG, DEFAULT_TICK_INTERVAL,
    HAZARD_APPROACH_FRACTION, REROUTE_APPROACH_FRACTION, REROUTE_RESUME_SPEED, RISK_APPROACH_SPEED,
};
pub use error::{AudioUnavailable, EngineError, EngineResult};
pub use hazard::{Landmark, RiskZone, SafeHaven};
pub use projection::{BoundingBox, DisplayPoint};
pub use reroute::{ReroutedSet, RerouteOutcome};
pub use scenario::Scenario;
pub use types::{GeoPoint, HazardKind, LandmarkKind, Severity, VehicleId, VehicleStatus, ZoneId};
pub use vehicle::{MotionUpdate, Vehicle};
pub use viewport::{Layers, Viewport, ZoneMarker, DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
pub use world::{
    NoticeView, OverlayKind, RouteOverlay, SimWorld, Snapshot, TickEvent, TickReport,
};
