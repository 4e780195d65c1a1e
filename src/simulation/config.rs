//! Engine tuning parameters
//!
//! Every threshold the engine uses lives here so a scenario or the CLI can
//! override it without touching the simulation code.

use std::time::Duration;

/// Default period of the simulation clock
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(800);

/// Planar radius (degrees) within which a hazard raises an alert
pub const ALERT_RADIUS_DEG: f64 = 0.04;

/// Minimum spacing between two alert sirens
pub const ALERT_DEBOUNCE: Duration = Duration::from_millis(2000);

/// How long an arrival notice stays visible
pub const ARRIVAL_NOTICE_TTL: Duration = Duration::from_millis(6000);

/// Share of the remaining delta covered per tick on the haven path
pub const REROUTE_APPROACH_FRACTION: f64 = 0.03;

/// Share of the remaining delta covered per tick towards a hazard
pub const HAZARD_APPROACH_FRACTION: f64 = 0.02;

/// Per-axis tolerance (degrees) for reaching the safe haven
pub const ARRIVAL_TOLERANCE_DEG: f64 = 0.005;

/// Per-axis tolerance (degrees) for stopping at a hazard
pub const CRITICAL_STOP_TOLERANCE_DEG: f64 = 0.003;

/// Speed a vehicle slows to while approaching a hazard
pub const RISK_APPROACH_SPEED: f64 = 60.0;

/// Speed a stopped or parked vehicle resumes at on the haven path
pub const REROUTE_RESUME_SPEED: f64 = 60.0;

/// Display-plane distance under which markers are grouped
pub const CLUSTER_THRESHOLD: f64 = 5.0;

/// Above this zoom factor markers are never clustered
pub const CLUSTER_MAX_ZOOM: f64 = 1.8;

/// Tunable parameters for a [`SimWorld`](super::SimWorld)
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub tick_interval: Duration,
    pub alert_radius_deg: f64,
    pub alert_debounce: Duration,
    pub arrival_notice_ttl: Duration,
    pub reroute_approach_fraction: f64,
    pub hazard_approach_fraction: f64,
    pub arrival_tolerance_deg: f64,
    pub critical_stop_tolerance_deg: f64,
    pub risk_approach_speed: f64,
    pub reroute_resume_speed: f64,
    pub cluster_threshold: f64,
    pub cluster_max_zoom: f64,
    /// Whether sound cues are requested at all; off until the operator opts in
    pub audio_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            alert_radius_deg: ALERT_RADIUS_DEG,
            alert_debounce: ALERT_DEBOUNCE,
            arrival_notice_ttl: ARRIVAL_NOTICE_TTL,
            reroute_approach_fraction: REROUTE_APPROACH_FRACTION,
            hazard_approach_fraction: HAZARD_APPROACH_FRACTION,
            arrival_tolerance_deg: ARRIVAL_TOLERANCE_DEG,
            critical_stop_tolerance_deg: CRITICAL_STOP_TOLERANCE_DEG,
            risk_approach_speed: RISK_APPROACH_SPEED,
            reroute_resume_speed: REROUTE_RESUME_SPEED,
            cluster_threshold: CLUSTER_THRESHOLD,
            cluster_max_zoom: CLUSTER_MAX_ZOOM,
            audio_enabled: false,
        }
    }
}

impl EngineConfig {
    /// Same defaults with a different clock period
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.audio_enabled = enabled;
        self
    }
}
