//! Main simulation world that ties everything together
//!
//! `SimWorld` owns all mutable engine state. `tick` and `reroute` are the only
//! operations that change it; everything else is a read-only query.

use log::{debug, info, warn};
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::time::Duration;

use super::alert::{scan_proximity, AlertChange, AlertManager, AlertState};
use super::arrival::{acknowledge_arrivals, millis, ArrivalNotice, NoticeBoard};
use super::audio::{AudioSink, LogAudio, SoundCue};
use super::cluster::{cluster_markers, ClusterGroup, VehicleMarker};
use super::config::EngineConfig;
use super::error::{EngineError, EngineResult};
use super::hazard::{Landmark, RiskZone, SafeHaven};
use super::projection::{BoundingBox, DisplayPoint};
use super::reroute::{ReroutedSet, RerouteOutcome};
use super::scenario::Scenario;
use super::types::{VehicleId, VehicleStatus};
use super::vehicle::{MotionUpdate, Vehicle};
use super::viewport::Viewport;

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    StatusChanged {
        vehicle_id: VehicleId,
        from: VehicleStatus,
        to: VehicleStatus,
    },
    AlertRaised(AlertState),
    AlertSwitched {
        from: AlertState,
        to: AlertState,
    },
    AlertCleared(AlertState),
    Arrived(ArrivalNotice),
    NoticeExpired(ArrivalNotice),
    /// The vehicle's update failed and it kept its previous state
    VehicleSkipped {
        vehicle_id: VehicleId,
        reason: String,
    },
}

/// Everything a single tick produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub events: Vec<TickEvent>,
    /// Whether the alert siren was requested this tick
    pub siren: bool,
}

impl TickReport {
    pub fn arrivals(&self) -> impl Iterator<Item = &ArrivalNotice> {
        self.events.iter().filter_map(|e| match e {
            TickEvent::Arrived(notice) => Some(notice),
            _ => None,
        })
    }
}

/// The arrival notice as the UI sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoticeView {
    pub vehicle_id: VehicleId,
    pub plate: String,
    pub visible: bool,
    #[serde(with = "millis")]
    pub remaining: Duration,
}

/// Read-only copy of the engine state handed to renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(with = "millis")]
    pub elapsed: Duration,
    pub vehicles: Vec<Vehicle>,
    pub alert: Option<AlertState>,
    pub rerouted: Vec<VehicleId>,
    pub notice: Option<NoticeView>,
}

/// Kind of projected route line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayKind {
    /// Rerouted vehicle to the safe haven
    SafeReroute,
    /// Vehicle to the hazard it is heading for
    RiskTrajectory { alerting: bool },
}

/// A projected route line in display coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteOverlay {
    pub vehicle_id: VehicleId,
    pub from: DisplayPoint,
    pub to: DisplayPoint,
    #[serde(flatten)]
    pub kind: OverlayKind,
}

/// The main simulation world
pub struct SimWorld {
    bounds: BoundingBox,
    haven: SafeHaven,
    zones: Vec<RiskZone>,
    vehicles: Vec<Vehicle>,
    landmarks: Vec<Landmark>,

    alerts: AlertManager,
    rerouted: ReroutedSet,
    notices: NoticeBoard,

    audio: Box<dyn AudioSink>,
    config: EngineConfig,

    /// Ticks run so far
    tick_count: u64,
    /// Engine time of the last tick
    elapsed: Duration,
}

impl std::fmt::Debug for SimWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimWorld")
            .field("vehicles", &self.vehicles.len())
            .field("zones", &self.zones.len())
            .field("alert", &self.alerts.active())
            .field("rerouted", &self.rerouted)
            .field("tick_count", &self.tick_count)
            .finish()
    }
}

impl SimWorld {
    /// Build a world from seed data, logging sound cues
    pub fn new(scenario: Scenario, config: EngineConfig) -> EngineResult<Self> {
        Self::with_audio(scenario, config, Box::new(LogAudio))
    }

    pub fn with_audio(
        scenario: Scenario,
        config: EngineConfig,
        audio: Box<dyn AudioSink>,
    ) -> EngineResult<Self> {
        scenario.validate()?;
        if config.tick_interval.is_zero() {
            return Err(EngineError::Configuration(
                "tick interval must be positive".to_string(),
            ));
        }

        info!(
            "fleet world ready: {} vehicles, {} zones, haven {} at {}",
            scenario.vehicles.len(),
            scenario.zones.len(),
            scenario.safe_haven.name,
            scenario.safe_haven.position
        );

        Ok(Self {
            bounds: scenario.bounds,
            haven: scenario.safe_haven,
            zones: scenario.zones,
            vehicles: scenario.vehicles,
            landmarks: scenario.landmarks,
            alerts: AlertManager::new(),
            rerouted: ReroutedSet::new(),
            notices: NoticeBoard::new(),
            audio,
            config,
            tick_count: 0,
            elapsed: Duration::ZERO,
        })
    }

    /// The built-in Chonburi demo with default tuning
    pub fn create_demo_world() -> EngineResult<Self> {
        Self::new(Scenario::chonburi(), EngineConfig::default())
    }

    /// Main simulation tick
    ///
    /// `now` is engine time since start. Runs motion, then proximity, then
    /// arrival detection. Never fails; a vehicle whose update errors keeps
    /// its previous state for this tick.
    pub fn tick(&mut self, now: Duration) -> TickReport {
        self.tick_count += 1;
        self.elapsed = now;

        let mut report = TickReport {
            tick: self.tick_count,
            ..TickReport::default()
        };

        self.update_vehicles(&mut report.events);
        report.siren = self.update_alert(now, &mut report.events);
        self.update_arrivals(now, &mut report.events);

        report
    }

    fn update_vehicles(&mut self, events: &mut Vec<TickEvent>) {
        for vehicle in &mut self.vehicles {
            let rerouted = self.rerouted.contains(&vehicle.id);
            let mut next = vehicle.clone();

            match next.advance(rerouted, &self.haven, &self.zones, &self.config) {
                Ok(MotionUpdate::Unchanged) => {}
                Ok(MotionUpdate::Moved) => *vehicle = next,
                Ok(MotionUpdate::Changed { from, to }) => {
                    debug!("vehicle {}: {:?} -> {:?} at {}", next.id, from, to, next.position);
                    events.push(TickEvent::StatusChanged {
                        vehicle_id: next.id.clone(),
                        from,
                        to,
                    });
                    *vehicle = next;
                }
                Err(e) => {
                    warn!("skipping vehicle {} this tick: {:#}", vehicle.id, e);
                    events.push(TickEvent::VehicleSkipped {
                        vehicle_id: vehicle.id.clone(),
                        reason: format!("{:#}", e),
                    });
                }
            }
        }
    }

    /// Returns true when the siren was requested
    fn update_alert(&mut self, now: Duration, events: &mut Vec<TickEvent>) -> bool {
        let found = scan_proximity(
            &self.vehicles,
            &self.zones,
            &self.rerouted,
            self.config.alert_radius_deg,
        );

        match self.alerts.apply_scan(found) {
            AlertChange::Unchanged => {}
            AlertChange::Raised(alert) => {
                warn!("hazard alert: vehicle {} near zone {}", alert.vehicle_id, alert.zone_id);
                events.push(TickEvent::AlertRaised(alert));
            }
            AlertChange::Switched { from, to } => {
                warn!(
                    "hazard alert moved from {}/{} to {}/{}",
                    from.vehicle_id, from.zone_id, to.vehicle_id, to.zone_id
                );
                events.push(TickEvent::AlertSwitched { from, to });
            }
            AlertChange::Cleared(alert) => {
                info!("hazard alert cleared for vehicle {}", alert.vehicle_id);
                events.push(TickEvent::AlertCleared(alert));
            }
        }

        if self.alerts.active().is_none() || !self.config.audio_enabled {
            return false;
        }
        if !self.alerts.siren_due(now, self.config.alert_debounce) {
            return false;
        }
        play_cue(self.audio.as_mut(), SoundCue::AlertSiren);
        true
    }

    fn update_arrivals(&mut self, now: Duration, events: &mut Vec<TickEvent>) {
        if let Some(expired) = self.notices.expire(now) {
            debug!("arrival notice for {} expired", expired.plate);
            events.push(TickEvent::NoticeExpired(expired));
        }

        let arrived = acknowledge_arrivals(&self.vehicles, &mut self.rerouted);
        for vehicle in arrived {
            let notice = self
                .notices
                .post(vehicle, now, self.config.arrival_notice_ttl);
            info!(
                "vehicle {} ({}) reached {}",
                vehicle.id, vehicle.plate, self.haven.name
            );
            if self.config.audio_enabled {
                play_cue(self.audio.as_mut(), SoundCue::ArrivalChime);
            }
            events.push(TickEvent::Arrived(notice));
        }
    }

    /// Operator command: send a vehicle to the safe haven
    ///
    /// Idempotent. Unknown ids and already-arrived vehicles are ignored.
    /// An alert pointing at the vehicle is cleared in the same call.
    pub fn reroute(&mut self, vehicle_id: &VehicleId) -> RerouteOutcome {
        let Some(vehicle) = self.vehicles.iter().find(|v| &v.id == vehicle_id) else {
            warn!("{}", EngineError::UnknownEntity(vehicle_id.clone()));
            return RerouteOutcome::UnknownVehicle;
        };
        if vehicle.status == VehicleStatus::SafeArrival {
            debug!("vehicle {} already at the haven, reroute ignored", vehicle_id);
            return RerouteOutcome::AlreadyArrived;
        }
        if !self.rerouted.insert(vehicle_id.clone()) {
            debug!("vehicle {} already rerouted", vehicle_id);
            return RerouteOutcome::AlreadyRerouted;
        }

        if let Some(cleared) = self.alerts.clear_for(vehicle_id) {
            info!(
                "alert for vehicle {} at zone {} cleared by reroute",
                cleared.vehicle_id, cleared.zone_id
            );
        }
        info!("vehicle {} rerouted to {}", vehicle_id, self.haven.name);
        if self.config.audio_enabled {
            play_cue(self.audio.as_mut(), SoundCue::RerouteConfirm);
        }
        RerouteOutcome::Accepted
    }

    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.config.audio_enabled = enabled;
    }

    pub fn audio_enabled(&self) -> bool {
        self.config.audio_enabled
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn haven(&self) -> &SafeHaven {
        &self.haven
    }

    pub fn zones(&self) -> &[RiskZone] {
        &self.zones
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle(&self, id: &VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| &v.id == id)
    }

    pub fn alert(&self) -> Option<&AlertState> {
        self.alerts.active()
    }

    pub fn rerouted(&self) -> &ReroutedSet {
        &self.rerouted
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// The arrival notice still on screen at `now`
    pub fn notice(&self, now: Duration) -> Option<&ArrivalNotice> {
        self.notices.visible(now)
    }

    /// Closest hazard to a vehicle and its planar distance in degrees
    pub fn nearest_hazard(&self, id: &VehicleId) -> Option<(&RiskZone, f64)> {
        let vehicle = self.vehicle(id)?;
        self.zones
            .iter()
            .map(|z| (z, vehicle.position.planar_distance(&z.position)))
            .min_by_key(|(_, d)| OrderedFloat(*d))
    }

    /// Vehicle markers in display coordinates, in store order
    pub fn markers(&self) -> Vec<VehicleMarker> {
        self.vehicles
            .iter()
            .map(|v| VehicleMarker {
                vehicle_id: v.id.clone(),
                plate: v.plate.clone(),
                status: v.status,
                point: self.bounds.project(&v.position),
            })
            .collect()
    }

    /// Marker groups for a zoom factor
    pub fn clusters(&self, zoom: f64) -> Vec<ClusterGroup> {
        cluster_markers(
            &self.markers(),
            zoom,
            self.config.cluster_threshold,
            self.config.cluster_max_zoom,
        )
    }

    /// Projected route lines for the map
    pub fn route_overlays(&self) -> Vec<RouteOverlay> {
        let haven = self.bounds.project(&self.haven.position);
        let mut overlays: Vec<RouteOverlay> = self
            .rerouted
            .iter()
            .filter_map(|id| self.vehicle(id))
            .map(|v| RouteOverlay {
                vehicle_id: v.id.clone(),
                from: self.bounds.project(&v.position),
                to: haven,
                kind: OverlayKind::SafeReroute,
            })
            .collect();

        for vehicle in &self.vehicles {
            if self.rerouted.contains(&vehicle.id) || vehicle.status == VehicleStatus::SafeArrival {
                continue;
            }
            let Some(target) = vehicle
                .hazard_target
                .as_ref()
                .and_then(|t| self.zones.iter().find(|z| &z.id == t))
            else {
                continue;
            };
            let alerting = self
                .alerts
                .active()
                .is_some_and(|a| a.vehicle_id == vehicle.id);
            overlays.push(RouteOverlay {
                vehicle_id: vehicle.id.clone(),
                from: self.bounds.project(&vehicle.position),
                to: self.bounds.project(&target.position),
                kind: OverlayKind::RiskTrajectory { alerting },
            });
        }

        overlays
    }

    pub fn snapshot(&self, now: Duration) -> Snapshot {
        Snapshot {
            tick: self.tick_count,
            elapsed: self.elapsed,
            vehicles: self.vehicles.clone(),
            alert: self.alerts.active().cloned(),
            rerouted: self.rerouted.iter().cloned().collect(),
            notice: self.notices.current().map(|n| NoticeView {
                vehicle_id: n.vehicle_id.clone(),
                plate: n.plate.clone(),
                visible: n.is_visible(now),
                remaining: n.remaining(now),
            }),
        }
    }

    /// Describe every broken state invariant; empty when the world is consistent
    ///
    /// Meant to be checked after a tick: between a reroute and the next tick a
    /// rerouted vehicle legitimately still shows its old status.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for vehicle in &self.vehicles {
            let listed = self.rerouted.contains(&vehicle.id);
            if vehicle.status == VehicleStatus::Rerouted && !listed {
                problems.push(format!("{} is Rerouted but not in the rerouted set", vehicle.id));
            }
            if vehicle.status == VehicleStatus::SafeArrival && listed {
                problems.push(format!("{} arrived but was never acknowledged", vehicle.id));
            }
        }
        for id in self.rerouted.iter() {
            if self.vehicle(id).is_none() {
                problems.push(format!("rerouted set holds unknown vehicle {}", id));
            }
        }
        if let Some(alert) = self.alerts.active() {
            if self.rerouted.contains(&alert.vehicle_id) {
                problems.push(format!("alert points at rerouted vehicle {}", alert.vehicle_id));
            }
            if self
                .vehicle(&alert.vehicle_id)
                .is_some_and(|v| v.status == VehicleStatus::SafeArrival)
            {
                problems.push(format!("alert points at arrived vehicle {}", alert.vehicle_id));
            }
        }

        problems
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Fleet Simulation Summary ===");
        println!(
            "Tick: {}, Time: {:.1}s",
            self.tick_count,
            self.elapsed.as_secs_f64()
        );
        println!(
            "Vehicles: {}, Risk zones: {}, Rerouted: {}",
            self.vehicles.len(),
            self.zones.len(),
            self.rerouted.len()
        );
        println!();

        println!("--- Vehicles ---");
        for v in &self.vehicles {
            let nearest = self
                .nearest_hazard(&v.id)
                .map(|(z, d)| format!("{} @ {:.3}°", z.id, d))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {} [{}] {:<18} pos={} speed={:.0} heading={:.0} nearest={}",
                v.id,
                v.plate,
                v.status.label(),
                v.position,
                v.speed,
                v.heading,
                nearest
            );
        }

        println!("--- Alert ---");
        match self.alerts.active() {
            Some(alert) => {
                let advice = self
                    .zones
                    .iter()
                    .find(|z| z.id == alert.zone_id)
                    .map(|z| z.advice.as_str())
                    .unwrap_or("");
                println!("  {} near {}: {}", alert.vehicle_id, alert.zone_id, advice);
            }
            None => println!("  none"),
        }

        if let Some(notice) = self.notices.visible(self.elapsed) {
            println!("--- Arrival ---");
            println!("  {} reached {}", notice.plate, self.haven.name);
        }
    }

    /// Draw the map in the terminal
    pub fn draw_map(&self, viewport: &Viewport) {
        const WIDTH: usize = 60;
        const HEIGHT: usize = 30;

        let mut grid = vec![vec![' '; WIDTH]; HEIGHT];

        let to_grid = |p: DisplayPoint| -> (usize, usize) {
            let row = (p.top / 100.0 * (HEIGHT - 1) as f64).round() as usize;
            let col = (p.left / 100.0 * (WIDTH - 1) as f64).round() as usize;
            (row.min(HEIGHT - 1), col.min(WIDTH - 1))
        };

        for landmark in &self.landmarks {
            let (row, col) = to_grid(self.bounds.project(&landmark.position));
            grid[row][col] = '+';
        }

        for marker in viewport.visible_zones(self) {
            let (row, col) = to_grid(marker.point);
            grid[row][col] = if marker.zone.raises_alerts() { 'X' } else { 'x' };
        }

        let (row, col) = to_grid(self.bounds.project(&self.haven.position));
        grid[row][col] = 'H';

        for group in viewport.visible_markers(self) {
            let (row, col) = to_grid(group.anchor());
            grid[row][col] = match &group {
                ClusterGroup::Single(marker) => marker.status.glyph(),
                ClusterGroup::Cluster { members, .. } => {
                    char::from_digit(members.len().min(9) as u32, 10).unwrap_or('#')
                }
            };
        }

        println!("\n=== Fleet Map (zoom {:.1}) ===", viewport.zoom());
        println!("Legend: H=Haven, X=Alerting zone, x=Other zone, +=Landmark, digit=Cluster size");
        println!("        m=Moving, w=Risk watch, !=Stopped, r=Rerouted, s=Safe, i=Parked");
        println!("{}", "-".repeat(WIDTH + 2));
        for row in &grid {
            let line: String = row.iter().collect();
            println!("|{}|", line);
        }
        println!("{}", "-".repeat(WIDTH + 2));
    }
}

fn play_cue(audio: &mut dyn AudioSink, cue: SoundCue) {
    if let Err(e) = audio.play(cue) {
        debug!("{:?} not played: {}", cue, e);
    }
}
