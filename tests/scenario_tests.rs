//! End-to-end engine scenarios
//!
//! These drive the Chonburi demo with synthetic time (`tick * interval`) so
//! every run is deterministic.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use fleet_sim::simulation::{
    AudioSink, AudioUnavailable, BoundingBox, ClusterGroup, EngineConfig, GeoPoint, MutedAudio,
    OverlayKind, RerouteOutcome, Scenario, Severity, SimWorld, SoundCue, TickEvent, TickReport,
    VehicleId, VehicleStatus, Viewport, ZoneId,
};

const INTERVAL: Duration = Duration::from_millis(800);

/// Records every cue it is asked to play; clones share the same log
#[derive(Debug, Clone, Default)]
struct RecordingAudio {
    played: Arc<Mutex<Vec<SoundCue>>>,
}

impl RecordingAudio {
    fn new() -> Self {
        Self::default()
    }

    fn played(&self) -> Vec<SoundCue> {
        self.played.lock().unwrap().clone()
    }

    fn count(&self, cue: SoundCue) -> usize {
        self.played().iter().filter(|c| **c == cue).count()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: SoundCue) -> Result<(), AudioUnavailable> {
        self.played.lock().unwrap().push(cue);
        Ok(())
    }
}

fn t04() -> VehicleId {
    VehicleId::from("T-04")
}

/// Tick until `done` holds or `limit` ticks have run; returns the tick count
fn run_until(
    world: &mut SimWorld,
    limit: u64,
    mut done: impl FnMut(&SimWorld, &TickReport) -> bool,
) -> Option<u64> {
    for _ in 0..limit {
        let now = INTERVAL * (world.tick_count() + 1) as u32;
        let report = world.tick(now);
        assert!(
            world.invariant_violations().is_empty(),
            "invariants broken at tick {}: {:?}",
            report.tick,
            world.invariant_violations()
        );
        if done(world, &report) {
            return Some(report.tick);
        }
    }
    None
}

fn step(world: &mut SimWorld) -> TickReport {
    let now = INTERVAL * (world.tick_count() + 1) as u32;
    world.tick(now)
}

fn recording_world() -> (SimWorld, RecordingAudio) {
    let audio = RecordingAudio::new();
    let world = SimWorld::with_audio(
        Scenario::chonburi(),
        EngineConfig::default().with_audio(true),
        Box::new(audio.clone()),
    )
    .unwrap();
    (world, audio)
}

#[test]
fn test_projection_corners_and_centre() {
    let bounds = BoundingBox::CHONBURI;

    let top_left = bounds.project(&GeoPoint::new(13.50, 100.80));
    assert!(top_left.top.abs() < 1e-9);
    assert!(top_left.left.abs() < 1e-9);

    let bottom_right = bounds.project(&GeoPoint::new(12.80, 101.20));
    assert!((bottom_right.top - 100.0).abs() < 1e-9);
    assert!((bottom_right.left - 100.0).abs() < 1e-9);

    let centre = bounds.project(&GeoPoint::new(13.15, 101.00));
    assert!((centre.top - 50.0).abs() < 1e-9);
    assert!((centre.left - 50.0).abs() < 1e-9);
}

#[test]
fn test_t04_converges_to_critical_stop() {
    let mut world = SimWorld::create_demo_world().unwrap();

    let stopped_at = run_until(&mut world, 200, |w, _| {
        w.vehicle(&t04()).unwrap().status == VehicleStatus::CriticalStop
    })
    .expect("T-04 should stop at the accident within 200 ticks");
    assert!(stopped_at > 100, "stopped too early at tick {}", stopped_at);

    let vehicle = world.vehicle(&t04()).unwrap();
    let zone = GeoPoint::new(13.25, 101.08);
    assert!((vehicle.position.lat - zone.lat).abs() < 0.003);
    assert!((vehicle.position.lng - zone.lng).abs() < 0.003);
    assert_eq!(vehicle.speed, 0.0);

    // Terminal without a reroute
    let position = vehicle.position;
    for _ in 0..20 {
        step(&mut world);
    }
    let vehicle = world.vehicle(&t04()).unwrap();
    assert_eq!(vehicle.status, VehicleStatus::CriticalStop);
    assert_eq!(vehicle.position, position);
}

#[test]
fn test_only_t04_raises_alerts_in_demo() {
    let mut world = SimWorld::create_demo_world().unwrap();

    let mut alerted = Vec::new();
    run_until(&mut world, 200, |w, _| {
        if let Some(alert) = w.alert() {
            alerted.push((alert.vehicle_id.clone(), alert.zone_id.clone()));
        }
        false
    });

    assert!(!alerted.is_empty());
    assert!(alerted
        .iter()
        .all(|(v, z)| *v == t04() && *z == ZoneId::from("Z-03")));
}

#[test]
fn test_full_reroute_flow() {
    let (mut world, audio) = recording_world();

    run_until(&mut world, 200, |w, _| {
        w.vehicle(&t04()).unwrap().status == VehicleStatus::CriticalStop
    })
    .expect("T-04 should reach the accident");
    assert_eq!(world.alert().map(|a| a.vehicle_id.clone()), Some(t04()));
    assert!(audio.count(SoundCue::AlertSiren) >= 1);

    // Reroute clears the alert before the next tick
    assert_eq!(world.reroute(&t04()), RerouteOutcome::Accepted);
    assert!(world.alert().is_none());
    assert!(world.rerouted().contains(&t04()));
    assert_eq!(audio.count(SoundCue::RerouteConfirm), 1);

    let report = step(&mut world);
    assert_eq!(world.vehicle(&t04()).unwrap().status, VehicleStatus::Rerouted);
    assert!(world.alert().is_none());
    assert!(report.events.contains(&TickEvent::StatusChanged {
        vehicle_id: t04(),
        from: VehicleStatus::CriticalStop,
        to: VehicleStatus::Rerouted,
    }));

    let mut arrivals = 0;
    let arrived_at = run_until(&mut world, 150, |w, report| {
        arrivals += report.arrivals().count();
        w.vehicle(&t04()).unwrap().status == VehicleStatus::SafeArrival
    })
    .expect("T-04 should reach the haven within 150 ticks");

    assert_eq!(arrivals, 1);
    assert!(!world.rerouted().contains(&t04()));
    assert_eq!(audio.count(SoundCue::ArrivalChime), 1);

    let vehicle = world.vehicle(&t04()).unwrap();
    let haven = world.haven().position;
    assert!((vehicle.position.lat - haven.lat).abs() < 0.005);
    assert!((vehicle.position.lng - haven.lng).abs() < 0.005);

    // Notice is visible for six seconds of engine time
    let raised = INTERVAL * arrived_at as u32;
    let notice = world.notice(raised).expect("arrival notice should be shown");
    assert_eq!(notice.plate, "71-5567");
    assert!(world.notice(raised + Duration::from_millis(5999)).is_some());
    assert!(world.notice(raised + Duration::from_millis(6000)).is_none());

    // Expiry is reported on the first tick at or after six seconds
    let mut expired_events = 0;
    for _ in 0..10 {
        let report = step(&mut world);
        arrivals += report.arrivals().count();
        expired_events += report
            .events
            .iter()
            .filter(|e| matches!(e, TickEvent::NoticeExpired(_)))
            .count();
    }
    assert_eq!(expired_events, 1);
    assert_eq!(arrivals, 1, "arrival must be reported exactly once");
    assert!(world.snapshot(world.elapsed()).notice.is_none());
    assert_eq!(
        world.vehicle(&t04()).unwrap().status,
        VehicleStatus::SafeArrival
    );

    // A vehicle at the haven cannot be rerouted again
    assert_eq!(world.reroute(&t04()), RerouteOutcome::AlreadyArrived);
    assert!(world.rerouted().is_empty());
}

#[test]
fn test_reroute_is_idempotent() {
    let (mut world, audio) = recording_world();

    assert_eq!(world.reroute(&t04()), RerouteOutcome::Accepted);
    assert_eq!(world.reroute(&t04()), RerouteOutcome::AlreadyRerouted);
    assert_eq!(world.reroute(&t04()), RerouteOutcome::AlreadyRerouted);
    assert_eq!(world.rerouted().len(), 1);
    assert_eq!(audio.count(SoundCue::RerouteConfirm), 1);

    let mut arrivals = 0;
    run_until(&mut world, 300, |_, report| {
        arrivals += report.arrivals().count();
        false
    });
    assert_eq!(arrivals, 1);
}

#[test]
fn test_reroute_unknown_vehicle_is_a_noop() {
    let (mut world, audio) = recording_world();
    let before = world.snapshot(Duration::ZERO);

    assert_eq!(
        world.reroute(&VehicleId::from("T-99")),
        RerouteOutcome::UnknownVehicle
    );
    assert!(world.rerouted().is_empty());
    assert_eq!(world.snapshot(Duration::ZERO), before);
    assert!(audio.played().is_empty());
}

#[test]
fn test_reroute_parked_vehicle_moves_it() {
    let mut world = SimWorld::create_demo_world().unwrap();
    let parked = VehicleId::from("T-02");
    let start = world.vehicle(&parked).unwrap().position;

    step(&mut world);
    assert_eq!(world.vehicle(&parked).unwrap().position, start);

    assert_eq!(world.reroute(&parked), RerouteOutcome::Accepted);
    step(&mut world);
    let vehicle = world.vehicle(&parked).unwrap();
    assert_eq!(vehicle.status, VehicleStatus::Rerouted);
    assert_ne!(vehicle.position, start);
}

#[test]
fn test_alert_siren_is_debounced() {
    let (mut world, audio) = recording_world();

    // Drive T-04 into alert range without letting the siren fire
    world.set_audio_enabled(false);
    run_until(&mut world, 200, |w, _| w.alert().is_some()).expect("alert should be raised");
    world.set_audio_enabled(true);

    let t0 = world.elapsed() + Duration::from_secs(10);
    let fired: Vec<bool> = [0, 1500, 2000, 2500, 4000]
        .iter()
        .map(|ms| world.tick(t0 + Duration::from_millis(*ms)).siren)
        .collect();

    assert_eq!(fired, vec![true, false, true, false, true]);
    assert_eq!(audio.count(SoundCue::AlertSiren), 3);
    assert!(world.alert().is_some());
}

#[test]
fn test_muted_audio_does_not_change_alerts() {
    let mut muted = SimWorld::with_audio(
        Scenario::chonburi(),
        EngineConfig::default().with_audio(true),
        Box::new(MutedAudio),
    )
    .unwrap();
    let mut logged = SimWorld::create_demo_world().unwrap();

    for _ in 0..120 {
        step(&mut muted);
        step(&mut logged);
        assert_eq!(muted.alert(), logged.alert());
        assert_eq!(muted.vehicles(), logged.vehicles());
    }
    assert!(muted.alert().is_some());
}

#[test]
fn test_disabled_audio_suppresses_all_cues() {
    let audio = RecordingAudio::new();
    let mut world = SimWorld::with_audio(
        Scenario::chonburi(),
        EngineConfig::default().with_audio(false),
        Box::new(audio.clone()),
    )
    .unwrap();

    run_until(&mut world, 200, |w, _| w.alert().is_some()).expect("alert should be raised");
    world.reroute(&t04());
    run_until(&mut world, 200, |w, _| {
        w.vehicle(&t04()).unwrap().status == VehicleStatus::SafeArrival
    })
    .expect("T-04 should arrive");

    assert!(audio.played().is_empty());
}

#[test]
fn test_clustering_depends_on_zoom() {
    let mut scenario = Scenario::chonburi();
    let template = scenario.vehicles[1].clone();
    let mut a = template.clone();
    a.id = VehicleId::from("A");
    a.position = GeoPoint::new(13.15, 101.00);
    let mut b = template;
    b.id = VehicleId::from("B");
    // 0.021 degrees of latitude is 3 display units in this box
    b.position = GeoPoint::new(13.129, 101.00);
    scenario.vehicles = vec![a, b];

    let world = SimWorld::new(scenario, EngineConfig::default()).unwrap();

    let groups = world.clusters(1.5);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].member_count(), 2);
    assert!(matches!(groups[0], ClusterGroup::Cluster { .. }));

    let groups = world.clusters(2.0);
    assert_eq!(groups.len(), 2);
    assert!(groups
        .iter()
        .all(|g| matches!(g, ClusterGroup::Single(_))));
}

#[test]
fn test_layers_hide_markers() {
    let world = SimWorld::create_demo_world().unwrap();
    let mut viewport = Viewport::new();

    let groups = viewport.visible_markers(&world);
    let total: usize = groups.iter().map(|g| g.member_count()).sum();
    assert_eq!(total, world.vehicles().len());
    assert_eq!(viewport.visible_zones(&world).len(), 3);

    viewport.layers.fleet = false;
    viewport.layers.risk = false;
    assert!(viewport.visible_markers(&world).is_empty());
    assert!(viewport.visible_zones(&world).is_empty());
}

#[test]
fn test_route_overlays_follow_state() {
    let mut world = SimWorld::create_demo_world().unwrap();

    let overlays = world.route_overlays();
    assert_eq!(overlays.len(), 1);
    assert_eq!(overlays[0].vehicle_id, t04());
    assert_eq!(
        overlays[0].kind,
        OverlayKind::RiskTrajectory { alerting: false }
    );

    run_until(&mut world, 200, |w, _| w.alert().is_some()).expect("alert should be raised");
    let overlays = world.route_overlays();
    assert_eq!(
        overlays[0].kind,
        OverlayKind::RiskTrajectory { alerting: true }
    );

    world.reroute(&t04());
    let overlays = world.route_overlays();
    assert_eq!(overlays.len(), 1);
    assert_eq!(overlays[0].kind, OverlayKind::SafeReroute);
    assert_eq!(overlays[0].to, world.bounds().project(&world.haven().position));
}

#[test]
fn test_faulty_vehicle_is_skipped() {
    let mut scenario = Scenario::chonburi();
    let broken = VehicleId::from("T-01");
    if let Some(vehicle) = scenario.vehicles.iter_mut().find(|v| v.id == broken) {
        vehicle.position = GeoPoint::new(f64::NAN, 101.02);
    }
    let mut world = SimWorld::new(scenario, EngineConfig::default()).unwrap();

    let report = step(&mut world);
    assert!(report.events.iter().any(|e| matches!(
        e,
        TickEvent::VehicleSkipped { vehicle_id, .. } if *vehicle_id == broken
    )));

    // The rest of the fleet still moves
    let t04 = world.vehicle(&t04()).unwrap();
    assert_eq!(t04.status, VehicleStatus::RiskWarning);
    assert_ne!(t04.position, GeoPoint::new(13.15, 101.00));
}

#[test]
fn test_snapshot_serializes() {
    let mut world = SimWorld::create_demo_world().unwrap();
    world.reroute(&t04());
    step(&mut world);

    let json = serde_json::to_value(world.snapshot(world.elapsed())).unwrap();
    assert_eq!(json["tick"], 1);
    assert_eq!(json["elapsed"], 800);
    assert_eq!(json["rerouted"][0], "T-04");
    assert_eq!(json["vehicles"][3]["status"], "REROUTED");
}

#[test]
fn test_alert_moves_to_earlier_pair_after_reroute() {
    let mut scenario = Scenario::chonburi();
    let template = scenario.vehicles[0].clone();
    let mut a = template.clone();
    a.id = VehicleId::from("A");
    a.position = GeoPoint::new(13.0, 101.0);
    let mut b = template;
    b.id = VehicleId::from("B");
    b.position = GeoPoint::new(13.2, 101.1);
    scenario.vehicles = vec![a, b];

    let zone_template = scenario.zones[2].clone();
    let mut za = zone_template.clone();
    za.id = ZoneId::from("ZA");
    za.severity = Severity::Critical;
    za.position = GeoPoint::new(13.01, 101.0);
    let mut zb = zone_template.clone();
    zb.id = ZoneId::from("ZB");
    zb.severity = Severity::Warning;
    zb.position = GeoPoint::new(13.21, 101.1);
    let mut zm = zone_template;
    zm.id = ZoneId::from("ZM");
    zm.severity = Severity::Moderate;
    zm.position = GeoPoint::new(13.2, 101.1);
    scenario.zones = vec![za, zb, zm];

    let audio = RecordingAudio::new();
    let mut world = SimWorld::with_audio(
        scenario,
        EngineConfig::default().with_audio(true),
        Box::new(audio.clone()),
    )
    .unwrap();

    let report = step(&mut world);
    let alert = world.alert().cloned().unwrap();
    assert_eq!(alert.vehicle_id, VehicleId::from("B"));
    assert_eq!(alert.zone_id, ZoneId::from("ZB"));
    assert!(report.siren);

    assert_eq!(world.reroute(&VehicleId::from("B")), RerouteOutcome::Accepted);
    assert!(world.alert().is_none());

    let report = step(&mut world);
    let alert = world.alert().cloned().unwrap();
    assert_eq!(alert.vehicle_id, VehicleId::from("A"));
    assert_eq!(alert.zone_id, ZoneId::from("ZA"));
    // Second tick is 800 ms after the first siren
    assert!(!report.siren);
    assert_eq!(audio.count(SoundCue::AlertSiren), 1);
}
