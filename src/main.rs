use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fleet_sim::simulation::{
    EngineConfig, RerouteOutcome, Scenario, SimWorld, SimulationClock, TickEvent, TickReport,
    VehicleId, Viewport,
};

#[derive(Parser)]
#[command(name = "fleet_sim")]
#[command(about = "Fleet risk simulation with hazard alerts and operator reroutes")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "300")]
    ticks: u64,

    /// Tick interval in milliseconds
    #[arg(long, default_value = "800")]
    interval_ms: u64,

    /// Tick against the wall clock instead of stepping as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Load seed data from a JSON scenario file instead of the built-in demo
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Reroute a vehicle before a tick, e.g. T-04@200 (repeatable)
    #[arg(long = "reroute", value_parser = parse_reroute)]
    reroutes: Vec<(VehicleId, u64)>,

    /// Map zoom factor used for clustering
    #[arg(long, default_value = "1.2")]
    zoom: f64,

    /// Print a summary every N ticks (0 prints only the final state)
    #[arg(long, default_value = "100")]
    summary_every: u64,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Disable sound cues
    #[arg(long)]
    mute: bool,
}

fn parse_reroute(value: &str) -> Result<(VehicleId, u64), String> {
    let (id, tick) = value
        .split_once('@')
        .ok_or_else(|| format!("expected VEHICLE@TICK, got '{}'", value))?;
    if id.is_empty() {
        return Err(format!("missing vehicle id in '{}'", value));
    }
    let tick = tick
        .parse::<u64>()
        .map_err(|e| format!("bad tick in '{}': {}", value, e))?;
    Ok((VehicleId::from(id), tick))
}

/// Counters reported when the run completes
#[derive(Debug, Default)]
struct RunStats {
    ticks: u64,
    alerts_raised: u32,
    sirens: u32,
    reroutes_accepted: u32,
    arrivals: u32,
    skipped_updates: u32,
}

impl RunStats {
    fn record(&mut self, report: &TickReport) {
        self.ticks = report.tick;
        if report.siren {
            self.sirens += 1;
        }
        for event in &report.events {
            match event {
                TickEvent::StatusChanged {
                    vehicle_id,
                    from,
                    to,
                } => info!("tick {}: {} {} -> {}", report.tick, vehicle_id, from, to),
                TickEvent::AlertRaised(_) | TickEvent::AlertSwitched { .. } => {
                    self.alerts_raised += 1
                }
                TickEvent::Arrived(notice) => {
                    info!("tick {}: ARRIVAL {} is safe", report.tick, notice.plate);
                    self.arrivals += 1;
                }
                TickEvent::VehicleSkipped { .. } => self.skipped_updates += 1,
                TickEvent::AlertCleared(_) | TickEvent::NoticeExpired(_) => {}
            }
        }
    }

    fn log(&self, world: &SimWorld) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Ticks run: {}", self.ticks);
        info!("Alerts raised: {}", self.alerts_raised);
        info!("Alert sirens: {}", self.sirens);
        info!("Reroutes accepted: {}", self.reroutes_accepted);
        info!("Arrivals: {}", self.arrivals);
        info!("Skipped vehicle updates: {}", self.skipped_updates);
        match world.alert() {
            Some(alert) => info!("Active alert: {} near {}", alert.vehicle_id, alert.zone_id),
            None => info!("Active alert: none"),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn,fleet_sim=info"))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.interval_ms == 0 {
        bail!("--interval-ms must be positive");
    }

    let scenario = match &cli.scenario {
        Some(path) => Scenario::from_json_file(path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => Scenario::chonburi(),
    };
    let config = EngineConfig::default()
        .with_tick_interval(Duration::from_millis(cli.interval_ms))
        .with_audio(!cli.mute);
    let world = SimWorld::new(scenario, config).context("building simulation world")?;

    let mut viewport = Viewport::new();
    viewport.set_zoom(cli.zoom);

    let world = if cli.realtime {
        run_realtime(world, &cli)?
    } else {
        run_headless(world, &cli)
    };

    println!("=== Final State ===");
    world.print_summary();
    world.draw_map(&viewport);

    if cli.json {
        let snapshot = world.snapshot(world.elapsed());
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("serializing snapshot")?
        );
    }
    Ok(())
}

/// Step the world as fast as possible with synthetic time
fn run_headless(mut world: SimWorld, cli: &Cli) -> SimWorld {
    println!("Running fleet simulation in headless mode...");
    println!("Ticks: {}, Interval: {}ms", cli.ticks, cli.interval_ms);
    println!();

    let interval = world.config().tick_interval;
    let mut stats = RunStats::default();

    for tick in 1..=cli.ticks {
        for (vehicle_id, _) in cli.reroutes.iter().filter(|(_, at)| *at == tick) {
            if issue_reroute(vehicle_id, world.reroute(vehicle_id)) {
                stats.reroutes_accepted += 1;
            }
        }

        let report = world.tick(interval * tick as u32);
        stats.record(&report);

        if cli.summary_every > 0 && tick % cli.summary_every == 0 && tick < cli.ticks {
            println!("--- After tick {} ---", tick);
            world.print_summary();
            println!();
        }
    }

    stats.log(&world);
    world
}

/// Drive the world with the real-time clock and poll its snapshots
fn run_realtime(world: SimWorld, cli: &Cli) -> Result<SimWorld> {
    println!("Running fleet simulation in real time...");
    println!("Ticks: {}, Interval: {}ms", cli.ticks, cli.interval_ms);
    println!();

    let stats = Arc::new(Mutex::new(RunStats::default()));
    let listener_stats = Arc::clone(&stats);
    let clock = SimulationClock::start_with_listener(
        world,
        Box::new(move |report: &TickReport| {
            if let Ok(mut stats) = listener_stats.lock() {
                stats.record(report);
            }
        }),
    )
    .context("starting simulation clock")?;

    let poll = Duration::from_millis((cli.interval_ms / 4).max(1));
    let mut pending: Vec<(VehicleId, u64)> = cli.reroutes.clone();
    let mut accepted = 0;
    loop {
        let tick = clock.snapshot().map(|s| s.tick).unwrap_or(0);
        pending.retain(|(vehicle_id, at)| {
            if *at > tick + 1 {
                return true;
            }
            if issue_reroute(vehicle_id, clock.reroute(vehicle_id.clone())) {
                accepted += 1;
            }
            false
        });
        if tick >= cli.ticks {
            break;
        }
        std::thread::sleep(poll);
    }

    let world = clock.stop().context("simulation clock did not shut down cleanly")?;
    if let Ok(mut stats) = stats.lock() {
        stats.reroutes_accepted += accepted;
        stats.log(&world);
    }
    Ok(world)
}

fn issue_reroute(vehicle_id: &VehicleId, outcome: RerouteOutcome) -> bool {
    match outcome {
        RerouteOutcome::Accepted => info!("reroute {}: accepted", vehicle_id),
        other => info!("reroute {}: {:?}", vehicle_id, other),
    }
    outcome.is_accepted()
}
