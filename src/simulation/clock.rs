//! Simulation clock: runs the world on its own thread at a fixed interval
//!
//! The world is moved into the clock thread, which is its only owner.
//! Operator commands arrive over an `mpsc` channel and are applied between
//! ticks, never during one. The latest snapshot is stored in shared state for
//! polling. A late tick is not made up: missed deadlines are dropped.

use log::{debug, info, warn};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use super::error::{EngineError, EngineResult};
use super::reroute::RerouteOutcome;
use super::types::VehicleId;
use super::world::{SimWorld, Snapshot, TickReport};

/// Messages accepted by the clock thread
enum ClockCommand {
    Reroute {
        vehicle_id: VehicleId,
        reply: mpsc::Sender<RerouteOutcome>,
    },
    SetAudio(bool),
    Shutdown,
}

/// Receives every tick report; called on the clock thread
///
/// A listener must not send commands back through the [`SimulationClock`]
/// handle: the clock thread would wait on a reply only it can send. Such
/// calls are refused with a warning instead of blocking.
pub type TickListener = Box<dyn FnMut(&TickReport) + Send>;

/// Handle to a running clock
///
/// Dropping the handle stops the thread.
pub struct SimulationClock {
    commands: mpsc::Sender<ClockCommand>,
    latest: Arc<Mutex<Option<Snapshot>>>,
    thread: Option<JoinHandle<SimWorld>>,
}

impl SimulationClock {
    /// Start ticking `world` at its configured interval
    pub fn start(world: SimWorld) -> EngineResult<Self> {
        Self::start_with_listener(world, Box::new(|_| {}))
    }

    pub fn start_with_listener(world: SimWorld, listener: TickListener) -> EngineResult<Self> {
        let interval = world.config().tick_interval;
        if interval.is_zero() {
            return Err(EngineError::Configuration(
                "tick interval must be positive".to_string(),
            ));
        }

        let (cmd_tx, cmd_rx) = mpsc::channel::<ClockCommand>();
        let latest = Arc::new(Mutex::new(None));
        let shared = Arc::clone(&latest);

        let thread = std::thread::Builder::new()
            .name("fleet-sim-clock".into())
            .spawn(move || run_clock(world, interval, cmd_rx, &shared, listener))?;

        info!("simulation clock started, interval {:?}", interval);
        Ok(Self {
            commands: cmd_tx,
            latest,
            thread: Some(thread),
        })
    }

    /// Send a reroute command and wait for the clock thread to apply it
    ///
    /// Returns `UnknownVehicle` as well if the clock has already stopped or
    /// the call comes from a tick listener.
    pub fn reroute(&self, vehicle_id: VehicleId) -> RerouteOutcome {
        if self.on_clock_thread() {
            warn!(
                "reroute of {} requested from the clock thread, refused",
                vehicle_id
            );
            return RerouteOutcome::UnknownVehicle;
        }
        let (reply_tx, reply_rx) = mpsc::channel();
        let sent = self.commands.send(ClockCommand::Reroute {
            vehicle_id: vehicle_id.clone(),
            reply: reply_tx,
        });
        if sent.is_err() {
            warn!("clock stopped, reroute of {} dropped", vehicle_id);
            return RerouteOutcome::UnknownVehicle;
        }
        reply_rx.recv().unwrap_or(RerouteOutcome::UnknownVehicle)
    }

    pub fn set_audio_enabled(&self, enabled: bool) {
        let _ = self.commands.send(ClockCommand::SetAudio(enabled));
    }

    /// Latest published snapshot, if a tick or command has run yet
    pub fn snapshot(&self) -> Option<Snapshot> {
        match self.latest.lock() {
            Ok(lock) => lock.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Stop the timer and hand the world back
    pub fn stop(mut self) -> Option<SimWorld> {
        self.shutdown()
    }

    fn on_clock_thread(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|t| t.thread().id() == std::thread::current().id())
    }

    fn shutdown(&mut self) -> Option<SimWorld> {
        if self.on_clock_thread() {
            // Joining from inside would never return
            let _ = self.commands.send(ClockCommand::Shutdown);
            return None;
        }
        let thread = self.thread.take()?;
        let _ = self.commands.send(ClockCommand::Shutdown);
        match thread.join() {
            Ok(world) => {
                info!("simulation clock stopped after {} ticks", world.tick_count());
                Some(world)
            }
            Err(_) => {
                warn!("simulation clock thread panicked");
                None
            }
        }
    }
}

impl Drop for SimulationClock {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn publish(world: &SimWorld, now: Duration, latest: &Mutex<Option<Snapshot>>) {
    let snapshot = world.snapshot(now);
    match latest.lock() {
        Ok(mut lock) => *lock = Some(snapshot),
        Err(poisoned) => *poisoned.into_inner() = Some(snapshot),
    }
}

/// The clock loop. Runs until Shutdown or until every handle is gone.
fn run_clock(
    mut world: SimWorld,
    interval: Duration,
    cmd_rx: mpsc::Receiver<ClockCommand>,
    latest: &Mutex<Option<Snapshot>>,
    mut listener: TickListener,
) -> SimWorld {
    let start = Instant::now();
    let mut next_tick = start + interval;

    loop {
        let now = Instant::now();
        if now >= next_tick {
            let report = world.tick(start.elapsed());
            listener(&report);
            publish(&world, start.elapsed(), latest);

            next_tick += interval;
            let after = Instant::now();
            if next_tick <= after {
                // Behind schedule: drop the missed deadlines
                debug!("tick {} overran, skipping missed ticks", report.tick);
                next_tick = after + interval;
            }
        }

        let wait = next_tick.saturating_duration_since(Instant::now());
        match cmd_rx.recv_timeout(wait) {
            Ok(ClockCommand::Reroute { vehicle_id, reply }) => {
                let outcome = world.reroute(&vehicle_id);
                publish(&world, start.elapsed(), latest);
                let _ = reply.send(outcome);
            }
            Ok(ClockCommand::SetAudio(enabled)) => world.set_audio_enabled(enabled),
            Ok(ClockCommand::Shutdown) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    world
}
