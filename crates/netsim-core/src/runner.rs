//! Shared Simulation and Physics Loop
//!
//! The simulation lives behind one mutex. Each epoch, fraternization pass,
//! growth request, layout tick and snapshot holds the lock for its whole
//! duration, so readers only ever see completed ticks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use netsim_events::{EpochSnapshot, LayoutSnapshot};

use crate::components::AgentId;
use crate::error::SimError;
use crate::output::EpochSink;
use crate::simulation::Simulation;

/// Cloneable handle to a simulation shared between threads
#[derive(Clone)]
pub struct SharedSimulation(Arc<Mutex<Simulation>>);

impl SharedSimulation {
    pub fn new(simulation: Simulation) -> Self {
        Self(Arc::new(Mutex::new(simulation)))
    }

    fn lock(&self) -> MutexGuard<'_, Simulation> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one epoch and hand its snapshot to `sink`.
    ///
    /// The sink is called after the lock is released. A failed write is
    /// reported and the epoch's rows are dropped.
    pub fn step_epoch(&self, sink: Option<&mut dyn EpochSink>) -> EpochSnapshot {
        let snapshot = self.lock().step_epoch();
        if let Some(sink) = sink {
            if let Err(e) = sink.log_epoch(&snapshot) {
                tracing::warn!(epoch = snapshot.epoch, error = %e, "epoch data lost");
            }
        }
        snapshot
    }

    pub fn tick_layout(&self) -> f64 {
        self.lock().tick_layout()
    }

    pub fn fraternize(&self) {
        self.lock().fraternize();
    }

    pub fn grow_at(&self, index: usize) -> Result<AgentId, SimError> {
        self.lock().grow_at(index)
    }

    pub fn update_dissonances(&self, delta: f32) {
        self.lock().update_dissonances(delta);
    }

    pub fn snapshot(&self) -> EpochSnapshot {
        self.lock().snapshot()
    }

    pub fn layout(&self) -> LayoutSnapshot {
        self.lock().layout()
    }

    /// Run `f` against the simulation as a single critical section
    pub fn with<R>(&self, f: impl FnOnce(&mut Simulation) -> R) -> R {
        f(&mut self.lock())
    }
}

/// Background thread running layout ticks at a fixed rate while enabled.
///
/// Disabling only prevents the next tick from being scheduled; a tick in
/// flight always completes.
pub struct PhysicsLoop {
    enabled: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PhysicsLoop {
    /// Start the loop. Physics begins enabled.
    pub fn spawn(simulation: SharedSimulation, tick_rate_hz: u32) -> Self {
        let enabled = Arc::new(AtomicBool::new(true));
        let running = Arc::new(AtomicBool::new(true));
        let period = Duration::from_secs_f64(1.0 / f64::from(tick_rate_hz.max(1)));

        let handle = {
            let enabled = Arc::clone(&enabled);
            let running = Arc::clone(&running);
            thread::spawn(move || {
                while running.load(Ordering::Acquire) {
                    if enabled.load(Ordering::Acquire) {
                        let displacement = simulation.tick_layout();
                        tracing::trace!(displacement, "layout tick");
                    }
                    thread::sleep(period);
                }
            })
        };

        tracing::info!(tick_rate_hz, "physics loop started");
        Self {
            enabled,
            running,
            handle: Some(handle),
        }
    }

    pub fn set_enabled(&self, value: bool) {
        self.enabled.store(value, Ordering::Release);
        tracing::debug!(enabled = value, "physics toggled");
    }

    /// Flip the enabled flag, returning the new value
    pub fn toggle(&self) -> bool {
        let value = !self.enabled.fetch_xor(true, Ordering::AcqRel);
        tracing::debug!(enabled = value, "physics toggled");
        value
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Stop the thread after its current tick and wait for it
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("physics thread panicked");
            }
        }
    }
}

impl Drop for PhysicsLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn shared(seed: u64) -> SharedSimulation {
        let mut config = SimConfig::default();
        config.simulation.agent_count = 10;
        config.simulation.seed = seed;
        SharedSimulation::new(Simulation::new(config).unwrap())
    }

    struct FailingSink;

    impl EpochSink for FailingSink {
        fn log_epoch(&mut self, _: &EpochSnapshot) -> Result<(), crate::output::LoggerError> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    #[test]
    fn test_failed_sink_does_not_stop_epochs() {
        let sim = shared(2);
        let mut sink = FailingSink;

        let first = sim.step_epoch(Some(&mut sink));
        let second = sim.step_epoch(Some(&mut sink));

        assert_eq!(first.epoch, 1);
        assert_eq!(second.epoch, 2);
    }

    #[test]
    fn test_physics_loop_ticks_until_shutdown() {
        let sim = shared(4);
        let physics = PhysicsLoop::spawn(sim.clone(), 200);

        thread::sleep(Duration::from_millis(100));
        physics.shutdown();

        let ticks = sim.with(|s| s.layout_ticks());
        assert!(ticks > 0);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(sim.with(|s| s.layout_ticks()), ticks);
    }

    #[test]
    fn test_disabled_physics_does_not_tick() {
        let sim = shared(4);
        let physics = PhysicsLoop::spawn(sim.clone(), 200);
        physics.set_enabled(false);
        thread::sleep(Duration::from_millis(20));
        let before = sim.with(|s| s.layout_ticks());

        thread::sleep(Duration::from_millis(50));

        assert_eq!(sim.with(|s| s.layout_ticks()), before);
        assert!(physics.toggle());
        assert!(physics.is_enabled());
        physics.shutdown();
    }

    #[test]
    fn test_growth_interleaves_with_physics() {
        let sim = shared(6);
        let physics = PhysicsLoop::spawn(sim.clone(), 200);

        for _ in 0..5 {
            sim.grow_at(0).unwrap();
            sim.step_epoch(None);
        }
        physics.shutdown();

        assert_eq!(sim.with(|s| s.agent_count()), 15);
        assert_eq!(sim.snapshot().len(), 15);
    }
}
