#![deny(warnings)]

//! Runtime for the campus simulation.
//!
//! Serialises player commands and fixed-period ticks against one engine,
//! publishes the committed snapshot to observers and drives the tick clock.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::TickReport;
use sim_econ::{Command, CommandError, Engine, Snapshot};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// Errors produced by the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("tick period must be non-zero")]
    ZeroPeriod,
    #[error("tick driver task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Totals of a batch of ticks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub money_credited: Decimal,
    pub research_credited: Decimal,
    /// Ticks whose income was withheld by the power gate.
    pub brownout_ticks: u64,
}

impl RunSummary {
    fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.money_credited += report.money_credited;
        self.research_credited += report.research_credited;
        if !report.powered {
            self.brownout_ticks += 1;
        }
    }
}

/// Run `ticks` intervals back to back.
pub fn fast_forward(engine: &mut Engine, ticks: u64) -> RunSummary {
    let mut summary = RunSummary::default();
    for _ in 0..ticks {
        summary.record(engine.tick());
    }
    summary
}

/// An engine shared between the tick driver and command handlers.
///
/// Every tick and command runs under one lock, so observers only ever see the
/// state before or after a whole transition.
#[derive(Clone)]
pub struct SharedEngine {
    engine: Arc<Mutex<Engine>>,
    snapshots: Arc<watch::Sender<Snapshot>>,
}

impl SharedEngine {
    pub fn new(engine: Engine) -> Self {
        let (snapshots, _) = watch::channel(engine.snapshot());
        Self {
            engine: Arc::new(Mutex::new(engine)),
            snapshots: Arc::new(snapshots),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Engine> {
        // transitions validate before writing, so a poisoned engine is still whole
        self.engine
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Receive the snapshot after every committed change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    /// Read the engine under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&Engine) -> R) -> R {
        f(&self.lock())
    }

    pub fn execute(&self, command: Command) -> Result<(), CommandError> {
        let mut engine = self.lock();
        let outcome = engine.execute(command);
        self.publish(&engine);
        outcome
    }

    pub fn tick(&self) -> TickReport {
        let mut engine = self.lock();
        let report = engine.tick().clone();
        self.publish(&engine);
        report
    }

    /// Tick period configured for this engine.
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.lock().config().tick_ms)
    }

    /// Take the engine back once every other handle is gone.
    pub fn into_inner(self) -> Result<Engine, Self> {
        let Self { engine, snapshots } = self;
        match Arc::try_unwrap(engine) {
            Ok(mutex) => Ok(mutex
                .into_inner()
                .unwrap_or_else(|poisoned| poisoned.into_inner())),
            Err(engine) => Err(Self { engine, snapshots }),
        }
    }

    fn publish(&self, engine: &Engine) {
        let revision = engine.state().revision;
        self.snapshots.send_if_modified(|current| {
            if current.state.revision == revision {
                return false;
            }
            *current = engine.snapshot();
            true
        });
    }
}

/// Background task ticking a [`SharedEngine`] at a fixed period.
pub struct TickDriver {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<RunSummary>,
}

impl TickDriver {
    /// Start ticking. Must be called from within a tokio runtime.
    pub fn spawn(shared: SharedEngine, period: Duration) -> Result<Self, RuntimeError> {
        if period.is_zero() {
            return Err(RuntimeError::ZeroPeriod);
        }
        let (shutdown, mut stop) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first interval tick completes immediately
            interval.tick().await;
            let mut summary = RunSummary::default();
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        summary.record(&shared.tick());
                    }
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }
            info!(ticks = summary.ticks, brownouts = summary.brownout_ticks, "tick driver stopped");
            summary
        });
        info!(?period, "tick driver started");
        Ok(Self { shutdown, handle })
    }

    /// Stop after the tick in flight, if any, and return what the ticks paid.
    pub async fn stop(self) -> Result<RunSummary, RuntimeError> {
        self.shutdown.send_replace(true);
        Ok(self.handle.await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{Catalog, RoomId, SimConfig};

    fn engine() -> Engine {
        Engine::new(Catalog::standard(), SimConfig::default()).unwrap()
    }

    #[test]
    fn fast_forward_sums_income() {
        let mut e = engine();
        let money = e.state().money;
        let summary = fast_forward(&mut e, 10);
        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.brownout_ticks, 0);
        // four level-1 PCs earn 5 each
        assert_eq!(summary.money_credited, Decimal::from(200));
        assert_eq!(e.state().money, money + Decimal::from(200));
        assert_eq!(e.state().tick, 10);
    }

    #[test]
    fn commands_publish_snapshots() {
        let shared = SharedEngine::new(engine());
        let mut rx = shared.subscribe();
        assert!(!rx.has_changed().unwrap());

        shared
            .execute(Command::BuyClassroomPc {
                classroom: RoomId::new("classroom-1"),
                slot: 1,
            })
            .unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().state.money, Decimal::from(1900));

        // silent rejection changes nothing observable
        let _ = shared.execute(Command::UnlockRoom {
            room: RoomId::new("classroom-3"),
        });
        assert!(!rx.has_changed().unwrap());

        shared.tick();
        assert_eq!(rx.borrow_and_update().state.tick, 1);
        assert_eq!(shared.read(|e| e.state().tick), 1);
    }

    #[test]
    fn into_inner_requires_sole_handle() {
        let shared = SharedEngine::new(engine());
        let other = shared.clone();
        let shared = shared.into_inner().err().unwrap();
        drop(other);
        assert!(shared.into_inner().is_ok());
    }

    #[tokio::test]
    async fn driver_ticks_until_stopped() {
        let shared = SharedEngine::new(engine());
        let driver = TickDriver::spawn(shared.clone(), Duration::from_millis(5)).unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        let summary = driver.stop().await.unwrap();
        assert!(summary.ticks > 0);
        assert_eq!(summary.brownout_ticks, 0);
        // four level-1 PCs earn 5 each
        assert_eq!(summary.money_credited, Decimal::from(20 * summary.ticks));
        let tick = shared.read(|e| e.state().tick);
        assert_eq!(tick, summary.ticks);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(shared.read(|e| e.state().tick), tick);
    }

    #[tokio::test]
    async fn zero_period_is_rejected() {
        let shared = SharedEngine::new(engine());
        assert!(matches!(
            TickDriver::spawn(shared, Duration::ZERO),
            Err(RuntimeError::ZeroPeriod)
        ));
    }

    #[test]
    fn period_follows_config() {
        let shared = SharedEngine::new(engine());
        assert_eq!(shared.period(), Duration::from_millis(1000));
    }
}
