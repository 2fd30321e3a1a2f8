//! Courier dispatch simulation.
//!
//! A stream of timestamp-sorted orders is matched, one at a time, to the
//! idle courier with the lowest predicted ETA. Orders that find no idle
//! courier are queued and never retried. After the run, `metrics`
//! summarizes the assignment log.

pub mod clock;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod event;
pub mod generator;
pub mod lookup;
pub mod metrics;
pub mod predictor;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod types;

pub use engine::{Decision, DispatchEngine, RunOutcome};
pub use entity::{Assignment, Courier, CourierState, Order};
pub use error::{DispatchError, DispatchResult};
pub use metrics::RunMetrics;
pub use predictor::{EtaModel, EtaPredictor, KinematicModel, ModelEtaPredictor};
