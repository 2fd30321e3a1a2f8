//! Shared primitive types used across the entire simulation.

/// Simulated time in seconds since the start of the run.
pub type SimTime = f64;

/// A discretized geographic area.
pub type ZoneId = u32;

pub type OrderId = u64;

pub type CourierId = u64;

/// The canonical run identifier.
pub type RunId = String;
