//! The dispatch event log: one entry per decision the engine makes.
//!
//! Entries are append-only and held in memory for the run; nothing
//! persists them across runs.

use crate::types::{CourierId, OrderId, RunId, SimTime, ZoneId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchEvent {
    // ── Engine events ──────────────────────────────
    RunInitialized {
        run_id:   RunId,
        couriers: usize,
    },
    RunCompleted {
        run_id:   RunId,
        assigned: usize,
        queued:   usize,
    },

    // ── Decision events ────────────────────────────
    OrderAssigned {
        time:         SimTime,
        order_id:     OrderId,
        courier_id:   CourierId,
        eta_seconds:  f64,
        candidates:   usize,
        dropoff_zone: ZoneId,
    },
    OrderQueued {
        time:     SimTime,
        order_id: OrderId,
    },
}

impl DispatchEvent {
    /// Stable string name of the variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            DispatchEvent::RunInitialized { .. } => "run_initialized",
            DispatchEvent::RunCompleted { .. }   => "run_completed",
            DispatchEvent::OrderAssigned { .. }  => "order_assigned",
            DispatchEvent::OrderQueued { .. }    => "order_queued",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub seq:        u64,
    pub run_id:     RunId,
    pub event_type: String,
    pub payload:    String,
}
