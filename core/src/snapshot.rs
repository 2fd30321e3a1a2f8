//! Owned copies of engine state for readers outside the engine.
//!
//! A snapshot never borrows from the engine, so a dashboard can hold one
//! while the run keeps mutating couriers.

use crate::{
    entity::{Courier, CourierState},
    types::{CourierId, RunId, SimTime, ZoneId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourierSnapshot {
    pub courier_id:      CourierId,
    pub current_zone:    ZoneId,
    pub available_at:    SimTime,
    pub total_work_time: f64,
    pub assigned_orders: u32,
    pub state:           CourierState,
}

impl CourierSnapshot {
    pub fn capture(courier: &Courier, now: SimTime) -> Self {
        Self {
            courier_id:      courier.courier_id,
            current_zone:    courier.current_zone,
            available_at:    courier.available_at,
            total_work_time: courier.total_work_time,
            assigned_orders: courier.assigned_orders,
            state:           courier.state_at(now),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSnapshot {
    pub run_id:           RunId,
    pub now:              SimTime,
    pub orders_processed: usize,
    pub assigned:         usize,
    pub queued:           usize,
    pub couriers:         Vec<CourierSnapshot>,
}
