//! Orders, couriers and the assignment records linking them.
//!
//! RULE: Only the dispatch engine mutates a Courier during a run.
//! Everything else reads couriers through a snapshot.

use crate::{
    error::{DispatchError, DispatchResult},
    types::{CourierId, OrderId, SimTime, ZoneId},
};
use serde::{Deserialize, Serialize};

/// A delivery request. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id:     OrderId,
    pub timestamp:    SimTime,
    pub pickup_zone:  ZoneId,
    pub dropoff_zone: ZoneId,
}

impl Order {
    /// Build an order, rejecting a trip that starts and ends in the same
    /// zone and a timestamp that is not a finite number.
    pub fn new(
        order_id: OrderId,
        timestamp: SimTime,
        pickup_zone: ZoneId,
        dropoff_zone: ZoneId,
    ) -> DispatchResult<Self> {
        if pickup_zone == dropoff_zone {
            return Err(DispatchError::InvalidOrder { order_id, zone: pickup_zone });
        }
        if !timestamp.is_finite() {
            return Err(DispatchError::InvalidTimestamp { order_id, timestamp });
        }
        Ok(Self { order_id, timestamp, pickup_zone, dropoff_zone })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Courier {
    pub courier_id:      CourierId,
    pub current_zone:    ZoneId,
    /// Never decreases over a run.
    pub available_at:    SimTime,
    /// Sum of the ETAs of every assignment naming this courier.
    pub total_work_time: f64,
    pub assigned_orders: u32,
}

impl Courier {
    /// A fresh courier, idle from time 0.
    pub fn new(courier_id: CourierId, current_zone: ZoneId) -> Self {
        Self {
            courier_id,
            current_zone,
            available_at: 0.0,
            total_work_time: 0.0,
            assigned_orders: 0,
        }
    }

    pub fn state_at(&self, now: SimTime) -> CourierState {
        if self.available_at <= now {
            CourierState::Idle
        } else {
            CourierState::Busy
        }
    }

    pub fn is_idle_at(&self, now: SimTime) -> bool {
        self.state_at(now) == CourierState::Idle
    }

    /// Take on an order. Idle -> Busy happens here and only here.
    pub(crate) fn commit(&mut self, order: &Order, eta_seconds: f64) {
        self.total_work_time += eta_seconds;
        self.available_at = order.timestamp + eta_seconds;
        self.current_zone = order.dropoff_zone;
        self.assigned_orders += 1;
    }
}

/// Busy -> Idle is implicit: time passing `available_at` frees the courier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourierState {
    Idle,
    Busy,
}

/// One matched order. Append-only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub order_id:    OrderId,
    pub courier_id:  CourierId,
    pub eta_seconds: f64,
}

impl From<Assignment> for (OrderId, CourierId, f64) {
    fn from(a: Assignment) -> Self {
        (a.order_id, a.courier_id, a.eta_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_rejects_same_pickup_and_dropoff() {
        let err = Order::new(7, 0.0, 12, 12).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidOrder { order_id: 7, zone: 12 }));
    }

    #[test]
    fn order_rejects_non_finite_timestamps() {
        for ts in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = Order::new(2, ts, 1, 2).unwrap_err();
            assert!(matches!(err, DispatchError::InvalidTimestamp { order_id: 2, .. }));
        }
    }

    #[test]
    fn commit_moves_courier_and_accumulates_work() {
        let mut courier = Courier::new(0, 4);
        let order = Order::new(1, 100.0, 4, 9).unwrap();

        assert_eq!(courier.state_at(100.0), CourierState::Idle);
        courier.commit(&order, 250.0);

        assert_eq!(courier.available_at, 350.0);
        assert_eq!(courier.current_zone, 9);
        assert_eq!(courier.total_work_time, 250.0);
        assert_eq!(courier.assigned_orders, 1);
        assert_eq!(courier.state_at(349.0), CourierState::Busy);
        assert!(courier.is_idle_at(350.0));
    }
}
