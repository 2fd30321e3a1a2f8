//! Post-run summary statistics.
//!
//! Computed once from the assignment log and the final courier states.
//! A run with no assignments has no metrics: `report_metrics` returns
//! None instead of dividing by zero.

use crate::{
    entity::{Assignment, Courier},
    types::{CourierId, OrderId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub avg_eta:         f64,
    pub p50:             f64,
    pub p90:             f64,
    pub total_sim_time:  f64,
    /// Work time over total simulated time, for every courier.
    pub utilization:     BTreeMap<CourierId, f64>,
    pub total_orders:    usize,
    pub assigned_orders: usize,
    pub queued_orders:   usize,
    pub queued_ratio:    f64,
    pub insights:        DispatchInsights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchInsights {
    pub most_assigned_courier: Option<CourierLoad>,
    pub longest_eta:           Option<Assignment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CourierLoad {
    pub courier_id: CourierId,
    pub orders:     u32,
}

pub fn report_metrics(
    assignments: &[Assignment],
    couriers: &[Courier],
    total_orders: usize,
    queued_orders: usize,
) -> Option<RunMetrics> {
    if assignments.is_empty() {
        return None;
    }

    let mut etas: Vec<f64> = assignments.iter().map(|a| a.eta_seconds).collect();
    let avg_eta = etas.iter().sum::<f64>() / etas.len() as f64;
    etas.sort_by(f64::total_cmp);
    let p50 = percentile(&etas, 50.0)?;
    let p90 = percentile(&etas, 90.0)?;

    let total_sim_time = total_sim_time(couriers);
    let utilization = couriers
        .iter()
        .map(|c| (c.courier_id, c.total_work_time / total_sim_time))
        .collect();

    let queued_ratio = if total_orders == 0 {
        0.0
    } else {
        queued_orders as f64 / total_orders as f64
    };

    Some(RunMetrics {
        avg_eta,
        p50,
        p90,
        total_sim_time,
        utilization,
        total_orders,
        assigned_orders: assignments.len(),
        queued_orders,
        queued_ratio,
        insights: DispatchInsights::from_run(assignments, couriers),
    })
}

/// Latest `available_at` among couriers that ever worked; 1.0 if none did.
pub fn total_sim_time(couriers: &[Courier]) -> f64 {
    couriers
        .iter()
        .map(|c| c.available_at)
        .filter(|&t| t != 0.0)
        .reduce(f64::max)
        .unwrap_or(1.0)
}

/// Linear interpolation between closest ranks over sorted values.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=100.0).contains(&p) {
        return None;
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

impl DispatchInsights {
    pub fn from_run(assignments: &[Assignment], couriers: &[Courier]) -> Self {
        // Pool order breaks ties between equally loaded couriers.
        let mut most_assigned: Option<CourierLoad> = None;
        for c in couriers.iter().filter(|c| c.assigned_orders > 0) {
            if most_assigned.map_or(true, |m| c.assigned_orders > m.orders) {
                most_assigned = Some(CourierLoad { courier_id: c.courier_id, orders: c.assigned_orders });
            }
        }

        let mut longest: Option<Assignment> = None;
        for a in assignments {
            if longest.map_or(true, |l| a.eta_seconds > l.eta_seconds) {
                longest = Some(*a);
            }
        }

        Self { most_assigned_courier: most_assigned, longest_eta: longest }
    }
}

/// Assignments regrouped per courier, in assignment order.
pub fn assignments_by_courier(assignments: &[Assignment]) -> BTreeMap<CourierId, Vec<(OrderId, f64)>> {
    let mut grouped: BTreeMap<CourierId, Vec<(OrderId, f64)>> = BTreeMap::new();
    for a in assignments {
        grouped.entry(a.courier_id).or_default().push((a.order_id, a.eta_seconds));
    }
    grouped
}
