//! Courier pool and order stream construction.
//!
//! Generators draw from their own RNG stream, so the same seed and
//! parameters always rebuild identical collections.

use crate::{
    entity::{Courier, Order},
    error::{DispatchError, DispatchResult},
    rng::StreamRng,
    types::{CourierId, OrderId, SimTime, ZoneId},
};

/// Build `n` idle couriers (ids 0..n), each starting in a random zone.
pub fn initialize_couriers(
    n: usize,
    zone_ids: &[ZoneId],
    rng: &mut StreamRng,
) -> DispatchResult<Vec<Courier>> {
    if n > 0 && zone_ids.is_empty() {
        return Err(DispatchError::InvalidZoneSet {
            reason: "cannot place couriers without any zones".into(),
        });
    }

    let mut couriers = Vec::with_capacity(n);
    for i in 0..n {
        let Some(&zone) = rng.choose(zone_ids) else { break };
        couriers.push(Courier::new(i as CourierId, zone));
    }
    log::debug!("initialized {} couriers over {} zones", couriers.len(), zone_ids.len());
    Ok(couriers)
}

/// Build `n` orders (ids 0..n) at `start_time + i * interval`, each with
/// distinct random pickup and dropoff zones.
pub fn generate_orders(
    n: usize,
    zone_ids: &[ZoneId],
    start_time: SimTime,
    interval: f64,
    rng: &mut StreamRng,
) -> DispatchResult<Vec<Order>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    if interval.is_nan() || interval <= 0.0 {
        return Err(DispatchError::InvalidConfig {
            reason: format!("order interval must be positive, got {interval}"),
        });
    }
    let first = zone_ids.first().copied();
    if zone_ids.iter().all(|z| Some(*z) == first) {
        return Err(DispatchError::InvalidZoneSet {
            reason: "orders need at least two distinct zones".into(),
        });
    }

    let mut orders = Vec::with_capacity(n);
    let mut time = start_time;
    for i in 0..n {
        let pickup = pick(zone_ids, rng)?;
        let mut dropoff = pick(zone_ids, rng)?;
        // Redraw until distinct; terminates since at least two zones differ.
        while dropoff == pickup {
            dropoff = pick(zone_ids, rng)?;
        }
        orders.push(Order::new(i as OrderId, time, pickup, dropoff)?);
        time += interval;
    }
    log::debug!("generated {} orders every {interval}s from t={start_time}", orders.len());
    Ok(orders)
}

fn pick(zone_ids: &[ZoneId], rng: &mut StreamRng) -> DispatchResult<ZoneId> {
    rng.choose(zone_ids).copied().ok_or_else(|| DispatchError::InvalidZoneSet {
        reason: "zone set is empty".into(),
    })
}
