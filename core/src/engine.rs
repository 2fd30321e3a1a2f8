//! The dispatch engine: a single-pass greedy matcher.
//!
//! PER-ORDER STEPS (fixed, never reordered):
//!   1. Candidates = couriers idle at the order's timestamp, in pool order.
//!   2. No candidate: the order is queued and never reconsidered.
//!   3. Each candidate is scored as reach-pickup ETA + trip ETA.
//!   4. Lowest total wins; the first candidate wins ties.
//!   5. Commit the assignment and move the winner.
//!
//! RULES:
//!   - Orders are processed in input order. The engine never re-sorts.
//!   - Exactly two predictor calls per candidate.
//!   - Predictor errors abort the run.
//!   - Only the engine mutates couriers; readers take snapshots.

use crate::{
    clock::SimClock,
    entity::{Assignment, Courier, Order},
    error::{DispatchError, DispatchResult},
    event::{DispatchEvent, EventLogEntry},
    metrics::{report_metrics, RunMetrics},
    predictor::EtaPredictor,
    snapshot::{CourierSnapshot, DispatchSnapshot},
    types::{RunId, SimTime},
};

/// What the engine did with one order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Assigned(Assignment),
    Queued,
}

/// Everything a finished run hands back to its caller.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub assignments: Vec<Assignment>,
    pub queued:      Vec<Order>,
    pub couriers:    Vec<Courier>,
    pub metrics:     Option<RunMetrics>,
}

pub struct DispatchEngine<'p> {
    run_id:           RunId,
    clock:            SimClock,
    couriers:         Vec<Courier>,
    predictor:        Box<dyn EtaPredictor + 'p>,
    assignments:      Vec<Assignment>,
    queued:           Vec<Order>,
    event_log:        Vec<EventLogEntry>,
    orders_processed: usize,
}

impl<'p> DispatchEngine<'p> {
    pub fn new(run_id: RunId, couriers: Vec<Courier>, predictor: Box<dyn EtaPredictor + 'p>) -> Self {
        Self {
            clock: SimClock::new(run_id.clone()),
            couriers,
            predictor,
            assignments: Vec::new(),
            queued: Vec::new(),
            event_log: Vec::new(),
            orders_processed: 0,
            run_id,
        }
    }

    /// Dispatch every order in input order.
    pub fn run(&mut self, orders: &[Order]) -> DispatchResult<()> {
        if self.event_log.is_empty() {
            self.record(DispatchEvent::RunInitialized {
                run_id:   self.run_id.clone(),
                couriers: self.couriers.len(),
            })?;
            log::info!(
                "run {} started: {} orders, {} couriers",
                self.run_id,
                orders.len(),
                self.couriers.len()
            );
        }

        for order in orders {
            self.dispatch(order)?;
        }

        self.record(DispatchEvent::RunCompleted {
            run_id:   self.run_id.clone(),
            assigned: self.assignments.len(),
            queued:   self.queued.len(),
        })?;
        log::info!(
            "run {} completed: {} assigned, {} queued",
            self.run_id,
            self.assignments.len(),
            self.queued.len()
        );
        Ok(())
    }

    /// Decide and commit a single order.
    pub fn dispatch(&mut self, order: &Order) -> DispatchResult<Decision> {
        let now = order.timestamp;
        if !self.clock.advance_to(now) {
            log::warn!(
                "order {} at t={now} arrived after t={}; input is not timestamp-sorted",
                order.order_id,
                self.clock.now
            );
        }
        self.orders_processed += 1;

        let mut best: Option<(usize, f64)> = None;
        let mut candidates = 0usize;
        for (idx, courier) in self.couriers.iter().enumerate() {
            if !courier.is_idle_at(now) {
                continue;
            }
            candidates += 1;
            let total_eta = self.candidate_eta(order, courier)?;
            match best {
                Some((_, best_eta)) if total_eta >= best_eta => {}
                _ => best = Some((idx, total_eta)),
            }
        }

        let Some((idx, eta_seconds)) = best else {
            log::debug!("t={now} order {} queued: no idle courier", order.order_id);
            self.queued.push(order.clone());
            self.record(DispatchEvent::OrderQueued { time: now, order_id: order.order_id })?;
            return Ok(Decision::Queued);
        };

        let winner = &mut self.couriers[idx];
        winner.commit(order, eta_seconds);
        let assignment = Assignment {
            order_id: order.order_id,
            courier_id: winner.courier_id,
            eta_seconds,
        };
        log::debug!(
            "t={now} order {} -> courier {} eta={eta_seconds:.1}s ({candidates} candidates)",
            order.order_id,
            assignment.courier_id
        );
        self.assignments.push(assignment);
        self.record(DispatchEvent::OrderAssigned {
            time: now,
            order_id: order.order_id,
            courier_id: assignment.courier_id,
            eta_seconds,
            candidates,
            dropoff_zone: order.dropoff_zone,
        })?;
        Ok(Decision::Assigned(assignment))
    }

    fn candidate_eta(&self, order: &Order, courier: &Courier) -> DispatchResult<f64> {
        let now = order.timestamp;
        let to_pickup = self.predictor.predict(order, now, courier.current_zone)?;
        let trip = self.predictor.predict(order, now, order.pickup_zone)?;
        let total = to_pickup + trip;
        // Totals must be finite with both legs non-negative.
        if !total.is_finite() || to_pickup < 0.0 || trip < 0.0 {
            return Err(DispatchError::Prediction {
                order_id: order.order_id,
                reason: format!(
                    "courier {}: invalid ETA {to_pickup} + {trip}",
                    courier.courier_id
                ),
            });
        }
        Ok(total)
    }

    fn record(&mut self, event: DispatchEvent) -> DispatchResult<()> {
        let entry = EventLogEntry {
            seq:        self.event_log.len() as u64,
            run_id:     self.run_id.clone(),
            event_type: event.type_name().to_string(),
            payload:    serde_json::to_string(&event)?,
        };
        self.event_log.push(entry);
        Ok(())
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Latest decision time seen so far.
    pub fn now(&self) -> SimTime {
        self.clock.now
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn queued_orders(&self) -> &[Order] {
        &self.queued
    }

    pub fn couriers(&self) -> &[Courier] {
        &self.couriers
    }

    pub fn event_log(&self) -> &[EventLogEntry] {
        &self.event_log
    }

    pub fn orders_processed(&self) -> usize {
        self.orders_processed
    }

    /// Owned copy of the current courier state.
    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            run_id:           self.run_id.clone(),
            now:              self.clock.now,
            orders_processed: self.orders_processed,
            assigned:         self.assignments.len(),
            queued:           self.queued.len(),
            couriers:         self
                .couriers
                .iter()
                .map(|c| CourierSnapshot::capture(c, self.clock.now))
                .collect(),
        }
    }

    /// Summary statistics; None when nothing was assigned.
    pub fn report(&self) -> Option<RunMetrics> {
        report_metrics(
            &self.assignments,
            &self.couriers,
            self.orders_processed,
            self.queued.len(),
        )
    }

    pub fn into_outcome(self) -> RunOutcome {
        let metrics = self.report();
        RunOutcome {
            assignments: self.assignments,
            queued:      self.queued,
            couriers:    self.couriers,
            metrics,
        }
    }
}
