//! ETA prediction: the only scoring seam the dispatch engine depends on.
//!
//! The engine sees an `EtaPredictor`. The production implementation,
//! `ModelEtaPredictor`, turns an order leg into `TripFeatures` using the
//! simulation epoch and the zone lookup tables, then asks an `EtaModel`
//! for a prediction in log space.

use crate::{
    clock::{SimEpoch, TimeFeatures},
    entity::Order,
    error::{DispatchError, DispatchResult},
    lookup::LookupTables,
    types::{SimTime, ZoneId},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DISTANCE_KM: f64 = 5.0;
pub const DEFAULT_SPEED_KMH: f64 = 20.0;

/// The contract every ETA scoring strategy must fulfill.
pub trait EtaPredictor {
    /// Predicted seconds for the leg of `order` that starts in
    /// `courier_zone`, evaluated at `current_time`.
    ///
    /// Must be free of side effects visible to the engine. Errors are
    /// fatal for the run and are never swallowed by the caller.
    fn predict(&self, order: &Order, current_time: SimTime, courier_zone: ZoneId)
        -> DispatchResult<f64>;
}

impl<F> EtaPredictor for F
where
    F: Fn(&Order, SimTime, ZoneId) -> DispatchResult<f64>,
{
    fn predict(&self, order: &Order, current_time: SimTime, courier_zone: ZoneId)
        -> DispatchResult<f64>
    {
        self(order, current_time, courier_zone)
    }
}

/// Model inputs for one leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripFeatures {
    pub great_circle_km:      f64,
    pub pickup_hour:          u32,
    pub pickup_weekday:       u32,
    pub is_weekend:           bool,
    pub pickup_month:         u32,
    pub historical_speed_kmh: f64,
}

impl TripFeatures {
    pub fn new(distance_km: f64, speed_kmh: f64, time: TimeFeatures) -> Self {
        Self {
            great_circle_km:      distance_km,
            pickup_hour:          time.hour,
            pickup_weekday:       time.weekday,
            is_weekend:           time.is_weekend,
            pickup_month:         time.month,
            historical_speed_kmh: speed_kmh,
        }
    }
}

/// A trained regression model, opaque to the engine.
pub trait EtaModel {
    /// Predicted `ln(1 + eta_seconds)`.
    fn predict_log_eta(&self, features: &TripFeatures) -> DispatchResult<f64>;
}

/// Travel time at the historical speed plus a fixed overhead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicModel {
    pub overhead_secs: f64,
}

impl Default for KinematicModel {
    fn default() -> Self {
        Self { overhead_secs: 0.0 }
    }
}

impl EtaModel for KinematicModel {
    fn predict_log_eta(&self, features: &TripFeatures) -> DispatchResult<f64> {
        if features.historical_speed_kmh <= 0.0 {
            return Err(anyhow::anyhow!(
                "non-positive speed {} km/h",
                features.historical_speed_kmh
            )
            .into());
        }
        let secs = features.great_circle_km / features.historical_speed_kmh * 3600.0
            + self.overhead_secs;
        Ok(secs.ln_1p())
    }
}

/// Lookup defaults applied when a table has no entry for a leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookupDefaults {
    pub distance_km: f64,
    pub speed_kmh:   f64,
}

impl Default for LookupDefaults {
    fn default() -> Self {
        Self { distance_km: DEFAULT_DISTANCE_KM, speed_kmh: DEFAULT_SPEED_KMH }
    }
}

pub struct ModelEtaPredictor<'a, M: EtaModel> {
    tables:   &'a LookupTables,
    model:    M,
    epoch:    SimEpoch,
    defaults: LookupDefaults,
}

impl<'a, M: EtaModel> ModelEtaPredictor<'a, M> {
    pub fn new(tables: &'a LookupTables, model: M) -> Self {
        Self {
            tables,
            model,
            epoch: SimEpoch::default(),
            defaults: LookupDefaults::default(),
        }
    }

    pub fn with_epoch(mut self, epoch: SimEpoch) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn with_defaults(mut self, defaults: LookupDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// The zone pair a leg covers. From anywhere but the pickup zone the
    /// courier is heading to pickup; from the pickup zone it is the trip.
    pub fn leg(order: &Order, courier_zone: ZoneId) -> (ZoneId, ZoneId) {
        if courier_zone == order.pickup_zone {
            (order.pickup_zone, order.dropoff_zone)
        } else {
            (courier_zone, order.pickup_zone)
        }
    }

    /// Fails when `current_time` has no calendar instant under the epoch.
    pub fn features(&self, order: &Order, current_time: SimTime, courier_zone: ZoneId)
        -> DispatchResult<TripFeatures>
    {
        let (from, to) = Self::leg(order, courier_zone);
        let time = self
            .epoch
            .features_at(current_time)
            .ok_or_else(|| DispatchError::Prediction {
                order_id: order.order_id,
                reason: format!("time {current_time} is outside the simulation calendar"),
            })?;
        let distance_km = self.tables.distances.get_or(from, to, self.defaults.distance_km);
        let speed_kmh = self.tables.speeds.get_or(from, to, time.hour, self.defaults.speed_kmh);
        Ok(TripFeatures::new(distance_km, speed_kmh, time))
    }
}

impl<M: EtaModel> EtaPredictor for ModelEtaPredictor<'_, M> {
    fn predict(&self, order: &Order, current_time: SimTime, courier_zone: ZoneId)
        -> DispatchResult<f64>
    {
        let features = self.features(order, current_time, courier_zone)?;
        let log_eta = self
            .model
            .predict_log_eta(&features)
            .map_err(|e| DispatchError::Prediction {
                order_id: order.order_id,
                reason: e.to_string(),
            })?;
        let eta = log_eta.exp_m1();
        if !eta.is_finite() || eta < 0.0 {
            return Err(DispatchError::Prediction {
                order_id: order.order_id,
                reason: format!("model produced invalid ETA {eta}"),
            });
        }
        Ok(eta)
    }
}
