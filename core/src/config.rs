use crate::{
    clock::SimEpoch,
    error::{DispatchError, DispatchResult},
    predictor::{LookupDefaults, DEFAULT_DISTANCE_KM, DEFAULT_SPEED_KMH},
    types::{SimTime, ZoneId},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Taxi zone ids 1..=263.
pub const DEFAULT_ZONE_COUNT: ZoneId = 263;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub seed:                 u64,
    pub num_couriers:         usize,
    pub num_orders:           usize,
    pub order_interval_secs:  f64,
    pub start_time:           SimTime,
    pub zone_ids:             Vec<ZoneId>,
    pub epoch:                SimEpoch,
    pub default_distance_km:  f64,
    pub default_speed_kmh:    f64,
    /// Fixed seconds added to every leg by the kinematic model.
    pub pickup_overhead_secs: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            seed:                 42,
            num_couriers:         5,
            num_orders:           20,
            order_interval_secs:  60.0,
            start_time:           0.0,
            zone_ids:             (1..=DEFAULT_ZONE_COUNT).collect(),
            epoch:                SimEpoch::default(),
            default_distance_km:  DEFAULT_DISTANCE_KM,
            default_speed_kmh:    DEFAULT_SPEED_KMH,
            pickup_overhead_secs: 0.0,
        }
    }
}

impl DispatchConfig {
    /// Load from a JSON file. Absent fields take their default value.
    pub fn load(path: impl AsRef<Path>) -> DispatchResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: DispatchConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Config with small hardcoded values for use in tests.
    pub fn default_test() -> Self {
        Self {
            seed: 7,
            num_couriers: 3,
            num_orders: 12,
            order_interval_secs: 30.0,
            zone_ids: (1..=10).collect(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> DispatchResult<()> {
        let invalid = |reason: String| -> DispatchResult<()> {
            Err(DispatchError::InvalidConfig { reason })
        };
        if !(self.order_interval_secs > 0.0) {
            return invalid(format!(
                "order_interval_secs must be positive, got {}",
                self.order_interval_secs
            ));
        }
        if !(self.start_time >= 0.0) || !self.start_time.is_finite() {
            return invalid(format!(
                "start_time must be finite and not negative, got {}",
                self.start_time
            ));
        }
        let last_order_time =
            self.start_time + self.order_interval_secs * self.num_orders as f64;
        if self.epoch.datetime_at(last_order_time).is_none() {
            return invalid(format!(
                "order times up to {last_order_time}s run past the calendar range of epoch {}",
                self.epoch.0
            ));
        }
        if !(self.default_speed_kmh > 0.0) {
            return invalid(format!(
                "default_speed_kmh must be positive, got {}",
                self.default_speed_kmh
            ));
        }
        if !(self.default_distance_km >= 0.0) {
            return invalid(format!(
                "default_distance_km must not be negative, got {}",
                self.default_distance_km
            ));
        }
        if !(self.pickup_overhead_secs >= 0.0) {
            return invalid(format!(
                "pickup_overhead_secs must not be negative, got {}",
                self.pickup_overhead_secs
            ));
        }
        Ok(())
    }

    pub fn lookup_defaults(&self) -> LookupDefaults {
        LookupDefaults {
            distance_km: self.default_distance_km,
            speed_kmh:   self.default_speed_kmh,
        }
    }
}
