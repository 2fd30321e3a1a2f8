//! Static zone lookup tables consumed by the ETA predictor.
//!
//! Tables are pre-aggregated outside the engine. A missing entry is not
//! an error: callers fall back to a default value.

use crate::{
    error::DispatchResult,
    types::ZoneId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DISTANCES_FILE: &str = "zone_distances.json";
pub const SPEEDS_FILE: &str = "zone_speeds.json";

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in km between two (lat, lon) points in degrees.
pub fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let sin_dlat = ((lat2 - lat1) * 0.5).sin();
    let sin_dlon = ((lon2 - lon1) * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceRow {
    pub pickup_zone:     ZoneId,
    pub dropoff_zone:    ZoneId,
    pub great_circle_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedRow {
    pub pickup_zone:          ZoneId,
    pub dropoff_zone:         ZoneId,
    pub pickup_hour:          u32,
    pub historical_speed_kmh: f64,
}

/// Zone-pair great-circle distances in km.
#[derive(Debug, Clone, Default)]
pub struct ZoneDistances {
    km: HashMap<(ZoneId, ZoneId), f64>,
}

impl ZoneDistances {
    pub fn from_rows(rows: impl IntoIterator<Item = DistanceRow>) -> Self {
        let km = rows
            .into_iter()
            .map(|r| ((r.pickup_zone, r.dropoff_zone), r.great_circle_km))
            .collect();
        Self { km }
    }

    /// Every ordered pair of centroids, self-pairs included.
    pub fn from_centroids(centroids: &HashMap<ZoneId, (f64, f64)>) -> Self {
        let mut km = HashMap::with_capacity(centroids.len() * centroids.len());
        for (&pu, &a) in centroids {
            for (&dz, &b) in centroids {
                km.insert((pu, dz), haversine_km(a, b));
            }
        }
        Self { km }
    }

    pub fn get(&self, pickup: ZoneId, dropoff: ZoneId) -> Option<f64> {
        self.km.get(&(pickup, dropoff)).copied()
    }

    pub fn get_or(&self, pickup: ZoneId, dropoff: ZoneId, default_km: f64) -> f64 {
        self.get(pickup, dropoff).unwrap_or(default_km)
    }

    pub fn len(&self) -> usize {
        self.km.len()
    }

    pub fn is_empty(&self) -> bool {
        self.km.is_empty()
    }
}

/// Historical speeds keyed by zone pair and pickup hour, in km/h.
#[derive(Debug, Clone, Default)]
pub struct ZoneSpeeds {
    kmh: HashMap<(ZoneId, ZoneId, u32), f64>,
}

impl ZoneSpeeds {
    pub fn from_rows(rows: impl IntoIterator<Item = SpeedRow>) -> Self {
        let kmh = rows
            .into_iter()
            .map(|r| ((r.pickup_zone, r.dropoff_zone, r.pickup_hour), r.historical_speed_kmh))
            .collect();
        Self { kmh }
    }

    /// Collapse raw per-trip observations to the median speed per key.
    pub fn from_observations(rows: impl IntoIterator<Item = SpeedRow>) -> Self {
        let mut grouped: HashMap<(ZoneId, ZoneId, u32), Vec<f64>> = HashMap::new();
        for r in rows {
            if r.historical_speed_kmh.is_finite() {
                grouped
                    .entry((r.pickup_zone, r.dropoff_zone, r.pickup_hour))
                    .or_default()
                    .push(r.historical_speed_kmh);
            }
        }
        let kmh = grouped
            .into_iter()
            .map(|(key, mut speeds)| (key, median(&mut speeds)))
            .collect();
        Self { kmh }
    }

    pub fn get(&self, pickup: ZoneId, dropoff: ZoneId, hour: u32) -> Option<f64> {
        self.kmh.get(&(pickup, dropoff, hour)).copied()
    }

    pub fn get_or(&self, pickup: ZoneId, dropoff: ZoneId, hour: u32, default_kmh: f64) -> f64 {
        self.get(pickup, dropoff, hour).unwrap_or(default_kmh)
    }

    pub fn len(&self) -> usize {
        self.kmh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kmh.is_empty()
    }
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Both tables the predictor needs. Built once, then shared by reference.
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    pub distances: ZoneDistances,
    pub speeds:    ZoneSpeeds,
}

impl LookupTables {
    pub fn new(distances: ZoneDistances, speeds: ZoneSpeeds) -> Self {
        Self { distances, speeds }
    }

    /// Load from the data directory. A missing file leaves that table
    /// empty; a malformed one is an error.
    pub fn load(data_dir: impl AsRef<Path>) -> DispatchResult<Self> {
        let dir = data_dir.as_ref();
        let distances = match read_rows::<DistanceRow>(&dir.join(DISTANCES_FILE))? {
            Some(rows) => ZoneDistances::from_rows(rows),
            None => ZoneDistances::default(),
        };
        let speeds = match read_rows::<SpeedRow>(&dir.join(SPEEDS_FILE))? {
            Some(rows) => ZoneSpeeds::from_observations(rows),
            None => ZoneSpeeds::default(),
        };
        log::info!(
            "lookup tables loaded from {}: {} distances, {} speeds",
            dir.display(),
            distances.len(),
            speeds.len()
        );
        Ok(Self { distances, speeds })
    }
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> DispatchResult<Option<Vec<T>>> {
    if !path.exists() {
        log::warn!("{} not found, predictor will use default values", path.display());
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}
