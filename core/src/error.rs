use crate::types::{OrderId, ZoneId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Invalid order {order_id}: pickup and dropoff are both zone {zone}")]
    InvalidOrder { order_id: OrderId, zone: ZoneId },

    #[error("Invalid order {order_id}: timestamp {timestamp} is not finite")]
    InvalidTimestamp { order_id: OrderId, timestamp: f64 },

    #[error("Invalid zone set: {reason}")]
    InvalidZoneSet { reason: String },

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Prediction failed for order {order_id}: {reason}")]
    Prediction { order_id: OrderId, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
