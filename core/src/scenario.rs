//! Builds the courier pool and order stream for a run from its config.

use crate::{
    config::DispatchConfig,
    entity::{Courier, Order},
    error::DispatchResult,
    generator::{generate_orders, initialize_couriers},
    rng::{RngBank, StreamSlot},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub couriers: Vec<Courier>,
    pub orders:   Vec<Order>,
}

impl Scenario {
    /// Same config, same scenario.
    pub fn from_config(config: &DispatchConfig) -> DispatchResult<Self> {
        config.validate()?;
        let bank = RngBank::new(config.seed);

        let mut courier_rng = bank.for_stream(StreamSlot::Couriers);
        let couriers = initialize_couriers(config.num_couriers, &config.zone_ids, &mut courier_rng)?;

        let mut order_rng = bank.for_stream(StreamSlot::Orders);
        let orders = generate_orders(
            config.num_orders,
            &config.zone_ids,
            config.start_time,
            config.order_interval_secs,
            &mut order_rng,
        )?;

        Ok(Self { couriers, orders })
    }
}
