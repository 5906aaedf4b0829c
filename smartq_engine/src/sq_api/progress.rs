//! Kitchen progression policy.
//!
//! The background worker periodically asks a [`KitchenPolicy`] whether each in-flight order should advance to
//! its next status. Production deployments without kitchen hardware run the [`SimulatedKitchen`], which
//! advances orders probabilistically so that demo orders drift through Confirmed → Preparing → Ready →
//! Completed at a believable pace.

use rand::Rng;

use crate::db_types::Order;

pub trait KitchenPolicy: Send + Sync {
    /// Should this order move to its next status on this tick?
    fn should_advance(&self, order: &Order) -> bool;
}

/// Advances each order with a fixed probability per tick.
#[derive(Debug, Clone)]
pub struct SimulatedKitchen {
    probability: f64,
}

impl SimulatedKitchen {
    pub fn new(probability: f64) -> Self {
        Self { probability: probability.clamp(0.0, 1.0) }
    }
}

impl Default for SimulatedKitchen {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl KitchenPolicy for SimulatedKitchen {
    fn should_advance(&self, _order: &Order) -> bool {
        rand::thread_rng().gen_bool(self.probability)
    }
}

/// Deterministic policy that always advances. Handy in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAdvance;

impl KitchenPolicy for AlwaysAdvance {
    fn should_advance(&self, _order: &Order) -> bool {
        true
    }
}
