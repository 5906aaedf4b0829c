use std::time::Duration;

use log::*;
use rand::Rng;

/// A stand-in for a card terminal used by the direct payment endpoint. It waits a moment, then succeeds or
/// fails with the configured failure rate and mints a transaction id.
#[derive(Debug, Clone)]
pub struct PaymentSimulator {
    failure_rate: f64,
    delay: Duration,
}

impl Default for PaymentSimulator {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl PaymentSimulator {
    pub fn new(failure_rate: f64) -> Self {
        Self { failure_rate: failure_rate.clamp(0.0, 1.0), delay: Duration::from_millis(400) }
    }

    /// A simulator that answers instantly, for tests.
    pub fn instant(failure_rate: f64) -> Self {
        Self { failure_rate: failure_rate.clamp(0.0, 1.0), delay: Duration::ZERO }
    }

    /// Runs one simulated payment attempt. Returns the outcome and a transaction id on success.
    pub async fn attempt(&self) -> (bool, Option<String>) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let roll: f64 = rand::thread_rng().gen();
        if roll < self.failure_rate {
            debug!("💳️ Simulated payment declined");
            (false, None)
        } else {
            let txn: u64 = rand::thread_rng().gen();
            (true, Some(format!("txn_{txn:016x}")))
        }
    }
}
