use log::*;
use smartq_engine::{
    events::EventProducers,
    progress::SimulatedKitchen,
    OrderFlowApi,
    SqliteDatabase,
};
use tokio::task::JoinHandle;

/// Starts the kitchen progression worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Every `interval_secs` the worker sweeps paid, in-flight orders and advances each one step along
/// Confirmed → Preparing → Ready → Completed with the given probability. A sweep failure is logged and the
/// loop continues; it never takes the server down.
pub fn start_progress_worker(
    db: SqliteDatabase,
    producers: EventProducers,
    interval_secs: u64,
    advance_probability: f64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
        let api = OrderFlowApi::new(db, producers);
        let kitchen = SimulatedKitchen::new(advance_probability);
        info!("🕰️ Kitchen progression worker started (every {interval_secs}s)");
        loop {
            timer.tick().await;
            trace!("🕰️ Running kitchen progression sweep");
            match api.advance_progressable_orders(&kitchen).await {
                Ok(advanced) if advanced.is_empty() => {},
                Ok(advanced) => {
                    debug!("🕰️ Advanced orders: {}", order_list(&advanced));
                },
                Err(e) => {
                    error!("🕰️ Error running kitchen progression sweep: {e}");
                },
            }
        }
    })
}

fn order_list(orders: &[smartq_engine::db_types::Order]) -> String {
    orders.iter().map(|o| format!("{} → {}", o.id, o.status)).collect::<Vec<String>>().join(", ")
}
