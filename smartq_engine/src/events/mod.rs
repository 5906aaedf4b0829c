mod broadcast;
mod channel;
mod event_types;
mod hooks;

pub use broadcast::{OrderUpdateHub, UpdateFilter};
pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
