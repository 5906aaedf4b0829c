//! The live order-update stream.
//!
//! `GET /events/orders` serves server-sent events. Each order status transition published on the
//! [`OrderUpdateHub`] becomes one `order-status-update` event whose data is the full updated order.
//! Delivery is best-effort: a subscriber that falls behind the hub's buffer misses the overwritten updates
//! and simply continues with newer ones. There is no replay for reconnecting clients.
use actix_web::{web, HttpResponse, Responder};
use futures::stream;
use log::*;
use serde::Deserialize;
use smartq_engine::{
    db_types::OrderId,
    events::{OrderUpdateHub, UpdateFilter},
};
use tokio::sync::broadcast::{error::RecvError, Receiver};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventStreamParams {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl From<EventStreamParams> for UpdateFilter {
    fn from(params: EventStreamParams) -> Self {
        UpdateFilter { order_id: params.order_id.map(OrderId::from), user_id: params.user_id }
    }
}

pub async fn order_events(query: web::Query<EventStreamParams>, hub: web::Data<OrderUpdateHub>) -> impl Responder {
    let filter = UpdateFilter::from(query.into_inner());
    debug!("💻️📬️ New SSE subscriber (filter: {filter:?}). {} active", hub.subscriber_count() + 1);
    let receiver = hub.subscribe();
    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(event_stream(receiver, filter))
}

fn event_stream(
    receiver: Receiver<smartq_engine::events::OrderStatusChangedEvent>,
    filter: UpdateFilter,
) -> impl futures::Stream<Item = Result<web::Bytes, actix_web::Error>> {
    stream::unfold((receiver, filter), |(mut receiver, filter)| async move {
        loop {
            match receiver.recv().await {
                Ok(event) if filter.matches(&event) => {
                    let data = match serde_json::to_string(&event.order) {
                        Ok(json) => json,
                        Err(e) => {
                            warn!("💻️📬️ Could not serialize order update: {e}");
                            continue;
                        },
                    };
                    let frame = web::Bytes::from(format!("event: order-status-update\ndata: {data}\n\n"));
                    return Some((Ok(frame), (receiver, filter)));
                },
                Ok(_) => continue,
                Err(RecvError::Lagged(missed)) => {
                    // at-most-once delivery; slow clients just skip ahead
                    warn!("💻️📬️ SSE subscriber lagged, skipping {missed} update(s)");
                    continue;
                },
                Err(RecvError::Closed) => {
                    debug!("💻️📬️ Update hub closed, ending SSE stream");
                    return None;
                },
            }
        }
    })
}
