//! Bus-to-WebSocket forwarding.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use itemgrid_api::notifications::EventBroadcaster;
use itemgrid_api::ws::WsManager;
use itemgrid_events::{EventBus, ItemEvent};
use tokio_util::sync::CancellationToken;

fn text(message: Option<Message>) -> serde_json::Value {
    match message {
        Some(Message::Text(text)) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn published_events_reach_connected_clients() {
    let bus = EventBus::default();
    let manager = Arc::new(WsManager::new());
    let mut client = manager.add("client".into()).await;
    let cancel = CancellationToken::new();

    let task = tokio::spawn(
        EventBroadcaster::new(Arc::clone(&manager)).run(bus.subscribe(), cancel.clone()),
    );

    bus.publish(ItemEvent::ItemDeleted(42));

    let frame = tokio::time::timeout(Duration::from_secs(2), client.recv())
        .await
        .expect("frame within timeout");
    let json = text(frame);
    assert_eq!(json["type"], "ItemDeleted");
    assert_eq!(json["payload"], 42);

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test]
async fn cancellation_stops_the_loop() {
    let bus = EventBus::default();
    let manager = Arc::new(WsManager::new());
    let cancel = CancellationToken::new();

    let task = tokio::spawn(EventBroadcaster::new(manager).run(bus.subscribe(), cancel.clone()));
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("broadcaster exits after cancel")
        .unwrap();
}

#[tokio::test]
async fn dropping_the_bus_stops_the_loop() {
    let bus = EventBus::default();
    let receiver = bus.subscribe();
    let manager = Arc::new(WsManager::new());

    let task = tokio::spawn(EventBroadcaster::new(manager).run(receiver, CancellationToken::new()));
    drop(bus);

    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("broadcaster exits when the bus closes")
        .unwrap();
}
