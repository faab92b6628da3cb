use super::*;
use serde_json::json;
use tokio::time::{Duration, timeout};

async fn recv(rx: &mut mpsc::Receiver<Frame>) -> Frame {
    timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("frame receive timed out")
        .expect("channel closed")
}

async fn assert_channel_empty(rx: &mut mpsc::Receiver<Frame>) {
    assert!(
        timeout(Duration::from_millis(80), rx.recv()).await.is_err(),
        "expected channel to remain empty"
    );
}

async fn open(state: &AppState) -> (ConnectionId, mpsc::Receiver<Frame>) {
    let id = ConnectionId::new();
    let (tx, rx) = mpsc::channel(state.channel_capacity);
    state.open(id, tx).await;
    (id, rx)
}

#[test]
fn hub_new_is_empty() {
    let hub = Hub::new();
    assert!(hub.transport.is_empty());
    assert!(hub.session.registry().is_empty());
    assert!(hub.session.drawing().is_empty());
}

#[test]
fn small_capacity_is_raised_to_fit_bootstrap() {
    assert_eq!(AppState::new(0).channel_capacity, MIN_CHANNEL_CAPACITY);
    assert_eq!(AppState::new(1).channel_capacity, MIN_CHANNEL_CAPACITY);
    assert_eq!(AppState::new(64).channel_capacity, 64);
}

#[tokio::test]
async fn capacity_one_still_receives_full_bootstrap() {
    let state = AppState::new(1);
    let (_id, mut rx) = open(&state).await;

    assert_eq!(recv(&mut rx).await.event, "current-user-info");
    assert_eq!(recv(&mut rx).await.event, "load-drawing");
    assert_eq!(recv(&mut rx).await.event, "active-users-list");
    assert_channel_empty(&mut rx).await;
}

#[tokio::test]
async fn lagging_connection_is_detached_and_later_announced() {
    let state = AppState::new(1);
    let (slow, mut rx_slow) = open(&state).await;
    let (fast, mut rx_fast) = open(&state).await;
    for _ in 0..3 {
        recv(&mut rx_fast).await;
    }

    // `slow` never drains: bootstrap plus user-connected fill its channel.
    state
        .dispatch(fast, &Frame::new("element-update", json!({"id": "e1"})))
        .await;
    assert_eq!(state.hub.lock().await.transport.len(), 1);

    let mut queued = Vec::new();
    while let Some(frame) = rx_slow.recv().await {
        queued.push(frame.event);
    }
    assert_eq!(queued, ["current-user-info", "load-drawing", "active-users-list", "user-connected"]);

    // The socket task closes once its channel ends; peers learn of it then.
    state.close(slow).await;
    let left = recv(&mut rx_fast).await;
    assert_eq!(left.event, "user-disconnected");
    assert_eq!(left.data, json!(slow.to_string()));
}

#[tokio::test]
async fn open_delivers_bootstrap_through_channel() {
    let state = AppState::new(16);
    let (_id, mut rx) = open(&state).await;

    assert_eq!(recv(&mut rx).await.event, "current-user-info");
    assert_eq!(recv(&mut rx).await.event, "load-drawing");
    assert_eq!(recv(&mut rx).await.event, "active-users-list");
    assert_channel_empty(&mut rx).await;
}

#[tokio::test]
async fn dispatch_relays_between_channels() {
    let state = AppState::new(16);
    let (a, mut rx_a) = open(&state).await;
    let (_b, mut rx_b) = open(&state).await;
    for _ in 0..4 {
        recv(&mut rx_a).await;
    }
    for _ in 0..3 {
        recv(&mut rx_b).await;
    }

    state
        .dispatch(a, &Frame::new("element-update", json!({"id": "e1", "type": "rect"})))
        .await;

    let relayed = recv(&mut rx_b).await;
    assert_eq!(relayed.event, "element-update");
    assert_eq!(relayed.data, json!({"id": "e1", "type": "rect"}));
    assert_channel_empty(&mut rx_a).await;
}

#[tokio::test]
async fn close_detaches_and_notifies_remaining() {
    let state = AppState::new(16);
    let (a, mut rx_a) = open(&state).await;
    let (_b, mut rx_b) = open(&state).await;
    for _ in 0..3 {
        recv(&mut rx_b).await;
    }

    state.close(a).await;

    let left = recv(&mut rx_b).await;
    assert_eq!(left.event, "user-disconnected");
    assert_eq!(left.data, json!(a.to_string()));

    // The closed connection's sender was dropped on detach.
    while rx_a.recv().await.is_some() {}

    let stats = state.stats().await;
    assert_eq!(stats.users, 1);
    assert_eq!(state.hub.lock().await.transport.len(), 1);
}
