//! End-to-end tests against a running hub over real WebSocket connections

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use presence_hub::{PeerId, Position, PresenceServer, ServerConfig, ServerMessage};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct TestServer {
    addr: SocketAddr,
    server: std::sync::Arc<PresenceServer>,
    _shutdown: oneshot::Sender<()>,
}

async fn start(config: ServerConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = std::sync::Arc::new(PresenceServer::new(config.stats_interval(Duration::ZERO)));
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let running = server.clone();
    tokio::spawn(async move {
        running
            .serve(listener, async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    TestServer {
        addr,
        server,
        _shutdown: shutdown_tx,
    }
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    client
}

async fn send_location(client: &mut Client, id: &str, latitude: f64, longitude: f64) {
    let payload = json!({
        "event": "location",
        "data": {"id": id, "latitude": latitude, "longitude": longitude}
    });
    client
        .send(Message::Text(payload.to_string().into()))
        .await
        .unwrap();
}

async fn recv(client: &mut Client) -> ServerMessage {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(2), client.next())
            .await
            .expect("timed out waiting for event")
            .expect("connection closed")
            .unwrap();

        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn assert_silent(client: &mut Client) {
    let result = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
    assert!(result.is_err(), "unexpected event: {:?}", result);
}

/// Wait until the hub has registered `expected` live channels
async fn wait_for_channels(server: &PresenceServer, expected: u64) {
    for _ in 0..100 {
        if server.hub().stats().await.unwrap().active_connections == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("hub never reached {} live channels", expected);
}

fn update(id: &str, latitude: f64, longitude: f64) -> ServerMessage {
    ServerMessage::location_update(PeerId::new(id).unwrap(), Position::new(latitude, longitude))
}

#[tokio::test]
async fn test_connect_report_catchup_disconnect() {
    let hub = start(ServerConfig::default()).await;

    let mut a = connect(hub.addr).await;
    wait_for_channels(&hub.server, 1).await;
    assert_silent(&mut a).await;

    send_location(&mut a, "p1", 10.0, 20.0).await;
    assert_eq!(recv(&mut a).await, update("p1", 10.0, 20.0));

    let mut b = connect(hub.addr).await;
    assert_eq!(recv(&mut b).await, update("p1", 10.0, 20.0));
    assert_silent(&mut a).await;

    a.close(None).await.unwrap();
    assert_eq!(
        recv(&mut b).await,
        ServerMessage::UserDisconnected(PeerId::new("p1").unwrap())
    );
}

#[tokio::test]
async fn test_update_reaches_every_channel() {
    let hub = start(ServerConfig::default()).await;

    let mut a = connect(hub.addr).await;
    let mut b = connect(hub.addr).await;
    let mut c = connect(hub.addr).await;
    wait_for_channels(&hub.server, 3).await;

    send_location(&mut b, "bravo", 1.5, -2.5).await;

    for client in [&mut a, &mut b, &mut c] {
        assert_eq!(recv(client).await, update("bravo", 1.5, -2.5));
    }
}

#[tokio::test]
async fn test_unbound_disconnect_is_silent() {
    let hub = start(ServerConfig::default()).await;

    let mut watcher = connect(hub.addr).await;
    let mut lurker = connect(hub.addr).await;
    wait_for_channels(&hub.server, 2).await;

    lurker.close(None).await.unwrap();
    wait_for_channels(&hub.server, 1).await;

    assert_silent(&mut watcher).await;
}

#[tokio::test]
async fn test_malformed_messages_are_ignored() {
    let hub = start(ServerConfig::default()).await;

    let mut a = connect(hub.addr).await;
    wait_for_channels(&hub.server, 1).await;

    a.send(Message::Text("not json".into())).await.unwrap();
    a.send(Message::Text(
        json!({"event": "location", "data": {"id": "p1", "latitude": 1.0}})
            .to_string()
            .into(),
    ))
    .await
    .unwrap();
    assert_silent(&mut a).await;

    // The channel is still usable afterwards
    send_location(&mut a, "p1", 3.0, 4.0).await;
    assert_eq!(recv(&mut a).await, update("p1", 3.0, 4.0));

    let stats = hub.server.hub().stats().await.unwrap();
    assert_eq!(stats.rejected_reports, 1);
    assert_eq!(stats.present_peers, 1);
}

#[tokio::test]
async fn test_connection_limit() {
    let hub = start(ServerConfig::default().max_connections(1)).await;

    let _first = connect(hub.addr).await;
    wait_for_channels(&hub.server, 1).await;

    let second = connect_async(format!("ws://{}/ws", hub.addr)).await;
    assert!(second.is_err());
}
