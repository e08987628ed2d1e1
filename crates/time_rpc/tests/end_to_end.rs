use std::net::SocketAddr;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use time_rpc::core::clock::{Clock, FixedClock};
use time_rpc::core::provider::TimeProvider;
use time_rpc::core::utils::parse_zoned;
use time_rpc::{
    ClientConfig, ServerConfig, TimeClient, TimeRequest, TimeRpcError, TimeRpcResult, TimeServer,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct RunningServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    handle: JoinHandle<TimeRpcResult<()>>,
}

async fn start_server(provider: TimeProvider) -> RunningServer {
    let config = ServerConfig {
        addr: "127.0.0.1:0".parse().unwrap(),
        grace_period: Duration::from_secs(5),
        linger: Duration::from_millis(200),
    };
    let server = TimeServer::bind_with_provider(config, provider).await.unwrap();
    let addr = server.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(server.run(shutdown.clone()));

    RunningServer {
        addr,
        shutdown,
        handle,
    }
}

fn client_config(addr: SocketAddr) -> ClientConfig {
    ClientConfig {
        connect_timeout: Duration::from_secs(2),
        call_timeout: Duration::from_secs(2),
        ..ClientConfig::new(addr.to_string())
    }
}

/// Clock that takes a while to answer, keeping a call in flight
struct SlowClock {
    delay: Duration,
    instant: DateTime<Utc>,
}

impl Clock for SlowClock {
    fn now(&self) -> DateTime<Utc> {
        std::thread::sleep(self.delay);
        self.instant
    }
}

#[tokio::test]
async fn test_selector_two_returns_gmt() {
    let server = start_server(TimeProvider::new()).await;
    let client = TimeClient::connect(client_config(server.addr)).await.unwrap();

    let response = client.request(2).await.unwrap();
    let parsed = parse_zoned(&response.time).unwrap();

    assert!(response.time.ends_with("[GMT]"), "{}", response.time);
    assert_eq!(parsed.zone, Tz::GMT);
    assert_eq!(parsed.datetime.offset().local_minus_utc(), 0);

    client.shutdown().await.unwrap();
    server.shutdown.cancel();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_selectors_map_to_zones() {
    let instant = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
    let server = start_server(TimeProvider::with_clock(FixedClock(instant))).await;
    let client = TimeClient::connect(client_config(server.addr)).await.unwrap();

    let cases = [
        (1, "2024-01-15T09:30:00+00:00[UTC]"),
        (2, "2024-01-15T09:30:00+00:00[GMT]"),
        (3, "2024-01-15T10:30:00+01:00[Europe/Paris]"),
        (99, "2024-01-15T09:30:00+00:00[UTC]"),
    ];
    for (id, expected) in cases {
        let response = client.request(id).await.unwrap();
        assert_eq!(response.time, expected, "selector {id}");
    }

    client.shutdown().await.unwrap();
    server.shutdown.cancel();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_fixed_instant_is_idempotent() {
    let instant = Utc.with_ymd_and_hms(2024, 5, 1, 8, 15, 30).unwrap();
    let server = start_server(TimeProvider::with_clock(FixedClock(instant))).await;
    let client = TimeClient::connect(client_config(server.addr)).await.unwrap();

    let request = TimeRequest::new("Asia/Tokyo");
    let first = client.request_time(&request).await.unwrap();
    let second = client.request_time(&request).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.time, "2024-05-01T17:15:30+09:00[Asia/Tokyo]");

    client.shutdown().await.unwrap();
    server.shutdown.cancel();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_invalid_timezone_does_not_break_server() {
    let server = start_server(TimeProvider::new()).await;
    let client = TimeClient::connect(client_config(server.addr)).await.unwrap();

    match client.request_time(&TimeRequest::new("Not/AZone")).await {
        Err(TimeRpcError::InvalidTimezone { timezone }) => assert_eq!(timezone, "Not/AZone"),
        other => panic!("unexpected result: {other:?}"),
    }

    // Same channel keeps working
    assert!(client.request_time(&TimeRequest::new("UTC")).await.is_ok());

    // So do new channels
    let other = TimeClient::connect(client_config(server.addr)).await.unwrap();
    assert!(other.request(1).await.is_ok());

    client.shutdown().await.unwrap();
    other.shutdown().await.unwrap();
    server.shutdown.cancel();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_unreachable_target_is_transport_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        TimeClient::connect(client_config(addr)),
    )
    .await
    .expect("connect must not hang");

    assert!(matches!(result, Err(TimeRpcError::Transport { .. })));
}

#[tokio::test]
async fn test_silent_peer_hits_deadline() {
    // Accepts TCP but never answers the handshake
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _holder = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let config = ClientConfig {
        connect_timeout: Duration::from_millis(300),
        ..client_config(addr)
    };
    let result = tokio::time::timeout(Duration::from_secs(5), TimeClient::connect(config))
        .await
        .expect("connect must not hang");

    match result {
        Err(TimeRpcError::Transport { message }) => assert!(message.contains("timed out")),
        Err(other) => panic!("unexpected error: {other:?}"),
        Ok(_) => panic!("handshake with a silent peer succeeded"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shutdown_drains_in_flight_call() {
    let clock = SlowClock {
        delay: Duration::from_millis(600),
        instant: Utc.with_ymd_and_hms(2024, 5, 1, 8, 15, 30).unwrap(),
    };
    let server = start_server(TimeProvider::with_clock(clock)).await;

    let busy = TimeClient::connect(client_config(server.addr)).await.unwrap();
    let late = TimeClient::connect(client_config(server.addr)).await.unwrap();

    let in_flight = tokio::spawn(async move {
        let result = busy.request_time(&TimeRequest::new("UTC")).await;
        (busy, result)
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    server.shutdown.cancel();

    // A call started after shutdown began fails without hanging
    let rejected = tokio::time::timeout(
        Duration::from_secs(2),
        late.request_time(&TimeRequest::new("UTC")),
    )
    .await
    .expect("call during shutdown must not hang");
    assert!(rejected.is_err());

    let (busy, result) = in_flight.await.unwrap();
    assert_eq!(result.unwrap().time, "2024-05-01T08:15:30+00:00[UTC]");

    let _ = busy.shutdown().await;
    let _ = late.shutdown().await;

    tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server must stop within the grace period")
        .unwrap()
        .unwrap();

    // The listener is gone
    let result = TimeClient::connect(client_config(server.addr)).await;
    assert!(matches!(result, Err(TimeRpcError::Transport { .. })));
}

#[tokio::test]
async fn test_shutdown_with_idle_channel_is_bounded() {
    let server = start_server(TimeProvider::new()).await;
    let idle = TimeClient::connect(client_config(server.addr)).await.unwrap();

    server.shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("idle channels must not hold the server open")
        .unwrap()
        .unwrap();

    // The server closed the channel underneath the client
    assert!(idle.request(1).await.is_err());
}
