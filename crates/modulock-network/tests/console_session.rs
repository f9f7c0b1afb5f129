use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use modulock_engine::{Controller, ControllerConfig};
use modulock_hardware::mock::{MockOutputs, MockReader, MockReaderHandle};
use modulock_network::console::BUSY_LINE;
use modulock_network::{ConsoleConfig, ConsoleServer};
use modulock_storage::{CredentialStore, MemoryBackend};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LinesCodec};
use tokio_util::sync::CancellationToken;

struct Harness {
    addr: SocketAddr,
    cards: MockReaderHandle,
    shutdown: CancellationToken,
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn harness(max_connections: usize) -> Harness {
    let (reader, cards) = MockReader::new();
    let (outputs, _probe) = MockOutputs::new();
    let config = ControllerConfig::default().tick_interval(Duration::from_millis(1));
    let store = CredentialStore::new(MemoryBackend::new());
    let (controller, handle) = Controller::new(config, store, reader, outputs);

    let shutdown = CancellationToken::new();
    tokio::spawn(controller.run(shutdown.clone().cancelled_owned()));

    let console_config = ConsoleConfig::default()
        .bind_addr("127.0.0.1:0".parse().unwrap())
        .max_connections(max_connections)
        .max_line_length(64);
    let server = ConsoleServer::bind(console_config, handle).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run(shutdown.clone()));

    Harness {
        addr,
        cards,
        shutdown,
    }
}

async fn connect(addr: SocketAddr) -> Framed<TcpStream, LinesCodec> {
    Framed::new(TcpStream::connect(addr).await.unwrap(), LinesCodec::new())
}

async fn next_line(client: &mut Framed<TcpStream, LinesCodec>) -> String {
    tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .expect("timed out waiting for a line")
        .expect("connection closed")
        .unwrap()
}

async fn roundtrip(client: &mut Framed<TcpStream, LinesCodec>, line: &str) -> String {
    client.send(line.to_string()).await.unwrap();
    next_line(client).await
}

#[tokio::test]
async fn roster_commands() {
    let h = harness(4).await;
    let mut client = connect(h.addr).await;

    assert_eq!(
        roundtrip(&mut client, "ADD USER R1,Alice,ab12cd34").await,
        "OK: User Alice (RA: R1) added with UID AB12CD34"
    );
    assert!(
        roundtrip(&mut client, "add_user R2, Bob ,AB12CD34")
            .await
            .starts_with("ERR: Conflict: UID 'AB12CD34'")
    );
    assert!(
        roundtrip(&mut client, "ADD USER ,Name,UID")
            .await
            .starts_with("ERR: Validation error")
    );
    assert_eq!(
        roundtrip(&mut client, "get users").await,
        r#"OK: Registered users: {"users":[{"ra":"R1","name":"Alice","uid":"AB12CD34"}]}"#
    );
    assert_eq!(
        roundtrip(&mut client, "REMOVE USER R1").await,
        "OK: User with RA 'R1' removed"
    );
    assert!(
        roundtrip(&mut client, "REMOVE USER R1")
            .await
            .starts_with("ERR: Not found")
    );
}

#[tokio::test]
async fn malformed_lines_keep_session_open() {
    let h = harness(4).await;
    let mut client = connect(h.addr).await;

    assert!(roundtrip(&mut client, "FLY AWAY").await.starts_with("ERR: Parse error"));
    assert!(
        roundtrip(&mut client, "ADD USER R1,Alice")
            .await
            .ends_with("Use 'ADD USER RA,NAME,UID'")
    );
    assert!(
        roundtrip(&mut client, &"X".repeat(200))
            .await
            .starts_with("ERR: Line exceeds maximum length")
    );
    assert_eq!(roundtrip(&mut client, "OPEN DOOR").await, "OK: Door opened");
}

#[tokio::test]
async fn notices_follow_replies() {
    let h = harness(4).await;
    let mut client = connect(h.addr).await;

    assert_eq!(roundtrip(&mut client, "OPEN DOOR").await, "OK: Door opened");
    assert!(next_line(&mut client).await.ends_with("Console: Door opened"));

    h.cards.present(vec![0xDE, 0xAD, 0xBE, 0xEF]).await.unwrap();
    assert!(
        next_line(&mut client)
            .await
            .ends_with("RFID: Not authorized (DEADBEEF)")
    );
}

#[tokio::test]
async fn sessions_beyond_limit_are_turned_away() {
    let h = harness(1).await;

    let mut first = connect(h.addr).await;
    assert_eq!(roundtrip(&mut first, "OPEN DOOR").await, "OK: Door opened");

    let mut second = connect(h.addr).await;
    assert_eq!(next_line(&mut second).await, BUSY_LINE);
    let closed = tokio::time::timeout(Duration::from_secs(5), second.next())
        .await
        .unwrap();
    assert!(closed.is_none() || closed.is_some_and(|r| r.is_err()));
}
