//! End-to-end tests: the real client codecs against a real server.
//!
//! Every test starts an `inventory_server` accept loop on an ephemeral
//! loopback port, backed by a snapshot file in a temporary directory, and
//! drives it through [`connect`] + [`Dispatcher`] exactly as the
//! `inventory-client` binary does.
//!
//! # What is covered
//!
//! - The six reference scenarios (add, duplicate, update, not found, show
//!   all, short add) on every binding.
//! - Transport equivalence: one script, three bindings, identical replies.
//! - Mutual exclusion across two client connections.
//! - A client whose binding does not match the server's fails at the
//!   connection level, not with an `ok == false` response, and fails
//!   promptly: the server turns away the foreign first byte.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use inventory_client::{connect, ClientError, Dispatcher, DEFAULT_REPLY_TIMEOUT};
use inventory_core::{Binding, Command, Response, Transport, TransportError};
use inventory_server::{serve, InventoryService, RecordStore, SnapshotFile};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Upper bound on how long a mismatched call may take to fail.
const MISMATCH_DEADLINE: Duration = Duration::from_secs(5);

const ALL_TRANSPORTS: [Transport; 3] = [Transport::Tcp, Transport::Http, Transport::Json];

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Server {
    port: u16,
    service: Arc<InventoryService>,
    running: Arc<AtomicBool>,
    dir: TempDir,
}

impl Server {
    async fn start(transport: Transport, delay: Duration) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let sink = SnapshotFile::new(dir.path().join("inventory.toml"));
        let service = Arc::new(InventoryService::new(RecordStore::open(Box::new(sink)), delay));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let running = Arc::new(AtomicBool::new(true));
        tokio::spawn(serve(
            listener,
            transport,
            Arc::clone(&service),
            Arc::clone(&running),
        ));

        Self {
            port,
            service,
            running,
            dir,
        }
    }

    fn binding(&self, transport: Transport) -> Binding {
        Binding {
            port: self.port,
            transport,
        }
    }

    async fn client(&self, transport: Transport) -> Dispatcher {
        let client = connect(self.binding(transport), "127.0.0.1", DEFAULT_REPLY_TIMEOUT)
            .await
            .unwrap();
        Dispatcher::new(client)
    }

    fn snapshot(&self) -> String {
        std::fs::read_to_string(self.dir.path().join("inventory.toml")).unwrap_or_default()
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

fn cmd(line: &str) -> Command {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    Command::from_tokens(&tokens).unwrap()
}

// ── Reference scenarios on every binding ─────────────────────────────────────

#[tokio::test]
async fn test_add_to_empty_store_on_every_binding() {
    for transport in ALL_TRANSPORTS {
        // Arrange
        let server = Server::start(transport, Duration::ZERO).await;
        let mut client = server.client(transport).await;

        // Act
        let response = client.send(&cmd("add vegetable carrot 2.50 100")).await.unwrap();

        // Assert
        assert!(response.ok, "{transport}: {}", response.message);
        assert_eq!(response.message, "Vegetable 'carrot' is added successfully!");
        let stored = server.service.store().find("carrot").unwrap();
        assert_eq!((stored.unit_price.as_str(), stored.stock_kg.as_str()), ("2.50", "100"));
        assert!(server.snapshot().contains("carrot"), "{transport}: snapshot not written");
    }
}

#[tokio::test]
async fn test_duplicate_add_leaves_store_unchanged_on_every_binding() {
    for transport in ALL_TRANSPORTS {
        // Arrange
        let server = Server::start(transport, Duration::ZERO).await;
        let mut client = server.client(transport).await;
        client.send(&cmd("add vegetable carrot 2.50 100")).await.unwrap();

        // Act
        let response = client.send(&cmd("add vegetable carrot 3.00 50")).await.unwrap();

        // Assert
        assert!(!response.ok);
        assert!(response.message.contains("already exists"), "{transport}: {}", response.message);
        assert_eq!(server.service.store().find("carrot").unwrap().unit_price, "2.50");
        assert_eq!(server.service.store().find_all().len(), 1);
    }
}

#[tokio::test]
async fn test_update_price_on_every_binding() {
    for transport in ALL_TRANSPORTS {
        let server = Server::start(transport, Duration::ZERO).await;
        let mut client = server.client(transport).await;
        client.send(&cmd("add vegetable carrot 2.50 100")).await.unwrap();

        let response = client.send(&cmd("update price carrot 3.00")).await.unwrap();

        assert!(response.ok, "{transport}: {}", response.message);
        assert_eq!(server.service.store().find("carrot").unwrap().unit_price, "3.00");
    }
}

#[tokio::test]
async fn test_update_missing_record_is_not_found_on_every_binding() {
    for transport in ALL_TRANSPORTS {
        let server = Server::start(transport, Duration::ZERO).await;
        let mut client = server.client(transport).await;

        let response = client.send(&cmd("update stocks kale 10")).await.unwrap();

        assert!(!response.ok);
        assert!(response.message.contains("not found"), "{transport}: {}", response.message);
    }
}

#[tokio::test]
async fn test_show_all_returns_insertion_order_on_every_binding() {
    for transport in ALL_TRANSPORTS {
        // Arrange
        let server = Server::start(transport, Duration::ZERO).await;
        let mut client = server.client(transport).await;
        for line in [
            "add vegetable carrot 2.50 100",
            "add vegetable tomato 3.10 40",
            "add vegetable onion 1.20 300",
        ] {
            client.send(&cmd(line)).await.unwrap();
        }

        // Act
        let response = client.send(&cmd("show vegetable all")).await.unwrap();

        // Assert
        assert!(response.ok);
        let names: Vec<&str> = response.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["carrot", "tomato", "onion"], "{transport}");
    }
}

#[tokio::test]
async fn test_short_add_is_an_arity_error_on_every_binding() {
    for transport in ALL_TRANSPORTS {
        let server = Server::start(transport, Duration::ZERO).await;
        let mut client = server.client(transport).await;

        let response = client.send(&cmd("add vegetable onion 1.0")).await.unwrap();

        assert!(!response.ok);
        assert_eq!(
            response.message,
            "Invalid number of inputs for 'add vegetable' command!"
        );
        assert!(server.service.store().find_all().is_empty());
        assert!(server.snapshot().is_empty(), "{transport}: nothing may be persisted");
    }
}

// ── Transport equivalence ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_all_bindings_give_identical_responses() {
    // Arrange
    let script = [
        "add vegetable carrot 2.50 100",
        "add vegetable carrot 9.99 1",
        "update stocks carrot 90",
        "update price kale 1.00",
        "show price carrot",
        "show vegetable kale",
        "show vegetable all",
        "add vegetable onion 1.0",
    ];

    // Act
    let mut transcripts: Vec<Vec<Response>> = Vec::new();
    for transport in ALL_TRANSPORTS {
        let server = Server::start(transport, Duration::ZERO).await;
        let mut client = server.client(transport).await;
        let mut replies = Vec::new();
        for line in script {
            replies.push(client.send(&cmd(line)).await.unwrap());
        }
        transcripts.push(replies);
    }

    // Assert
    assert_eq!(transcripts[0], transcripts[1], "binary/tcp vs binary/http");
    assert_eq!(transcripts[0], transcripts[2], "binary/tcp vs json-rpc/tcp");
}

// ── Mutual exclusion ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_second_writer_during_delay_is_busy() {
    // Arrange
    let server = Server::start(Transport::Tcp, Duration::from_millis(400)).await;
    let mut first = server.client(Transport::Tcp).await;
    let mut second = server.client(Transport::Tcp).await;

    // Act
    let first_cmd = cmd("add vegetable carrot 2.50 100");
    let (a, b) = tokio::join!(first.send(&first_cmd), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        second.send(&cmd("add vegetable onion 1.20 300")).await
    });

    // Assert
    let (a, b) = (a.unwrap(), b.unwrap());
    assert!(a.ok, "{}", a.message);
    assert!(b.is_busy(), "{}", b.message);
    assert!(server.service.store().find("onion").is_none());
    assert!(!server.snapshot().contains("onion"));
}

// ── Binding mismatch ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_json_client_against_binary_server_fails_the_call() {
    // Arrange
    let server = Server::start(Transport::Tcp, Duration::ZERO).await;
    let mut client = server.client(Transport::Json).await;

    // Act
    let result = client.send(&cmd("show vegetable all")).await;

    // Assert
    assert!(matches!(result, Err(ClientError::Transport(_))), "got {result:?}");
}

#[tokio::test]
async fn test_http_client_against_non_http_servers_fails_to_connect() {
    for server_transport in [Transport::Tcp, Transport::Json] {
        let server = Server::start(server_transport, Duration::ZERO).await;

        let result = tokio::time::timeout(
            MISMATCH_DEADLINE,
            connect(server.binding(Transport::Http), "127.0.0.1", DEFAULT_REPLY_TIMEOUT),
        )
        .await
        .expect("HTTP handshake must fail before the deadline");

        assert!(
            matches!(result, Err(ClientError::Transport(_))),
            "HTTP handshake against {server_transport} must fail"
        );
    }
}

#[tokio::test]
async fn test_binary_client_against_json_and_http_servers_fails_promptly() {
    for server_transport in [Transport::Json, Transport::Http] {
        // Arrange: the connection stays open on both ends.
        let server = Server::start(server_transport, Duration::ZERO).await;
        let mut client = server.client(Transport::Tcp).await;

        // Act
        let result = tokio::time::timeout(MISMATCH_DEADLINE, client.send(&cmd("show vegetable all")))
            .await
            .unwrap_or_else(|_| panic!("binary call against {server_transport} hung"));

        // Assert
        // EOF or a reset, depending on unread bytes at close; never a timeout.
        assert!(
            matches!(&result, Err(ClientError::Transport(e)) if !matches!(e, TransportError::TimedOut(_))),
            "binary client against {server_transport}: got {result:?}"
        );
        assert!(server.service.store().find_all().is_empty());
    }
}

#[tokio::test]
async fn test_json_client_against_http_server_fails_promptly() {
    // Arrange
    let server = Server::start(Transport::Http, Duration::ZERO).await;
    let mut client = server.client(Transport::Json).await;

    // Act
    let result = tokio::time::timeout(MISMATCH_DEADLINE, client.send(&cmd("add vegetable carrot 2.50 100")))
        .await
        .expect("JSON call against the HTTP binding hung");

    // Assert
    assert!(matches!(result, Err(ClientError::Transport(_))), "got {result:?}");
    assert!(server.service.store().find("carrot").is_none());
}

