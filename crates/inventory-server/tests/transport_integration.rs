//! Integration tests for the three server bindings over real sockets.
//!
//! Each test binds `127.0.0.1:0`, runs [`serve`] on a background task and
//! talks to it with the codecs from `inventory_core`, exactly as a client
//! would.  The store is backed by a [`SnapshotFile`] in a temporary
//! directory, so every test also checks what reached the disk.
//!
//! ```text
//! test ──TcpStream──▶ serve() ──▶ binary / http / json codec
//!                                   └─▶ InventoryService ─▶ SnapshotFile (tempdir)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use inventory_core::protocol::http::client_handshake;
use inventory_core::protocol::{read_frame, write_frame, JsonRpcRequest, JsonRpcResponse, RpcRequest};
use inventory_core::{Command, Frame, Method, Response, Target, Transport, TransportError, Verb};
use inventory_server::{serve, InventoryService, RecordStore, SnapshotFile};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// A running server plus everything needed to inspect and stop it.
struct TestServer {
    addr: SocketAddr,
    running: Arc<AtomicBool>,
    task: JoinHandle<()>,
    db_path: PathBuf,
    _dir: TempDir,
}

impl TestServer {
    async fn start(transport: Transport) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("inventory.toml");
        let store = RecordStore::open(Box::new(SnapshotFile::new(db_path.clone())));
        let service = Arc::new(InventoryService::new(store, Duration::ZERO));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let running = Arc::new(AtomicBool::new(true));
        let task = tokio::spawn(serve(listener, transport, service, Arc::clone(&running)));

        Self {
            addr,
            running,
            task,
            db_path,
            _dir: dir,
        }
    }

    fn snapshot(&self) -> String {
        std::fs::read_to_string(&self.db_path).unwrap_or_default()
    }
}

fn command(verb: Verb, target: Target, args: &[&str]) -> Command {
    Command::new(verb, target, args.iter().map(|s| s.to_string()).collect())
}

/// Sends one binary request and returns the decoded response.
async fn binary_call(stream: &mut TcpStream, command: Command, seq: u64) -> Response {
    let request = Frame::Request(RpcRequest::for_command(command));
    write_frame(stream, &request, seq).await.unwrap();
    match read_frame(stream).await.unwrap() {
        Some((Frame::Response(response), reply_seq)) => {
            assert_eq!(reply_seq, seq, "reply must echo the request sequence number");
            response
        }
        other => panic!("expected a response frame, got {other:?}"),
    }
}

// ── Binary over TCP ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_binary_add_then_show_reaches_snapshot() {
    // Arrange
    let server = TestServer::start(Transport::Tcp).await;
    let mut stream = TcpStream::connect(server.addr).await.unwrap();

    // Act
    let added = binary_call(
        &mut stream,
        command(Verb::Add, Target::Vegetable, &["carrot", "2.50", "100"]),
        1,
    )
    .await;
    let shown = binary_call(&mut stream, command(Verb::Show, Target::All, &[]), 2).await;

    // Assert
    assert!(added.ok);
    assert_eq!(added.message, "Vegetable 'carrot' is added successfully!");
    assert_eq!(shown.records.len(), 1);
    assert_eq!(shown.records[0].name, "carrot");
    assert!(server.snapshot().contains("carrot"));
}

#[tokio::test]
async fn test_binary_rejects_non_request_frame_and_keeps_connection() {
    // Arrange
    let server = TestServer::start(Transport::Tcp).await;
    let mut stream = TcpStream::connect(server.addr).await.unwrap();

    // Act: a client must never send a Response frame.
    write_frame(&mut stream, &Frame::Response(Response::success("hi")), 7)
        .await
        .unwrap();
    let first = read_frame(&mut stream).await.unwrap();
    let second = binary_call(&mut stream, command(Verb::Show, Target::All, &[]), 8).await;

    // Assert
    assert!(matches!(first, Some((Frame::Error(_), 7))));
    assert!(second.ok);
}

// ── HTTP-tunnelled binary ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_http_handshake_then_frames() {
    // Arrange
    let server = TestServer::start(Transport::Http).await;
    let mut stream = TcpStream::connect(server.addr).await.unwrap();

    // Act
    client_handshake(&mut stream).await.unwrap();
    let response = binary_call(
        &mut stream,
        command(Verb::Add, Target::Vegetable, &["tomato", "3.10", "40"]),
        1,
    )
    .await;

    // Assert
    assert!(response.ok);
    assert!(server.snapshot().contains("tomato"));
}

#[tokio::test]
async fn test_http_wrong_path_gets_404_and_close() {
    // Arrange
    let server = TestServer::start(Transport::Http).await;
    let mut stream = TcpStream::connect(server.addr).await.unwrap();

    // Act
    stream
        .write_all(b"CONNECT /somewhere-else HTTP/1.0\r\n\r\n")
        .await
        .unwrap();
    let mut reply = String::new();
    stream.read_to_string(&mut reply).await.unwrap();

    // Assert
    assert!(reply.starts_with("HTTP/1.0 404"), "got: {reply}");
}

/// How long a peer on the wrong binding may wait before the server hangs up.
const MISMATCH_DEADLINE: Duration = Duration::from_secs(2);

#[tokio::test]
async fn test_raw_binary_client_cannot_talk_to_http_binding() {
    // Arrange
    let server = TestServer::start(Transport::Http).await;
    let mut stream = TcpStream::connect(server.addr).await.unwrap();

    // Act: frames without the handshake, write side left open.
    let request = Frame::Request(RpcRequest::for_command(command(Verb::Show, Target::All, &[])));
    write_frame(&mut stream, &request, 1).await.unwrap();
    let result = tokio::time::timeout(MISMATCH_DEADLINE, read_frame(&mut stream))
        .await
        .expect("server kept a binary peer waiting on the HTTP binding");

    // Assert: closed or reset, no frame and no HTTP reply.
    assert!(
        matches!(result, Ok(None) | Err(TransportError::Io(_))),
        "got {result:?}"
    );
    assert!(server.snapshot().is_empty());
}

// ── JSON-RPC ──────────────────────────────────────────────────────────────────

async fn json_call(
    lines: &mut tokio::io::Lines<BufReader<tokio::net::tcp::ReadHalf<'_>>>,
    write: &mut tokio::net::tcp::WriteHalf<'_>,
    request: &JsonRpcRequest,
) -> JsonRpcResponse {
    let mut line = serde_json::to_vec(request).unwrap();
    line.push(b'\n');
    write.write_all(&line).await.unwrap();
    let reply = lines.next_line().await.unwrap().expect("server closed the stream");
    serde_json::from_str(&reply).unwrap()
}

#[tokio::test]
async fn test_json_update_then_show_one() {
    // Arrange
    let server = TestServer::start(Transport::Json).await;
    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    let (read, mut write) = stream.split();
    let mut lines = BufReader::new(read).lines();
    let add = JsonRpcRequest::new(
        Method::AddInventory,
        command(Verb::Add, Target::Vegetable, &["onion", "1.20", "300"]),
        1,
    );
    let update = JsonRpcRequest::new(
        Method::UpdateInventory,
        command(Verb::Update, Target::Price, &["onion", "1.35"]),
        2,
    );
    let show = JsonRpcRequest::new(
        Method::ShowInventory,
        command(Verb::Show, Target::Price, &["onion"]),
        3,
    );

    // Act
    json_call(&mut lines, &mut write, &add).await;
    let updated = json_call(&mut lines, &mut write, &update).await;
    let shown = json_call(&mut lines, &mut write, &show).await;

    // Assert
    assert_eq!(updated.id, serde_json::json!(2));
    assert_eq!(
        updated.result.unwrap().message,
        "Vegetable 'onion' is updated successfully!"
    );
    let shown = shown.result.unwrap();
    assert_eq!(shown.records[0].unit_price, "1.35");
    assert!(server.snapshot().contains("1.35"));
}

#[tokio::test]
async fn test_json_unknown_method_is_answered_and_connection_kept() {
    // Arrange
    let server = TestServer::start(Transport::Json).await;
    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    let (read, mut write) = stream.split();
    let mut lines = BufReader::new(read).lines();
    let bogus = JsonRpcRequest {
        method: "DeleteInventory".to_string(),
        params: vec![command(Verb::Show, Target::All, &[])],
        id: serde_json::json!(1),
    };
    let show = JsonRpcRequest::new(Method::ShowInventory, command(Verb::Show, Target::All, &[]), 2);

    // Act
    let rejected = json_call(&mut lines, &mut write, &bogus).await;
    let accepted = json_call(&mut lines, &mut write, &show).await;

    // Assert
    assert_eq!(rejected.error.as_deref(), Some("unknown method: DeleteInventory"));
    assert!(rejected.result.is_none());
    assert!(accepted.result.unwrap().ok);
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_clearing_running_stops_loop_and_releases_port() {
    // Arrange
    let server = TestServer::start(Transport::Tcp).await;

    // Act
    server.running.store(false, Ordering::Relaxed);
    let stopped = tokio::time::timeout(Duration::from_secs(2), server.task).await;

    // Assert
    assert!(stopped.is_ok(), "accept loop did not notice the cleared flag");
    assert!(TcpListener::bind(server.addr).await.is_ok());
}

#[tokio::test]
async fn test_binary_frames_on_json_binding_close_the_connection() {
    // Arrange: a binary frame holds no newline; the first byte alone is enough
    // for the server to hang up.
    let server = TestServer::start(Transport::Json).await;
    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    let request = Frame::Request(RpcRequest::for_command(command(Verb::Show, Target::All, &[])));

    // Act: write side left open.
    write_frame(&mut stream, &request, 1).await.unwrap();
    let result = tokio::time::timeout(MISMATCH_DEADLINE, read_frame(&mut stream))
        .await
        .expect("server kept a binary peer waiting on the JSON binding");

    // Assert
    assert!(
        matches!(result, Ok(None) | Err(TransportError::Io(_))),
        "got {result:?}"
    );
}
