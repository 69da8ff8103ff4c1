use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use tui_2048::adapter::protocol::{create_command, create_hello};
use tui_2048::adapter::server::{run_server, ServerConfig};

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    write_half: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect failed");
        let (read_half, write_half) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            write_half,
        }
    }

    async fn send_line(&mut self, line: &str) {
        self.write_half.write_all(line.as_bytes()).await.unwrap();
        self.write_half.write_all(b"\n").await.unwrap();
        self.write_half.flush().await.unwrap();
    }

    async fn send<T: serde::Serialize>(&mut self, msg: &T) {
        let line = serde_json::to_string(msg).unwrap();
        self.send_line(&line).await;
    }

    async fn recv(&mut self) -> serde_json::Value {
        let line = tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .unwrap()
            .expect("connection closed");
        serde_json::from_str(&line).unwrap()
    }

    async fn hello(&mut self, seq: u64, seed: u64) -> (serde_json::Value, serde_json::Value) {
        let line = format!(
            r#"{{"type":"hello","seq":{seq},"ts":1,"client":{{"name":"e2e","version":"0.1.0"}},"protocol_version":"1.0.0","requested":{{"seed":{seed},"best_score":100}}}}"#
        );
        self.send_line(&line).await;
        let welcome = self.recv().await;
        let obs = self.recv().await;
        (welcome, obs)
    }
}

async fn start_server(max_sessions: usize) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_sessions,
        ..ServerConfig::default()
    };
    let (ready_tx, ready_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        let _ = run_server(config, Some(ready_tx)).await;
    });
    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");
    (addr, handle)
}

fn tile_count(obs: &serde_json::Value) -> usize {
    obs["grid"]["cells"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|row| row.as_array().unwrap().iter())
        .filter(|v| v.as_u64() != Some(0))
        .count()
}

#[tokio::test]
async fn adapter_hello_command_ack_and_observation() {
    let (addr, server) = start_server(4).await;
    let mut client = Client::connect(addr).await;

    let (welcome, obs) = client.hello(1, 42).await;
    assert_eq!(welcome["type"], "welcome");
    assert_eq!(welcome["seq"], 1);
    assert_eq!(welcome["protocol_version"], "1.0.0");
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["grid"]["width"], 4);
    assert_eq!(obs["best_score"], 100);
    assert_eq!(obs["status"], "in_progress");
    assert_eq!(obs["move_id"], 0);
    assert_eq!(tile_count(&obs), 2);

    // Some direction always moves on a two-tile grid.
    let mut seq = 2;
    let mut moved = None;
    for action in ["left", "right", "up", "down"] {
        client.send(&create_command(seq, action)).await;
        let ack = client.recv().await;
        assert_eq!(ack["type"], "ack");
        assert_eq!(ack["seq"], seq);
        assert_eq!(ack["status"], "ok");

        let obs = client.recv().await;
        assert_eq!(obs["type"], "observation");
        assert_eq!(obs["last_move"]["direction"], action);
        seq += 1;
        if obs["last_move"]["moved"] == true {
            moved = Some(obs);
            break;
        }
    }
    let obs = moved.expect("no direction moved");
    assert_eq!(obs["move_id"], 1);
    assert_eq!(obs["can_undo"], true);

    client.send(&create_command(seq, "undo")).await;
    assert_eq!(client.recv().await["type"], "ack");
    let obs = client.recv().await;
    assert_eq!(obs["move_id"], 0);
    assert_eq!(obs["can_undo"], false);
    assert!(obs.get("last_move").is_none());

    client.send(&create_command(seq + 1, "restart")).await;
    assert_eq!(client.recv().await["type"], "ack");
    let obs = client.recv().await;
    assert_eq!(obs["episode_id"], 1);
    assert_eq!(obs["score"], 0);
    assert_eq!(tile_count(&obs), 2);

    server.abort();
}

#[tokio::test]
async fn adapter_rejects_command_before_hello() {
    let (addr, server) = start_server(4).await;
    let mut client = Client::connect(addr).await;

    client.send(&create_command(1, "left")).await;
    let err = client.recv().await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "handshake_required");

    let (welcome, _) = client.hello(2, 1).await;
    assert_eq!(welcome["type"], "welcome");

    server.abort();
}

#[tokio::test]
async fn adapter_invalid_direction_leaves_session_untouched() {
    let (addr, server) = start_server(4).await;
    let mut client = Client::connect(addr).await;
    let (_, before) = client.hello(1, 9).await;

    client.send(&create_command(2, "diagonal")).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_direction");
    assert_eq!(err["seq"], 2);

    // The next observation still shows the original position.
    client.send(&create_command(3, "undo")).await;
    assert_eq!(client.recv().await["type"], "ack");
    let after = client.recv().await;
    assert_eq!(after["grid"], before["grid"]);
    assert_eq!(after["move_id"], 0);

    server.abort();
}

#[tokio::test]
async fn adapter_enforces_increasing_seq() {
    let (addr, server) = start_server(4).await;
    let mut client = Client::connect(addr).await;
    client.hello(5, 3).await;

    client.send(&create_command(5, "left")).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");

    client.send(&create_command(6, "left")).await;
    assert_eq!(client.recv().await["type"], "ack");

    server.abort();
}

#[tokio::test]
async fn adapter_protocol_mismatch() {
    let (addr, server) = start_server(4).await;
    let mut client = Client::connect(addr).await;

    client.send(&create_hello(1, "e2e", "9.0.0")).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "protocol_mismatch");

    server.abort();
}

#[tokio::test]
async fn adapter_sessions_are_independent() {
    let (addr, server) = start_server(4).await;
    let mut a = Client::connect(addr).await;
    let mut b = Client::connect(addr).await;

    let (wa, oa) = a.hello(1, 77).await;
    let (wb, ob) = b.hello(1, 77).await;
    assert_ne!(wa["session_id"], wb["session_id"]);
    // Same seed, same opening.
    assert_eq!(oa["grid"], ob["grid"]);

    a.send(&create_command(2, "restart")).await;
    a.recv().await;
    let oa = a.recv().await;
    assert_eq!(oa["episode_id"], 1);

    b.send(&create_command(2, "undo")).await;
    b.recv().await;
    let ob = b.recv().await;
    assert_eq!(ob["episode_id"], 0);

    server.abort();
}

#[tokio::test]
async fn adapter_session_limit() {
    let (addr, server) = start_server(1).await;
    let mut first = Client::connect(addr).await;
    first.hello(1, 1).await;

    let mut second = Client::connect(addr).await;
    let err = second.recv().await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "session_limit");

    server.abort();
}
