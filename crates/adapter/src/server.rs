//! TCP server for game sessions
//!
//! Every connection owns one `GameEngine`; nothing is shared between
//! sessions except the concurrency bound.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tracing::{debug, info, warn};

use crate::core::{EngineConfig, EngineError, GameEngine, SpawnPolicy, StdRandom};
use crate::protocol::*;
use crate::types::GameAction;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_sessions: usize,
    /// Used when a hello does not request a policy.
    pub spawn_policy: SpawnPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7848,
            protocol_version: "1.0.0".to_string(),
            max_sessions: 64,
            spawn_policy: SpawnPolicy::OnChange,
        }
    }
}

impl ServerConfig {
    /// Create from `TWENTY48_*` environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let host = env::var("TWENTY48_HOST").unwrap_or(defaults.host);
        let port = env::var("TWENTY48_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        let max_sessions = env::var("TWENTY48_MAX_SESSIONS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.max_sessions);

        let spawn_policy = env::var("TWENTY48_SPAWN_POLICY")
            .ok()
            .and_then(|s| SpawnPolicy::from_str(&s))
            .unwrap_or(defaults.spawn_policy);

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_sessions,
            spawn_policy,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }

    /// Major version the server accepts, e.g. "1." for "1.0.0".
    fn major_prefix(&self) -> String {
        let major = self.protocol_version.split('.').next().unwrap_or("1");
        format!("{major}.")
    }
}

#[derive(Debug, Clone)]
enum SessionOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(Box<ObservationMessage>),
}

/// Start the TCP server
///
/// `ready_tx` receives the bound address, which lets tests bind port 0.
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, max_sessions = config.max_sessions, "session server listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let sessions = Arc::new(Semaphore::new(config.max_sessions));
    let config = Arc::new(config);
    let mut session_id_counter = 0u64;

    loop {
        let (mut socket, peer) = listener.accept().await?;
        session_id_counter += 1;
        let session_id = session_id_counter;

        let Ok(permit) = Arc::clone(&sessions).try_acquire_owned() else {
            warn!(session_id, %peer, "session limit reached, refusing connection");
            tokio::spawn(async move {
                let error = create_error(0, ErrorCode::SessionLimit, "Too many sessions");
                if let Ok(mut line) = serde_json::to_vec(&error) {
                    line.push(b'\n');
                    let _ = socket.write_all(&line).await;
                    let _ = socket.shutdown().await;
                }
            });
            continue;
        };

        info!(session_id, %peer, "client connected");
        let config = Arc::clone(&config);
        tokio::spawn(async move {
            if let Err(e) = handle_session(socket, session_id, config).await {
                warn!(session_id, error = %e, "session ended with error");
            }
            info!(session_id, "client disconnected");
            drop(permit);
        });
    }
}

/// Per-connection state
struct Session {
    id: u64,
    engine: Option<GameEngine<StdRandom>>,
    last_seq: Option<u64>,
    observation_seq: u64,
}

impl Session {
    fn new(id: u64) -> Self {
        Self {
            id,
            engine: None,
            last_seq: None,
            observation_seq: 0,
        }
    }

    fn check_and_update_seq(&mut self, seq: u64) -> bool {
        match self.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                self.last_seq = Some(seq);
                true
            }
        }
    }

    fn observe(&mut self, last_move: Option<crate::core::MoveOutcome>) -> Option<ObservationMessage> {
        let engine = self.engine.as_ref()?;
        self.observation_seq += 1;
        Some(build_observation(
            &engine.snapshot(),
            self.observation_seq,
            self.id,
            last_move,
        ))
    }
}

/// Drive one session over any byte stream until the peer disconnects
///
/// Generic over the transport so tests can use in-memory duplex pipes.
pub async fn handle_session<S>(
    stream: S,
    session_id: u64,
    config: Arc<ServerConfig>,
) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<SessionOutbound>();

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(1024);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            let encoded = match &msg {
                SessionOutbound::Welcome(m) => serde_json::to_writer(&mut buf, m),
                SessionOutbound::Ack(m) => serde_json::to_writer(&mut buf, m),
                SessionOutbound::Error(m) => serde_json::to_writer(&mut buf, m),
                SessionOutbound::Observation(m) => serde_json::to_writer(&mut buf, m.as_ref()),
            };
            if encoded.is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut session = Session::new(session_id);
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if session.engine.is_some() {
                    send_error(&tx, hello.seq, ErrorCode::InvalidCommand, "hello already received");
                    continue;
                }

                if !hello.protocol_version.starts_with(&config.major_prefix()) {
                    send_error(
                        &tx,
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                session.last_seq = Some(hello.seq);
                let engine = start_engine(&hello.requested, &config, session_id);
                let welcome = create_welcome(
                    hello.seq,
                    &config.protocol_version,
                    session_id,
                    engine.spawn_policy(),
                );
                info!(
                    session_id,
                    client = %hello.client.name,
                    seed = ?hello.requested.seed,
                    spawn_policy = engine.spawn_policy().as_str(),
                    "session started"
                );
                session.engine = Some(engine);

                let _ = tx.send(SessionOutbound::Welcome(welcome));
                if let Some(obs) = session.observe(None) {
                    let _ = tx.send(SessionOutbound::Observation(Box::new(obs)));
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if session.engine.is_none() {
                    send_error(&tx, cmd.seq, ErrorCode::HandshakeRequired, "Send hello before command");
                    continue;
                }

                if !session.check_and_update_seq(cmd.seq) {
                    send_error(&tx, cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                let action = match parse_action(&cmd.action) {
                    Ok(action) => action,
                    Err(e) => {
                        warn!(session_id, action = %cmd.action, "rejected command");
                        send_error(&tx, cmd.seq, ErrorCode::InvalidDirection, &e.to_string());
                        continue;
                    }
                };

                let last_move = session.engine.as_mut().and_then(|engine| {
                    engine.apply_action(action);
                    match action {
                        GameAction::Move(_) => engine.take_last_move(),
                        _ => None,
                    }
                });
                debug!(session_id, action = action.as_str(), "command applied");

                let _ = tx.send(SessionOutbound::Ack(create_ack(cmd.seq)));
                if let Some(obs) = session.observe(last_move) {
                    let _ = tx.send(SessionOutbound::Observation(Box::new(obs)));
                }
            }

            Ok(ParsedMessage::Unknown(msg)) => {
                if session.engine.is_some() && !session.check_and_update_seq(msg.seq) {
                    send_error(&tx, msg.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                send_error(&tx, msg.seq, ErrorCode::InvalidCommand, "Unknown message type");
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                send_error(&tx, seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {e}"));
            }
        }
    }

    drop(tx);
    let _ = write_task.await;
    Ok(())
}

fn send_error(tx: &mpsc::UnboundedSender<SessionOutbound>, seq: u64, code: ErrorCode, message: &str) {
    let _ = tx.send(SessionOutbound::Error(create_error(seq, code, message)));
}

/// Map a wire action onto a game action
///
/// Anything that is neither a direction nor `undo`/`restart` is an invalid
/// direction.
pub fn parse_action(action: &str) -> Result<GameAction, EngineError> {
    GameAction::from_str(action).ok_or_else(|| EngineError::InvalidDirection(action.to_string()))
}

fn start_engine(
    requested: &RequestedSession,
    config: &ServerConfig,
    session_id: u64,
) -> GameEngine<StdRandom> {
    let engine_config = EngineConfig {
        spawn_policy: requested
            .spawn_policy
            .map(|p| p.0)
            .unwrap_or(config.spawn_policy),
        best_score: requested.best_score.unwrap_or(0),
        ..EngineConfig::default()
    };
    let rng = requested
        .seed
        .map(StdRandom::seeded)
        .unwrap_or_else(StdRandom::from_entropy);

    let mut engine = GameEngine::with_config(engine_config, rng);
    engine.set_best_score_observer(move |best: u32| {
        debug!(session_id, best, "best score raised");
    });
    engine
}
