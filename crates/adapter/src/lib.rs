//! Adapter module - remote play via TCP socket with a JSON protocol
//!
//! This module lets external clients (bots, test harnesses, other front-ends)
//! play 2048 over a TCP connection. Each connection is its own game session.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7848)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome` and
//!    the first `observation`
//! 3. **Commanding**: Client sends one `command` per action; the server
//!    answers `ack` followed by a fresh `observation`
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Handshake with client info and optional `seed`, `best_score`,
//!   `spawn_policy`
//! - **command**: One of `up`, `down`, `left`, `right`, `undo`, `restart`
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with the session id
//! - **observation**: Grid, score, best score, status flags, last move
//! - **ack**: Command applied
//! - **error**: `handshake_required`, `invalid_direction`, `invalid_command`,
//!   `protocol_mismatch` or `session_limit`
//!
//! # Environment Variables
//!
//! - `TWENTY48_HOST`: Bind address (default: "127.0.0.1")
//! - `TWENTY48_PORT`: Port number (default: 7848)
//! - `TWENTY48_MAX_SESSIONS`: Concurrent session bound (default: 64)
//! - `TWENTY48_SPAWN_POLICY`: `on_change` (default) or `always`
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1234567890,"client":{"name":"bot","version":"1.0.0"},"protocol_version":"1.0.0","requested":{"seed":42}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1234567890,"protocol_version":"1.0.0","session_id":1,...}
//! Server -> Client: {"type":"observation","seq":1,"ts":1234567891,"grid":{"width":4,"cells":[[0,2,0,0],...]},...}
//! Client -> Server: {"type":"command","seq":2,"ts":1234567892,"action":"left"}
//! Server -> Client: {"type":"ack","seq":2,"ts":1234567892,"status":"ok"}
//! Server -> Client: {"type":"observation","seq":2,...,"last_move":{"direction":"left",...}}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7848
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"test","version":"1.0.0"},"protocol_version":"1.0.0"}
//! ```

pub mod protocol;
pub mod server;

pub use tui_2048_core as core;
pub use tui_2048_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use server::{handle_session, parse_action, run_server, ServerConfig};
