//! HTTP API for the MDM command service.
//!
//! Exposes `POST /commands`, `GET /health` and `GET /metrics`. The binary in
//! `main.rs` wires the archive, publisher and middleware chains together;
//! everything it uses lives here so integration tests can build the same
//! router.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;
