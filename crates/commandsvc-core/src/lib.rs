//! Command service core.
//!
//! Defines the command event, its binary codec, the archive key encoding,
//! the error taxonomy, and the contracts (`Archive`, `Publisher`,
//! `CommandService`) the pipeline is assembled from. It contains no
//! infrastructure code.

pub mod archive;
pub mod clock;
pub mod codec;
pub mod error;
pub mod event;
pub mod publisher;
pub mod service;
pub mod telemetry;
