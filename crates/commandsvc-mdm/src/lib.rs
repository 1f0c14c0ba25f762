//! MDM command vocabulary.
//!
//! Turns a caller-supplied [`CommandRequest`] into a typed [`Payload`]. The
//! set of commands is a closed sum type ([`Command`]); every consumer that
//! matches on it is checked for exhaustiveness by the compiler.

pub mod command;
pub mod error;
pub mod payload;
pub mod request;

pub use command::Command;
pub use error::VocabularyError;
pub use payload::Payload;
pub use request::CommandRequest;
