//! SQLite-backed command archive.
//!
//! Stores codec-encoded command events under fixed-width event-time keys in
//! an embedded SQLite database. SQLite compares BLOBs bytewise, so a scan
//! ordered by key returns events in creation-time order.

pub mod schema;
pub mod sqlite_archive;

pub use sqlite_archive::SqliteArchive;
