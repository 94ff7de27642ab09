//! LockGate Storage Layer
//!
//! SQLite-based persistence for the gate's durable state.
//! Every multi-key write is a single transaction, committed with
//! `synchronous=FULL` so a returned write survives a crash.

mod database;
mod error;
mod migrations;

pub use database::{Database, SettingChange};
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
