//! Database layer for Notepin
//!
//! A libSQL file stands in for browser local storage: one table of string
//! keys and string values, each value overwritten wholesale.

mod connection;
mod local_storage;
mod migrations;

pub use connection::Database;
pub use local_storage::{KeyValueStore, LocalStorage, MemoryStorage};
