//! Core database infrastructure
//!
//! This module provides the foundational database components used by the mappers:
//! - `DatabaseConn`: Shared SQLite storage handle
//! - `SchemaManager`: Schema initialization and teardown
//! - `SchemaStatus`: Schema state enumeration

mod connection;
mod schema;

pub use connection::DatabaseConn;
pub use schema::{SchemaDefinitions, SchemaManager, SchemaStatus, SCHEMA_VERSION};
