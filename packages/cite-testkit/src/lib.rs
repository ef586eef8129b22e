//! Test doubles and fixtures shared by the workspace's integration tests.

mod config;
mod database;
mod error;
mod memory;

pub use config::sample_config;
pub use database::{TestDatabase, env_dsn};
pub use error::{Error, Result};
pub use memory::{MemoryChunkStore, chunk};
