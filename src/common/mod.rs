//! Common types and utilities shared across blockdex.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Format constants and runtime options
//! - Error types
//! - Block identifiers

pub mod config;
pub mod error;
mod block_id;

pub use block_id::BlockId;
pub use config::IndexOptions;
pub use error::{Error, ErrorKind, Result};
