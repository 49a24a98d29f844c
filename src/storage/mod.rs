//! Storage layer - block I/O and block formats.
//!
//! This module handles persistent storage:
//! - [`BlockFile`] - Low-level file I/O in 512-byte blocks
//! - [`block`] - Block types and their big-endian layouts

mod block_file;
pub mod block;

pub use block_file::BlockFile;
