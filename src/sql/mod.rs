//! SQL plumbing
//!
//! This module provides:
//! - `types`: cell values and column data types
//! - `schema`: column metadata reported by the engine
//! - `statement`: SQL text builders and statement classification
//! - `engine`: embedded engine abstraction and its SQLite implementation

pub mod types;
pub mod schema;
pub mod statement;
pub mod engine;
