//! Memeshelf persistence layer
//!
//! Repository traits with PostgreSQL implementations, plus in-memory
//! implementations of the same traits behind the `memory` feature.

pub mod db;

pub use db::*;
