//! # Feedback Swarm Common Library
//!
//! Shared code for the feedback swarm services including:
//! - Database initialization, migrations and row models
//! - Bootstrap configuration loading
//! - Common error type
//! - Timestamp utilities

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
