//! # Notemend Common Library
//!
//! Shared code for the notemend middleware:
//! - Error types (Error enum)
//! - Layered configuration loading (ENV → TOML → compiled default)

pub mod config;
pub mod error;

pub use error::{Error, Result};
