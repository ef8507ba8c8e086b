//! # FTA Common Library
//!
//! Shared code for the Financial Text Analyzer services:
//! - Common error type
//! - Bootstrap configuration (TOML + environment resolution)

pub mod config;
pub mod error;

pub use error::{Error, Result};
