//! Shared utilities for stock-bot
//!
//! This crate provides common functionality used across the stock-bot workspace,
//! including logging setup and environment variable helpers.

pub mod env;
pub mod logging;

pub use env::{EnvError, env_parse, env_var};
pub use logging::{LogFormat, init_tracing};
