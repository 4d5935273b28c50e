//! # Scorebook application library
//!
//! The HTTP API, CLI and configuration of the `scorebook` binary, exposed as
//! a library so integration tests can drive the router directly.

pub mod api;
pub mod cli;
pub mod config;
