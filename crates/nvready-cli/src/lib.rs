//! `nvready` command-line adapter.
//!
//! Parses flags, wires the real detectors through [`bootstrap`], and renders
//! orchestrator results as text or JSON.

#![deny(unsafe_code)]

// Used by the binary only
use anyhow as _;
use dotenvy as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
