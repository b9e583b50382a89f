// ABOUTME: Library root for kubeship - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod cluster;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod monitor;
pub mod output;
pub mod probe;
pub mod report;
pub mod types;
