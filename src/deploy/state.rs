// ABOUTME: Retry state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce valid attempt transitions at compile time.

/// Waiting to make the next attempt.
/// Available actions: `begin()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Pending;

/// An apply call is in flight.
/// Available actions: `record()`, `succeed()`, `fail()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Attempting;

/// Terminal: one attempt succeeded.
/// Available actions: `into_history()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Succeeded;

/// Terminal: every allowed attempt failed.
/// Available actions: `into_history()`, `last_failure()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Exhausted;
