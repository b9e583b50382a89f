// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;
use std::time::Instant;

use crate::deploy::{ComponentOutcome, Outcome};
use crate::diagnostics::Warning;
use crate::report::RenderOptions;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
#[derive(Debug, Clone)]
pub struct Output {
    mode: OutputMode,
    color: bool,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            color: false,
            start_time: None,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color && self.mode != OutputMode::Json;
        self
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions { color: self.color }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Report a component as soon as it finishes deploying.
    pub fn component_finished(&self, outcome: &ComponentOutcome) {
        match self.mode {
            OutputMode::Normal => {
                let attempts = outcome.attempts.len();
                match outcome.status {
                    Outcome::Succeeded => println!(
                        "  ✓ {} deployed ({} attempt{})",
                        outcome.component.name,
                        attempts,
                        if attempts == 1 { "" } else { "s" }
                    ),
                    Outcome::Failed => println!(
                        "  ✗ {} failed after {} attempt{}",
                        outcome.component.name,
                        attempts,
                        if attempts == 1 { "" } else { "s" }
                    ),
                }
            }
            OutputMode::Quiet => {}
            OutputMode::Json => print_json(&DataEvent {
                event: "component",
                data: outcome,
            }),
        }
    }

    /// Print a rendered result, or its JSON form in JSON mode.
    pub fn result<T: Serialize>(&self, event: &str, value: &T, text: impl FnOnce() -> String) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => println!("{}", text()),
            OutputMode::Json => print_json(&DataEvent { event, data: value }),
        }
    }

    /// Print collected warnings (suppressed in quiet mode).
    pub fn warnings(&self, warnings: &[Warning]) {
        for warning in warnings {
            self.warning(&warning.message);
        }
    }

    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => print_json(&JsonEvent {
                event: "warning",
                message,
                duration_secs: None,
            }),
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                println!("{message}");
            }
            OutputMode::Json => print_json(&JsonEvent {
                event: "success",
                message,
                duration_secs: self.duration(),
            }),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    duration_secs: self.duration(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }
}

fn print_json<T: Serialize>(event: &T) {
    if let Ok(json) = serde_json::to_string(event) {
        println!("{json}");
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct DataEvent<'a, T: Serialize> {
    event: &'a str,
    data: &'a T,
}
