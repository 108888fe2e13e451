//! TUI debugger for the JC-62 simulator.
//!
//! Provides an interactive terminal-based debugger with:
//! - Register and flag view, with the microsteps of the current instruction
//! - Labelled memory view
//! - Step/run/breakpoint controls
//! - Program listing with the instruction cursor

mod app;
mod ui;

pub use app::{DebuggerApp, run_debugger};
