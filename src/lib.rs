//! # JC-62 Simulator
//!
//! A stepping simulator for the JC-62, a single-accumulator teaching CPU.
//!
//! The JC-62 runs an eight-instruction program over 256 labelled memory
//! cells. After every step the simulator hands back a [`Snapshot`] of the
//! full machine state, so each register transfer can be shown to a student.

pub mod cpu;
pub mod asm;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use cpu::{Address, Cell, Instruction, Machine, MachineError, Memory, MemoryError, Opcode, Registers, Snapshot};
pub use asm::{listing, load_program_file, load_samples, split_program, MemorySeed, SampleProgram};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
