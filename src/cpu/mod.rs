//! CPU emulation for the JC-62 teaching machine.
//!
//! This module implements the complete JC-62 architecture:
//! - 256 labelled memory cells addressed 00-FF
//! - Registers: A (accumulator), B (secondary), PC, IR (cursor), N (negative flag)
//! - 8-instruction set with label-based data access

pub mod memory;
pub mod registers;
pub mod decode;
pub mod snapshot;
pub mod execute;

pub use memory::{Address, Cell, Memory, MemoryError};
pub use registers::Registers;
pub use decode::{Instruction, Opcode};
pub use snapshot::Snapshot;
pub use execute::{Machine, MachineError};
