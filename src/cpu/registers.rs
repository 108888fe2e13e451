//! JC-62 CPU registers.
//!
//! The JC-62 has:
//! - A: accumulator (main computation register)
//! - B: secondary register, the second ALU operand
//! - PC: program counter
//! - IR: instruction cursor into the loaded program
//! - N: negative flag, written only by SUB
//!
//! A and B are arbitrary-precision, so sums never overflow.
//! MAR and MDR are not stored; they mirror PC and A in every snapshot.

use num_bigint::{BigInt, Sign};
use serde::{Serialize, Deserialize};

/// The JC-62 register file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// A: accumulator
    pub a: BigInt,

    /// B: secondary register
    pub b: BigInt,

    /// PC: program counter
    pub pc: usize,

    /// IR: index of the program line to fetch next
    pub ir: usize,

    /// N: set when the last SUB went negative
    pub negative: bool,
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Increment the program counter by 1.
    pub fn advance_pc(&mut self) {
        self.pc += 1;
    }

    /// Move the instruction cursor to the next program line.
    pub fn advance_ir(&mut self) {
        self.ir += 1;
    }

    /// Point both the cursor and the program counter at `line`.
    pub fn jump(&mut self, line: usize) {
        self.ir = line;
        self.pc = line;
    }

    /// A := A + B
    pub fn add(&mut self) {
        self.a += &self.b;
    }

    /// A := |A - B|, N := (A - B < 0)
    pub fn subtract(&mut self) {
        let raw = &self.a - &self.b;
        self.negative = raw.sign() == Sign::Minus;
        self.a = if self.negative { -raw } else { raw };
    }

    /// MAR mirrors the program counter.
    pub fn mar(&self) -> usize {
        self.pc
    }

    /// MDR mirrors the accumulator.
    pub fn mdr(&self) -> &BigInt {
        &self.a
    }
}
