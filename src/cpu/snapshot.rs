//! Observable machine state captured after each step.

use num_bigint::BigInt;
use serde::{Serialize, Serializer};

use crate::cpu::{Memory, Registers};

/// Full microarchitectural state at one point in execution.
///
/// Owns a copy of memory, so later steps never change a snapshot
/// that was already handed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub program_counter: usize,
    #[serde(serialize_with = "serialize_int")]
    pub accumulator: BigInt,
    #[serde(serialize_with = "serialize_int")]
    pub secondary_register: BigInt,
    /// Mirrors `program_counter`.
    pub memory_address_register: usize,
    /// Mirrors `accumulator`.
    #[serde(serialize_with = "serialize_int")]
    pub memory_data_register: BigInt,
    /// The instruction cursor.
    pub instruction_register: usize,
    pub negative_flag: bool,
    /// Two-line name of the instruction under the cursor.
    pub description: String,
    /// Numbered register transfers of the instruction under the cursor.
    pub microsteps: String,
    pub memory_image: Memory,
}

impl Snapshot {
    pub(crate) fn capture(
        regs: &Registers,
        mem: &Memory,
        description: String,
        microsteps: String,
    ) -> Self {
        Self {
            program_counter: regs.pc,
            accumulator: regs.a.clone(),
            secondary_register: regs.b.clone(),
            memory_address_register: regs.mar(),
            memory_data_register: regs.mdr().clone(),
            instruction_register: regs.ir,
            negative_flag: regs.negative,
            description,
            microsteps,
            memory_image: mem.clone(),
        }
    }

    /// One-line register summary, for traces.
    pub fn summary(&self) -> String {
        format!(
            "PC={:02} IR={:02} A={} B={} N={}",
            self.program_counter,
            self.instruction_register,
            self.accumulator,
            self.secondary_register,
            u8::from(self.negative_flag),
        )
    }
}

/// Register values as plain JSON numbers while they fit in an `i64`,
/// and as decimal strings beyond that.
fn serialize_int<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
    match i64::try_from(value) {
        Ok(n) => serializer.serialize_i64(n),
        Err(_) => serializer.collect_str(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_registers_serialize_as_text() {
        let mut regs = Registers::new();
        regs.a = BigInt::from(i64::MAX) + BigInt::from(1);
        regs.b = BigInt::from(-3);
        let snapshot = Snapshot::capture(&regs, &Memory::new(), String::new(), String::new());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["accumulator"], "9223372036854775808");
        assert_eq!(json["memory_data_register"], "9223372036854775808");
        assert_eq!(json["secondary_register"], -3);
    }
}
