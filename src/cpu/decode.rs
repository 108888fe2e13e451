//! Instruction decoder for the JC-62.
//!
//! Programs are plain text, one instruction per line. A line is split into
//! a mnemonic and an operand; the mnemonic is matched as a prefix, in a fixed
//! priority order, against the eight opcodes.

use std::fmt;

use serde::{Serialize, Deserialize};

/// The eight JC-62 opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Mba,
    Lda,
    Sta,
    Add,
    Sub,
    Jmp,
    Jn,
    Hlt,
}

impl Opcode {
    /// Opcodes in the order a line's mnemonic is tried against them.
    ///
    /// `JN` comes first so that it is never shadowed.
    pub const PRIORITY: [Opcode; 8] = [
        Opcode::Jn,
        Opcode::Lda,
        Opcode::Sta,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mba,
        Opcode::Jmp,
        Opcode::Hlt,
    ];

    /// Assembly mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Mba => "MBA",
            Opcode::Lda => "LDA",
            Opcode::Sta => "STA",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Jmp => "JMP",
            Opcode::Jn => "JN",
            Opcode::Hlt => "HLT",
        }
    }

    /// Short human-readable name.
    pub const fn title(self) -> &'static str {
        match self {
            Opcode::Mba => "Move A to B",
            Opcode::Lda => "Load A",
            Opcode::Sta => "Store A",
            Opcode::Add => "Add B to A",
            Opcode::Sub => "Subtract B from A",
            Opcode::Jmp => "Jump to Address",
            Opcode::Jn => "Jump if Negative",
            Opcode::Hlt => "Terminate",
        }
    }

    /// Register transfers performed by this opcode, in order.
    pub fn transfers(self) -> &'static [&'static str] {
        match self {
            Opcode::Mba => &["B ← A"],
            Opcode::Lda => &["MAR ← IR", "MDR ← M(MAR)", "A ← MDR"],
            Opcode::Sta => &["MAR ← IR", "MDR ← A", "M(MAR) ← MDR"],
            Opcode::Add => &["A ← ALU(add)"],
            Opcode::Sub => &["A ← ALU(sub)"],
            Opcode::Jmp | Opcode::Jn => &["PC ← IR"],
            Opcode::Hlt => &[],
        }
    }

    /// Two-line description: mnemonic, then the title in parentheses.
    pub fn description(self) -> String {
        format!("{}\n({})", self.mnemonic(), self.title())
    }

    /// Numbered register-transfer trace, one transfer per line.
    pub fn microsteps(self) -> String {
        self.transfers()
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Split a trimmed line into its opcode and the trimmed operand text.
    pub fn split(line: &str) -> Option<(Opcode, &str)> {
        let line = line.trim();
        Self::PRIORITY.iter().find_map(|&op| {
            line.strip_prefix(op.mnemonic())
                .map(|operand| (op, operand.trim()))
        })
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Decoded JC-62 instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// B := A
    Mba,

    /// A := value of the first cell labelled `label`
    Lda { label: String },

    /// value of the first cell labelled `label` := A
    Sta { label: String },

    /// A := A + B
    Add,

    /// A := |A - B|, N := (A - B < 0)
    Sub,

    /// Unconditional jump: IR := PC := target
    Jmp { target: usize },

    /// Jump if negative: if N then IR := PC := target
    Jn { target: usize },

    /// No register effect beyond PC advance
    Hlt,
}

impl Instruction {
    /// The opcode of this instruction.
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Mba => Opcode::Mba,
            Instruction::Lda { .. } => Opcode::Lda,
            Instruction::Sta { .. } => Opcode::Sta,
            Instruction::Add => Opcode::Add,
            Instruction::Sub => Opcode::Sub,
            Instruction::Jmp { .. } => Opcode::Jmp,
            Instruction::Jn { .. } => Opcode::Jn,
            Instruction::Hlt => Opcode::Hlt,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Lda { label } | Instruction::Sta { label } => {
                write!(f, "{} {}", self.opcode(), label)
            }
            Instruction::Jmp { target } | Instruction::Jn { target } => {
                write!(f, "{} {:02}", self.opcode(), target)
            }
            _ => write!(f, "{}", self.opcode()),
        }
    }
}

/// Decode one program line.
///
/// Returns `None` for lines that match no opcode, and for jumps whose
/// operand is not a decimal line number. Both execute as no-ops.
pub fn decode(line: &str) -> Option<Instruction> {
    let (opcode, operand) = Opcode::split(line)?;

    let instruction = match opcode {
        Opcode::Mba => Instruction::Mba,
        Opcode::Add => Instruction::Add,
        Opcode::Sub => Instruction::Sub,
        Opcode::Hlt => Instruction::Hlt,
        Opcode::Lda => Instruction::Lda { label: operand.to_string() },
        Opcode::Sta => Instruction::Sta { label: operand.to_string() },
        Opcode::Jmp => Instruction::Jmp { target: parse_target(operand)? },
        Opcode::Jn => Instruction::Jn { target: parse_target(operand)? },
    };

    Some(instruction)
}

/// Parse a jump operand: the first token, as a decimal line number.
fn parse_target(operand: &str) -> Option<usize> {
    operand.split_whitespace().next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_no_operand() {
        assert_eq!(decode("MBA"), Some(Instruction::Mba));
        assert_eq!(decode("  ADD  "), Some(Instruction::Add));
        assert_eq!(decode("SUB"), Some(Instruction::Sub));
        assert_eq!(decode("HLT"), Some(Instruction::Hlt));
    }

    #[test]
    fn test_decode_labels() {
        assert_eq!(decode("LDA x"), Some(Instruction::Lda { label: "x".into() }));
        assert_eq!(decode("STA  total "), Some(Instruction::Sta { label: "total".into() }));
        assert_eq!(decode("LDA"), Some(Instruction::Lda { label: String::new() }));
    }

    #[test]
    fn test_decode_jumps() {
        assert_eq!(decode("JMP 05"), Some(Instruction::Jmp { target: 5 }));
        assert_eq!(decode("JN 12"), Some(Instruction::Jn { target: 12 }));
        assert_eq!(decode("JMP 3 ; loop"), Some(Instruction::Jmp { target: 3 }));
        assert_eq!(decode("JMP"), None);
        assert_eq!(decode("JN zz"), None);
    }

    #[test]
    fn test_decode_unrecognized() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("NOP"), None);
        assert_eq!(decode("lda x"), None);
    }

    #[test]
    fn test_prefix_priority() {
        // Mnemonics are prefixes, so trailing text still selects the opcode.
        assert_eq!(decode("ADDX"), Some(Instruction::Add));
        assert_eq!(Opcode::split("JN 4").map(|(op, _)| op), Some(Opcode::Jn));
        assert_eq!(Opcode::split("JMP 4").map(|(op, _)| op), Some(Opcode::Jmp));
    }

    #[test]
    fn test_metadata() {
        assert_eq!(Opcode::Lda.description(), "LDA\n(Load A)");
        assert_eq!(Opcode::Jn.description(), "JN\n(Jump if Negative)");
        assert_eq!(
            Opcode::Sta.microsteps(),
            "1. MAR ← IR\n2. MDR ← A\n3. M(MAR) ← MDR"
        );
        assert_eq!(Opcode::Mba.microsteps(), "1. B ← A");
        assert_eq!(Opcode::Hlt.microsteps(), "");
    }

    #[test]
    fn test_display() {
        assert_eq!(Instruction::Jmp { target: 5 }.to_string(), "JMP 05");
        assert_eq!(Instruction::Lda { label: "x".into() }.to_string(), "LDA x");
        assert_eq!(Instruction::Hlt.to_string(), "HLT");
    }
}
