//! Program text and memory seeds.
//!
//! A JC-62 program is plain text, one instruction per line. Lines are
//! handed to the machine as written; the machine decides what they mean.
//!
//! Memory seeds use the form `ADDR=LABEL:VALUE`, e.g. `0A=x:10`.

use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::cpu::{Address, Cell, Machine, MemoryError};

/// Split program text into instruction lines.
///
/// Accepts `\n` and `\r\n` endings. A single trailing newline does not
/// produce an extra empty line, unlike a plain split on `\n`, which would
/// hand the machine one more (unrecognized) line to step through.
/// Blank lines inside the text are kept and still take a step each.
pub fn split_program(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

/// Read a program file from disk.
pub fn load_program_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>, SourceError> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| SourceError::IoError(e.to_string()))?;
    Ok(split_program(&text))
}

/// A labelled value to place in memory before a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySeed {
    pub address: Address,
    pub label: String,
    pub value: String,
}

impl MemorySeed {
    /// Write this seed into the machine's memory.
    pub fn apply(&self, machine: &mut Machine) {
        machine.write_cell(self.address, Cell::new(self.label.clone(), self.value.clone()));
    }
}

impl FromStr for MemorySeed {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, rest) = s
            .split_once('=')
            .ok_or_else(|| SourceError::SeedError(format!("`{}`: expected ADDR=LABEL:VALUE", s)))?;
        let (label, value) = rest
            .split_once(':')
            .ok_or_else(|| SourceError::SeedError(format!("`{}`: missing `:VALUE`", s)))?;

        let label = label.trim();
        if label.is_empty() {
            return Err(SourceError::SeedError(format!("`{}`: empty label", s)));
        }

        Ok(Self {
            address: addr.trim().parse()?,
            label: label.to_string(),
            value: value.trim().to_string(),
        })
    }
}

/// Errors that can occur while reading programs and seeds.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("bad memory seed {0}")]
    SeedError(String),

    #[error(transparent)]
    Memory(#[from] MemoryError),
}
