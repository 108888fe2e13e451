//! Sample program bundles.
//!
//! A bundle is a JSON array of programs, each with the memory it expects:
//!
//! ```json
//! [
//!   {
//!     "programName": "Add two numbers",
//!     "program": ["LDA x", "MBA", "LDA y", "ADD", "STA z", "HLT"],
//!     "ramSetup": [
//!       { "address": "00", "label": "x", "value": "5" },
//!       { "address": "01", "label": "y", "value": "7" },
//!       { "address": "02", "label": "z" }
//!     ]
//!   }
//! ]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpu::memory::{EMPTY_LABEL, EMPTY_VALUE};
use crate::cpu::{Machine, MemoryError};

/// One memory cell a sample program expects to find.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RamSetup {
    pub address: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// A named program together with its memory setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleProgram {
    pub program_name: String,
    pub program: Vec<String>,
    #[serde(default)]
    pub ram_setup: Vec<RamSetup>,
}

impl SampleProgram {
    /// Reset the machine, seed its memory and load the program.
    ///
    /// Cells without a label or value get `NULL` / `0`. Fails on the first
    /// invalid address, leaving the machine reset but only partly seeded.
    pub fn install(&self, machine: &mut Machine) -> Result<(), MemoryError> {
        machine.reset();
        for setup in &self.ram_setup {
            let label = setup.label.as_deref().unwrap_or(EMPTY_LABEL);
            let value = setup.value.as_deref().unwrap_or(EMPTY_VALUE);
            machine.set_memory(&setup.address, label, value)?;
        }
        machine.load(self.program.iter().cloned());
        Ok(())
    }
}

/// Parse a bundle from JSON text.
pub fn parse_samples(json: &str) -> Result<Vec<SampleProgram>, SampleError> {
    serde_json::from_str(json).map_err(|e| SampleError::JsonError(e.to_string()))
}

/// Load a bundle from disk.
pub fn load_samples<P: AsRef<Path>>(path: P) -> Result<Vec<SampleProgram>, SampleError> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| SampleError::IoError(e.to_string()))?;
    parse_samples(&text)
}

/// Errors that can occur while loading sample bundles.
#[derive(Debug, Clone, Error)]
pub enum SampleError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("invalid sample bundle: {0}")]
    JsonError(String),

    #[error("no sample #{index} (bundle has {count})")]
    NoSuchSample { index: usize, count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::{Address, Cell};
    use num_bigint::BigInt;

    const BUNDLE: &str = r#"[
        {
            "programName": "Add two numbers",
            "program": ["LDA x", "MBA", "LDA y", "ADD", "STA z", "HLT"],
            "ramSetup": [
                { "address": "00", "label": "x", "value": "5" },
                { "address": "01", "label": "y", "value": "7" },
                { "address": "0a", "label": "z" }
            ]
        },
        {
            "programName": "Empty",
            "program": []
        }
    ]"#;

    #[test]
    fn test_parse_bundle() {
        let samples = parse_samples(BUNDLE).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].program_name, "Add two numbers");
        assert_eq!(samples[0].ram_setup.len(), 3);
        assert!(samples[1].ram_setup.is_empty());
    }

    #[test]
    fn test_install_and_run() {
        let samples = parse_samples(BUNDLE).unwrap();
        let mut machine = Machine::new();
        machine.regs.a = BigInt::from(99);

        samples[0].install(&mut machine).unwrap();
        assert_eq!(machine.regs.a, BigInt::from(0));
        assert_eq!(machine.mem.read(Address::new(0x0A)), &Cell::new("z", "0"));

        let states = machine.run_all();
        assert_eq!(states.len(), 6);
        assert_eq!(machine.mem.read(Address::new(0x0A)).value, "12");
    }

    #[test]
    fn test_install_bad_address() {
        let sample = SampleProgram {
            program_name: "bad".into(),
            program: vec!["HLT".into()],
            ram_setup: vec![RamSetup {
                address: "1FF".into(),
                label: None,
                value: None,
            }],
        };
        let mut machine = Machine::new();
        assert!(sample.install(&mut machine).is_err());
    }

    #[test]
    fn test_bundled_samples_run_to_completion() {
        let samples = parse_samples(include_str!("../../programs/samples.json")).unwrap();
        assert_eq!(samples.len(), 3);

        let mut machine = Machine::new();
        samples[1].install(&mut machine).unwrap();
        machine.run_all();
        assert_eq!(machine.mem.read(Address::new(0x12)).value, "8");

        samples[2].install(&mut machine).unwrap();
        let states = machine.run_limited(100);
        assert!(machine.is_finished());
        assert!(states.last().map(|s| s.negative_flag).unwrap_or(false));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(parse_samples("{"), Err(SampleError::JsonError(_))));
    }
}
