//! Program sources for the JC-62.
//!
//! This module provides:
//! - Program text and memory-seed parsing
//! - Sample program bundles (JSON)
//! - A listing renderer (program → annotated text)

pub mod listing;
pub mod sample;
pub mod source;

pub use listing::listing;
pub use sample::{load_samples, parse_samples, SampleError, SampleProgram};
pub use source::{load_program_file, split_program, MemorySeed, SourceError};
