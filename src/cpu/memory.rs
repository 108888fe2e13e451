//! JC-62 memory subsystem.
//!
//! Memory is a fixed table of 256 cells addressed `00`..`FF`. Each cell
//! carries a human-readable label and a textual value; programs reach data
//! through labels rather than raw addresses.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// The number of memory cells.
pub const MEMORY_SIZE: usize = 256;

/// Label written into every cell on reset.
pub const EMPTY_LABEL: &str = "NULL";

/// Value written into every cell on reset.
pub const EMPTY_VALUE: &str = "0";

/// A memory address in `00..=FF`.
///
/// Parsed from exactly two hexadecimal digits, either case. Always
/// displayed as two uppercase digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(u8);

impl Address {
    /// Create an address from its numeric value.
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Index into the cell table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate every address in ascending order.
    pub fn all() -> impl Iterator<Item = Address> {
        (0..=u8::MAX).map(Address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}", self.0)
    }
}

impl FromStr for Address {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.to_ascii_uppercase();
        if key.len() != 2 || !key.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(MemoryError::InvalidAddress(s.to_string()));
        }
        u8::from_str_radix(&key, 16)
            .map(Address)
            .map_err(|_| MemoryError::InvalidAddress(s.to_string()))
    }
}

/// A single labelled memory cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub label: String,
    pub value: String,
}

impl Cell {
    /// Create a cell from a label and a value.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Does this cell carry `label`, ignoring case?
    pub fn has_label(&self, label: &str) -> bool {
        self.label.to_lowercase() == label.to_lowercase()
    }

    /// Parse the value as a signed decimal integer of any size.
    pub fn int_value(&self) -> Option<BigInt> {
        self.value.trim().parse().ok()
    }

    /// Is this cell still in its reset state?
    pub fn is_blank(&self) -> bool {
        self.label == EMPTY_LABEL && self.value == EMPTY_VALUE
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(EMPTY_LABEL, EMPTY_VALUE)
    }
}

/// JC-62 memory: 256 labelled cells.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<Cell>,
}

impl Memory {
    /// Create a memory with every cell blank.
    pub fn new() -> Self {
        Self {
            cells: vec![Cell::default(); MEMORY_SIZE],
        }
    }

    /// Read a cell.
    #[inline]
    pub fn read(&self, addr: Address) -> &Cell {
        &self.cells[addr.index()]
    }

    /// Overwrite a cell.
    #[inline]
    pub fn write(&mut self, addr: Address, cell: Cell) {
        self.cells[addr.index()] = cell;
    }

    /// Find the first cell, in address order, whose label matches.
    pub fn find_label(&self, label: &str) -> Option<Address> {
        self.iter()
            .find(|(_, cell)| cell.has_label(label))
            .map(|(addr, _)| addr)
    }

    /// Replace the value of an existing cell, keeping its label.
    pub fn set_value(&mut self, addr: Address, value: impl Into<String>) {
        self.cells[addr.index()].value = value.into();
    }

    /// Reset every cell to `NULL` / `0`.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::default();
        }
    }

    /// Iterate cells with their addresses, in address order.
    pub fn iter(&self) -> impl Iterator<Item = (Address, &Cell)> {
        Address::all().zip(self.cells.iter())
    }

    /// Cells that differ from their reset contents.
    pub fn used(&self) -> Vec<(Address, &Cell)> {
        self.iter().filter(|(_, cell)| !cell.is_blank()).collect()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory")
            .field("used_cells", &self.used().len())
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

// Serialized as `{"00": {label, value}, ...}`, the shape front ends index by address.
impl Serialize for Memory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(MEMORY_SIZE))?;
        for (addr, cell) in self.iter() {
            map.serialize_entry(&addr.to_string(), cell)?;
        }
        map.end()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("invalid memory address `{0}` (expected 00-FF)")]
    InvalidAddress(String),
}
