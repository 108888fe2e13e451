//! WebAssembly bindings for the JC-62 simulator.
//!
//! This module provides JavaScript-friendly wrappers around the core machine.
//! Snapshots cross the boundary as plain JS objects.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::asm::listing::list_line;
use crate::asm::sample::parse_samples;
use crate::asm::source::split_program;
use crate::cpu::Machine;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Serialize a value into a JS object.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    let json = serde_json::to_string(value).map_err(|e| JsError::new(&e.to_string()))?;
    js_sys::JSON::parse(&json).map_err(|_| JsError::new("failed to build JS object"))
}

/// WebAssembly-friendly machine wrapper.
#[wasm_bindgen]
pub struct WasmMachine {
    machine: Machine,
}

#[wasm_bindgen]
impl WasmMachine {
    /// Create a new machine instance.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            machine: Machine::new(),
        }
    }

    /// Load program text, one instruction per line. Returns the line count.
    #[wasm_bindgen]
    pub fn submit_code(&mut self, code: &str) -> usize {
        self.machine.load(split_program(code));
        self.machine.program().len()
    }

    /// Step one instruction. Returns the snapshot, or throws once the
    /// program has completed.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<JsValue, JsError> {
        let snapshot = self.machine.step().map_err(|e| JsError::new(&e.to_string()))?;
        to_js(&snapshot)
    }

    /// Run to the end of the program, or for at most `max_steps` steps.
    /// Returns an array of snapshots.
    #[wasm_bindgen]
    pub fn run_all(&mut self, max_steps: u32) -> Result<JsValue, JsError> {
        let snapshots = self.machine.run_limited(u64::from(max_steps));
        to_js(&snapshots)
    }

    /// Reset registers, memory and program.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.machine.reset();
    }

    /// Set a memory cell. Returns false for addresses outside 00-FF.
    #[wasm_bindgen]
    pub fn set_ram(&mut self, address: &str, label: &str, value: &str) -> bool {
        self.machine.set_memory(address, label, value).is_ok()
    }

    /// Install sample `index` from a JSON bundle.
    #[wasm_bindgen]
    pub fn load_sample(&mut self, bundle: &str, index: usize) -> Result<(), JsError> {
        let samples = parse_samples(bundle).map_err(|e| JsError::new(&e.to_string()))?;
        let sample = samples
            .get(index)
            .ok_or_else(|| JsError::new(&format!("no sample #{}", index)))?;
        sample
            .install(&mut self.machine)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Current state as a snapshot object.
    #[wasm_bindgen]
    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(&self.machine.state())
    }

    /// Has the program run to completion?
    #[wasm_bindgen]
    pub fn is_finished(&self) -> bool {
        self.machine.is_finished()
    }

    /// Get program counter.
    #[wasm_bindgen]
    pub fn pc(&self) -> usize {
        self.machine.regs.pc
    }

    /// Get accumulator value (A register), in decimal.
    #[wasm_bindgen]
    pub fn accumulator(&self) -> String {
        self.machine.regs.a.to_string()
    }

    /// Get secondary register value (B register), in decimal.
    #[wasm_bindgen]
    pub fn secondary(&self) -> String {
        self.machine.regs.b.to_string()
    }

    /// Get the negative flag.
    #[wasm_bindgen]
    pub fn negative(&self) -> bool {
        self.machine.regs.negative
    }
}

impl Default for WasmMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Render one program line as canonical instruction text.
#[wasm_bindgen]
pub fn wasm_list_line(line: &str) -> String {
    list_line(line)
}
