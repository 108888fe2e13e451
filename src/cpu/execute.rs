//! CPU execution engine for the JC-62.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

use crate::cpu::decode::{self, Instruction, Opcode};
use crate::cpu::memory::{Address, Cell, MemoryError};
use crate::cpu::{Memory, Registers, Snapshot};

/// The JC-62 machine.
///
/// Owns every piece of architectural state. Callers that share one
/// machine between threads must serialize access themselves.
#[derive(Clone, Serialize)]
pub struct Machine {
    /// CPU registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Loaded program, one instruction per line.
    program: Vec<String>,
    /// Instruction count (for profiling).
    pub cycles: u64,
    /// Last executed instruction (for debugging).
    #[serde(skip)]
    last_instr: Option<Instruction>,
}

impl Machine {
    /// Create a machine with zeroed registers and blank memory.
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            program: Vec::new(),
            cycles: 0,
            last_instr: None,
        }
    }

    /// Reset registers, memory and the loaded program.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.program.clear();
        self.cycles = 0;
        self.last_instr = None;
    }

    /// Replace the loaded program and rewind the instruction cursor.
    ///
    /// Registers, the negative flag and memory keep their values; call
    /// [`Machine::reset`] first for a clean run.
    pub fn load<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.program = lines.into_iter().map(Into::into).collect();
        self.regs.ir = 0;
        self.last_instr = None;
        debug!("loaded {} program lines", self.program.len());
    }

    /// The loaded program.
    pub fn program(&self) -> &[String] {
        &self.program
    }

    /// The line under the instruction cursor, if any.
    pub fn current_line(&self) -> Option<&str> {
        self.program.get(self.regs.ir).map(String::as_str)
    }

    /// Execute a single program line.
    ///
    /// Returns the state after the line has executed, or
    /// [`MachineError::ExecutionComplete`] once the cursor has run off the
    /// end of the program. A taken jump leaves the cursor on its target;
    /// every other line advances it by one.
    pub fn step(&mut self) -> Result<Snapshot, MachineError> {
        // Fetch
        let ir = self.regs.ir;
        let line = self
            .program
            .get(ir)
            .ok_or(MachineError::ExecutionComplete)?
            .trim()
            .to_string();

        // Decode
        let instr = decode::decode(&line);

        // Execute
        let jumped = match &instr {
            Some(instr) => {
                debug!("{:02}: {}", ir, instr);
                self.execute(instr)
            }
            None => {
                warn!("{:02}: unrecognized instruction `{}`, skipping", ir, line);
                false
            }
        };

        let snapshot = self.state();

        if !jumped {
            self.regs.advance_ir();
        }
        self.cycles += 1;
        self.last_instr = instr;

        Ok(snapshot)
    }

    /// Step until the program is exhausted, collecting every snapshot.
    ///
    /// There is no loop guard: a program that jumps backwards forever never
    /// returns. Use [`Machine::run_limited`] for untrusted programs.
    pub fn run_all(&mut self) -> Vec<Snapshot> {
        let mut snapshots = Vec::new();
        while let Ok(snapshot) = self.step() {
            snapshots.push(snapshot);
        }
        snapshots
    }

    /// Like [`Machine::run_all`], but stops after at most `max_steps` steps.
    pub fn run_limited(&mut self, max_steps: u64) -> Vec<Snapshot> {
        let mut snapshots = Vec::new();
        for _ in 0..max_steps {
            match self.step() {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(_) => break,
            }
        }
        snapshots
    }

    /// Overwrite the cell at a two-digit hex address (either case).
    pub fn set_memory(
        &mut self,
        address: &str,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Address, MemoryError> {
        let addr: Address = address.parse().map_err(|e| {
            warn!("{}", e);
            e
        })?;
        self.write_cell(addr, Cell::new(label, value));
        Ok(addr)
    }

    /// Overwrite the cell at an already validated address.
    pub fn write_cell(&mut self, addr: Address, cell: Cell) {
        self.mem.write(addr, cell);
        debug!("M[{}] = {:?}", addr, self.mem.read(addr));
    }

    /// Capture the current state.
    ///
    /// Description and microsteps describe the line under the cursor;
    /// both are empty past the end of the program or for unrecognized lines.
    pub fn state(&self) -> Snapshot {
        let opcode = self.current_line().and_then(Opcode::split);
        let (description, microsteps) = match opcode {
            Some((op, _)) => (op.description(), op.microsteps()),
            None => (String::new(), String::new()),
        };
        Snapshot::capture(&self.regs, &self.mem, description, microsteps)
    }

    /// Execute a decoded instruction. Returns whether control was transferred.
    fn execute(&mut self, instr: &Instruction) -> bool {
        match instr {
            Instruction::Mba => {
                self.regs.b = self.regs.a.clone();
            }

            Instruction::Lda { label } => {
                self.load_label(label);
            }

            Instruction::Sta { label } => match self.mem.find_label(label) {
                Some(addr) => self.mem.set_value(addr, self.regs.a.to_string()),
                None => warn!("STA: label `{}` not found", label),
            },

            Instruction::Add => {
                self.regs.add();
            }

            Instruction::Sub => {
                self.regs.subtract();
            }

            Instruction::Jmp { target } => {
                self.regs.jump(*target);
                return true;
            }

            // Not taken, PC holds and only the cursor moves on.
            Instruction::Jn { target } => {
                if self.regs.negative {
                    self.regs.jump(*target);
                }
                return self.regs.negative;
            }

            Instruction::Hlt => {}
        }

        self.regs.advance_pc();
        false
    }

    /// A := value of the first cell labelled `label`, when it is an integer.
    fn load_label(&mut self, label: &str) {
        let Some(addr) = self.mem.find_label(label) else {
            warn!("LDA: label `{}` not found", label);
            return;
        };

        let cell = self.mem.read(addr);
        match cell.int_value() {
            Some(value) => self.regs.a = value,
            None => warn!(
                "LDA: value `{}` at {} is not an integer, A unchanged",
                cell.value, addr
            ),
        }
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<&Instruction> {
        self.last_instr.as_ref()
    }

    /// Has the cursor run off the end of the program?
    pub fn is_finished(&self) -> bool {
        self.regs.ir >= self.program.len()
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("cycles", &self.cycles)
            .field("program_lines", &self.program.len())
            .field("regs", &self.regs)
            .finish()
    }
}

/// Errors that can occur during execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("program completed")]
    ExecutionComplete,
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use proptest::prelude::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn machine_with(program: &[&str]) -> Machine {
        init_logger();
        let mut m = Machine::new();
        m.load(program.iter().copied());
        m
    }

    #[test]
    fn test_reset_state() {
        let mut m = machine_with(&["LDA x", "HLT"]);
        m.set_memory("0A", "x", "10").unwrap();
        m.step().unwrap();
        m.reset();

        let state = m.state();
        assert_eq!(state.program_counter, 0);
        assert_eq!(state.accumulator, BigInt::from(0));
        assert_eq!(state.secondary_register, BigInt::from(0));
        assert_eq!(state.instruction_register, 0);
        assert!(!state.negative_flag);
        assert!(m.program().is_empty());
        assert!(state
            .memory_image
            .iter()
            .all(|(_, cell)| cell.label == "NULL" && cell.value == "0"));
    }

    #[test]
    fn test_set_memory_case_insensitive() {
        let mut m = Machine::new();
        assert_eq!(m.set_memory("0A", "x", "10"), Ok(Address::new(10)));
        assert_eq!(m.set_memory("0a", "y", "20"), Ok(Address::new(10)));
        assert_eq!(m.mem.read(Address::new(10)), &Cell::new("y", "20"));
    }

    #[test]
    fn test_set_memory_invalid_address() {
        let mut m = Machine::new();
        let before = m.mem.clone();
        assert_eq!(
            m.set_memory("100", "x", "1"),
            Err(MemoryError::InvalidAddress("100".into()))
        );
        assert_eq!(m.mem, before);
    }

    #[test]
    fn test_load_add_store() {
        let mut m = machine_with(&["LDA x", "ADD", "STA y", "HLT"]);
        m.set_memory("0A", "x", "10").unwrap();
        m.set_memory("0B", "y", "0").unwrap();

        let s1 = m.step().unwrap();
        assert_eq!(s1.accumulator, BigInt::from(10));
        assert_eq!(s1.memory_data_register, BigInt::from(10));
        assert_eq!(s1.description, "LDA\n(Load A)");

        let s2 = m.step().unwrap();
        assert_eq!(s2.accumulator, BigInt::from(10));

        let s3 = m.step().unwrap();
        assert_eq!(s3.memory_image.read(Address::new(0x0B)).value, "10");

        let s4 = m.step().unwrap();
        assert_eq!(s4.accumulator, BigInt::from(10));
        assert_eq!(s4.program_counter, 4);
        assert_eq!(s4.microsteps, "");

        assert_eq!(m.step(), Err(MachineError::ExecutionComplete));
    }

    #[test]
    fn test_store_missing_label_is_noop() {
        let mut m = machine_with(&["LDA x", "STA y"]);
        m.set_memory("0A", "x", "10").unwrap();
        let before = m.mem.clone();
        m.run_all();
        assert_eq!(m.mem, before);
    }

    #[test]
    fn test_load_missing_label_keeps_accumulator() {
        let mut m = machine_with(&["LDA nope"]);
        m.regs.a = BigInt::from(42);
        let s = m.step().unwrap();
        assert_eq!(s.accumulator, BigInt::from(42));
        assert_eq!(s.program_counter, 1);
    }

    #[test]
    fn test_load_non_integer_keeps_accumulator() {
        let mut m = machine_with(&["LDA x"]);
        m.set_memory("00", "x", "NULL").unwrap();
        m.regs.a = BigInt::from(7);
        assert_eq!(m.step().unwrap().accumulator, BigInt::from(7));
    }

    #[test]
    fn test_load_and_add_past_i64() {
        let mut m = machine_with(&["LDA big", "MBA", "ADD", "STA sum"]);
        m.set_memory("00", "big", "9223372036854775808").unwrap();
        m.set_memory("01", "sum", "0").unwrap();

        let loaded = m.step().unwrap();
        assert_eq!(loaded.accumulator.to_string(), "9223372036854775808");

        m.run_all();
        assert_eq!(m.mem.read(Address::new(1)).value, "18446744073709551616");
    }

    #[test]
    fn test_label_match_ignores_case() {
        let mut m = machine_with(&["LDA Total", "STA TOTAL"]);
        m.set_memory("05", "total", "3").unwrap();
        m.set_memory("06", "Total", "9").unwrap();
        m.run_all();
        assert_eq!(m.regs.a, BigInt::from(3));
        assert_eq!(m.mem.read(Address::new(5)).value, "3");
        assert_eq!(m.mem.read(Address::new(6)).value, "9");
    }

    #[test]
    fn test_mba_then_sub() {
        let mut m = machine_with(&["LDA a", "MBA", "LDA b", "SUB"]);
        m.set_memory("00", "a", "10").unwrap();
        m.set_memory("01", "b", "4").unwrap();
        let states = m.run_all();
        assert_eq!(states[1].secondary_register, BigInt::from(10));
        assert_eq!(states[3].accumulator, BigInt::from(6));
        assert!(states[3].negative_flag);
    }

    #[test]
    fn test_jmp_lands_on_target() {
        let mut m = machine_with(&["JMP 02", "HLT", "ADD", "HLT"]);
        m.regs.a = BigInt::from(1);
        m.regs.b = BigInt::from(2);

        let jump = m.step().unwrap();
        assert_eq!(jump.instruction_register, 2);
        assert_eq!(jump.program_counter, 2);

        let next = m.step().unwrap();
        assert_eq!(next.instruction_register, 2);
        assert_eq!(next.accumulator, BigInt::from(3));
        assert_eq!(m.last_instruction(), Some(&Instruction::Add));
    }

    #[test]
    fn test_jn_not_taken_holds_pc() {
        let mut m = machine_with(&["HLT", "JN 00", "HLT"]);
        m.step().unwrap();
        let s = m.step().unwrap();
        assert_eq!(s.instruction_register, 1);
        assert_eq!(s.program_counter, 1);
        assert_eq!(m.regs.ir, 2);

        let last = m.step().unwrap();
        assert_eq!(last.program_counter, 2);
        assert!(m.is_finished());
    }

    #[test]
    fn test_countdown_loop() {
        // Subtract 1 until the result would go negative.
        let mut m = machine_with(&["LDA one", "MBA", "LDA n", "SUB", "JN 06", "JMP 03", "HLT"]);
        m.set_memory("00", "one", "1").unwrap();
        m.set_memory("01", "n", "3").unwrap();

        let states = m.run_all();
        let last = states.last().unwrap();
        assert!(last.negative_flag);
        assert_eq!(last.accumulator, BigInt::from(1));
        assert!(m.is_finished());
    }

    #[test]
    fn test_unrecognized_line_advances_cursor_only() {
        let mut m = machine_with(&["NOP", "", "HLT"]);
        let s = m.step().unwrap();
        assert_eq!(s.program_counter, 0);
        assert_eq!(s.description, "");
        assert_eq!(m.regs.ir, 1);
        assert_eq!(m.run_all().len(), 2);
    }

    #[test]
    fn test_run_all_counts() {
        let program = ["LDA x", "MBA", "ADD", "STA x", "SUB", "HLT"];
        let mut m = machine_with(&program);
        let states = m.run_all();
        assert_eq!(states.len(), program.len());
        for (i, s) in states.iter().enumerate() {
            assert_eq!(s.instruction_register, i);
        }
        assert!(m.run_all().is_empty());
    }

    #[test]
    fn test_step_after_end_is_idempotent() {
        let mut m = machine_with(&[]);
        for _ in 0..3 {
            assert_eq!(m.step(), Err(MachineError::ExecutionComplete));
        }
        assert_eq!(m.regs, Registers::new());
    }

    #[test]
    fn test_load_keeps_registers() {
        let mut m = machine_with(&["LDA x"]);
        m.set_memory("00", "x", "5").unwrap();
        m.run_all();
        m.load(["ADD"]);
        assert_eq!(m.regs.ir, 0);
        assert_eq!(m.regs.a, BigInt::from(5));
        assert_eq!(m.mem.read(Address::new(0)).value, "5");
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut m = machine_with(&["LDA x", "STA x"]);
        m.set_memory("00", "x", "5").unwrap();
        let first = m.step().unwrap();
        m.set_memory("00", "x", "99").unwrap();
        assert_eq!(first.memory_image.read(Address::new(0)).value, "5");
    }

    #[test]
    fn test_debug_summarizes_machine() {
        let m = machine_with(&["HLT", "HLT"]);
        let text = format!("{:?}", m);
        assert!(text.starts_with("Machine"));
        assert!(text.contains("program_lines: 2"));
        assert!(!text.contains("NULL"));
    }

    #[test]
    fn test_run_limited_stops_infinite_loop() {
        let mut m = machine_with(&["JMP 00"]);
        assert_eq!(m.run_limited(25).len(), 25);
        assert_eq!(m.cycles, 25);
    }

    proptest! {
        #[test]
        fn prop_sub_stores_absolute_difference(
            a in -1_000_000_000_000i64..1_000_000_000_000,
            b in -1_000_000_000_000i64..1_000_000_000_000,
        ) {
            let mut m = Machine::new();
            m.regs.a = BigInt::from(a);
            m.regs.b = BigInt::from(b);
            m.load(["SUB"]);
            let s = m.step().unwrap();
            prop_assert_eq!(&s.accumulator, &BigInt::from((a - b).abs()));
            prop_assert_eq!(s.negative_flag, a - b < 0);
            prop_assert!(s.accumulator >= BigInt::from(0));
        }

        #[test]
        fn prop_jmp_reports_target(target in 0usize..100, len in 1usize..100) {
            let mut program = vec!["HLT".to_string(); len];
            program[0] = format!("JMP {:02}", target);
            let mut m = Machine::new();
            m.load(program);
            let s = m.step().unwrap();
            prop_assert_eq!(s.instruction_register, target);
            prop_assert_eq!(s.program_counter, target);
            prop_assert_eq!(m.is_finished(), target >= len);
        }

        #[test]
        fn prop_lda_missing_label_is_noop(a in any::<i64>(), label in "[a-m]{1,8}") {
            let mut m = Machine::new();
            m.regs.a = BigInt::from(a);
            m.load([format!("LDA {}", label)]);
            prop_assert_eq!(m.step().unwrap().accumulator, BigInt::from(a));
        }
    }
}
