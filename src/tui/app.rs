//! Debugger application state and logic.

use std::collections::HashSet;

use crate::asm::listing::list_line;
use crate::cpu::memory::MEMORY_SIZE;
use crate::cpu::{Machine, Memory, Snapshot};

/// Debugger application state.
pub struct DebuggerApp {
    /// The machine being debugged.
    pub machine: Machine,
    /// Program text shown in the listing pane.
    pub program: Vec<String>,
    /// Memory as seeded before the run, restored on reset.
    seeded: Memory,
    /// State after the most recent step.
    pub last: Option<Snapshot>,
    /// Breakpoints (by program line).
    pub breakpoints: HashSet<usize>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Memory view scroll offset.
    pub mem_scroll: usize,
}

impl DebuggerApp {
    /// Create a debugger over a machine whose memory is already seeded.
    pub fn new(mut machine: Machine, program: Vec<String>) -> Self {
        machine.load(program.iter().cloned());
        let seeded = machine.mem.clone();

        Self {
            machine,
            program,
            seeded,
            last: None,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            mem_scroll: 0,
        }
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        let ir = self.machine.regs.ir;
        match self.machine.step() {
            Ok(snapshot) => {
                let text = self.program.get(ir).map(|line| list_line(line)).unwrap_or_default();
                self.status = format!("IR={:02}: {}", ir, text);
                self.last = Some(snapshot);
            }
            Err(e) => {
                self.status = format!("Stopped after {} steps: {}", self.machine.cycles, e);
                self.running = false;
            }
        }
    }

    /// Run until the program ends or a breakpoint is hit.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        if self.machine.is_finished() {
            self.running = false;
            self.status = format!("Finished after {} steps", self.machine.cycles);
            return;
        }

        let ir = self.machine.regs.ir;
        if self.breakpoints.contains(&ir) {
            self.running = false;
            self.status = format!("Breakpoint at line {:02}", ir);
            return;
        }

        self.step();
    }

    /// Toggle breakpoint at the line under the cursor.
    pub fn toggle_breakpoint(&mut self) {
        let ir = self.machine.regs.ir;
        if self.breakpoints.remove(&ir) {
            self.status = format!("Removed breakpoint at line {:02}", ir);
        } else {
            self.breakpoints.insert(ir);
            self.status = format!("Set breakpoint at line {:02}", ir);
        }
    }

    /// Reset the machine, restoring the seeded memory and the program.
    pub fn reset(&mut self) {
        self.machine.reset();
        self.machine.mem = self.seeded.clone();
        self.machine.load(self.program.iter().cloned());
        self.last = None;
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Scroll the memory view by one row.
    pub fn scroll(&mut self, down: bool) {
        if down {
            self.mem_scroll = (self.mem_scroll + 1).min(MEMORY_SIZE - 1);
        } else {
            self.mem_scroll = self.mem_scroll.saturating_sub(1);
        }
    }

    /// Program lines with their index and whether the cursor is on them.
    pub fn get_listing(&self) -> Vec<(usize, String, bool)> {
        let ir = self.machine.regs.ir;
        self.program
            .iter()
            .enumerate()
            .map(|(i, line)| (i, list_line(line), i == ir))
            .collect()
    }
}

/// Run the debugger over a seeded machine and a program.
pub fn run_debugger(machine: Machine, program: Vec<String>) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(machine, program);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => app.scroll(false),
                        KeyCode::Down => app.scroll(true),
                        _ => {}
                    }
                }
            }
        }

        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
