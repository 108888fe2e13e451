//! JC-62 Simulator - CLI Entry Point
//!
//! Commands:
//! - `jaycee-emu run <program>` - Run a program file or sample bundle
//! - `jaycee-emu debug <program>` - Interactive debugger
//! - `jaycee-emu list <program>` - Print an annotated listing
//! - `jaycee-emu samples <bundle>` - List the programs in a sample bundle
//! - `jaycee-emu test` - Built-in self-test

use clap::{Parser, Subcommand};
use jaycee::MemorySeed;

#[derive(Parser)]
#[command(name = "jaycee-emu")]
#[command(version = "0.1.0")]
#[command(about = "A stepping simulator for the JC-62 single-accumulator teaching CPU")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it runs off its last line
    Run {
        /// Program text file, or a `.json` sample bundle
        program: String,
        /// Seed a memory cell before running (ADDR=LABEL:VALUE, repeatable)
        #[arg(short = 's', long = "set")]
        seeds: Vec<MemorySeed>,
        /// Which program of a sample bundle to run
        #[arg(long, default_value = "0")]
        sample: usize,
        /// Maximum number of steps to run (default: 10000)
        #[arg(short, long, default_value = "10000")]
        max_steps: u64,
        /// Show trace output
        #[arg(short, long)]
        trace: bool,
        /// Print every snapshot as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Interactive debugger
    Debug {
        /// Program text file, or a `.json` sample bundle
        program: String,
        /// Seed a memory cell before running (ADDR=LABEL:VALUE, repeatable)
        #[arg(short = 's', long = "set")]
        seeds: Vec<MemorySeed>,
        /// Which program of a sample bundle to debug
        #[arg(long, default_value = "0")]
        sample: usize,
    },
    /// Print an annotated listing of a program
    List {
        /// Program text file, or a `.json` sample bundle
        program: String,
        /// Which program of a sample bundle to list
        #[arg(long, default_value = "0")]
        sample: usize,
    },
    /// List the programs in a sample bundle
    Samples {
        /// Path to the `.json` bundle
        bundle: String,
    },
    /// Run the built-in self-test
    Test,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { program, seeds, sample, max_steps, trace, json }) => {
            run_program(&program, &seeds, sample, max_steps, trace, json);
        }
        Some(Commands::Debug { program, seeds, sample }) => {
            debug_program(&program, &seeds, sample);
        }
        Some(Commands::List { program, sample }) => {
            list_program(&program, sample);
        }
        Some(Commands::Samples { bundle }) => {
            list_samples(&bundle);
        }
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("JC-62 Simulator v0.1.0");
            println!("A single-accumulator teaching CPU");
            println!();
            println!("Use --help for available commands");
            println!();
            demo_machine();
        }
    }
}

/// Print an error and exit with status 1.
fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("❌ {}", message);
    std::process::exit(1);
}

/// Build a machine with memory seeded and the program loaded.
///
/// `.json` paths are sample bundles; anything else is program text.
/// Command-line seeds are applied last, on top of a sample's own setup.
fn prepare(path: &str, seeds: &[MemorySeed], sample: usize) -> (jaycee::Machine, Vec<String>) {
    use jaycee::{load_program_file, load_samples, Machine};
    use jaycee::asm::SampleError;

    let mut machine = Machine::new();

    let program = if path.ends_with(".json") {
        let samples = load_samples(path).unwrap_or_else(|e| fail(format!("Failed to load samples: {}", e)));
        let count = samples.len();
        let chosen = samples
            .into_iter()
            .nth(sample)
            .unwrap_or_else(|| fail(SampleError::NoSuchSample { index: sample, count }));

        println!("📂 Sample: {}", chosen.program_name);
        if let Err(e) = chosen.install(&mut machine) {
            fail(format!("Failed to set up memory: {}", e));
        }
        chosen.program
    } else {
        let lines = load_program_file(path).unwrap_or_else(|e| fail(format!("Failed to read file: {}", e)));
        machine.load(lines.iter().cloned());
        lines
    };

    for seed in seeds {
        seed.apply(&mut machine);
    }

    println!("📝 Loaded {} lines", program.len());
    (machine, program)
}

fn run_program(path: &str, seeds: &[MemorySeed], sample: usize, max_steps: u64, trace: bool, json: bool) {
    use jaycee::asm::listing::list_line;

    println!("🔧 Running: {}", path);
    let (mut machine, program) = prepare(path, seeds, sample);

    if !json {
        println!();
        println!("━━━ Execution ━━━");
    }

    let mut snapshots = Vec::new();
    let mut steps = 0u64;
    while !machine.is_finished() && steps < max_steps {
        let ir = machine.regs.ir;
        match machine.step() {
            Ok(snapshot) => {
                if trace && !json {
                    let text = program.get(ir).map(|line| list_line(line)).unwrap_or_default();
                    println!("{:02}: {:<16} {}", ir, text, snapshot.summary());
                }
                if json {
                    snapshots.push(snapshot);
                }
                steps += 1;
            }
            Err(e) => {
                eprintln!("❌ Stopped at IR={}: {}", ir, e);
                break;
            }
        }
    }

    if json {
        match serde_json::to_string_pretty(&snapshots) {
            Ok(text) => println!("{}", text),
            Err(e) => fail(format!("Failed to encode snapshots: {}", e)),
        }
        return;
    }

    let regs = &machine.regs;
    println!();
    println!("━━━ Result ━━━");
    println!("Steps: {}", steps);
    println!("A (accumulator): {}", regs.a);
    println!("B (secondary):   {}", regs.b);
    println!("PC:              {}", regs.pc);
    println!("IR:              {}", regs.ir);
    println!("N (negative):    {}", u8::from(regs.negative));

    let used = machine.mem.used();
    if !used.is_empty() {
        println!();
        println!("━━━ Memory ━━━");
        for (addr, cell) in used {
            println!("{}: {:<10} {}", addr, cell.label, cell.value);
        }
    }

    if steps >= max_steps && !machine.is_finished() {
        println!();
        println!("⚠️  Reached max steps limit ({}). Use --max-steps to increase.", max_steps);
    }
}

#[cfg(feature = "tui")]
fn debug_program(path: &str, seeds: &[MemorySeed], sample: usize) {
    use jaycee::run_debugger;

    println!("🔍 Loading: {}", path);
    let (machine, program) = prepare(path, seeds, sample);

    if program.is_empty() {
        fail("No instructions to execute");
    }

    println!("🚀 Launching debugger...");
    println!();

    if let Err(e) = run_debugger(machine, program) {
        fail(format!("Debugger error: {}", e));
    }
}

#[cfg(not(feature = "tui"))]
fn debug_program(_path: &str, _seeds: &[MemorySeed], _sample: usize) {
    fail("This build has no debugger; rebuild with `--features tui`");
}

fn list_program(path: &str, sample: usize) {
    let (_, program) = prepare(path, &[], sample);
    println!();
    print!("{}", jaycee::listing(&program));
}

fn list_samples(path: &str) {
    let samples = jaycee::load_samples(path).unwrap_or_else(|e| fail(format!("Failed to load samples: {}", e)));
    for (i, sample) in samples.iter().enumerate() {
        println!("{:>3}: {} ({} lines, {} cells)", i, sample.program_name, sample.program.len(), sample.ram_setup.len());
    }
}

fn demo_machine() {
    use jaycee::Machine;

    println!("━━━ JC-62 Demo ━━━");
    println!();

    let mut machine = Machine::new();
    let seeded = machine.set_memory("0A", "x", "10")
        .and_then(|_| machine.set_memory("0B", "y", "0"));
    if let Err(e) = seeded {
        fail(e);
    }

    let program = ["LDA x", "MBA", "ADD", "STA y", "HLT"];
    machine.load(program);

    for (line, snapshot) in program.iter().zip(machine.run_all()) {
        println!("  {:<8} {}", line, snapshot.summary());
    }

    println!();
    println!("  y = {}", machine.mem.read(jaycee::Address::new(0x0B)).value);
    println!();
    println!("✓ Machine working!");
}

fn run_self_test() {
    use jaycee::{Machine, MachineError, Address};
    use num_bigint::BigInt;

    println!("━━━ JC-62 Simulator Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;

    // Test 1: Reset state
    print!("Reset populates 256 blank cells... ");
    let machine = Machine::new();
    let cells = machine.mem.iter().filter(|(_, c)| c.label == "NULL" && c.value == "0").count();
    if cells == 256 { println!("✓"); passed += 1; }
    else { println!("✗ (got {})", cells); failed += 1; }

    // Test 2: Address case
    print!("Addresses ignore case... ");
    let mut machine = Machine::new();
    let upper = machine.set_memory("0A", "x", "1");
    let lower = machine.set_memory("0a", "x", "2");
    if upper.is_ok() && upper == lower { println!("✓"); passed += 1; }
    else { println!("✗"); failed += 1; }

    // Test 3: Load/add/store
    print!("LDA/MBA/ADD/STA... ");
    let mut machine = Machine::new();
    let _ = machine.set_memory("0A", "x", "10");
    let _ = machine.set_memory("0B", "y", "0");
    machine.load(["LDA x", "MBA", "ADD", "STA y", "HLT"]);
    machine.run_all();
    let y = machine.mem.read(Address::new(0x0B)).value.clone();
    if y == "20" { println!("✓"); passed += 1; }
    else { println!("✗ (got {}, expected 20)", y); failed += 1; }

    // Test 4: SUB stores the absolute value
    print!("SUB absolute value and flag... ");
    let mut machine = Machine::new();
    machine.regs.a = BigInt::from(3);
    machine.regs.b = BigInt::from(10);
    machine.load(["SUB"]);
    match machine.step() {
        Ok(s) if s.accumulator == BigInt::from(7) && s.negative_flag => { println!("✓"); passed += 1; }
        _ => { println!("✗"); failed += 1; }
    }

    // Test 5: Jump lands on target
    print!("JMP lands on target... ");
    let mut machine = Machine::new();
    machine.load(["JMP 02", "HLT", "HLT"]);
    match machine.step() {
        Ok(s) if s.instruction_register == 2 && s.program_counter == 2 => { println!("✓"); passed += 1; }
        _ => { println!("✗"); failed += 1; }
    }

    // Test 6: Exhaustion
    print!("Step after end reports completion... ");
    let mut machine = Machine::new();
    machine.load(["HLT"]);
    let _ = machine.step();
    if machine.step() == Err(MachineError::ExecutionComplete) { println!("✓"); passed += 1; }
    else { println!("✗"); failed += 1; }

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
