//! Program listings.
//!
//! Renders program lines the way the machine will read them.

use crate::cpu::decode::{decode, Opcode};

/// Render a single line as canonical instruction text.
pub fn list_line(line: &str) -> String {
    match decode(line) {
        Some(instr) => instr.to_string(),
        None => format!("??? ; {}", line.trim()),
    }
}

/// Render a numbered listing with each instruction's description.
pub fn listing(lines: &[String]) -> String {
    let mut output = String::new();
    output.push_str("; JC-62 Listing\n");
    output.push_str("; -------------\n\n");

    for (index, line) in lines.iter().enumerate() {
        let title = Opcode::split(line).map(|(op, _)| op.title()).unwrap_or("");
        output.push_str(&format!("{:02}: {:<16} ; {}\n", index, list_line(line), title));
    }

    output
}
