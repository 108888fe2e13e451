//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::cpu::memory::MEMORY_SIZE;
use super::app::DebuggerApp;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60),
            Constraint::Percentage(40),
        ])
        .split(frame.area());

    // Left side: program, registers, microsteps, status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(7),
            Constraint::Length(6),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_program(frame, left_chunks[0], app);
    draw_registers(frame, left_chunks[1], app);
    draw_microsteps(frame, left_chunks[2], app);
    draw_status(frame, left_chunks[3], app);

    // Right side: memory and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(4),
        ])
        .split(chunks[1]);

    draw_memory(frame, right_chunks[0], app);
    draw_help(frame, right_chunks[1]);
}

/// Draw the program listing with the cursor and breakpoints.
fn draw_program(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let items: Vec<ListItem> = app
        .get_listing()
        .into_iter()
        .map(|(line, text, is_current)| {
            let prefix = if is_current { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(&line) { "●" } else { " " };

            let style = if is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(&line) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            ListItem::new(format!("{} {}{:02}: {}", bp, prefix, line, text)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Program ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

/// Draw registers and the negative flag.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let regs = &app.machine.regs;
    let flag_style = if regs.negative {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Gray)
    };

    let content = vec![
        Line::from(vec![
            Span::raw("A:   "),
            Span::styled(format!("{:>12}", regs.a), Style::default().fg(Color::White)),
            Span::raw("   B:   "),
            Span::styled(format!("{:>12}", regs.b), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::raw("PC:  "),
            Span::styled(format!("{:>12}", regs.pc), Style::default().fg(Color::Yellow)),
            Span::raw("   IR:  "),
            Span::styled(format!("{:>12}", regs.ir), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::raw("MAR: "),
            Span::styled(format!("{:>12}", regs.mar()), Style::default().fg(Color::White)),
            Span::raw("   MDR: "),
            Span::styled(format!("{:>12}", regs.mdr()), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::raw("N: "),
            Span::styled(format!("{}", u8::from(regs.negative)), flag_style),
            Span::raw("   Steps: "),
            Span::styled(format!("{}", app.machine.cycles), Style::default().fg(Color::Cyan)),
            Span::raw("   State: "),
            if app.machine.is_finished() {
                Span::styled("Finished", Style::default().fg(Color::Red))
            } else {
                Span::styled("Ready", Style::default().fg(Color::Green))
            },
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw the description and microsteps of the last step.
fn draw_microsteps(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let text = match &app.last {
        Some(snapshot) => {
            let description = snapshot.description.replace('\n', " ");
            format!("{}\n{}", description, snapshot.microsteps)
        }
        None => String::new(),
    };

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Microsteps ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)));

    frame.render_widget(paragraph, area);
}

/// Draw memory view.
fn draw_memory(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible_rows = (area.height as usize).saturating_sub(2);
    let start = app.mem_scroll;
    let end = (start + visible_rows).min(MEMORY_SIZE);

    let items: Vec<ListItem> = app
        .machine
        .mem
        .iter()
        .skip(start)
        .take(end.saturating_sub(start))
        .map(|(addr, cell)| {
            let text = format!("{}: {:<10} {}", addr, cell.label, cell.value);

            let style = if cell.is_blank() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Memory ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(list, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s: Step  r: Run  p: Pause  b: Breakpoint"),
        Line::from("x: Reset  ↑↓: Scroll memory  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}
