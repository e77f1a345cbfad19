//! A live view of a running experiment.

use crate::cli::{print_report, Result};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use lifetrace_lib::{
    ExperimentId, FileStore, GenerationRecord, RunHandle, Runner, StatusReport, Store,
};
use std::io::{self, Stdout, Write};

/// Raw mode on the alternate screen, restored on drop.
struct RawTerminal;

impl RawTerminal {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(RawTerminal)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Pads or truncates a line to the width of the terminal.
fn fit(line: &str, width: u16) -> String {
    format!("{:<w$.w$}", line, w = width as usize)
}

struct View {
    id: ExperimentId,
    /// Index of the shown generation in the trace. `None` follows the latest.
    shown: Option<usize>,
    out: Stdout,
}

impl View {
    fn new(id: ExperimentId) -> Self {
        View {
            id,
            shown: None,
            out: io::stdout(),
        }
    }

    fn index(&self, len: usize) -> Option<usize> {
        let last = len.checked_sub(1)?;
        Some(self.shown.map_or(last, |i| i.min(last)))
    }

    fn previous(&mut self, len: usize) {
        if let Some(i) = self.index(len) {
            self.shown = Some(i.saturating_sub(1));
        }
    }

    fn next(&mut self, len: usize) {
        if let Some(i) = self.shown {
            self.shown = Some(i + 1).filter(|&i| i + 1 < len);
        }
    }

    fn update(&mut self, report: &StatusReport, trace: &[GenerationRecord]) -> Result<()> {
        let (cols, rows) = terminal::size()?;
        queue!(
            self.out,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;

        let record = self.index(trace.len()).and_then(|i| trace.get(i));
        let top = match record {
            Some(r) => format!(
                "Experiment {}  Gen: {}/{}  Cells: {}  {}",
                self.id, r.generation, report.total_steps, r.live_cells, report.status
            ),
            None => format!("Experiment {}  No generation yet  {}", self.id, report.status),
        };
        queue!(
            self.out,
            SetAttribute(Attribute::Reverse),
            Print(fit(&top, cols)),
            SetAttribute(Attribute::Reset)
        )?;

        if let Some(r) = record {
            match r.board() {
                Ok(board) => {
                    let text = board.to_string();
                    let height = rows.saturating_sub(2) as usize;
                    for (i, line) in text.lines().take(height).enumerate() {
                        queue!(
                            self.out,
                            cursor::MoveTo(0, i as u16 + 1),
                            Print(fit(line, cols))
                        )?;
                    }
                }
                Err(e) => queue!(
                    self.out,
                    cursor::MoveTo(0, 1),
                    Print(fit(&format!("Cannot decode the board: {}", e), cols))
                )?,
            }
        }

        let bottom = if report.status.is_terminal() {
            "Finished. [←/→] browse  [q] quit"
        } else if self.shown.is_some() {
            "Running. [←/→] browse  [f] follow the latest  [q] quit"
        } else {
            "Running, following the latest generation. [←] browse  [q] quit"
        };
        queue!(
            self.out,
            cursor::MoveTo(0, rows.saturating_sub(1)),
            SetAttribute(Attribute::Reverse),
            Print(fit(bottom, cols)),
            SetAttribute(Attribute::Reset)
        )?;
        self.out.flush()?;
        Ok(())
    }
}

/// Shows the latest generation of a run until the user quits.
///
/// Quitting only closes the view; the run itself goes on, and this
/// function waits for it before printing the final status.
pub(crate) fn follow_with_tui(runner: &Runner<FileStore>, handle: RunHandle) -> Result<()> {
    let id = handle.id();
    {
        let _terminal = RawTerminal::enter()?;
        let mut view = View::new(id);
        loop {
            let report = runner.status(id)?;
            let trace = runner.store().trace(id)?;
            view.update(&report, &trace)?;

            if !event::poll(runner.settings().poll_interval())? {
                continue;
            }
            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) = event::read()?
            {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Left | KeyCode::PageUp => view.previous(trace.len()),
                    KeyCode::Right | KeyCode::PageDown => view.next(trace.len()),
                    KeyCode::Home => view.shown = Some(0),
                    KeyCode::Char('f') | KeyCode::End => view.shown = None,
                    _ => (),
                }
            }
        }
    }

    if !handle.is_finished() {
        println!("Waiting for experiment {} to finish...", id);
    }
    handle.join()?;
    print_report(runner, id)
}
