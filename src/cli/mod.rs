//! CLI command implementations

pub mod ssh;

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::error::{KickError, Result};

/// Longest line accepted at a prompt
pub const MAX_INPUT_LEN: usize = 2048;

/// Leaves raw mode when dropped, including on early return
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Edit state of a single-line prompt
#[derive(Debug)]
struct LineEditor {
    buffer: String,
    limit: usize,
}

/// What a key press did to the line
#[derive(Debug, PartialEq, Eq)]
enum Edit {
    Inserted(char),
    Erased,
    Ignored,
    Submit,
    Cancel,
}

impl LineEditor {
    fn new(limit: usize) -> Self {
        Self {
            buffer: String::new(),
            limit,
        }
    }

    fn handle(&mut self, key: KeyEvent) -> Edit {
        match key.code {
            KeyCode::Enter => Edit::Submit,
            KeyCode::Esc => Edit::Cancel,
            KeyCode::Char('c') | KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Edit::Cancel
            }
            KeyCode::Backspace => {
                if self.buffer.pop().is_some() {
                    Edit::Erased
                } else {
                    Edit::Ignored
                }
            }
            KeyCode::Char(c) if self.buffer.chars().count() < self.limit => {
                self.buffer.push(c);
                Edit::Inserted(c)
            }
            _ => Edit::Ignored,
        }
    }
}

/// Read one line from the terminal.
///
/// Enter submits, Esc or Ctrl-C cancels. Without a terminal a plain line is
/// read from stdin and end of input cancels.
pub fn prompt_line(prompt: &str, limit: usize) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input)? == 0 {
            return Err(KickError::Cancelled);
        }
        let mut line = input.trim_end_matches(&['\r', '\n'][..]).to_string();
        if let Some((cut, _)) = line.char_indices().nth(limit) {
            line.truncate(cut);
        }
        return Ok(line);
    }

    let mut editor = LineEditor::new(limit);
    let mut stdout = io::stdout();
    {
        let _raw = RawMode::enable()?;
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match editor.handle(key) {
                Edit::Inserted(c) => write!(stdout, "{c}")?,
                Edit::Erased => write!(stdout, "\x08 \x08")?,
                Edit::Ignored => continue,
                Edit::Submit => break,
                Edit::Cancel => {
                    write!(stdout, "\r\n")?;
                    stdout.flush()?;
                    return Err(KickError::Cancelled);
                }
            }
            stdout.flush()?;
        }
    }
    println!();

    Ok(editor.buffer)
}
