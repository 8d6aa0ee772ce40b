//! Terminal canvas adapter
//!
//! Keeps a back buffer of text rows and, on every swap, moves the cursor
//! back up over the previous frame and overwrites it line by line.

use super::{Canvas, DrawCommand, InputEvent, TextFormatter};
use crate::Result;
use std::io::Write;
use std::sync::mpsc::Receiver;

/// [`Canvas`] that renders text rows to any writer
pub struct TerminalCanvas<W: Write> {
    out: W,
    formatter: TextFormatter,
    rows: Vec<String>,
    /// Rows printed by the last swap, to move the cursor back over
    presented: usize,
    input: Option<Receiver<char>>,
}

impl<W: Write> TerminalCanvas<W> {
    /// Canvas writing to `out`, formatting meters with `formatter`
    pub fn new(out: W, formatter: TextFormatter) -> Self {
        TerminalCanvas {
            out,
            formatter,
            rows: Vec::new(),
            presented: 0,
            input: None,
        }
    }

    /// Attach a channel of key presses to be reported by `poll_input`
    pub fn with_input(mut self, keys: Receiver<char>) -> Self {
        self.input = Some(keys);
        self
    }

    /// Current back buffer rows
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn row_mut(&mut self, row: usize) -> &mut String {
        if self.rows.len() <= row {
            self.rows.resize(row + 1, String::new());
        }
        &mut self.rows[row]
    }
}

impl<W: Write> Canvas for TerminalCanvas<W> {
    fn open_window(&mut self, _width: u32, _height: u32, title: &str) -> Result<()> {
        self.rows.clear();
        self.presented = 0;
        writeln!(self.out, "{}", title)?;
        writeln!(self.out, "{}", "=".repeat(title.chars().count()))?;
        Ok(())
    }

    fn draw(&mut self, command: &DrawCommand) -> Result<()> {
        match command {
            DrawCommand::Clear => self.rows.iter_mut().for_each(String::clear),
            DrawCommand::Text { row, text } => *self.row_mut(*row) = text.clone(),
            DrawCommand::Meter { row, label, level } => {
                let line = self.formatter.meter(label, level.clamp(0.0, 1.0));
                *self.row_mut(*row) = line;
            }
        }
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<()> {
        if self.presented > 0 {
            write!(self.out, "\x1B[{}A", self.presented)?;
        }
        for row in &self.rows {
            write!(self.out, "\x1B[2K\r{}\n", row)?;
        }
        self.out.flush()?;
        self.presented = self.rows.len();
        Ok(())
    }

    fn poll_input(&mut self) -> Option<InputEvent> {
        let key = self.input.as_ref()?.try_recv().ok()?;
        match key {
            'q' | 'Q' | '\x03' => Some(InputEvent::Quit),
            other => Some(InputEvent::Key(other)),
        }
    }
}
