//! # Terminal Output
//!
//! Writes laid out [`View`]s to an output stream.
//!
//! With ANSI enabled (stdout is a terminal), styles are emitted through
//! `crossterm` and file links as OSC 8 hyperlinks. Otherwise the output is
//! plain text, which is also what the tests capture.

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, ContentStyle, Print, PrintStyledContent, StyledContent},
    terminal::{Clear, ClearType},
};
use ratatui::backend::IntoCrossterm;
use ratatui::style::{Modifier, Style};
use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

use crate::ui::builders::ViewBuilder;
use crate::ui::theme::StyleSheet;
use crate::ui::view::{Line, Span, Text, View};

pub struct Terminal {
    out: Box<dyn Write>,
    styles: StyleSheet,
    ansi: bool,
}

impl Terminal {
    /// A terminal on the process stdout; ANSI only when stdout is a tty.
    pub fn stdout(styles: StyleSheet) -> Self {
        let ansi = io::stdout().is_terminal();
        Self::new(Box::new(io::stdout()), styles, ansi)
    }

    pub fn new(out: Box<dyn Write>, styles: StyleSheet, ansi: bool) -> Self {
        Self { out, styles, ansi }
    }

    pub fn builder(&self) -> ViewBuilder<'_> {
        ViewBuilder::new(&self.styles)
    }

    /// Clear the screen (no-op without ANSI).
    pub fn clear(&mut self) -> io::Result<()> {
        if self.ansi {
            queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }

    /// Write a view, one line at a time.
    pub fn write_view(&mut self, view: &View) -> io::Result<()> {
        for line in view.layout() {
            self.write_line(&line)?;
            self.out.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Write a text followed by a newline.
    pub fn write_text(&mut self, text: &Text) -> io::Result<()> {
        self.write_view(&View::Text(text.clone()))
    }

    /// Write a string as is (already rendered, may hold escape sequences).
    pub fn write_raw(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }

    pub fn newline(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Render a text the way this terminal would print it.
    pub fn render_inline(&self, text: &Text) -> String {
        let mut out = String::new();
        for (i, line) in text.lines().iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for span in &line.spans {
                if self.ansi {
                    out.push_str(&ansi_span(span));
                } else {
                    out.push_str(&span.text);
                }
            }
        }
        out
    }

    fn write_line(&mut self, line: &Line) -> io::Result<()> {
        for span in &line.spans {
            if !self.ansi {
                self.out.write_all(span.text.as_bytes())?;
                continue;
            }
            if let Some(path) = &span.link {
                queue!(self.out, Print(osc8_open(path)))?;
            }
            if span.style == Style::default() {
                queue!(self.out, Print(&span.text))?;
            } else {
                let styled = StyledContent::new(content_style(span.style), &span.text);
                queue!(self.out, PrintStyledContent(styled))?;
            }
            if span.link.is_some() {
                queue!(self.out, Print(OSC8_CLOSE))?;
            }
        }
        Ok(())
    }
}

const OSC8_CLOSE: &str = "\x1b]8;;\x1b\\";

fn osc8_open(path: &Path) -> String {
    format!("\x1b]8;;file://{}\x1b\\", path.display())
}

fn ansi_span(span: &Span) -> String {
    let mut out = String::new();
    if let Some(path) = &span.link {
        out.push_str(&osc8_open(path));
    }
    if span.style == Style::default() {
        out.push_str(&span.text);
    } else {
        let _ = write!(
            out,
            "{}",
            StyledContent::new(content_style(span.style), &span.text)
        );
    }
    if span.link.is_some() {
        out.push_str(OSC8_CLOSE);
    }
    out
}

/// Convert a ratatui style to its crossterm equivalent.
pub fn content_style(style: Style) -> ContentStyle {
    let mut content = ContentStyle::new();
    content.foreground_color = style.fg.map(IntoCrossterm::into_crossterm);
    content.background_color = style.bg.map(IntoCrossterm::into_crossterm);

    let modifiers = style.add_modifier - style.sub_modifier;
    for (modifier, attribute) in [
        (Modifier::BOLD, Attribute::Bold),
        (Modifier::DIM, Attribute::Dim),
        (Modifier::ITALIC, Attribute::Italic),
        (Modifier::UNDERLINED, Attribute::Underlined),
        (Modifier::SLOW_BLINK, Attribute::SlowBlink),
        (Modifier::RAPID_BLINK, Attribute::RapidBlink),
        (Modifier::REVERSED, Attribute::Reverse),
        (Modifier::HIDDEN, Attribute::Hidden),
        (Modifier::CROSSED_OUT, Attribute::CrossedOut),
    ] {
        if modifiers.contains(modifier) {
            content.attributes.set(attribute);
        }
    }
    content
}
