use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{ContentStyle, PrintStyledContent, Stylize},
    terminal::{Clear, ClearType},
};

use super::{Span, Tone};

/// Output boundary for everything the quiz shows
pub trait Screen {
    fn clear(&mut self);
    fn line(&mut self, spans: &[Span]);

    fn say(&mut self, tone: Tone, text: &str) {
        self.line(&[Span::new(tone, text)]);
    }

    fn blank(&mut self) {
        self.line(&[]);
    }
}

/// Colored output on stdout
pub struct ConsoleScreen {
    out: Stdout,
}

impl ConsoleScreen {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }

    fn write_span(&mut self, span: &Span) -> io::Result<()> {
        let style = match span.tone {
            Tone::Plain => ContentStyle::new(),
            Tone::Heading => ContentStyle::new().bold(),
            Tone::Good => ContentStyle::new().green().bold(),
            Tone::Bad => ContentStyle::new().red().bold(),
            Tone::Warn => ContentStyle::new().yellow(),
            Tone::Dim => ContentStyle::new().dim(),
        };
        queue!(self.out, PrintStyledContent(style.apply(span.text.as_str())))
    }

    fn write_line(&mut self, spans: &[Span]) -> io::Result<()> {
        for span in spans {
            self.write_span(span)?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl Default for ConsoleScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for ConsoleScreen {
    fn clear(&mut self) {
        let cleared = queue!(self.out, Clear(ClearType::All), MoveTo(0, 0)).and_then(|_| self.out.flush());
        if let Err(e) = cleared {
            tracing::warn!("failed to clear screen: {e}");
        }
    }

    fn line(&mut self, spans: &[Span]) {
        if let Err(e) = self.write_line(spans) {
            tracing::warn!("failed to write to terminal: {e}");
        }
    }
}

/// Keeps plain text of everything shown, for headless runs and tests
#[derive(Debug, Default, Clone)]
pub struct RecordingScreen {
    lines: Vec<String>,
    clears: usize,
}

impl RecordingScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn clears(&self) -> usize {
        self.clears
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }

    pub fn count(&self, needle: &str) -> usize {
        self.lines.iter().filter(|l| l.contains(needle)).count()
    }
}

impl Screen for RecordingScreen {
    fn clear(&mut self) {
        self.clears += 1;
    }

    fn line(&mut self, spans: &[Span]) {
        self.lines
            .push(spans.iter().map(|s| s.text.as_str()).collect::<String>());
    }
}
