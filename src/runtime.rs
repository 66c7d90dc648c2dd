use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("interrupted")]
    Interrupted,
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// Source of operator input, one line at a time
pub trait LineSource {
    /// Show `prompt` and block until a full line is entered.
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError>;

    /// A line split on whitespace and lower-cased.
    fn read_tokens(&mut self, prompt: &str) -> Result<Vec<String>, InputError> {
        let line = self.read_line(prompt)?;
        Ok(line.split_whitespace().map(str::to_lowercase).collect())
    }
}

/// Blocking waits
pub trait Clock {
    fn sleep(&mut self, duration: Duration) -> Result<(), InputError>;
}

fn is_interrupt(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => true,
        KeyCode::Char('c') | KeyCode::Char('d') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Printable character for a key press; chords with Ctrl or Alt type nothing
fn typed_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            Some(c)
        }
        _ => None,
    }
}

/// Raw-mode RAII guard; raw mode is left even on early return
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Line editor on top of crossterm key events. Ctrl-C, Ctrl-D and Esc
/// interrupt instead of killing the process.
#[derive(Debug, Default)]
pub struct TerminalLineSource;

impl TerminalLineSource {
    pub fn new() -> Self {
        Self
    }

    fn collect_keys(out: &mut impl Write) -> Result<String, InputError> {
        let mut line = String::new();
        loop {
            let key = match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => key,
                _ => continue,
            };
            if is_interrupt(&key) {
                return Err(InputError::Interrupted);
            }
            match key.code {
                KeyCode::Enter => return Ok(line),
                KeyCode::Backspace => {
                    if line.pop().is_some() {
                        write!(out, "\u{8} \u{8}")?;
                    }
                }
                _ => {
                    if let Some(c) = typed_char(&key) {
                        line.push(c);
                        write!(out, "{c}")?;
                    }
                }
            }
            out.flush()?;
        }
    }
}

impl LineSource for TerminalLineSource {
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let result = {
            let _raw = RawMode::enable()?;
            Self::collect_keys(&mut stdout)
        };
        writeln!(stdout)?;
        result
    }
}

/// Plain buffered stdin, used when input is piped. End of input interrupts.
pub struct StdinLineSource<R: BufRead> {
    reader: R,
}

impl StdinLineSource<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> StdinLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for StdinLineSource<R> {
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let mut raw = Vec::new();
        if self.reader.read_until(b'\n', &mut raw)? == 0 {
            return Err(InputError::Interrupted);
        }
        // undecodable bytes become U+FFFD so the caller rejects the line and asks again
        let line = String::from_utf8_lossy(&raw);
        // echo so piped transcripts read like an interactive run
        writeln!(stdout, "{}", line.trim_end())?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Pre-recorded answers for headless runs. Running out interrupts.
#[derive(Debug, Default)]
pub struct ScriptedLineSource {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedLineSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Every prompt shown so far, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for ScriptedLineSource {
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError> {
        self.prompts.push(prompt.to_string());
        self.lines.pop_front().ok_or(InputError::Interrupted)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) -> Result<(), InputError> {
        std::thread::sleep(duration);
        Ok(())
    }
}

const POLL_SLICE: Duration = Duration::from_secs(1);

/// Waits by polling the terminal so a Ctrl-C during a wait ends the session
/// cleanly. Other keys are swallowed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalClock;

impl Clock for TerminalClock {
    fn sleep(&mut self, duration: Duration) -> Result<(), InputError> {
        let started = Instant::now();
        let _raw = RawMode::enable()?;
        loop {
            let remaining = duration.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                return Ok(());
            }
            if event::poll(remaining.min(POLL_SLICE))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Release && is_interrupt(&key) {
                        return Err(InputError::Interrupted);
                    }
                }
            }
        }
    }
}

/// Records requested waits without blocking
#[derive(Debug, Default, Clone)]
pub struct TestClock {
    sleeps: Vec<Duration>,
    interrupt_after: Option<usize>,
}

impl TestClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interrupt on the sleep following the first `n` successful ones.
    pub fn interrupting_after(n: usize) -> Self {
        Self {
            sleeps: Vec::new(),
            interrupt_after: Some(n),
        }
    }

    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }

    pub fn total(&self) -> Duration {
        self.sleeps.iter().sum()
    }
}

impl Clock for TestClock {
    fn sleep(&mut self, duration: Duration) -> Result<(), InputError> {
        if self.interrupt_after == Some(self.sleeps.len()) {
            return Err(InputError::Interrupted);
        }
        self.sleeps.push(duration);
        Ok(())
    }
}
