//! Progress reporting for a rebuild
//!
//! Everything the loader wants to tell the operator goes through [`Ui`]:
//! - Current phase (Connecting, Resetting, Loading, Repairing, Constraining)
//! - Progress (current/total with optional details)
//! - Activity log; lines starting with `warning:` are highlighted
//!
//! [`ConsoleUi`] writes plain lines, [`UiApp`] is a full-screen ratatui view
//! and [`SilentUi`] discards everything.

mod components;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;

use components::{LogPanel, ProgressPanel, StatusPanel};

/// Application phases shown in the status panel
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Preparing,
    Extracting,
    Connecting,
    Resetting,
    Loading,
    Repairing,
    Constraining,
    Verifying,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Preparing => write!(f, "Preparing"),
            Phase::Extracting => write!(f, "Extracting CSV archive"),
            Phase::Connecting => write!(f, "Connecting"),
            Phase::Resetting => write!(f, "Recreating schema"),
            Phase::Loading => write!(f, "Loading tables"),
            Phase::Repairing => write!(f, "Applying date corrections"),
            Phase::Constraining => write!(f, "Adding foreign keys"),
            Phase::Verifying => write!(f, "Verifying schema"),
            Phase::Complete => write!(f, "Complete"),
        }
    }
}

/// Progress information for the current operation
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    pub label: String,
}

impl Progress {
    pub fn new(current: u64, total: u64, label: impl Into<String>) -> Self {
        Self {
            current,
            total,
            label: label.into(),
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Trait for UI implementations - allows console, full TUI and silent/test modes
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_info(&mut self, info: impl Into<String>);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn clear_progress(&mut self);
    fn log(&mut self, message: impl Into<String>);
}

/// Full-screen TUI
pub struct UiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    status: StatusPanel,
    progress: ProgressPanel,
    log: LogPanel,
}

impl UiApp {
    /// Create a new UI application and enter the alternate screen
    pub fn new(target: impl Into<String>) -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            status: StatusPanel::new(target),
            progress: ProgressPanel::new(),
            log: LogPanel::new(),
        })
    }

    fn draw(&mut self) -> Result<()> {
        let status = &self.status;
        let progress = &self.progress;
        let log = &self.log;

        self.terminal.draw(|frame| {
            let area = frame.area();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(5), // Status panel
                    Constraint::Length(3), // Progress bar
                    Constraint::Min(5),    // Log panel
                ])
                .split(area);

            status.render(frame, chunks[0]);
            progress.render(frame, chunks[1]);
            log.render(frame, chunks[2]);
        })?;

        Ok(())
    }

    /// Show the outcome, wait for a key, then restore the terminal
    pub fn finish(mut self, summary: &str) -> Result<()> {
        self.set_phase(Phase::Complete);
        self.clear_progress();
        match self.log.warnings() {
            0 => self.log(summary),
            n => self.log(format!("{} ({} warnings)", summary, n)),
        }
        self.log("Press any key to exit...");
        self.draw()?;

        loop {
            if event::poll(Duration::from_millis(100))? {
                if let CrosstermEvent::Key(_) = event::read()? {
                    break;
                }
            }
        }

        self.restore()
    }

    /// Restore terminal without waiting
    pub fn restore(mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Ui for UiApp {
    fn set_phase(&mut self, phase: Phase) {
        self.status.set_phase(phase);
        self.draw().ok();
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.status.set_info(info);
        self.draw().ok();
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        self.progress
            .set_progress(Progress::new(current, total, label));
        self.draw().ok();
    }

    fn clear_progress(&mut self) {
        self.progress.clear();
        self.draw().ok();
    }

    fn log(&mut self, message: impl Into<String>) {
        self.log.add(message);
        self.draw().ok();
    }
}

impl Drop for UiApp {
    fn drop(&mut self) {
        // Best effort cleanup
        terminal::disable_raw_mode().ok();
        self.terminal
            .backend_mut()
            .execute(LeaveAlternateScreen)
            .ok();
        self.terminal.show_cursor().ok();
    }
}

/// Line-oriented UI for plain terminals and CI logs
#[derive(Default)]
pub struct ConsoleUi {
    phase: Option<Phase>,
    verbose: bool,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also print progress lines
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Ui for ConsoleUi {
    fn set_phase(&mut self, phase: Phase) {
        if self.phase.as_ref() != Some(&phase) {
            println!("==> {}", phase);
            self.phase = Some(phase);
        }
    }

    fn set_info(&mut self, info: impl Into<String>) {
        println!("    {}", info.into());
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        if self.verbose {
            println!("    [{}/{}] {}", current, total, label.into());
        }
    }

    fn clear_progress(&mut self) {}

    fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        if message.starts_with("warning:") {
            eprintln!("    {}", message);
        } else {
            println!("    {}", message);
        }
    }
}

/// Silent UI implementation for testing and non-interactive use
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, _message: impl Into<String>) {}
}

/// Keeps everything it is told; for asserting on loader output in tests
#[derive(Debug, Default)]
pub struct RecordingUi {
    pub phases: Vec<Phase>,
    pub messages: Vec<String>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &String> {
        self.messages.iter().filter(|m| m.starts_with("warning:"))
    }
}

impl Ui for RecordingUi {
    fn set_phase(&mut self, phase: Phase) {
        self.phases.push(phase);
    }
    fn set_info(&mut self, info: impl Into<String>) {
        self.messages.push(info.into());
    }
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }
}
