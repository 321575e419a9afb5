//! UI Components for the terminal interface

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph};
use ratatui::Frame;

use super::{Phase, Progress};

/// Status panel showing current phase, target database and info
pub struct StatusPanel {
    phase: Phase,
    target: String,
    info: String,
}

impl StatusPanel {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            phase: Phase::Preparing,
            target: target.into(),
            info: String::new(),
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let phase_style = match self.phase {
            Phase::Complete => Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            _ => Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        };

        let phase_indicator = match self.phase {
            Phase::Preparing | Phase::Connecting => "◐",
            Phase::Extracting => "⤷",
            Phase::Resetting => "↺",
            Phase::Loading => "↓",
            Phase::Repairing => "✎",
            Phase::Constraining => "⚙",
            Phase::Verifying => "?",
            Phase::Complete => "✓",
        };

        let lines = vec![
            Line::from(vec![
                Span::styled(format!(" {} ", phase_indicator), phase_style),
                Span::styled(self.phase.to_string(), phase_style),
            ]),
            Line::from(vec![
                Span::raw("   "),
                Span::styled(&self.target, Style::default().fg(Color::Blue)),
            ]),
            Line::from(vec![
                Span::raw("   "),
                Span::styled(&self.info, Style::default().fg(Color::Gray)),
            ]),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Movies DB Loader ")
            .border_style(Style::default().fg(Color::Blue));

        let paragraph = Paragraph::new(lines).block(block);
        frame.render_widget(paragraph, area);
    }
}

/// Progress panel showing tables loaded so far
pub struct ProgressPanel {
    progress: Option<Progress>,
}

impl ProgressPanel {
    pub fn new() -> Self {
        Self { progress: None }
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    pub fn clear(&mut self) {
        self.progress = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::Blue));

        let Some(progress) = &self.progress else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };

        let label = if progress.total > 0 {
            format!("{} ({}/{})", progress.label, progress.current, progress.total)
        } else {
            progress.label.clone()
        };

        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(progress.ratio().min(1.0))
            .label(label);

        frame.render_widget(gauge, area);
    }
}

/// Log panel showing the most recent activity; warnings stand out
pub struct LogPanel {
    entries: Vec<String>,
    max_entries: usize,
    warnings: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            max_entries: 200,
            warnings: 0,
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        let message = message.into();
        if is_warning(&message) {
            self.warnings += 1;
        }
        self.entries.push(message);
        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let title = if self.warnings > 0 {
            format!(" Activity ({} warnings) ", self.warnings)
        } else {
            " Activity ".to_string()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Blue));

        let visible_height = area.height.saturating_sub(2) as usize; // -2 for borders
        let start = self.entries.len().saturating_sub(visible_height);
        let last = self.entries.len().saturating_sub(1);

        let items: Vec<ListItem> = self.entries[start..]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if is_warning(entry) {
                    Style::default().fg(Color::Yellow)
                } else if start + i == last {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(Span::styled(format!(" {}", entry), style))
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }
}

fn is_warning(message: &str) -> bool {
    message.trim_start().starts_with("warning:")
}
