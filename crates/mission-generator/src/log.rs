//! Per-run generation log.
//!
//! Every line is both kept (timestamped) for the mission and emitted as a
//! `tracing` event.

use chrono::Utc;
use mission_domain::{LogLevel, LogLine};

#[derive(Debug, Default)]
pub struct GenerationLog {
    lines: Vec<LogLine>,
}

impl GenerationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{message}");
        self.push(LogLevel::Info, message);
    }

    /// Non-fatal degradation
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.push(LogLevel::Warning, message);
    }

    fn push(&mut self, level: LogLevel, message: String) {
        self.lines.push(LogLine {
            at: Utc::now(),
            level,
            message,
        });
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<LogLine> {
        self.lines
    }
}
