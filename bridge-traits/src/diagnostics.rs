//! Diagnostic Sink Abstractions
//!
//! Write-only output channel for the toolkit. The core never reads anything
//! back from a sink; lines are delivered in the order they are emitted by a
//! single task.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// One line of diagnostic output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticLine {
    /// Severity
    pub level: LogLevel,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Emitting component (scenario name, module path, ...)
    pub target: String,
    /// Rendered text
    pub message: String,
    /// Structured fields
    pub fields: BTreeMap<String, String>,
}

impl DiagnosticLine {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Shorthand for an `Info` line, the level used for narrative output.
    pub fn info(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, target, message)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Diagnostic sink trait
///
/// Receives ordered text lines from the toolkit and its scenarios:
/// - **Console**: printed to stdout
/// - **Tests**: captured in memory and asserted on
/// - **Log pipelines**: mirrored from `tracing` events by the logging layer
///
/// # Example
///
/// ```ignore
/// use bridge_traits::diagnostics::{DiagnosticLine, DiagnosticSink};
///
/// async fn announce(sink: &dyn DiagnosticSink) {
///     sink.emit(DiagnosticLine::info("tour", "f1 starts")).await.ok();
/// }
/// ```
#[async_trait::async_trait]
pub trait DiagnosticSink: Send + Sync {
    /// Deliver a line to the sink
    async fn emit(&self, line: DiagnosticLine) -> Result<()>;

    /// Flush any buffered lines
    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Get the minimum level that will be processed
    ///
    /// Lines below this level can be filtered out at the source.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

/// Console sink that prints each line to stdout
#[derive(Debug, Clone)]
pub struct ConsoleSink {
    pub min_level: LogLevel,
    /// Prefix lines with timestamp, level and target
    pub decorated: bool,
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            decorated: false,
        }
    }
}

#[async_trait::async_trait]
impl DiagnosticSink for ConsoleSink {
    async fn emit(&self, line: DiagnosticLine) -> Result<()> {
        if line.level < self.min_level {
            return Ok(());
        }

        if !self.decorated {
            println!("{}", line.message);
            return Ok(());
        }

        let level_str = match line.level {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };

        println!(
            "[{}] {} {}: {}",
            line.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            level_str,
            line.target,
            line.message
        );

        if !line.fields.is_empty() {
            println!("  Fields: {:?}", line.fields);
        }
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

/// In-memory sink that keeps every line it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<DiagnosticLine>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured lines, in arrival order.
    pub fn lines(&self) -> Vec<DiagnosticLine> {
        self.lines.lock().clone()
    }

    /// Captured messages only.
    pub fn messages(&self) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .map(|line| line.message.clone())
            .collect()
    }

    /// Captured messages for a single target.
    pub fn messages_for(&self, target: &str) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|line| line.target == target)
            .map(|line| line.message.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

#[async_trait::async_trait]
impl DiagnosticSink for MemorySink {
    async fn emit(&self, line: DiagnosticLine) -> Result<()> {
        self.lines.lock().push(line);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_builder() {
        let line = DiagnosticLine::new(LogLevel::Warn, "race", "n value is: 3")
            .with_field("original", "0")
            .with_field("final", "3");

        assert_eq!(line.level, LogLevel::Warn);
        assert_eq!(line.target, "race");
        assert_eq!(line.message, "n value is: 3");
        assert_eq!(line.fields.get("final"), Some(&"3".to_string()));
    }

    #[test]
    fn test_line_serializes() {
        let line = DiagnosticLine::info("tour", "f1 starts").with_field("task", "f1");
        let json = serde_json::to_value(&line).unwrap();

        assert_eq!(json["level"], "Info");
        assert_eq!(json["message"], "f1 starts");
        assert_eq!(json["fields"]["task"], "f1");
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[tokio::test]
    async fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.emit(DiagnosticLine::info("a", "first")).await.unwrap();
        sink.emit(DiagnosticLine::info("b", "second")).await.unwrap();
        sink.emit(DiagnosticLine::info("a", "third")).await.unwrap();

        assert_eq!(sink.messages(), vec!["first", "second", "third"]);
        assert_eq!(sink.messages_for("a"), vec!["first", "third"]);

        sink.clear();
        assert!(sink.lines().is_empty());
    }

    #[tokio::test]
    async fn test_console_sink() {
        let sink = ConsoleSink {
            min_level: LogLevel::Info,
            decorated: true,
        };
        sink.emit(DiagnosticLine::info("test", "Test line")).await.unwrap();
        sink.emit(DiagnosticLine::new(LogLevel::Debug, "test", "filtered"))
            .await
            .unwrap();
    }
}
