use std::fmt;

use serde::Serialize;
use tracing::{error, warn};

/// Severity of a conversion problem. Errors sort before warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Error => "ERROR",
            Level::Warning => "WARNING",
        })
    }
}

/// A problem tied to a 1-based source line; line 0 means the whole document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    pub line: u32,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "{} @ line {}: {}", self.level, self.line, self.message)
        } else {
            write!(f, "{}: {}", self.level, self.message)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, line: u32, message: impl Into<String>) {
        let message = message.into();
        error!(line, "{message}");
        self.entries.push(Diagnostic {
            level: Level::Error,
            line,
            message,
        });
    }

    pub fn warning(&mut self, line: u32, message: impl Into<String>) {
        let message = message.into();
        warn!(line, "{message}");
        self.entries.push(Diagnostic {
            level: Level::Warning,
            line,
            message,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.level == Level::Error)
    }

    /// Entries in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn sorted(&self) -> Vec<Diagnostic> {
        let mut entries = self.entries.clone();
        entries.sort();
        entries
    }

    /// All entries sorted by level, line and message, one per line. Empty when nothing was
    /// recorded.
    pub fn combined_message(&self) -> String {
        self.sorted()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
