//! Scoped diagnostic context passed explicitly through the differ and writer

use std::fmt;

/// Identifies which report section (and optionally which table) a log line
/// belongs to. Cheap to clone; narrowed with [`LogContext::table`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogContext {
    pub section: String,
    pub table: Option<String>,
}

impl LogContext {
    pub fn new(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            table: None,
        }
    }

    /// Narrow the context to a single table of the section
    pub fn table(&self, table: impl Into<String>) -> Self {
        Self {
            section: self.section.clone(),
            table: Some(table.into()),
        }
    }

    pub fn debug(&self, message: impl fmt::Display) {
        log::debug!("[{}] {}", self, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        log::warn!("[{}] {}", self, message);
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}/{}", self.section, table),
            None => write!(f, "{}", self.section),
        }
    }
}
