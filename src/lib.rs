//! # driftdoc
//!
//! Compares the configuration of a pilot environment with its production
//! counterpart and documents the drift as a nested HTML report, with each
//! row marked unchanged, modified, added or deleted.

pub mod bookmark;
pub mod change_detection;
pub mod cli;
pub mod commands;
pub mod config;
pub mod diffgram;
pub mod error;
pub mod html;
pub mod layout;
pub mod logging;
pub mod output;
pub mod progress;
pub mod report;
pub mod section;
pub mod snapshot;

pub use change_detection::{ChangeDetector, DiffTable, RowChange, RowState};
pub use config::ReportConfig;
pub use diffgram::{diff_snapshots, Diffgram};
pub use error::{DriftError, Result};
pub use layout::{LayoutEntry, PrintLayout};
pub use logging::LogContext;
pub use report::{Report, ReportSection};
pub use snapshot::{ColumnType, Row, Snapshot, Table, Value};
