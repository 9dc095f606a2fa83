//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};

/// Progress over the section files of one report run
#[derive(Debug)]
pub struct ProgressReporter {
    pub sections_pb: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Create progress reporter for diffing `total` sections
    pub fn new_for_sections(total: u64) -> Self {
        Self {
            sections_pb: Some(create_progress_bar(total, "Diffing sections")),
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self { sections_pb: None }
    }

    /// Advance by one section
    pub fn section_done(&self, section_id: &str) {
        if let Some(pb) = &self.sections_pb {
            pb.set_message(section_id.to_string());
            pb.inc(1);
        }
    }

    pub fn finish(&mut self, message: &str) {
        if let Some(pb) = self.sections_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(pb) = self.sections_pb.take() {
            pb.finish_and_clear();
        }
    }
}

/// Create a progress bar with known total
fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>4}/{len:4} {msg}")
            .expect("Invalid progress template")
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}
