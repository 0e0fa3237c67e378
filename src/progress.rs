//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter for diffing file pairs
#[derive(Debug)]
pub struct ProgressReporter {
    pairs_pb: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Create progress reporter for a directory diff
    pub fn new_for_pairs(total: u64) -> Self {
        Self {
            pairs_pb: Some(create_progress_bar(total, "Comparing files")),
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self { pairs_pb: None }
    }

    /// Choose a reporter for the number of file pairs
    pub fn for_pair_count(count: usize) -> Self {
        if count > 1 {
            Self::new_for_pairs(count as u64)
        } else {
            Self::new_minimal()
        }
    }

    pub fn is_active(&self) -> bool {
        self.pairs_pb.is_some()
    }

    /// Record one finished pair; safe to call from worker threads
    pub fn pair_done(&self, name: &str) {
        if let Some(pb) = &self.pairs_pb {
            pb.set_message(name.to_string());
            pb.inc(1);
        }
    }

    pub fn finish(&mut self, message: &str) {
        if let Some(pb) = self.pairs_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(pb) = self.pairs_pb.take() {
            pb.finish_and_clear();
        }
    }
}

/// Create a progress bar with known total
fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>4}/{len:4} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(message.to_string());
    pb
}
