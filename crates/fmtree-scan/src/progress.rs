//! Scrape progress reporting.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Progress information during a scrape, published once per directory listed.
#[derive(Debug, Clone)]
pub struct ScrapeProgress {
    /// Number of directories listed so far.
    pub dirs_listed: u64,
    /// Number of files kept so far.
    pub files_found: u64,
    /// Total bytes of kept files.
    pub bytes_found: u64,
    /// Directory that was just listed.
    pub current_path: PathBuf,
    /// Number of warnings recorded so far.
    pub warnings: u64,
    /// Time elapsed since the run started.
    pub elapsed: Duration,
}

impl ScrapeProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            dirs_listed: 0,
            files_found: 0,
            bytes_found: 0,
            current_path: PathBuf::new(),
            warnings: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Calculate scrape rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_found as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Default for ScrapeProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-run counters with timing.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    dirs_listed: u64,
    files_found: u64,
    bytes_found: u64,
    current_path: PathBuf,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            dirs_listed: 0,
            files_found: 0,
            bytes_found: 0,
            current_path: PathBuf::new(),
        }
    }

    pub fn record_file(&mut self, size: u64) {
        self.files_found += 1;
        self.bytes_found += size;
    }

    pub fn record_dir(&mut self, path: &Path) {
        self.dirs_listed += 1;
        self.current_path = path.to_path_buf();
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self, warnings: usize) -> ScrapeProgress {
        ScrapeProgress {
            dirs_listed: self.dirs_listed,
            files_found: self.files_found,
            bytes_found: self.bytes_found,
            current_path: self.current_path.clone(),
            warnings: warnings as u64,
            elapsed: self.start_time.elapsed(),
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_snapshot() {
        let mut tracker = ProgressTracker::new();
        tracker.record_dir(Path::new("/a"));
        tracker.record_file(10);
        tracker.record_file(5);

        let progress = tracker.snapshot(2);
        assert_eq!(progress.dirs_listed, 1);
        assert_eq!(progress.files_found, 2);
        assert_eq!(progress.bytes_found, 15);
        assert_eq!(progress.warnings, 2);
        assert_eq!(progress.current_path, PathBuf::from("/a"));
    }

    #[test]
    fn test_rate_without_elapsed() {
        assert_eq!(ScrapeProgress::default().files_per_second(), 0.0);
    }

    #[test]
    fn test_rate_over_elapsed() {
        let progress = ScrapeProgress {
            files_found: 50,
            elapsed: Duration::from_secs(2),
            ..ScrapeProgress::default()
        };
        assert_eq!(progress.files_per_second(), 25.0);
    }
}
