// src/progress.rs
//! Progress bar for per-host DNS collection

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar wrapper that can be switched off
pub struct ProgressIndicator {
    bar: Option<ProgressBar>,
}

impl ProgressIndicator {
    /// Create a bar counting up to `total`
    pub fn new(enabled: bool, total: u64) -> Self {
        if !enabled || total == 0 {
            return Self { bar: None };
        }

        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar: Some(bar) }
    }

    /// Show the host currently being resolved
    pub fn set_message(&self, msg: impl Into<String>) {
        if let Some(ref bar) = self.bar {
            bar.set_message(msg.into());
        }
    }

    pub fn inc(&self) {
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    /// Finish and clear the bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.bar.is_some()
    }
}

impl Drop for ProgressIndicator {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_indicator_disabled() {
        let progress = ProgressIndicator::new(false, 10);
        assert!(!progress.is_enabled());

        // Should not panic
        progress.set_message("test");
        progress.inc();
        progress.finish();
    }

    #[test]
    fn test_progress_indicator_empty_total() {
        assert!(!ProgressIndicator::new(true, 0).is_enabled());
    }

    #[test]
    fn test_progress_indicator_enabled() {
        let progress = ProgressIndicator::new(true, 2);
        assert!(progress.is_enabled());

        progress.set_message("www.example.com");
        progress.inc();
    }
}
