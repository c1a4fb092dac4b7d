//! Run statistics and the final summary.

use std::fmt::Write;
use std::time::Duration;

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStats {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Wall-clock time spent in the batch loop
    pub elapsed: Duration,
}

impl RunStats {
    /// Mean time per image that was not skipped.
    ///
    /// Divides by `max(total_images - skipped, 1)` so an all-skipped run never
    /// divides by zero.
    pub fn mean_per_image(&self, total_images: usize) -> Duration {
        let processed = total_images.saturating_sub(self.skipped).max(1);
        self.elapsed.div_f64(processed as f64)
    }

    /// Renders the final report.
    ///
    /// The mean per image is only included when at least one image succeeded.
    pub fn render_report(&self, total_images: usize) -> String {
        let rule = "-".repeat(50);
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, " FINAL REPORT");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, " Tagged successfully: {}", self.succeeded);
        let _ = writeln!(out, " Already tagged (skipped): {}", self.skipped);
        let _ = writeln!(out, " Failed: {}", self.failed);
        let _ = writeln!(out, " Total time: {:.2}s", self.elapsed.as_secs_f64());
        if self.succeeded > 0 {
            let mean = self.mean_per_image(total_images);
            let _ = writeln!(out, " Average per image: {:.2}s", mean.as_secs_f64());
        }
        let _ = writeln!(out, "{rule}");
        out
    }
}
