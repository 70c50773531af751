//! Runtime counters for the bot.

use chrono::{DateTime, Utc};

/// Counters kept since startup, surfaced via the `/stats` command.
#[derive(Debug, Clone)]
pub struct BotStats {
    /// When the bot started.
    started_at: DateTime<Utc>,

    /// Shorten requests received (valid or not).
    pub total_requests: u64,

    /// Requests that produced a short URL.
    pub successful: u64,

    /// Requests that ended in a failure reply.
    pub failed: u64,
}

impl Default for BotStats {
    fn default() -> Self {
        Self::new()
    }
}

impl BotStats {
    /// Creates fresh counters, marking now as the start time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            total_requests: 0,
            successful: 0,
            failed: 0,
        }
    }

    /// Records an incoming shorten request.
    pub fn record_request(&mut self) {
        self.total_requests += 1;
    }

    /// Records a successful shorten.
    pub fn record_success(&mut self) {
        self.successful += 1;
    }

    /// Records a failed shorten.
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Success rate in percent, 0 when nothing was requested yet.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            {
                self.successful as f64 / self.total_requests as f64 * 100.0
            }
        }
    }

    /// Seconds elapsed since startup.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        let secs = (Utc::now() - self.started_at).num_seconds();
        u64::try_from(secs).unwrap_or_default()
    }

    /// Builds the `/stats` reply text.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Uptime: {}\n\
             Requests: {}\n\
             Shortened: {}\n\
             Failed: {}\n\
             Success rate: {:.1}%",
            format_uptime(self.uptime_secs()),
            self.total_requests,
            self.successful,
            self.failed,
            self.success_rate(),
        )
    }
}

/// Formats an uptime in seconds to a human-readable string.
fn format_uptime(secs: u64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins == 0 {
            format!("{hours}h")
        } else {
            format!("{hours}h {mins}m")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut stats = BotStats::new();
        stats.record_request();
        stats.record_success();
        stats.record_request();
        stats.record_failure();

        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.failed, 1);
        assert!((stats.success_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_success_rate_without_requests() {
        let stats = BotStats::new();
        assert!(stats.success_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(30), "30s");
        assert_eq!(format_uptime(90), "1m 30s");
        assert_eq!(format_uptime(3600), "1h");
        assert_eq!(format_uptime(3660), "1h 1m");
    }

    #[test]
    fn test_summary_contains_counts() {
        let mut stats = BotStats::new();
        stats.record_request();
        stats.record_success();

        let summary = stats.summary();
        assert!(summary.contains("Requests: 1"));
        assert!(summary.contains("Shortened: 1"));
        assert!(summary.contains("Success rate: 100.0%"));
    }
}
