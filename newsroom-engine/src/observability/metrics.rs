//! Metric names used by the engine, following Prometheus naming
//! conventions. An enum instead of magic strings.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    EmailsSent,
    EmailsFailed,
    NotificationsDelivered,
    TasksExecuted,
    TasksFailed,
    DigestRuns,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::EmailsSent => "newsroom_emails_sent_total",
            MetricName::EmailsFailed => "newsroom_emails_failed_total",
            MetricName::NotificationsDelivered => "newsroom_notifications_delivered_total",
            MetricName::TasksExecuted => "newsroom_tasks_executed_total",
            MetricName::TasksFailed => "newsroom_tasks_failed_total",
            MetricName::DigestRuns => "newsroom_digest_runs_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn increment(metric: MetricName) {
    metrics::counter!(metric.as_str()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_follow_prometheus_conventions() {
        let names = [
            MetricName::EmailsSent,
            MetricName::EmailsFailed,
            MetricName::NotificationsDelivered,
            MetricName::TasksExecuted,
            MetricName::TasksFailed,
            MetricName::DigestRuns,
        ];
        for name in names {
            assert!(name.as_str().starts_with("newsroom_"));
            assert!(name.as_str().ends_with("_total"));
        }
    }
}
