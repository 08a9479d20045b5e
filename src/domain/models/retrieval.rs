use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Identifiers of an assistant message the upstream has accepted but not yet produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRetrieval {
    pub conversation_id: String,
    pub message_id: String,
}

impl PendingRetrieval {
    pub fn new(conversation_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            message_id: message_id.into(),
        }
    }
}

/// A successfully fetched upstream message.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchedMessage {
    Text(String),
    /// The response succeeded but carried no text item; the payload is kept as-is.
    Raw(serde_json::Value),
}

impl FetchedMessage {
    pub fn is_raw(&self) -> bool {
        matches!(self, FetchedMessage::Raw(_))
    }

    pub fn into_text(self) -> String {
        match self {
            FetchedMessage::Text(text) => text,
            FetchedMessage::Raw(serde_json::Value::String(body)) => body,
            FetchedMessage::Raw(value) => value.to_string(),
        }
    }
}

/// Phases of a single submit-and-retrieve exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalState {
    Submitting,
    AwaitingGeneration,
    Resolved,
    Failed,
}

impl RetrievalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalState::Submitting => "submitting",
            RetrievalState::AwaitingGeneration => "awaiting_generation",
            RetrievalState::Resolved => "resolved",
            RetrievalState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RetrievalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bounded exponential backoff used while polling for a generated message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    factor: f64,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            base_delay: Duration::from_millis(1000),
            factor: 1.5,
            max_delay: Duration::from_millis(10_000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, factor: f64, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            factor: if factor < 1.0 { 1.0 } else { factor },
            max_delay,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Fetches performed before giving up: the initial try plus every retry.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Delay before retry number `retry` (zero-based), capped at `max_delay`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let cap_ms = self.max_delay.as_millis() as f64;
        let computed = base_ms * self.factor.powi(retry.min(i32::MAX as u32) as i32);
        Duration::from_millis(computed.min(cap_ms).round() as u64)
    }

    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_retries).map(|retry| self.delay_for(retry)).collect()
    }

    /// Upper bound on the time spent sleeping between attempts.
    pub fn total_delay(&self) -> Duration {
        self.schedule().iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(durations: &[Duration]) -> Vec<u64> {
        durations.iter().map(|d| d.as_millis() as u64).collect()
    }

    #[test]
    fn schedule_grows_by_factor() {
        let policy = RetryPolicy::default().with_max_retries(3);
        assert_eq!(millis(&policy.schedule()), vec![1000, 1500, 2250]);
    }

    #[test]
    fn schedule_is_capped() {
        let policy = RetryPolicy::default().with_max_retries(10);
        let schedule = millis(&policy.schedule());

        // 1000 * 1.5^6 = 11390.6 would exceed the cap
        assert_eq!(schedule[5], 7594);
        assert_eq!(schedule[6], 10_000);
        assert!(schedule.iter().all(|&d| d <= 10_000));
        assert_eq!(schedule[9], 10_000);
    }

    #[test]
    fn attempts_include_initial_try() {
        let policy = RetryPolicy::default().with_max_retries(3);
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn zero_retries_means_empty_schedule() {
        let policy = RetryPolicy::default().with_max_retries(0);
        assert!(policy.schedule().is_empty());
        assert_eq!(policy.total_delay(), Duration::ZERO);
    }

    #[test]
    fn total_delay_is_sum_of_schedule() {
        let policy = RetryPolicy::default().with_max_retries(3);
        assert_eq!(policy.total_delay(), Duration::from_millis(4750));
    }

    #[test]
    fn raw_fetch_falls_back_to_payload_text() {
        let raw = FetchedMessage::Raw(serde_json::json!({"id": "m1"}));
        assert!(raw.is_raw());
        assert_eq!(raw.into_text(), r#"{"id":"m1"}"#);
    }

    #[test]
    fn raw_string_payload_is_not_requoted() {
        let raw = FetchedMessage::Raw(serde_json::Value::String("plain body".to_string()));
        assert_eq!(raw.into_text(), "plain body");
    }
}
