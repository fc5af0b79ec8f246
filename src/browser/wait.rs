//! Bounded fixed-interval polling for page readiness.
//!
//! The portal renders its login widgets and document table asynchronously.
//! Every browser step is gated on a [`WaitCondition`] that is re-evaluated
//! in the page every poll interval until it holds or the per-call deadline
//! passes. The portal's render latency is bounded, so there is no backoff.

use std::fmt;
use std::time::Duration;

use regex::Regex;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::{BrowserError, BrowserSession, js_string};

/// Default interval between readiness checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default deadline for a single readiness wait.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Something the page must show before the next step may run.
#[derive(Debug, Clone)]
pub enum WaitCondition {
    /// An element matching the selector exists and has a non-empty rendered box.
    Visible(String),
    /// The page's rendered text matches the pattern.
    TextMatches(Regex),
}

impl WaitCondition {
    /// Waits for an element matching `selector` to be rendered.
    #[must_use]
    pub fn visible(selector: impl Into<String>) -> Self {
        Self::Visible(selector.into())
    }

    /// Waits for the page text to match `pattern`.
    #[must_use]
    pub fn text_matches(pattern: Regex) -> Self {
        Self::TextMatches(pattern)
    }

    fn script(&self) -> String {
        match self {
            Self::Visible(selector) => format!(
                r"(function() {{
                    const el = document.querySelector({selector});
                    return el !== null &&
                        (el.offsetWidth > 0 || el.offsetHeight > 0 || el.getClientRects().length > 0);
                }})()",
                selector = js_string(selector)
            ),
            Self::TextMatches(_) => {
                "(function() { return document.body ? document.body.innerText : ''; })()"
                    .to_string()
            }
        }
    }

    fn is_satisfied(&self, value: &Value) -> bool {
        match self {
            Self::Visible(_) => value.as_bool() == Some(true),
            Self::TextMatches(pattern) => value.as_str().is_some_and(|text| pattern.is_match(text)),
        }
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visible(selector) => write!(f, "element `{selector}`"),
            Self::TextMatches(pattern) => write!(f, "text matching `{}`", pattern.as_str()),
        }
    }
}

/// Polls a [`BrowserSession`] until a [`WaitCondition`] holds.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessWaiter {
    poll_interval: Duration,
}

impl Default for ReadinessWaiter {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl ReadinessWaiter {
    /// Creates a waiter polling every `poll_interval`.
    #[must_use]
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Waits until `condition` holds, returning the time it took.
    ///
    /// Evaluation errors are retried on the next tick. An evaluation still
    /// pending when the deadline passes counts as deadline exhaustion.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::TimedOut`] when `timeout` elapses first.
    pub async fn wait_for(
        &self,
        session: &dyn BrowserSession,
        condition: &WaitCondition,
        timeout: Duration,
    ) -> Result<Duration, BrowserError> {
        debug!(%condition, ?timeout, "Waiting for page readiness");

        let script = condition.script();
        let start = Instant::now();
        let deadline = start + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(BrowserError::timed_out(condition, start.elapsed()));
            }

            match tokio::time::timeout(remaining, session.evaluate(&script)).await {
                Err(_) => return Err(BrowserError::timed_out(condition, start.elapsed())),
                Ok(Ok(value)) if condition.is_satisfied(&value) => {
                    let elapsed = start.elapsed();
                    debug!(%condition, elapsed_ms = elapsed.as_millis(), "Page ready");
                    return Ok(elapsed);
                }
                Ok(Ok(_)) => trace!(%condition, "Condition not met yet"),
                Ok(Err(error)) => debug!(%condition, %error, "Readiness check failed; retrying"),
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::browser::BrowserCookie;

    /// Answers `evaluate` from a fixed sequence, repeating the last entry.
    struct SequenceSession {
        answers: Mutex<Vec<Result<Value, String>>>,
        calls: Mutex<usize>,
    }

    impl SequenceSession {
        fn new(answers: Vec<Result<Value, String>>) -> Self {
            Self {
                answers: Mutex::new(answers),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl BrowserSession for SequenceSession {
        async fn navigate(&self, _url: &str) -> Result<(), BrowserError> {
            Ok(())
        }

        async fn click(&self, _selector: &str) -> Result<(), BrowserError> {
            Ok(())
        }

        async fn evaluate(&self, _script: &str) -> Result<Value, BrowserError> {
            *self.calls.lock().unwrap() += 1;
            let mut answers = self.answers.lock().unwrap();
            let answer = if answers.len() > 1 {
                answers.remove(0)
            } else {
                answers[0].clone()
            };
            answer.map_err(BrowserError::EvaluationFailed)
        }

        async fn content(&self) -> Result<String, BrowserError> {
            Ok(String::new())
        }

        async fn cookies(&self) -> Result<Vec<BrowserCookie>, BrowserError> {
            Ok(Vec::new())
        }
    }

    fn fast_waiter() -> ReadinessWaiter {
        ReadinessWaiter::new(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_wait_for_visible_succeeds_after_element_renders() {
        let session = SequenceSession::new(vec![
            Ok(Value::Bool(false)),
            Ok(Value::Bool(false)),
            Ok(Value::Bool(true)),
        ]);
        let condition = WaitCondition::visible("#login-form_username");

        let result = fast_waiter()
            .wait_for(&session, &condition, Duration::from_secs(5))
            .await;

        assert!(result.is_ok(), "wait should succeed: {result:?}");
        assert_eq!(session.calls(), 3);
    }

    #[tokio::test]
    async fn test_wait_for_text_matches_pattern() {
        let session = SequenceSession::new(vec![
            Ok(Value::String("Willkommen".into())),
            Ok(Value::String("Start\nAlle Dokumente (42)\nHilfe".into())),
        ]);
        let condition = WaitCondition::text_matches(Regex::new(r"Alle Dokumente \(\d+\)").unwrap());

        let result = fast_waiter()
            .wait_for(&session, &condition, Duration::from_secs(5))
            .await;

        assert!(result.is_ok(), "wait should succeed: {result:?}");
        assert_eq!(session.calls(), 2);
    }

    #[tokio::test]
    async fn test_wait_for_times_out_with_condition_in_error() {
        let session = SequenceSession::new(vec![Ok(Value::Bool(false))]);
        let condition = WaitCondition::visible("#signBtn");

        let result = fast_waiter()
            .wait_for(&session, &condition, Duration::from_millis(40))
            .await;

        match result {
            Err(BrowserError::TimedOut { condition, elapsed }) => {
                assert!(condition.contains("#signBtn"));
                assert!(elapsed >= Duration::from_millis(40));
            }
            other => panic!("expected TimedOut, got {other:?}"),
        }
        assert!(session.calls() > 1, "should poll more than once");
    }

    #[tokio::test]
    async fn test_wait_for_retries_after_evaluation_errors() {
        let session = SequenceSession::new(vec![
            Err("Execution context was destroyed".into()),
            Err("Execution context was destroyed".into()),
            Ok(Value::Bool(true)),
        ]);
        let condition = WaitCondition::visible("table");

        let result = fast_waiter()
            .wait_for(&session, &condition, Duration::from_secs(5))
            .await;

        assert!(result.is_ok(), "errors must be retried: {result:?}");
        assert_eq!(session.calls(), 3);
    }

    #[tokio::test]
    async fn test_wait_for_persistent_errors_end_in_timeout_not_error() {
        let session = SequenceSession::new(vec![Err("detached".into())]);
        let condition = WaitCondition::visible("table");

        let result = fast_waiter()
            .wait_for(&session, &condition, Duration::from_millis(30))
            .await;

        assert!(
            matches!(result, Err(BrowserError::TimedOut { .. })),
            "expected TimedOut, got {result:?}"
        );
    }

    #[test]
    fn test_visible_script_embeds_escaped_selector() {
        let condition = WaitCondition::visible(r"#epaysliplist\:ePayListForm");
        let script = condition.script();
        assert!(
            script.contains(r##""#epaysliplist\\:ePayListForm""##),
            "{script}"
        );
        assert!(script.contains("getClientRects"));
    }

    #[test]
    fn test_non_boolean_value_does_not_satisfy_visibility() {
        let condition = WaitCondition::visible("table");
        assert!(!condition.is_satisfied(&Value::Null));
        assert!(!condition.is_satisfied(&Value::String("true".into())));
        assert!(condition.is_satisfied(&Value::Bool(true)));
    }
}
