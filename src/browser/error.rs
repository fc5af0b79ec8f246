//! Browser error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while driving the browser.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Chrome could not be configured or started.
    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    /// A page load did not complete.
    #[error("navigation to {url} failed: {reason}")]
    NavigationFailed {
        /// The URL being loaded.
        url: String,
        /// Driver-reported cause.
        reason: String,
    },

    /// A click, field fill or similar page interaction did not complete.
    #[error("interaction with {target} failed: {reason}")]
    InteractionFailed {
        /// Selector or description of the element involved.
        target: String,
        /// Driver-reported cause.
        reason: String,
    },

    /// A script could not be evaluated or returned an unexpected value.
    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    /// The browser could not enumerate its cookies.
    #[error("cookie enumeration failed: {0}")]
    CookiesUnavailable(String),

    /// A readiness wait exceeded its deadline.
    #[error("timed out after {elapsed:?} waiting for {condition}")]
    TimedOut {
        /// Human-readable description of the awaited condition.
        condition: String,
        /// Time spent waiting before giving up.
        elapsed: Duration,
    },
}

impl BrowserError {
    /// Creates a navigation error.
    pub fn navigation(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::NavigationFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates an interaction error.
    pub fn interaction(target: impl Into<String>, reason: impl ToString) -> Self {
        Self::InteractionFailed {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a readiness timeout error.
    pub fn timed_out(condition: impl ToString, elapsed: Duration) -> Self {
        Self::TimedOut {
            condition: condition.to_string(),
            elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_out_display_names_condition_and_elapsed() {
        let error = BrowserError::timed_out("element `#signBtn`", Duration::from_secs(30));
        let msg = error.to_string();
        assert!(msg.contains("#signBtn"), "Expected selector in: {msg}");
        assert!(msg.contains("30s"), "Expected elapsed time in: {msg}");
    }

    #[test]
    fn test_interaction_display_names_target() {
        let error = BrowserError::interaction("#verifUseridBtn", "node not found");
        let msg = error.to_string();
        assert!(msg.contains("#verifUseridBtn"), "Expected target in: {msg}");
        assert!(msg.contains("node not found"), "Expected reason in: {msg}");
    }
}
