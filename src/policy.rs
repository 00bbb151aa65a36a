use std::fmt;
use std::sync::Arc;

use crate::{ClientOptions, Headers, TransportError};

type StatusPredicate = Arc<dyn Fn(u16) -> bool + Send + Sync>;
type TransportErrorPredicate = Arc<dyn Fn(&TransportError) -> bool + Send + Sync>;

/// Status codes retried by [`RetryPolicy::new`].
pub const DEFAULT_RETRYABLE_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

/// Retry rules for one executor.
///
/// There is no `Default`: the retry budget must always be chosen explicitly.
#[derive(Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    retryable_status: StatusPredicate,
    retryable_transport_error: TransportErrorPredicate,
    default_headers: Arc<Headers>,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    /// Retries [`DEFAULT_RETRYABLE_STATUSES`] up to `max_retries` times.
    /// Transport errors are never retried.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            retryable_status: Arc::new(|status: u16| DEFAULT_RETRYABLE_STATUSES.contains(&status)),
            retryable_transport_error: Arc::new(|_: &TransportError| false),
            default_headers: Arc::new(Headers::new()),
        }
    }

    pub fn from_options(opts: &ClientOptions) -> Self {
        let policy = Self::new(opts.max_retries);
        if opts.retry_transport_errors {
            policy.with_transport_error_predicate(TransportError::is_transient)
        } else {
            policy
        }
    }

    pub fn with_status_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(u16) -> bool + Send + Sync + 'static,
    {
        self.retryable_status = Arc::new(predicate);
        self
    }

    /// Retries exactly the listed status codes.
    pub fn retry_on_statuses(self, statuses: impl IntoIterator<Item = u16>) -> Self {
        let statuses: Vec<u16> = statuses.into_iter().collect();
        self.with_status_predicate(move |status| statuses.contains(&status))
    }

    pub fn with_transport_error_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&TransportError) -> bool + Send + Sync + 'static,
    {
        self.retryable_transport_error = Arc::new(predicate);
        self
    }

    /// Shares a read-only default header template with this policy.
    pub fn with_default_headers(mut self, headers: Arc<Headers>) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn default_headers(&self) -> &Arc<Headers> {
        &self.default_headers
    }

    pub fn initial_state(&self) -> RetryState {
        RetryState::new(self.max_retries)
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        (self.retryable_status)(status)
    }

    pub fn is_retryable_transport_error(&self, err: &TransportError) -> bool {
        (self.retryable_transport_error)(err)
    }
}

/// Remaining retry budget of one call chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryState {
    remaining_retries: u32,
}

impl RetryState {
    pub fn new(remaining_retries: u32) -> Self {
        Self { remaining_retries }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining_retries
    }

    /// State for the next attempt, or `None` once the budget is spent.
    pub fn decrement(self) -> Option<Self> {
        self.remaining_retries
            .checked_sub(1)
            .map(|remaining_retries| Self { remaining_retries })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{ClientOptions, Headers, RetryPolicy, RetryState, TransportError};

    #[test]
    fn state_decrements_by_one_until_exhausted() {
        let mut state = RetryState::new(3);
        let mut seen = vec![state.remaining()];
        while let Some(next) = state.decrement() {
            seen.push(next.remaining());
            state = next;
        }
        assert_eq!(seen, vec![3, 2, 1, 0]);
        assert_eq!(RetryState::new(0).decrement(), None);
    }

    #[test]
    fn default_statuses_are_retryable() {
        let policy = RetryPolicy::new(2);
        for status in [429, 500, 502, 503, 504] {
            assert!(policy.is_retryable_status(status), "{status}");
        }
        for status in [200, 400, 401, 404, 501] {
            assert!(!policy.is_retryable_status(status), "{status}");
        }
        assert!(!policy.is_retryable_transport_error(&TransportError::Timeout));
        assert_eq!(policy.initial_state(), RetryState::new(2));
    }

    #[test]
    fn custom_status_list_replaces_defaults() {
        let policy = RetryPolicy::new(1).retry_on_statuses([408]);
        assert!(policy.is_retryable_status(408));
        assert!(!policy.is_retryable_status(503));
    }

    #[test]
    fn options_enable_transient_transport_retries() {
        let policy = RetryPolicy::from_options(&ClientOptions {
            max_retries: 4,
            retry_transport_errors: true,
            ..ClientOptions::default()
        });
        assert_eq!(policy.max_retries(), 4);
        assert!(policy.is_retryable_transport_error(&TransportError::Timeout));
        assert!(!policy.is_retryable_transport_error(&TransportError::Other("tls".to_owned())));
    }

    #[test]
    fn debug_redacts_default_authorization() {
        let policy = RetryPolicy::new(0)
            .with_default_headers(Arc::new(Headers::new().with_bearer("secret-token")));
        let debug = format!("{policy:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-token"));
    }
}
