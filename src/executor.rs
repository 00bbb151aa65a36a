use std::fmt;

use crate::{
    ClientOptions, ReqwestTransport, RequestSpec, Response, Result, RetryPolicy, RetryState,
    RetryingHttpError, Transport,
};

/// Issues requests through a [`Transport`] and re-issues them while the
/// outcome is retryable and the retry budget lasts.
#[derive(Clone)]
pub struct RetryingRequestExecutor<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T> fmt::Debug for RetryingRequestExecutor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryingRequestExecutor")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RetryingRequestExecutor<ReqwestTransport> {
    /// Creates a `reqwest`-backed executor.
    pub fn from_options(opts: ClientOptions) -> Self {
        Self::new(ReqwestTransport::new(&opts), RetryPolicy::from_options(&opts))
    }

    /// Creates a `reqwest`-backed executor configured from
    /// `RETRYING_HTTP_*` environment variables.
    ///
    /// See [`ClientOptions::from_env`].
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_options(ClientOptions::from_env()?))
    }
}

impl<T: Transport> RetryingRequestExecutor<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Replaces the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Executes `spec` with the policy's full retry budget.
    pub async fn send(&self, spec: &RequestSpec) -> Result<Response> {
        self.execute(spec, self.policy.initial_state()).await
    }

    /// Executes `spec` with the budget carried by `state`.
    ///
    /// Performs at most `state.remaining() + 1` transport invocations. The
    /// last response is returned even when its status is still a failure;
    /// a transport error is returned once it is not retryable or no
    /// retries remain.
    ///
    /// Malformed header names/values or URLs are rejected as
    /// [`RetryingHttpError::Encode`] before the transport is invoked.
    pub async fn execute(&self, spec: &RequestSpec, mut state: RetryState) -> Result<Response> {
        spec.resolve(self.policy.default_headers()).validate()?;

        let mut attempts = 0u32;
        loop {
            let request = spec.resolve(self.policy.default_headers());
            attempts = attempts.saturating_add(1);

            match self.transport.send(&request).await {
                Ok(response) => {
                    if !self.policy.is_retryable_status(response.status()) {
                        return Ok(response);
                    }
                    match state.decrement() {
                        Some(next) => {
                            #[cfg(feature = "tracing")]
                            tracing::debug!(
                                method = %request.method,
                                url = %request.url,
                                status = response.status(),
                                attempt = attempts,
                                remaining = next.remaining(),
                                "retrying request after retryable status"
                            );
                            state = next;
                        }
                        None => {
                            #[cfg(feature = "tracing")]
                            tracing::debug!(
                                method = %request.method,
                                url = %request.url,
                                status = response.status(),
                                attempts,
                                "retry budget exhausted, returning last response"
                            );
                            return Ok(response);
                        }
                    }
                }
                Err(err) => {
                    let next = if self.policy.is_retryable_transport_error(&err) {
                        state.decrement()
                    } else {
                        None
                    };
                    match next {
                        Some(next) => {
                            #[cfg(feature = "tracing")]
                            tracing::debug!(
                                method = %request.method,
                                url = %request.url,
                                error = %err,
                                attempt = attempts,
                                remaining = next.remaining(),
                                "retrying request after transport error"
                            );
                            state = next;
                        }
                        None => {
                            return Err(RetryingHttpError::Transport {
                                attempts,
                                source: err,
                            })
                        }
                    }
                }
            }
        }
    }
}
