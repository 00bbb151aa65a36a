/// Failure of the transport itself, as opposed to an HTTP error status.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// The remote host could not be reached.
    #[error("connection failed: {0}")]
    Connect(String),
    /// The attempt did not complete within the transport deadline.
    #[error("request timed out")]
    Timeout,
    /// Any other transport-level failure.
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Reqwest(err) => err.is_timeout(),
            Self::Timeout => true,
            _ => false,
        }
    }

    pub fn is_connect(&self) -> bool {
        match self {
            Self::Reqwest(err) => err.is_connect(),
            Self::Connect(_) => true,
            _ => false,
        }
    }

    /// Request-level failures worth another attempt: timeouts, connection
    /// failures and interrupted request/response bodies.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Reqwest(err) => {
                err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
            }
            Self::Connect(_) | Self::Timeout => true,
            Self::Other(_) => false,
        }
    }
}

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum RetryingHttpError {
    /// The transport failed and no retries remained (or the failure was not
    /// retryable).
    #[error("transport failed after {attempts} attempt(s): {source}")]
    Transport {
        /// Total transport invocations made for this call chain.
        attempts: u32,
        #[source]
        source: TransportError,
    },
    /// Request body could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),
    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::{RetryingHttpError, TransportError};

    #[test]
    fn classifies_synthetic_transport_errors() {
        assert!(TransportError::Timeout.is_timeout());
        assert!(TransportError::Timeout.is_transient());
        assert!(TransportError::Connect("refused".to_owned()).is_connect());
        assert!(!TransportError::Other("tls".to_owned()).is_transient());
    }

    #[test]
    fn transport_error_message_includes_attempts() {
        let err = RetryingHttpError::Transport {
            attempts: 3,
            source: TransportError::Connect("dns lookup failed".to_owned()),
        };
        assert_eq!(
            err.to_string(),
            "transport failed after 3 attempt(s): connection failed: dns lookup failed"
        );
    }
}
