//! `retrying-http` executes HTTP requests with a bounded retry budget.
//!
//! - [`RetryingRequestExecutor::send`] runs a [`RequestSpec`] with the
//!   policy's full budget.
//! - [`RetryingRequestExecutor::execute`] runs it with an explicit
//!   [`RetryState`].
//!
//! Retries are immediate (no backoff). Every attempt resolves its headers
//! into a fresh table built from the policy's shared defaults and the
//! request's own headers; the defaults are never written to.

mod error;
mod executor;
mod headers;
mod options;
mod policy;
mod request;
mod response;
mod transport;

pub use error::{RetryingHttpError, TransportError};
pub use executor::RetryingRequestExecutor;
pub use headers::{Headers, ResponseHeaders};
pub use options::ClientOptions;
pub use policy::{RetryPolicy, RetryState, DEFAULT_RETRYABLE_STATUSES};
pub use request::{Body, Method, RequestSpec, ResolvedRequest};
pub use response::Response;
pub use transport::{transport_fn, FnTransport, ReqwestTransport, Transport};

pub type Result<T> = std::result::Result<T, RetryingHttpError>;
