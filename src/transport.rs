use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::{ClientOptions, Method, ResolvedRequest, Response, ResponseHeaders, TransportError};

/// Performs the network I/O for a single attempt.
///
/// A transport reports an HTTP error status as an `Ok(Response)`; `Err` is
/// reserved for attempts that never produced a response.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &ResolvedRequest,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: &ResolvedRequest,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send {
        (**self).send(request)
    }
}

/// Adapts an async closure into a [`Transport`].
///
/// The closure receives its own copy of the resolved request.
#[derive(Clone)]
pub struct FnTransport<F> {
    f: F,
}

/// Wraps `f` as a [`Transport`].
pub fn transport_fn<F, Fut>(f: F) -> FnTransport<F>
where
    F: Fn(ResolvedRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, TransportError>> + Send,
{
    FnTransport { f }
}

impl<F> fmt::Debug for FnTransport<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransport").finish_non_exhaustive()
    }
}

impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(ResolvedRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, TransportError>> + Send,
{
    fn send(
        &self,
        request: &ResolvedRequest,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send {
        (self.f)(request.clone())
    }
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(opts: &ClientOptions) -> Self {
        Self::with_client(reqwest::Client::new(), opts)
    }

    /// Reuses an existing client (connection pool, TLS config, proxies).
    pub fn with_client(http: reqwest::Client, opts: &ClientOptions) -> Self {
        Self {
            http,
            timeout: Duration::from_millis(opts.timeout_ms),
        }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: &ResolvedRequest) -> Result<Response, TransportError> {
        let mut builder = self
            .http
            .request(to_reqwest_method(request.method), &request.url)
            .timeout(self.timeout);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_bytes());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers: ResponseHeaders = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?;

        Ok(Response::new(status, body.to_vec()).with_headers(headers))
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}
