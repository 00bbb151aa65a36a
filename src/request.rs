use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Headers, Result, RetryingHttpError};

/// HTTP request method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
}

impl Body {
    /// Serializes the payload into the bytes sent on the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.as_bytes().to_vec(),
            Self::Bytes(bytes) => bytes.clone(),
            Self::Json(value) => value.to_string().into_bytes(),
        }
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// Description of a single logical request.
///
/// Fields are private: once built, a spec can only be read. The same spec is
/// reused unchanged for every attempt of a call chain.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestSpec {
    method: Method,
    url: String,
    body: Option<Body>,
    headers: Headers,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            headers: Headers::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// Sets a call-specific header. Overrides a default of the same name.
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers = self.headers.with(name, value);
        self
    }

    /// Replaces all call-specific headers.
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)
            .map_err(|err| RetryingHttpError::Encode(format!("invalid JSON body: {err}")))?;
        self.body = Some(Body::Json(value));
        Ok(self)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body_ref(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn header_map(&self) -> &Headers {
        &self.headers
    }

    /// Produces the request handed to a transport.
    ///
    /// Headers are `defaults` overlaid with this spec's headers, in a freshly
    /// allocated table. A JSON body adds `content-type: application/json`
    /// unless a content type is already present.
    pub fn resolve(&self, defaults: &Headers) -> ResolvedRequest {
        let mut headers = defaults.merge(&self.headers);
        if matches!(self.body, Some(Body::Json(_))) && !headers.contains("content-type") {
            headers = headers.with("content-type", "application/json");
        }
        ResolvedRequest {
            method: self.method,
            url: self.url.clone(),
            headers,
            body: self.body.clone(),
        }
    }
}

/// A fully-resolved request for one transport invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Body>,
}

impl ResolvedRequest {
    /// Rejects requests no transport could put on the wire: a URL that is
    /// not absolute, or a header name/value that breaks HTTP syntax.
    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.url).map_err(|err| {
            RetryingHttpError::Encode(format!("invalid URL '{}': {err}", self.url))
        })?;
        self.headers.validate()
    }
}
