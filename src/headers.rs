use std::collections::BTreeMap;
use std::fmt;

use reqwest::header::{HeaderName, HeaderValue};

use crate::{Result, RetryingHttpError};

const REDACTED_HEADERS: &[&str] = &["authorization", "proxy-authorization", "cookie"];

/// Header table keyed by lower-cased header name.
///
/// A `Headers` value is never updated through a shared reference. Combining
/// two tables with [`Headers::merge`] always allocates a new table, so a set
/// of defaults held behind an `Arc` can be shared by any number of
/// concurrent call chains.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: BTreeMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of `self` with `name` set to `value`.
    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.entries
            .insert(normalize_name(name.as_ref()), value.into());
        self
    }

    /// Returns a copy of `self` carrying a bearer `authorization` header.
    ///
    /// If the token is missing the `Bearer ` prefix, it is added automatically.
    pub fn with_bearer(self, token: impl AsRef<str>) -> Self {
        self.with("authorization", bearer_value(token.as_ref()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Checks every name and value against HTTP header syntax.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in &self.entries {
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                RetryingHttpError::Encode(format!("invalid header name '{name}'"))
            })?;
            HeaderValue::from_str(value).map_err(|_| {
                RetryingHttpError::Encode(format!("invalid value for header '{name}'"))
            })?;
        }
        Ok(())
    }

    /// Builds a new table from `self` with every entry of `overrides` layered
    /// on top. Neither input is modified.
    pub fn merge(&self, overrides: &Headers) -> Headers {
        let mut entries = self.entries.clone();
        for (name, value) in &overrides.entries {
            entries.insert(name.clone(), value.clone());
        }
        Headers { entries }
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.entries {
            if REDACTED_HEADERS.contains(&name.as_str()) {
                map.entry(name, &"<redacted>");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Headers::new(), |headers, (name, value)| headers.with(name, value))
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Headers
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Prefixes `token` with the `Bearer` scheme unless the caller already
/// supplied one (matched case-insensitively).
fn bearer_value(token: &str) -> String {
    let token = token.trim();
    match token.split_once(' ') {
        Some((scheme, _)) if scheme.eq_ignore_ascii_case("bearer") => token.to_owned(),
        _ => format!("Bearer {token}"),
    }
}

/// Response header table. Keeps every value received for a name, in
/// arrival order; values that are not valid UTF-8 are kept lossily.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: BTreeMap<String, Vec<String>>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the values already stored for `name`.
    pub fn append(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.entries
            .entry(normalize_name(name.as_ref()))
            .or_default()
            .push(value.into());
        self
    }

    /// First value received for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&normalize_name(name))
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries
            .get(&normalize_name(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_name(name))
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(name, values)| {
            values
                .iter()
                .map(move |value| (name.as_str(), value.as_str()))
        })
    }
}

impl fmt::Debug for ResponseHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, values) in &self.entries {
            if REDACTED_HEADERS.contains(&name.as_str()) || name == "set-cookie" {
                map.entry(name, &"<redacted>");
            } else {
                map.entry(name, values);
            }
        }
        map.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for ResponseHeaders
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ResponseHeaders::new(), |headers, (name, value)| {
                headers.append(name, value)
            })
    }
}
