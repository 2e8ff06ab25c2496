//! Building requests from primitive parts.
//!
//! [`RequestArgs`] plays the role of keyword arguments for the `request`
//! convenience methods: everything except the method and URI is optional, and
//! [`RequestArgs::into_request`] is the one place a [`Request`] gets assembled
//! from those parts.

use http::header::{HeaderName, HeaderValue};
use http::uri::PathAndQuery;
use http::{HeaderMap, Method, Uri};

use crate::body::{Body, Request};
use crate::options::{ClientCert, DispatchOptions, TimeoutConfig, Verify};

/// Ordered query string parameters. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// An empty set of parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, keeping any earlier values for the same key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Iterate over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All values for `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter()
            .filter(move |(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Number of parameters, counting repeated keys.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Form-urlencode the parameters, e.g. `a=1&a=2&b=x+y`.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K, V> From<Vec<(K, V)>> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Everything about a request besides its method and URI.
///
/// The defaults are an empty body, no parameters, no headers, and transport
/// defaults for every [`DispatchOptions`] field.
#[derive(Debug, Default)]
pub struct RequestArgs {
    /// Request payload.
    pub data: Body,

    /// Query parameters appended to the URI.
    pub params: Option<QueryParams>,

    /// Request headers.
    pub headers: Option<HeaderMap>,

    /// Options passed through to the transport.
    pub options: DispatchOptions,
}

impl RequestArgs {
    /// Arguments with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request payload.
    pub fn data(mut self, data: impl Into<Body>) -> Self {
        self.data = data.into();
        self
    }

    /// Replace the query parameters.
    pub fn params(mut self, params: impl Into<QueryParams>) -> Self {
        self.params = Some(params.into());
        self
    }

    /// Append a single query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(QueryParams::new)
            .append(key, value);
        self
    }

    /// Replace the headers.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Append a single header, keeping any earlier values for the same name.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers
            .get_or_insert_with(HeaderMap::new)
            .append(name, value);
        self
    }

    /// Set the certificate verification mode.
    pub fn verify(mut self, verify: impl Into<Verify>) -> Self {
        self.options.verify = Some(verify.into());
        self
    }

    /// Set the client certificate.
    pub fn cert(mut self, cert: ClientCert) -> Self {
        self.options.cert = Some(cert);
        self
    }

    /// Set the timeout budgets.
    pub fn timeout(mut self, timeout: impl Into<TimeoutConfig>) -> Self {
        self.options.timeout = Some(timeout.into());
        self
    }

    /// Replace all transport options at once.
    pub fn options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Assemble the request, returning it with the options it should be sent with.
    ///
    /// # Errors
    ///
    /// Fails when the query parameters cannot be merged into `uri`.
    pub fn into_request(
        self,
        method: Method,
        uri: Uri,
    ) -> Result<(Request, DispatchOptions), http::Error> {
        let uri = match &self.params {
            Some(params) if !params.is_empty() => with_query(uri, params)?,
            _ => uri,
        };

        let mut builder = http::Request::builder().method(method).uri(uri);
        if let (Some(slot), Some(headers)) = (builder.headers_mut(), self.headers) {
            *slot = headers;
        }

        let request = builder.body(self.data)?;
        Ok((request, self.options))
    }
}

/// Append the encoded parameters to any query already present on `uri`.
fn with_query(uri: Uri, params: &QueryParams) -> Result<Uri, http::Error> {
    let mut parts = uri.into_parts();
    let encoded = params.encode();

    let path_and_query = match parts.path_and_query.as_ref() {
        Some(pq) => match pq.query() {
            Some(query) if !query.is_empty() => format!("{}?{}&{}", pq.path(), query, encoded),
            _ => format!("{}?{}", pq.path(), encoded),
        },
        None => format!("/?{encoded}"),
    };

    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    Ok(Uri::from_parts(parts)?)
}
