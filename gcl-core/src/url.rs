//! Redirect URL construction.

/// Ordered query parameters. Repeated keys are kept and serialized in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Create an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single `key=value` pair.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Append a single `key=value` pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Append one `key=value` pair per value.
    pub fn extend_values<I, V>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.0
            .extend(values.into_iter().map(|v| (key.to_string(), v.into())));
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Form-urlencode the parameters, without a leading `?`.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Append query parameters to `url`.
///
/// Uses `&` when `url` already carries a query string and `?` otherwise. An empty parameter
/// list returns `url` unchanged.
pub fn append_query(url: &str, params: &QueryParams) -> String {
    if params.is_empty() {
        return url.to_string();
    }

    let sep = if url.contains('?') { '&' } else { '?' };

    format!("{url}{sep}{}", params.encode())
}

/// Join path components with `/`, stripping leading and trailing slashes from each one.
pub fn join_url<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|s| s.as_ref().trim_matches('/').to_string())
        .collect::<Vec<_>>()
        .join("/")
}
