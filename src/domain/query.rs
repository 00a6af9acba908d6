/// Result cap applied to an unfiltered listing
pub const DEFAULT_RESULT_CAP: usize = 10;

/// A canonical location search query
///
/// Built from an optional classification tag filter and the debounced search
/// text. The parameter list doubles as the remote request's query parameters
/// and, joined, as the cache key, so its ordering is fixed:
///
/// 1. `_summary=data` — always; requests the lightweight response shape
/// 2. `_count` — only when the text is empty, to bound an unfiltered listing
/// 3. `_tag` — exact classification match, when a tag filter is set
/// 4. `name:contains` — case-insensitive name filter, when text is non-empty
///
/// A filtered search carries no cap: the name filter itself bounds the
/// result size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    tag_filter: Option<String>,
    text: String,
    result_cap: usize,
}

impl SearchQuery {
    pub fn new(tag_filter: Option<String>, text: impl Into<String>) -> Self {
        Self::with_result_cap(tag_filter, text, DEFAULT_RESULT_CAP)
    }

    pub fn with_result_cap(
        tag_filter: Option<String>,
        text: impl Into<String>,
        result_cap: usize,
    ) -> Self {
        Self {
            tag_filter,
            text: text.into(),
            result_cap,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tag_filter(&self) -> Option<&str> {
        self.tag_filter.as_deref()
    }

    /// Query parameters in canonical order
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("_summary", "data".to_string())];

        if self.text.is_empty() {
            params.push(("_count", self.result_cap.to_string()));
        }

        if let Some(tag) = &self.tag_filter {
            params.push(("_tag", tag.clone()));
        }

        if !self.text.is_empty() {
            params.push(("name:contains", self.text.clone()));
        }

        params
    }

    /// Canonical cache key for this query
    ///
    /// Identical `(tag_filter, text)` pairs always produce byte-identical
    /// keys; request deduplication and cache lookups both depend on this.
    pub fn cache_key(&self) -> String {
        let mut key = String::new();
        for (name, value) in self.params() {
            if !key.is_empty() {
                key.push('&');
            }
            key.push_str(name);
            key.push('=');
            key.push_str(&value);
        }
        key
    }
}
