//! Keyword preparation for URL construction
//!
//! Both helpers start from the keyword as written in the configuration:
//!
//! 1. [`format_keyword`] runs once per keyword and feeds the primary request.
//! 2. [`fallback_keyword`] runs only when the primary request failed. It
//!    percent-encodes the unquoted keyword, never the already formatted text,
//!    so `%20` is not turned into `%2520`.

/// Format a keyword for the `q` query parameter.
///
/// Keywords without a double quote are returned untouched. Quoted phrases
/// lose their quotes and have every space replaced by `%20`.
pub fn format_keyword(keyword: &str) -> String {
    if !keyword.contains('"') {
        return keyword.to_string();
    }

    keyword.replace('"', "").replace(' ', "%20")
}

/// Percent-encode a keyword segment
pub fn encode_keyword(keyword: &str) -> String {
    urlencoding::encode(keyword).into_owned()
}

/// Keyword segment for the fallback request, from the configured keyword
pub fn fallback_keyword(query: &str) -> String {
    encode_keyword(&query.replace('"', ""))
}
