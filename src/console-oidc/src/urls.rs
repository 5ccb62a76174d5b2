//! Callback URL and origin helpers.
//!
//! Several callback URLs are stored as a single `regexp=(a|b)` entry; the
//! form edits them as a comma separated list.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

const REGEXP_PREFIX: &str = "regexp=";

static QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]+"#).expect("quote regex pattern is valid"));

/// `scheme://something`, which covers http(s) and mobile deep links.
static SCHEME_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://\S+$").expect("scheme url regex pattern is valid")
});

/// Encode a comma separated list for storage.
///
/// Quotes are stripped; more than one URL becomes `regexp=(a|b)`.
pub fn build_callback_url_with_regexp(urls: &str) -> String {
    let stripped = QUOTES.replace_all(urls, "");
    let parts: Vec<&str> = stripped.split(',').collect();
    if parts.len() > 1 {
        format!("{}({})", REGEXP_PREFIX, parts.join("|"))
    } else {
        stripped.into_owned()
    }
}

/// Decode a stored callback URL back into a comma separated list.
pub fn build_callback_url_with_separator(url: &str) -> String {
    if !url.contains(REGEXP_PREFIX) {
        return url.to_string();
    }
    url.replacen("regexp=(", "", 1)
        .replacen(')', "", 1)
        .split('|')
        .collect::<Vec<_>>()
        .join(",")
}

/// Split a comma separated origin list, dropping empty entries.
pub fn resolve_allowed_origins(origins: &str) -> Vec<String> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a comma separated list of callback URLs, dropping empty entries.
pub fn split_urls(urls: &str) -> Vec<String> {
    resolve_allowed_origins(&QUOTES.replace_all(urls, ""))
}

pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://")
}

pub fn is_https_url(value: &str) -> bool {
    value.starts_with("https://")
}

pub fn is_https_or_http_url(value: &str) -> bool {
    is_http_url(value) || is_https_url(value)
}

/// Any `scheme://...` URL. Plain http(s) URLs qualify too.
pub fn is_mobile_deep_link(value: &str) -> bool {
    SCHEME_URL.is_match(value)
}

/// An absolute URL with a host.
pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| url.has_host())
}

/// `http(s)://host[:port]` with nothing after it but an optional `/`.
pub fn is_valid_origin_url(value: &str) -> bool {
    let Ok(url) = Url::parse(value) else {
        return false;
    };
    matches!(url.scheme(), "http" | "https")
        && url.has_host()
        && url.username().is_empty()
        && url.password().is_none()
        && url.path() == "/"
        && url.query().is_none()
        && url.fragment().is_none()
}
