//! Website URL validation and canonicalisation.
//!
//! Two entry points with different strictness:
//!
//! - [`normalize_website_url`] is lenient and used on websites reported by the
//!   places API, which are frequently bare hostnames (`example.com`).
//! - [`is_valid_target_url`] is strict and used on URLs typed by the operator,
//!   which must already carry an `http://` or `https://` scheme.

use url::Url;

/// Hostnames shorter than this are rejected as implausible.
const MIN_HOST_LEN: usize = 3;

/// Validates and canonicalises a website string.
///
/// A missing scheme is replaced by `https://`. Returns `None` when the result
/// does not parse, has no host, or the host is shorter than three characters.
/// On success the URL is returned in its serialized form, so `example.com`
/// becomes `https://example.com/`.
#[must_use]
pub fn normalize_website_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidate = if has_http_scheme(trimmed) {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&candidate).ok()?;
    let host = parsed.host_str()?;
    if host.len() < MIN_HOST_LEN {
        return None;
    }

    Some(parsed.to_string())
}

/// Returns `true` if `raw` is an absolute URL that starts with `http://` or
/// `https://`.
#[must_use]
pub fn is_valid_target_url(raw: &str) -> bool {
    has_http_scheme(raw) && Url::parse(raw).is_ok_and(|u| u.host_str().is_some())
}

/// Strips the scheme and a leading `www.` for compact display.
///
/// `https://www.example.com/shop` becomes `example.com/shop`.
#[must_use]
pub fn display_url(url: &str) -> &str {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    without_scheme
        .strip_prefix("www.")
        .unwrap_or(without_scheme)
}

fn has_http_scheme(raw: &str) -> bool {
    let lower = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
