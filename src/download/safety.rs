//! URL safety validation for outbound fetches
//!
//! Blocks obvious SSRF targets before any network I/O: non-HTTP schemes,
//! localhost, and private/link-local address ranges. This is a hostname-string
//! check, not a DNS-resolved-IP check; a hostname that resolves to a private
//! address will pass here and fail (or not) at connect time.

use url::Url;

/// Hostname prefixes for private and link-local networks
const BLOCKED_PREFIXES: &[&str] = &["127.", "169.254.", "192.168.", "10."];

/// Returns true when `raw` is acceptable for an outbound fetch
///
/// Fails closed: unparseable URLs are unsafe.
pub fn is_safe_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw) else {
        return false;
    };

    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }

    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_lowercase();

    if host == "localhost" {
        return false;
    }
    if BLOCKED_PREFIXES.iter().any(|p| host.starts_with(p)) {
        return false;
    }
    // 172.16.0.0/12
    if let Some(rest) = host.strip_prefix("172.") {
        if let Some(second) = rest.split('.').next() {
            if let Ok(octet) = second.parse::<u16>() {
                if (16..=31).contains(&octet) {
                    return false;
                }
            }
        }
    }

    true
}
