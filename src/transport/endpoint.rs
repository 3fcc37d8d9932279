use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use url::Url;

/// Query parameter appended to every GET so intermediaries cannot serve a stale copy.
pub const CACHE_BUST_PARAM: &str = "_cb";

static CACHE_BUST_SEQ: AtomicU64 = AtomicU64::new(0);

/// Numeric value unique per call within the process.
pub fn cache_buster() -> u64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default();
    let seq = CACHE_BUST_SEQ.fetch_add(1, Ordering::Relaxed) % 1000;
    millis.wrapping_mul(1000).wrapping_add(seq)
}

/// Assemble `scheme://host/path?query`, appending the cache buster last when given.
pub fn build_url(
    scheme: &str,
    host: &str,
    path: &str,
    query: &[(String, String)],
    cache_bust: Option<u64>,
) -> Result<Url, url::ParseError> {
    let host = host.trim_end_matches('/');
    let separator = if path.starts_with('/') { "" } else { "/" };
    let mut url = Url::parse(&format!("{scheme}://{host}{separator}{path}"))?;

    if !query.is_empty() || cache_bust.is_some() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
        if let Some(nonce) = cache_bust {
            pairs.append_pair(CACHE_BUST_PARAM, &nonce.to_string());
        }
    }

    Ok(url)
}

/// Resolve a `Location` header against the URL that produced it and carry the original
/// query string over to the new target.
pub fn resolve_redirect(
    current: &Url,
    location: &str,
    original_query: Option<&str>,
) -> Result<Url, url::ParseError> {
    let mut target = current.join(location.trim())?;

    if let Some(original) = original_query.filter(|query| !query.is_empty()) {
        let merged = match target.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{original}"),
            _ => original.to_owned(),
        };
        target.set_query(Some(&merged));
    }

    Ok(target)
}
