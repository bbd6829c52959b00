use url::Url;

/// Schemes kept as-is when a URL is already absolute.
const PASSTHROUGH_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Resolves `raw` against the site origin.
///
/// Protocol-relative (`//host/x`), root-relative (`/x`) and path-relative
/// values are joined onto `base`; absolute http(s)/mailto URLs are returned
/// untouched, so the function is idempotent. Fragment-only anchors, empty
/// values and any other scheme (`javascript:`, `data:` ...) yield `None`.
pub fn absolutize(base: &Url, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }

    match Url::parse(raw) {
        Ok(url) => PASSTHROUGH_SCHEMES
            .contains(&url.scheme())
            .then(|| raw.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => base.join(raw).ok().map(String::from),
        Err(_) => None,
    }
}
