use crate::{UrlError, UrlResult};
use url::Url;

/// Parses and validates a catalogue base URL
///
/// The URL must be absolute, use the `http` or `https` scheme, and carry a
/// host.
///
/// # Examples
///
/// ```
/// use catalogue_scraper::url::parse_base_url;
///
/// assert!(parse_base_url("https://shop.example.com/shop").is_ok());
/// assert!(parse_base_url("ftp://shop.example.com/").is_err());
/// assert!(parse_base_url("/shop").is_err());
/// ```
pub fn parse_base_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Returns true if `src` is an absolute `http://` or `https://` reference
///
/// Relative paths, protocol-relative `//host/...` references and other
/// schemes (`data:`, `file:`) are not absolute for this purpose. The scheme
/// comparison ignores ASCII case.
pub fn is_absolute_http(src: &str) -> bool {
    let src = src.trim_start();
    ["http://", "https://"].iter().any(|scheme| {
        src.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}
