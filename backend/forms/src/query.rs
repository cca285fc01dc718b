//! Reads a query parameter out of a page URL.

use url::{form_urlencoded, Url};

/// Value of query parameter `name` in `url`, percent-decoded with `+` read
/// as a space.
///
/// `name` is compared with the key exactly as written in the URL, without
/// decoding it first. The first match wins. `None` when the parameter is
/// absent, `Some("")` when it has no value. Relative URLs and bare query
/// strings (`?id=1`) are accepted.
pub fn parameter_by_name(url: &str, name: &str) -> Option<String> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse("http://localhost/").ok()?.join(url).ok()?
        }
        Err(_) => return None,
    };
    let pair = parsed.query()?.split('&').find(|pair| {
        let raw_key = pair.split_once('=').map_or(*pair, |(key, _)| key);
        raw_key == name
    })?;
    let value = form_urlencoded::parse(pair.as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();
    Some(value)
}
