use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::warn;
use url::Url;

/// route every proxied request goes through
pub const PROXY_PATH: &str = "/p";

// #EXT-X-KEY: / #EXT-X-MAP: in any casing
static URI_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^#EXT-X-(KEY|MAP):").expect("uri directive regex"));

// the URI attribute, quoted or bare, only when it starts an attribute so KEYFORMATURI and
// friends are left alone
static URI_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)([:,]\s*)URI=(?:"([^"]*)"|([^",\s]+))"#).expect("uri attribute regex")
});

/// `/p?u=<upstream>&rf=<referer>`, both percent-encoded
///
/// this is also the shape the catalog side hands to the player
pub fn proxied_url(upstream: &str, referer: &str) -> String {
    format!(
        "{}?u={}&rf={}",
        PROXY_PATH,
        urlencoding::encode(upstream),
        urlencoding::encode(referer)
    )
}

fn proxy_uri(uri: &str, base_url: &Url, referer: &str) -> Option<String> {
    match base_url.join(uri) {
        Ok(resolved) => Some(proxied_url(resolved.as_str(), referer)),
        Err(e) => {
            warn!("could not resolve {} against {}: {}", uri, base_url, e);
            None
        }
    }
}

fn rewrite_uri_attribute(line: &str, base_url: &Url, referer: &str) -> String {
    URI_ATTRIBUTE
        .replace(line, |caps: &Captures| {
            let uri = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();

            // URI="" would resolve to the playlist itself
            if uri.is_empty() {
                return caps[0].to_string();
            }

            match proxy_uri(uri, base_url, referer) {
                Some(proxied) => format!("{}URI=\"{}\"", &caps[1], proxied),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// rewrite an hls playlist so segments, keys and init sections all come back through the proxy
///
/// line order is kept and directive and blank lines keep their original bytes, media lines are
/// replaced from their trimmed text so any `\r` on them is dropped. `rf` is always the playlist's own url
/// which is what the header builder needs for the referer on the follow-up requests.
/// running it over its own output double-encodes, that's expected
pub fn rewrite_m3u8(body: &str, base_url: &Url) -> String {
    let referer = base_url.as_str();

    body.split('\n')
        .map(|line| {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                return line.to_string();
            }

            if trimmed.starts_with('#') {
                if URI_DIRECTIVE.is_match(trimmed) {
                    return rewrite_uri_attribute(line, base_url, referer);
                }
                return line.to_string();
            }

            proxy_uri(trimmed, base_url, referer).unwrap_or_else(|| line.to_string())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
