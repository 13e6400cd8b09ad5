use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use url::Url;

use crate::server::services::cookie_services::CookieServiceTrait;

/// client headers that are allowed to reach the upstream, everything else is dropped
pub static FORWARDED_REQUEST_HEADERS: [HeaderName; 4] = [
    header::ACCEPT,
    header::ACCEPT_LANGUAGE,
    header::RANGE,
    header::CACHE_CONTROL,
];

/// per request knobs that survive every redirect hop
#[derive(Debug, Clone, Default)]
pub struct HeaderOptions {
    /// url of the playlist a segment or key came from, sent as the referer
    pub playlist_referer: Option<String>,
    /// forward the client's user-agent
    pub keep_user_agent: bool,
}

/// `scheme://host[:port]`, the default port is left out like browsers do
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

pub fn is_playlist_path(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".m3u8")
}

fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// outbound header set for one hop to `target`
///
/// playlists always present their own origin as the referer, segments and keys present the
/// playlist they were listed in so hot-link checks on the stream host pass
pub fn build_headers(
    client_headers: &HeaderMap,
    target: &Url,
    cookies: &dyn CookieServiceTrait,
    options: &HeaderOptions,
) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for name in FORWARDED_REQUEST_HEADERS.iter() {
        if let Some(value) = client_headers.get(name) {
            headers.insert(name.clone(), value.clone());
        }
    }

    if options.keep_user_agent {
        if let Some(ua) = client_headers.get(header::USER_AGENT) {
            headers.insert(header::USER_AGENT, ua.clone());
        }
    }

    let origin = origin_of(target);

    let cookie = cookies.get_cookies(&origin);
    if !cookie.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            headers.insert(header::COOKIE, value);
        }
    }

    let origin_referer = format!("{}/", origin);
    let referer = if is_playlist_path(target) {
        origin_referer
    } else {
        options
            .playlist_referer
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or(origin_referer)
    };
    if let Ok(value) = HeaderValue::from_str(&referer) {
        headers.insert(header::REFERER, value);
    }

    // some edges key on Host, so never leave it to the client library
    if let Ok(value) = HeaderValue::from_str(&host_header(target)) {
        headers.insert(header::HOST, value);
    }

    if !headers.contains_key(header::ACCEPT) {
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    }

    headers
}
