use axum::{
    Extension, Router,
    body::Body,
    extract::RawQuery,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use futures::TryStreamExt;
use tracing::{debug, error};
use url::Url;

use crate::server::{
    error::{AppResult, Error},
    services::proxy_services::ProxyServices,
    utils::{
        header_utils::{HeaderOptions, build_headers, is_playlist_path},
        manifest_utils::{PROXY_PATH, rewrite_m3u8},
    },
};

const HLS_CONTENT_TYPES: [&str; 2] = ["application/vnd.apple.mpegurl", "application/x-mpegurl"];

/// upstream response headers that make it to the player on passthrough
pub static PASSTHROUGH_RESPONSE_HEADERS: [HeaderName; 9] = [
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::CONTENT_RANGE,
    header::ACCEPT_RANGES,
    header::ETAG,
    header::LAST_MODIFIED,
    header::DATE,
    header::SERVER,
    header::CACHE_CONTROL,
];

#[derive(Debug, Default)]
struct ProxyQuery {
    u: Option<String>,
    rf: Option<String>,
}

impl ProxyQuery {
    /// first `u` and first `rf` win, repeats are ignored instead of rejecting the request
    fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();

        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "u" if query.u.is_none() => query.u = Some(value.into_owned()),
                "rf" if query.rf.is_none() => query.rf = Some(value.into_owned()),
                _ => {}
            }
        }

        query
    }
}

pub struct ProxyController;

impl ProxyController {
    pub fn app() -> Router {
        Router::new().route(PROXY_PATH, get(Self::proxy_get).options(Self::proxy_options))
    }

    async fn proxy_get(
        Extension(services): Extension<ProxyServices>,
        RawQuery(raw_query): RawQuery,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let params = ProxyQuery::parse(raw_query.as_deref());

        let Some(target) = params.u.filter(|u| !u.is_empty()) else {
            return Err(Error::BadRequest("missing ?u".to_string()));
        };

        let upstream = Url::parse(&target).map_err(|e| {
            debug!("rejecting ?u={}: {}", target, e);
            Error::BadRequest("bad url".to_string())
        })?;

        let options = HeaderOptions {
            playlist_referer: params.rf.filter(|rf| !rf.is_empty()),
            keep_user_agent: true,
        };

        Self::forward(&services, upstream, &headers, &options)
            .await
            .map_err(|e| {
                match &e {
                    Error::RedirectLoop => error!("redirect loop while proxying"),
                    _ => error!("proxy error: {:?}", e),
                }
                e
            })
    }

    async fn proxy_options() -> impl IntoResponse {
        StatusCode::NO_CONTENT
    }

    async fn forward(
        services: &ProxyServices,
        upstream: Url,
        client_headers: &HeaderMap,
        options: &HeaderOptions,
    ) -> AppResult<Response> {
        let outbound = build_headers(client_headers, &upstream, services.cookies.as_ref(), options);

        debug!("proxying {}", upstream);

        let fetched = services
            .upstream
            .fetch_follow(upstream.clone(), outbound, options)
            .await?;
        let response = fetched.response;
        let status = response.status();

        // the originally requested path decides too, panels love serving playlists as text/plain
        if Self::is_manifest(response.headers(), &upstream) && status.is_success() {
            let text = response.text().await?;
            let rewritten = rewrite_m3u8(&text, &upstream);

            debug!(
                "rewrote playlist from {} ({} -> {} bytes)",
                fetched.url,
                text.len(),
                rewritten.len()
            );

            return Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/vnd.apple.mpegurl"),
                    (header::CACHE_CONTROL, "no-store"),
                ],
                rewritten,
            )
                .into_response());
        }

        // panel errors (bad login, geo block) are only readable from the body, keep them
        if !status.is_success() && Self::has_no_body(&response) {
            let text = response.text().await.unwrap_or_default();
            let body = if text.is_empty() {
                format!("upstream {}", status.as_u16())
            } else {
                text
            };

            return Ok((status, [(header::CACHE_CONTROL, "no-store")], body).into_response());
        }

        Ok(Self::passthrough(response))
    }

    fn is_manifest(headers: &HeaderMap, upstream: &Url) -> bool {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        HLS_CONTENT_TYPES.iter().any(|ct| content_type.contains(ct)) || is_playlist_path(upstream)
    }

    fn has_no_body(response: &reqwest::Response) -> bool {
        matches!(
            response.status(),
            StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT | StatusCode::NOT_MODIFIED
        ) || response.content_length() == Some(0)
    }

    /// segments, keys and anything else, streamed through untouched
    fn passthrough(response: reqwest::Response) -> Response {
        let status = response.status();

        let mut headers = HeaderMap::new();
        for name in PASSTHROUGH_RESPONSE_HEADERS.iter() {
            if let Some(value) = response.headers().get(name) {
                headers.insert(name.clone(), value.clone());
            }
        }
        if !headers.contains_key(header::CACHE_CONTROL) {
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        }

        let stream = response
            .bytes_stream()
            .inspect_err(|e| error!("upstream body failed mid-stream: {}", e));

        (status, headers, Body::from_stream(stream)).into_response()
    }
}
