use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, header};
use tracing::{debug, warn};
use url::Url;

use crate::server::{
    error::{AppResult, Error},
    services::cookie_services::{DynCookieService, extract_set_cookies},
    utils::header_utils::{HeaderOptions, build_headers, origin_of},
};

/// fixed on purpose so a misbehaving panel can never keep a request alive forever
pub const MAX_REDIRECT_HOPS: usize = 6;

pub type DynUpstreamService = Arc<dyn UpstreamServiceTrait + Send + Sync>;

/// the response that ended a redirect chain and the url it came from
#[derive(Debug)]
pub struct UpstreamResponse {
    pub url: Url,
    pub response: reqwest::Response,
}

#[async_trait::async_trait]
pub trait UpstreamServiceTrait {
    /// fetch `url`, following redirects by hand so cookies and referer are recomputed per hop
    ///
    /// fails with `Error::RedirectLoop` once `MAX_REDIRECT_HOPS` fetches all redirected
    async fn fetch_follow(
        &self,
        url: Url,
        headers: HeaderMap,
        options: &HeaderOptions,
    ) -> AppResult<UpstreamResponse>;
}

pub struct UpstreamService {
    http: reqwest::Client,
    cookies: DynCookieService,
}

impl UpstreamService {
    pub fn new(
        cookies: DynCookieService,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> AppResult<Self> {
        // redirects are ours to follow, reqwest would replay the first hop's cookie and referer
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .build()
            .map_err(|e| {
                Error::InternalServerErrorWithContext(format!(
                    "failed to build upstream client: {}",
                    e
                ))
            })?;

        Ok(Self { http, cookies })
    }

    fn redirect_target(current: &Url, response: &reqwest::Response) -> Option<Url> {
        let location = response.headers().get(header::LOCATION)?.to_str().ok()?;

        match current.join(location) {
            Ok(next) => Some(next),
            Err(e) => {
                warn!("unusable location {:?} from {}: {}", location, current, e);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl UpstreamServiceTrait for UpstreamService {
    async fn fetch_follow(
        &self,
        url: Url,
        headers: HeaderMap,
        options: &HeaderOptions,
    ) -> AppResult<UpstreamResponse> {
        let mut current = url;
        let mut headers = headers;

        for hop in 0..MAX_REDIRECT_HOPS {
            debug!("hop {}: GET {}", hop + 1, current);

            let response = self
                .http
                .get(current.clone())
                .headers(headers.clone())
                .send()
                .await?;

            // store before following so the next hop already sends what this one set
            self.cookies
                .store_cookies(&origin_of(&current), &extract_set_cookies(response.headers()));

            if !response.status().is_redirection() {
                return Ok(UpstreamResponse {
                    url: current,
                    response,
                });
            }

            let Some(next) = Self::redirect_target(&current, &response) else {
                debug!("{} from {} without a usable location", response.status(), current);
                return Ok(UpstreamResponse {
                    url: current,
                    response,
                });
            };

            debug!("{} redirect {} -> {}", response.status(), current, next);

            headers = build_headers(&headers, &next, self.cookies.as_ref(), options);
            current = next;
        }

        warn!("gave up after {} redirects at {}", MAX_REDIRECT_HOPS, current);
        Err(Error::RedirectLoop)
    }
}
