use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::{
    config::AppConfig,
    server::{
        error::AppResult,
        services::{cookie_services::CookieService, upstream_services::UpstreamService},
    },
};

use super::{cookie_services::DynCookieService, upstream_services::DynUpstreamService};

/// everything a proxied request needs, cloned into every handler through an Extension
#[derive(Clone)]
pub struct ProxyServices {
    pub cookies: DynCookieService,
    pub upstream: DynUpstreamService,
    pub config: Arc<AppConfig>,
}

impl ProxyServices {
    pub fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        info!("starting proxy services...");

        let cookies = Arc::new(CookieService::new()) as DynCookieService;
        Self::with_cookies(config, cookies)
    }

    /// same as `new` but with a caller supplied jar, tests hand every case its own
    pub fn with_cookies(config: Arc<AppConfig>, cookies: DynCookieService) -> AppResult<Self> {
        let upstream = Arc::new(UpstreamService::new(
            cookies.clone(),
            Duration::from_secs(config.upstream_connect_timeout_secs),
            Duration::from_secs(config.upstream_read_timeout_secs),
        )?) as DynUpstreamService;

        info!("cookie jar and upstream client ok");

        Ok(Self {
            cookies,
            upstream,
            config,
        })
    }
}
