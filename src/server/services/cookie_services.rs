use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::http::{HeaderMap, header};
use mockall::automock;
use tracing::debug;

pub type DynCookieService = Arc<dyn CookieServiceTrait + Send + Sync>;

/// per-origin cookie jar, keyed by `scheme://host[:port]` only
///
/// there is no Path/Domain/Expires/Secure handling at all, a Set-Cookie from any path on an
/// origin lands in the same bucket and overwrites same-named keys
#[automock]
pub trait CookieServiceTrait {
    /// joined `Cookie` header value for the origin, empty if nothing was ever stored
    fn get_cookies(&self, origin: &str) -> String;

    /// upsert the leading `name=value` of every raw Set-Cookie value into the origin's bucket
    fn store_cookies(&self, origin: &str, set_cookies: &[String]);

    /// how many origins currently have cookies, only used by the health endpoint
    fn origin_count(&self) -> usize;
}

/// in memory jar that lives as long as the process
///
/// concurrent requests to the same origin can interleave their read-modify-write, last
/// write wins on overlapping keys
#[derive(Default)]
pub struct CookieService {
    // insertion order is kept so the replayed header is stable
    jar: RwLock<HashMap<String, Vec<(String, String)>>>,
}

impl CookieService {
    pub fn new() -> Self {
        Self::default()
    }

    /// `name=value` out of `name=value; Path=/; HttpOnly`
    fn parse_pair(set_cookie: &str) -> Option<(String, String)> {
        let pair = set_cookie.split(';').next()?;
        let (name, value) = match pair.split_once('=') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => (pair.trim(), ""),
        };

        if name.is_empty() {
            return None;
        }

        Some((name.to_string(), value.to_string()))
    }
}

impl CookieServiceTrait for CookieService {
    fn get_cookies(&self, origin: &str) -> String {
        let jar = self.jar.read().unwrap_or_else(|poisoned| poisoned.into_inner());

        jar.get(origin)
            .map(|cookies| {
                cookies
                    .iter()
                    .map(|(name, value)| format!("{}={}", name, value))
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .unwrap_or_default()
    }

    fn store_cookies(&self, origin: &str, set_cookies: &[String]) {
        if set_cookies.is_empty() {
            return;
        }

        let mut jar = self
            .jar
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let cookies = jar.entry(origin.to_string()).or_default();

        for (name, value) in set_cookies.iter().filter_map(|sc| Self::parse_pair(sc)) {
            match cookies.iter_mut().find(|(existing, _)| *existing == name) {
                Some(entry) => entry.1 = value,
                None => cookies.push((name, value)),
            }
        }

        debug!("jar for {} now holds {} cookies", origin, cookies.len());
    }

    fn origin_count(&self) -> usize {
        self.jar
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|cookies| !cookies.is_empty())
            .count()
    }
}

/// every Set-Cookie field of a response, one entry per header line
///
/// HeaderMap keeps repeated fields apart so get_all is enough here, joining them with commas
/// would break on Expires dates. a single field that an upstream folded itself stays as one
/// entry, only its leading pair gets used
pub fn extract_set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(|s| s.to_string()))
        .collect()
}
