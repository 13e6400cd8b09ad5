use url::Url;

/// login for an xtream codes panel, as entered on the player's settings form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XtreamCredentials {
    pub host: String,
    pub port: Option<String>,
    pub username: String,
    pub password: String,
}

impl XtreamCredentials {
    pub fn new(
        host: impl Into<String>,
        port: Option<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
        }
    }

    /// panel root, people paste hosts with and without a scheme and with the port already in
    pub fn base_url(&self) -> String {
        let host = self.host.trim();
        let scheme = host.get(..8).unwrap_or(host).to_ascii_lowercase();
        let host = if scheme.starts_with("http://") || scheme.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };
        let host = host.trim_end_matches('/');

        match self.port.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(port) if !Self::has_port(host) => format!("{}:{}", host, port),
            _ => host.to_string(),
        }
    }

    fn has_port(host: &str) -> bool {
        host.rsplit_once(':')
            .map(|(_, tail)| !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or(false)
    }

    /// `player_api.php` url for an action like `get_live_streams` or `get_short_epg`
    pub fn player_api_url(&self, action: &str, params: &[(&str, &str)]) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.base_url())?.join("/player_api.php")?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("username", &self.username)
                .append_pair("password", &self.password)
                .append_pair("action", action);
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// direct hls url of a live channel
    pub fn live_stream_url(&self, stream_id: &str) -> String {
        format!(
            "{}/live/{}/{}/{}.m3u8",
            self.base_url(),
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.password),
            urlencoding::encode(stream_id)
        )
    }
}

/// a plain m3u playlist instead of a panel: absolute http(s) url ending in .m3u/.m3u8 and no login
pub fn is_m3u_source(host: &str, username: &str, password: &str) -> bool {
    if !username.is_empty() || !password.is_empty() {
        return false;
    }

    match Url::parse(host) {
        Ok(url) => {
            let path = url.path().to_ascii_lowercase();
            matches!(url.scheme(), "http" | "https")
                && (path.ends_with(".m3u") || path.ends_with(".m3u8"))
        }
        Err(_) => false,
    }
}
