#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum CargoEnv {
    Development,
    Production,
}

#[derive(clap::Parser, Clone, Debug)]
pub struct AppConfig {
    // production or development
    #[clap(long, env, value_enum)]
    pub cargo_env: CargoEnv,

    // port that the proxy will bind to, same as the astro dev server so the player's relative
    // /p urls keep working
    #[clap(long, env, default_value = "4321")]
    pub port: u16,

    // this should be either * for allowing everything, or a comma seperated list of origins like
    // https://example.com,https://something.com
    #[clap(long, env, default_value = "*")]
    pub cors_origin: String,

    // seconds allowed for the tcp/tls handshake of every upstream hop
    #[clap(long, env, default_value = "10")]
    pub upstream_connect_timeout_secs: u64,

    // seconds an upstream read can sit idle before the request is dropped, this is per read so
    // a slow but moving segment download is never cut off
    #[clap(long, env, default_value = "30")]
    pub upstream_read_timeout_secs: u64,

    // optional sentry integration
    #[clap(long, env)]
    pub sentry_dsn: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cargo_env: CargoEnv::Development,
            port: 4321,
            cors_origin: "*".to_string(),
            upstream_connect_timeout_secs: 10,
            upstream_read_timeout_secs: 30,
            sentry_dsn: None,
        }
    }
}
