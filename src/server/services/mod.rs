pub mod cookie_services;
pub mod proxy_services;
pub mod upstream_services;

pub use cookie_services::DynCookieService;
pub use upstream_services::DynUpstreamService;
