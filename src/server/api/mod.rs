pub mod health_controller;
pub mod proxy_controller;

pub use health_controller::health_endpoint;
pub use proxy_controller::ProxyController;
