// proxy module - authenticated reverse proxy in front of the backend API

pub mod config;
pub mod credentials;
pub mod handler;
pub mod headers;
pub mod response;
pub mod server;
pub mod upstream;

pub use config::ProxyConfig;
pub use server::AxumServer;
