pub mod error;
pub mod logger;
pub mod proxy;

pub use error::{ProxyError, ProxyResult};
pub use proxy::{AxumServer, ProxyConfig};
