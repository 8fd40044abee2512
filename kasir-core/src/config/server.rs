//! Server configuration.

use std::net::SocketAddr;
use url::Url;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind. Only read at startup; a reload does not rebind.
    pub listen: SocketAddr,
    /// Storefront origin used for callback URLs when a payment request
    /// does not carry one.
    pub public_origin: Option<Url>,
}
