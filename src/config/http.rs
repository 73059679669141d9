//! HTTP server configuration types.

use serde::Deserialize;

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Host to bind to.
    pub host: String,
    /// Port for the REST API.
    pub port: u16,
    /// Expose the unauthenticated dev order simulator (`POST /util/order`).
    pub order_endpoint: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            order_endpoint: false,
        }
    }
}

impl HttpConfig {
    /// Address string suitable for a TCP listener bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
