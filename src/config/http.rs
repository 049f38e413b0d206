//! HTTP Server Configuration

use std::net::SocketAddr;

/// HTTP server configuration
///
/// ## Environment Variables
///
/// - `HTTP_HOST`: Server bind address (default: 127.0.0.1)
/// - `HTTP_PORT`: Server port (default: 3000)
/// - `HTTP_PRICE_MAX_AGE_SECS`: `s-maxage` advertised on price responses (default: 5)
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Server bind address
    pub addr: SocketAddr,

    /// Shared-cache lifetime hinted on `/api/btc-price`
    pub price_max_age_secs: u32,
}

impl HttpConfig {
    /// Load HTTP configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a variable holds an unparseable value
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let host = std::env::var("HTTP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = std::env::var("HTTP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        let price_max_age_secs: u32 = std::env::var("HTTP_PRICE_MAX_AGE_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()?;

        Ok(Self {
            addr: format!("{}:{}", host, port).parse()?,
            price_max_age_secs,
        })
    }

    pub fn with_addr(mut self, host: Option<&str>, port: Option<u16>) -> Result<Self, std::net::AddrParseError> {
        let host = host
            .map(str::to_string)
            .unwrap_or_else(|| self.addr.ip().to_string());
        let port = port.unwrap_or(self.addr.port());
        self.addr = format!("{}:{}", host, port).parse()?;
        Ok(self)
    }

    /// `Cache-Control` value for price responses
    pub fn price_cache_control(&self) -> String {
        format!("s-maxage={}, stale-while-revalidate", self.price_max_age_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            price_max_age_secs: 5,
        }
    }
}
