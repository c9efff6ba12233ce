//! HTTP Server Configuration
//!
//! Host, port, deployment path prefix and CORS settings.

use serde::{Deserialize, Serialize};

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 5000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Reverse-proxy mount point also served in addition to the bare paths
    /// (default: "/IClassSel_WebService", empty to disable)
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,

    /// CORS allowed origins (default: empty, meaning any origin)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_path_prefix() -> String {
    "/IClassSel_WebService".to_string()
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path_prefix: default_path_prefix(),
            cors_origins: Vec::new(),
        }
    }
}

impl HttpServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The prefix to nest routes under, if any
    pub fn mount_prefix(&self) -> Option<&str> {
        match self.path_prefix.as_str() {
            "" | "/" => None,
            prefix => Some(prefix),
        }
    }

    /// Check the prefix shape; returns a description of the problem
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("server.port must be > 0".to_string());
        }
        if let Some(prefix) = self.mount_prefix() {
            if !prefix.starts_with('/') || prefix.ends_with('/') {
                return Err(format!(
                    "server.path_prefix '{}' must start with '/' and not end with '/'",
                    prefix
                ));
            }
        }
        Ok(())
    }
}
