//! HTTP server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the web server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: SocketAddr,
    /// Directory resized photos are written to and served from.
    pub uploads_dir: PathBuf,
    /// Width uploaded photos are resized to; height keeps the aspect ratio.
    pub photo_width: u32,
    /// Largest width or height accepted, both for the decoded upload and
    /// for the resized photo.
    pub photo_max_dimension: u32,
    /// Request body limit, which bounds the size of an uploaded photo.
    pub max_upload_bytes: usize,
    /// Google Maps browser key. Address autocomplete is disabled without it.
    pub maps_api_key: Option<String>,
    /// Secret of at least 64 bytes used to sign flash cookies. A random key
    /// is generated at startup when unset, so pending flashes do not survive
    /// a restart.
    pub cookie_secret: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 7777)),
            uploads_dir: PathBuf::from("public/uploads"),
            photo_width: 800,
            photo_max_dimension: 8000,
            max_upload_bytes: 10 * 1024 * 1024,
            maps_api_key: None,
            cookie_secret: None,
        }
    }
}
