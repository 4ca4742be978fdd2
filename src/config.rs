//! Server settings read from the environment

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 6573;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// Where the JSON file store lives (None = in-memory store)
    pub data_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: None,
        }
    }
}

impl ServerConfig {
    /// Load config from TRIVIO_PORT and TRIVIO_DATA_DIR
    pub fn from_env() -> Self {
        let port = match std::env::var("TRIVIO_PORT") {
            Ok(raw) => match raw.trim().parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    tracing::warn!(
                        "Invalid TRIVIO_PORT '{}', falling back to {}",
                        raw,
                        DEFAULT_PORT
                    );
                    DEFAULT_PORT
                }
            },
            Err(_) => DEFAULT_PORT,
        };

        let data_dir = std::env::var("TRIVIO_DATA_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        match &data_dir {
            Some(dir) => tracing::info!("Sets and games will be stored in {}", dir.display()),
            None => tracing::warn!("TRIVIO_DATA_DIR not set - sets and games are kept in memory only"),
        }

        Self { port, data_dir }
    }
}
