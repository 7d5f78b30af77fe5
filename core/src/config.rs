//! config.rs
//! Backend selection and pipeline defaults, loadable from JSON.
//!
//! Missing fields take their defaults, so `{}` is a valid config.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::Backend;
use crate::constants::{
    DEFAULT_CHUNK_FLOOR, DEFAULT_CHUNK_SIZE, DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config read error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrimitivesConfig {
    pub cipher_backend: Backend,
    pub digest_backend: Backend,
    pub compression_backend: Backend,
    /// Deflate level, 0..=9.
    pub compression_level: u32,
    /// Raw DEFLATE (no zlib header/trailer) for the batch pipeline.
    pub raw_deflate: bool,
    /// Output chunk size when draining a compression session.
    pub chunk_size: usize,
    /// Batch buffers grow by a fresh chunk once less than this remains.
    pub chunk_floor: usize,
}

impl Default for PrimitivesConfig {
    fn default() -> Self {
        Self {
            cipher_backend: Backend::Native,
            digest_backend: Backend::Native,
            compression_backend: Backend::Native,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            raw_deflate: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_floor: DEFAULT_CHUNK_FLOOR,
        }
    }
}

impl PrimitivesConfig {
    /// Every primitive on the same backend, other fields default.
    pub fn with_backend(backend: Backend) -> Self {
        Self {
            cipher_backend: backend,
            digest_backend: backend,
            compression_backend: backend,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(ConfigError::Invalid(format!(
                "compression_level {} exceeds {}",
                self.compression_level, MAX_COMPRESSION_LEVEL
            )));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be non-zero".into()));
        }
        if self.chunk_floor >= self.chunk_size {
            return Err(ConfigError::Invalid(format!(
                "chunk_floor {} must be below chunk_size {}",
                self.chunk_floor, self.chunk_size
            )));
        }
        Ok(())
    }
}
