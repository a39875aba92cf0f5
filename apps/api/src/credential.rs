use std::fmt;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read API key file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("API key file '{path}' is not valid base64: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: base64::DecodeError,
    },

    #[error("API key in '{path}' is not valid UTF-8")]
    Utf8 { path: PathBuf },

    #[error("API key file '{path}' decodes to an empty key")]
    Empty { path: PathBuf },
}

/// The bearer secret for the completion endpoint.
/// Loaded once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct ApiCredential(String);

impl ApiCredential {
    /// Reads a base64-encoded key from `path`. Errors name the path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CredentialError> {
        let path = path.as_ref();
        let encoded = std::fs::read_to_string(path).map_err(|source| CredentialError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|source| CredentialError::Decode {
                path: path.to_path_buf(),
                source,
            })?;

        let key = String::from_utf8(bytes).map_err(|_| CredentialError::Utf8 {
            path: path.to_path_buf(),
        })?;
        let key = key.trim().to_string();

        if key.is_empty() {
            return Err(CredentialError::Empty {
                path: path.to_path_buf(),
            });
        }

        info!("Loaded API credential from {}", path.display());
        Ok(Self(key))
    }

    #[cfg(test)]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(***)")
    }
}
