use std::{io::ErrorKind, path::PathBuf};

use crate::{config, error::Result, types::Token};

/// Durable slot for the bearer token.
///
/// The token is kept as JSON in the local data directory, so it survives
/// restarts. Absence of the file means unauthenticated.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// The stored access token, if any.
    pub async fn get_token(&self) -> Option<String> {
        self.load().await.map(|t| t.access_token)
    }

    /// The full stored token. An unreadable or corrupt file reads as absent.
    pub async fn load(&self) -> Option<Token> {
        let content = async_fs::read_to_string(&self.path).await.ok()?;
        serde_json::from_str::<Token>(&content)
            .ok()
            .filter(|t| !t.access_token.is_empty())
    }

    pub async fn set_token(&self, token: &Token) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(token)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Forgets the token. Clearing an empty store is not an error.
    pub async fn clear(&self) -> Result<()> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(config::data_dir().join("cache/token.json"))
    }
}
