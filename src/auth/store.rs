use std::path::PathBuf;

use anyhow::{Context, Result};

/// Token file name in the storage directory
const TOKEN_FILE: &str = "token";

/// Durable storage for the session token.
///
/// One key, one value: the raw credential string. Absence of the file means
/// no prior session. Only the token is persisted; the identity record lives
/// in memory and is re-derived from the next login response.
pub struct TokenStore {
    storage_dir: PathBuf,
}

impl TokenStore {
    pub fn new(storage_dir: PathBuf) -> Self {
        Self { storage_dir }
    }

    /// Load the persisted token, `None` when no prior session was saved.
    pub fn load(&self) -> Result<Option<String>> {
        let path = self.token_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&path).context("Failed to read token file")?;
        let token = contents.trim().to_string();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token))
    }

    /// Persist the token for the next run.
    pub fn save(&self, token: &str) -> Result<()> {
        std::fs::create_dir_all(&self.storage_dir)
            .context("Failed to create token storage directory")?;
        std::fs::write(self.token_path(), token).context("Failed to write token file")?;
        Ok(())
    }

    /// Remove the persisted token. Removing an absent token is a no-op.
    pub fn clear(&self) -> Result<()> {
        let path = self.token_path();
        if path.exists() {
            std::fs::remove_file(&path).context("Failed to remove token file")?;
        }
        Ok(())
    }

    fn token_path(&self) -> PathBuf {
        self.storage_dir.join(TOKEN_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_load_clear_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().to_path_buf());

        assert_eq!(store.load().unwrap(), None);

        store.save("tok123").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("tok123"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing again is a no-op
        store.clear().unwrap();
    }

    #[test]
    fn creates_missing_storage_directory() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("storage"));

        store.save("tok123").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("tok123"));
    }

    #[test]
    fn blank_file_counts_as_no_session() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("token"), "  \n").unwrap();

        let store = TokenStore::new(dir.path().to_path_buf());
        assert_eq!(store.load().unwrap(), None);
    }
}
