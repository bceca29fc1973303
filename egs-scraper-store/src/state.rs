//! Scraper state file.

use egs_scraper_core::ScraperState;
use std::path::Path;
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::persistence::{load_json, save_json};

/// Reads the state file.
///
/// # Errors
///
/// Returns an IO error if the file is missing and [`StoreError::Parse`] if it
/// is not a valid state document.
#[instrument(fields(path = %path.display()))]
pub async fn load_state(path: &Path) -> Result<ScraperState, StoreError> {
    let state: ScraperState = load_json(path).await?;
    debug!(
        has_credentials = state.credentials.is_some(),
        output = %state.output_folder.display(),
        "State loaded"
    );
    Ok(state)
}

/// Reads the state file if it exists.
///
/// # Errors
///
/// Fails only if the file exists but can't be read or parsed.
pub async fn load_state_if_exists(path: &Path) -> Result<Option<ScraperState>, StoreError> {
    match load_state(path).await {
        Ok(state) => Ok(Some(state)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Atomically rewrites the state file.
///
/// # Errors
///
/// Returns error if the file cannot be written.
#[instrument(skip(state), fields(path = %path.display()))]
pub async fn save_state(path: &Path, state: &ScraperState) -> Result<(), StoreError> {
    save_json(path, state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use egs_scraper_core::{ClientId, ClientSecret};

    #[tokio::test]
    async fn test_missing_state_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_state_if_exists(&dir.path().join("scraper.state.json"))
            .await
            .unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_state_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraper.state.json");
        let state = ScraperState::new("out", ClientId::new("id"), ClientSecret::new("secret"));

        save_state(&path, &state).await.unwrap();
        let loaded = load_state(&path).await.unwrap();

        assert_eq!(loaded.output_folder, state.output_folder);
        assert_eq!(loaded.client_id, state.client_id);
        assert!(loaded.credentials.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_state_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraper.state.json");
        tokio::fs::write(&path, "{\"outputFolder\": 3}").await.unwrap();

        assert!(matches!(
            load_state_if_exists(&path).await,
            Err(StoreError::Parse { .. })
        ));
    }
}
