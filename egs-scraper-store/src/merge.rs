//! Merging key/value mappings into JSON files on disk.
//!
//! New keys are added, existing keys are overwritten, and keys that only
//! exist on disk are kept. A file that exists but doesn't parse is never
//! overwritten.

use egs_scraper_core::NamespaceMap;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, instrument};

use crate::error::StoreError;
use crate::persistence::{load_json, save_json};

/// Merges `new` into the JSON object stored at `path` and returns the result.
///
/// If `path` doesn't exist, `new` is written as is.
///
/// # Errors
///
/// Returns [`StoreError::Parse`] if the existing file is not a JSON object of
/// the expected shape, or an IO error if it can't be read or written.
pub async fn merge_json_map<K, V>(
    path: &Path,
    new: &BTreeMap<K, V>,
) -> Result<BTreeMap<K, V>, StoreError>
where
    K: Ord + Clone + Serialize + DeserializeOwned,
    V: Clone + Serialize + DeserializeOwned,
{
    let mut merged: BTreeMap<K, V> = match load_json(path).await {
        Ok(existing) => existing,
        Err(e) if e.is_not_found() => BTreeMap::new(),
        Err(e) => return Err(e),
    };

    merged.extend(new.iter().map(|(k, v)| (k.clone(), v.clone())));

    save_json(path, &merged).await?;
    Ok(merged)
}

/// Merges freshly discovered namespaces into the mapping file.
///
/// # Errors
///
/// See [`merge_json_map`].
#[instrument(skip(new), fields(path = %path.display(), new = new.len()))]
pub async fn merge_namespace_mapping(
    path: &Path,
    new: &NamespaceMap,
) -> Result<NamespaceMap, StoreError> {
    let merged = merge_json_map(path, new).await?;
    info!(total = merged.len(), "Namespace mapping saved");
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egs_scraper_core::{CatalogNamespace, UrlSlug};
    use tempfile::TempDir;

    fn map(entries: &[(&str, i32)]) -> BTreeMap<String, i32> {
        entries.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[tokio::test]
    async fn test_absent_file_written_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("namespaces.json");

        let merged = merge_json_map(&path, &map(&[("A", 1)])).await.unwrap();
        assert_eq!(merged, map(&[("A", 1)]));

        let on_disk: BTreeMap<String, i32> = load_json(&path).await.unwrap();
        assert_eq!(on_disk, map(&[("A", 1)]));
    }

    #[tokio::test]
    async fn test_merge_overwrites_and_keeps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("namespaces.json");

        save_json(&path, &map(&[("A", 1), ("B", 2)])).await.unwrap();
        let merged = merge_json_map(&path, &map(&[("B", 3), ("C", 4)])).await.unwrap();

        assert_eq!(merged, map(&[("A", 1), ("B", 3), ("C", 4)]));
    }

    #[tokio::test]
    async fn test_merge_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("namespaces.json");
        let new = map(&[("B", 3), ("C", 4)]);

        save_json(&path, &map(&[("A", 1), ("B", 2)])).await.unwrap();
        let once = merge_json_map(&path, &new).await.unwrap();
        let twice = merge_json_map(&path, &new).await.unwrap();

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_unparseable_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("namespaces.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let result = merge_json_map(&path, &map(&[("A", 1)])).await;
        assert!(matches!(result, Err(StoreError::Parse { .. })));
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "not json");
    }

    #[tokio::test]
    async fn test_namespace_mapping_file_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("namespaces.json");
        let new: NamespaceMap =
            [(CatalogNamespace::new("fn"), UrlSlug::new("fortnite"))].into_iter().collect();

        merge_namespace_mapping(&path, &new).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"fn": "fortnite"}));
    }
}
