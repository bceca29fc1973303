//! Output folder layout and the per-namespace commit protocol.
//!
//! ```text
//! <output>/
//!   namespaces.json              namespace -> slug mapping
//!   namespaces/
//!     <ns>/<itemId>.json         complete namespace
//!     <ns>-tmp/<itemId>.json     namespace being written
//! ```
//!
//! A namespace directory only appears under its final name through a single
//! rename of the `-tmp` directory, after every item has been written.
//!
//! Namespaces and item ids come from the server and become path components,
//! so both are checked before anything touches the disk. Namespaces ending in
//! `-tmp` are rejected since they would collide with another namespace's
//! temp directory.

use egs_scraper_core::{CatalogItem, CatalogNamespace};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::error::StoreError;
use crate::persistence::write_json;

/// File holding the namespace mapping.
pub const NAMESPACES_FILE_NAME: &str = "namespaces.json";

/// Directory holding one subdirectory per namespace.
pub const NAMESPACES_DIR_NAME: &str = "namespaces";

/// Suffix of a namespace directory that is still being written.
pub const TEMP_DIR_SUFFIX: &str = "-tmp";

// ============================================================================
// Output Layout
// ============================================================================

/// Paths inside an output folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

/// Result of preparing a namespace for writing.
#[derive(Debug)]
pub enum PrepareOutcome {
    /// The namespace was scraped before; nothing to do.
    AlreadyComplete(PathBuf),
    /// A fresh temp directory is ready.
    Ready(NamespaceWriter),
}

impl OutputLayout {
    /// Creates a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Output folder.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the namespace mapping file.
    pub fn mapping_file(&self) -> PathBuf {
        self.root.join(NAMESPACES_FILE_NAME)
    }

    /// Directory holding all namespace directories.
    pub fn namespaces_dir(&self) -> PathBuf {
        self.root.join(NAMESPACES_DIR_NAME)
    }

    /// Final directory of a namespace.
    pub fn namespace_dir(&self, namespace: &CatalogNamespace) -> PathBuf {
        self.namespaces_dir().join(namespace.as_str())
    }

    /// Temp directory of a namespace.
    pub fn temp_dir(&self, namespace: &CatalogNamespace) -> PathBuf {
        self.namespaces_dir()
            .join(format!("{}{TEMP_DIR_SUFFIX}", namespace.as_str()))
    }

    /// Returns true if the namespace was fully written before.
    ///
    /// An unusable namespace name is never complete.
    ///
    /// # Errors
    ///
    /// Returns error if the directory can't be inspected.
    pub async fn is_complete(&self, namespace: &CatalogNamespace) -> Result<bool, StoreError> {
        if check_namespace(namespace).is_err() {
            return Ok(false);
        }
        Ok(tokio::fs::try_exists(self.namespace_dir(namespace)).await?)
    }

    /// Gets a namespace ready for writing.
    ///
    /// Skips namespaces whose final directory exists. Deletes a stale temp
    /// directory left by an earlier, interrupted run, then creates a fresh
    /// one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnsafeName`] if the namespace can't be used as a
    /// directory name, or an IO error if any directory operation fails.
    #[instrument(skip(self), fields(namespace = %namespace))]
    pub async fn prepare_namespace(
        &self,
        namespace: &CatalogNamespace,
    ) -> Result<PrepareOutcome, StoreError> {
        check_namespace(namespace)?;

        let final_dir = self.namespace_dir(namespace);
        if self.is_complete(namespace).await? {
            debug!(path = %final_dir.display(), "Namespace already complete");
            return Ok(PrepareOutcome::AlreadyComplete(final_dir));
        }

        let temp_dir = self.temp_dir(namespace);
        if tokio::fs::try_exists(&temp_dir).await? {
            warn!(path = %temp_dir.display(), "Deleting stale temp directory");
            tokio::fs::remove_dir_all(&temp_dir).await?;
        }

        tokio::fs::create_dir_all(&temp_dir).await?;

        Ok(PrepareOutcome::Ready(NamespaceWriter {
            namespace: namespace.clone(),
            temp_dir,
            final_dir,
            written: 0,
        }))
    }

    /// Lists namespaces with a final directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns error if the namespaces directory exists but can't be read.
    pub async fn completed_namespaces(&self) -> Result<Vec<CatalogNamespace>, StoreError> {
        self.list_namespace_dirs(false).await
    }

    /// Lists namespaces left mid-write, sorted.
    ///
    /// # Errors
    ///
    /// Returns error if the namespaces directory exists but can't be read.
    pub async fn pending_namespaces(&self) -> Result<Vec<CatalogNamespace>, StoreError> {
        self.list_namespace_dirs(true).await
    }

    async fn list_namespace_dirs(&self, temp: bool) -> Result<Vec<CatalogNamespace>, StoreError> {
        let dir = self.namespaces_dir();
        if !tokio::fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match (name.strip_suffix(TEMP_DIR_SUFFIX), temp) {
                (Some(ns), true) => found.push(CatalogNamespace::new(ns)),
                (None, false) => found.push(CatalogNamespace::new(name)),
                _ => {}
            }
        }
        found.sort();
        Ok(found)
    }
}

// ============================================================================
// Namespace Writer
// ============================================================================

/// Writes the items of one namespace into its temp directory.
#[derive(Debug)]
pub struct NamespaceWriter {
    namespace: CatalogNamespace,
    temp_dir: PathBuf,
    final_dir: PathBuf,
    written: usize,
}

impl NamespaceWriter {
    /// Temp directory items are written to.
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Number of items written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Writes one item as `<itemId>.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnsafeName`] for an id that would land outside
    /// the temp directory, or an IO error if the file can't be written.
    pub async fn write_item(&mut self, item: &CatalogItem) -> Result<(), StoreError> {
        check_component("item id", item.id.as_str())?;
        let path = self.temp_dir.join(item.file_name());
        write_json(&path, item).await?;
        self.written += 1;
        Ok(())
    }

    /// Promotes the temp directory to its final name.
    ///
    /// # Errors
    ///
    /// Returns error if the rename fails. The temp directory is left in place.
    #[instrument(skip(self), fields(namespace = %self.namespace, items = self.written))]
    pub async fn commit(self) -> Result<PathBuf, StoreError> {
        tokio::fs::rename(&self.temp_dir, &self.final_dir).await?;
        info!(path = %self.final_dir.display(), "Namespace committed");
        Ok(self.final_dir)
    }
}

// ============================================================================
// Name Checks
// ============================================================================

fn check_namespace(namespace: &CatalogNamespace) -> Result<(), StoreError> {
    check_component("namespace", namespace.as_str())?;
    if namespace.as_str().ends_with(TEMP_DIR_SUFFIX) {
        return Err(StoreError::UnsafeName {
            kind: "namespace",
            name: namespace.to_string(),
        });
    }
    Ok(())
}

/// Accepts names that stay a single component inside their parent.
fn check_component(kind: &'static str, name: &str) -> Result<(), StoreError> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if unsafe_name {
        return Err(StoreError::UnsafeName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
