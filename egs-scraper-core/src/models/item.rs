//! Catalog items and list-endpoint payloads.
//!
//! Field names follow the catalog API (`camelCase`). Items are written back
//! out unchanged apart from [`Categories`], which is always stored in its
//! canonical string form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use super::categories::Categories;
use super::ids::{CatalogId, CatalogNamespace};

// ============================================================================
// Catalog Item
// ============================================================================

/// One item of a catalog namespace (base game, DLC, edition, ...).
///
/// Two items are equal when their ids match case-insensitively, regardless
/// of any other field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Unique item id.
    pub id: CatalogId,
    /// Display title.
    pub title: String,
    /// Store description.
    #[serde(default)]
    pub description: String,
    /// Owning namespace.
    pub namespace: CatalogNamespace,
    /// Category path, absent when the API sent `null` or omitted it.
    #[serde(default)]
    pub categories: Option<Categories>,
    /// Artwork descriptors.
    #[serde(default)]
    pub key_images: Option<Vec<KeyImage>>,
    /// When the item was created.
    pub creation_date: DateTime<Utc>,
    /// When the item was last modified.
    pub last_modified_date: DateTime<Utc>,
    /// Developer display name.
    #[serde(default)]
    pub developer: Option<String>,
    /// Developer id.
    #[serde(default)]
    pub developer_id: Option<String>,
    /// Launcher application id.
    #[serde(default)]
    pub application_id: Option<String>,
}

impl CatalogItem {
    /// Returns the image descriptors, empty if the API sent none.
    pub fn images(&self) -> &[KeyImage] {
        self.key_images.as_deref().unwrap_or_default()
    }

    /// File name used when persisting this item.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.id.as_str())
    }
}

impl PartialEq for CatalogItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CatalogItem {}

impl Hash for CatalogItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Artwork descriptor attached to a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyImage {
    /// Image role (e.g. `DieselStoreFrontWide`, `Thumbnail`).
    #[serde(rename = "type")]
    pub kind: String,
    /// CDN URL.
    pub url: String,
    /// MD5 of the image file.
    #[serde(default)]
    pub md5: Option<String>,
    /// Width in pixels.
    #[serde(default)]
    pub width: u32,
    /// Height in pixels.
    #[serde(default)]
    pub height: u32,
    /// File size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Upload timestamp.
    #[serde(default)]
    pub uploaded_date: Option<DateTime<Utc>>,
}

// ============================================================================
// List Endpoint Payload
// ============================================================================

/// Paging block of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    /// Number of elements in this page.
    pub count: u64,
    /// Offset of the first element.
    pub start: u64,
    /// Total number of elements in the namespace.
    pub total: u64,
}

/// One page returned by the catalog list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogPage {
    /// Paging information.
    pub paging: Paging,
    /// Items, in server order.
    #[serde(default)]
    pub elements: Vec<CatalogItem>,
}
