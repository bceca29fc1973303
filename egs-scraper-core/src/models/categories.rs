//! Hierarchical category paths.
//!
//! The catalog API is inconsistent about how it encodes categories. Older
//! payloads carry a list of objects with a `path` field, newer ones (and our
//! own output files) use a single `/`-separated string:
//!
//! ```json
//! { "categories": [{ "path": "games" }, { "path": "games/edition" }] }
//! { "categories": "games/games/edition" }
//! ```
//!
//! Both decode to the same [`Categories`] value. A JSON `null` is handled by
//! wrapping the field in `Option<Categories>` and stays distinct from an empty
//! value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Separator used by the compact string form.
pub const CATEGORY_SEPARATOR: char = '/';

/// Ordered list of category path segments.
///
/// Equality and hashing are defined on the canonical string, ignoring ASCII
/// case.
#[derive(Debug, Clone, Default)]
pub struct Categories {
    parts: Vec<String>,
    canonical: String,
}

impl Categories {
    /// Builds categories from already split segments.
    pub fn new(parts: Vec<String>) -> Self {
        let canonical = parts.join(&CATEGORY_SEPARATOR.to_string());
        Self { parts, canonical }
    }

    /// Parses the compact `a/b/c` form. An empty string yields no segments.
    pub fn parse(compact: &str) -> Self {
        if compact.is_empty() {
            return Self::default();
        }
        Self::new(
            compact
                .split(CATEGORY_SEPARATOR)
                .map(str::to_string)
                .collect(),
        )
    }

    /// Returns the individual segments in order.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Returns the canonical `/`-joined form.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Returns true if there are no segments.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Iterates over the segments.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.parts.iter()
    }
}

impl PartialEq for Categories {
    fn eq(&self, other: &Self) -> bool {
        self.canonical.eq_ignore_ascii_case(&other.canonical)
    }
}

impl Eq for Categories {}

impl Hash for Categories {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.canonical.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl fmt::Display for Categories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl<'a> IntoIterator for &'a Categories {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}

// ============================================================================
// Serde
// ============================================================================

/// One entry of the expanded encoding. Everything except `path` is ignored.
#[derive(Deserialize)]
struct CategoryPath {
    path: String,
}

/// Wire encodings, tried in declaration order.
#[derive(Deserialize)]
#[serde(untagged)]
enum CategoriesRepr {
    Compact(String),
    Expanded(Vec<CategoryPath>),
}

impl<'de> Deserialize<'de> for Categories {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = CategoriesRepr::deserialize(deserializer).map_err(|_| {
            serde::de::Error::custom(
                "categories must be a '/'-separated string or a list of objects with a \"path\" field",
            )
        })?;

        Ok(match repr {
            CategoriesRepr::Compact(compact) => Self::parse(&compact),
            CategoriesRepr::Expanded(entries) => {
                Self::new(entries.into_iter().map(|e| e.path).collect())
            }
        })
    }
}

impl Serialize for Categories {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.canonical)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Holder {
        categories: Option<Categories>,
    }

    fn decode(json: &str) -> Option<Categories> {
        serde_json::from_str::<Holder>(json).unwrap().categories
    }

    #[test]
    fn test_expanded_form() {
        let c = decode(r#"{"categories": [{"path": "foo"}, {"path": "bar"}, {"path": "baz"}]}"#)
            .unwrap();
        assert_eq!(c.parts(), ["foo", "bar", "baz"]);
        assert_eq!(c.as_str(), "foo/bar/baz");
    }

    #[test]
    fn test_expanded_form_ignores_extra_fields() {
        let json = r#"{"categories": [
            {"something": "else", "path": "foo"},
            {"another": 1, "path": "bar"},
            {"what": [1, 2, 3], "path": "baz", "is": false, "this": {"a": "b", "c": [1, false, "hi!"]}}
        ]}"#;
        let c = decode(json).unwrap();
        assert_eq!(c.parts(), ["foo", "bar", "baz"]);
        assert_eq!(c.as_str(), "foo/bar/baz");
    }

    #[test]
    fn test_compact_form() {
        let c = decode(r#"{"categories": "foo/bar/baz"}"#).unwrap();
        assert_eq!(c.parts(), ["foo", "bar", "baz"]);
        assert_eq!(c.as_str(), "foo/bar/baz");
    }

    #[test]
    fn test_two_segments_keep_both() {
        let c = Categories::parse("games/edition");
        assert_eq!(c.as_str(), "games/edition");
        assert_eq!(c.parts().len(), 2);
    }

    #[test]
    fn test_single_segment() {
        let c = decode(r#"{"categories": "games"}"#).unwrap();
        assert_eq!(c.parts(), ["games"]);
        assert_eq!(c.as_str(), "games");
    }

    #[test]
    fn test_empty_encodings() {
        let from_string = decode(r#"{"categories": ""}"#).unwrap();
        let from_list = decode(r#"{"categories": []}"#).unwrap();
        assert!(from_string.is_empty());
        assert!(from_list.is_empty());
        assert_eq!(from_string.as_str(), "");
        assert_eq!(from_string, from_list);
    }

    #[test]
    fn test_null_is_absent() {
        assert!(decode(r#"{"categories": null}"#).is_none());
    }

    #[test]
    fn test_invalid_encoding_errors() {
        assert!(serde_json::from_str::<Holder>(r#"{"categories": 42}"#).is_err());
        assert!(serde_json::from_str::<Holder>(r#"{"categories": [{"name": "x"}]}"#).is_err());
    }

    #[test]
    fn test_both_encodings_reencode_to_canonical() {
        let compact = decode(r#"{"categories": "a/b/c"}"#).unwrap();
        let expanded = decode(r#"{"categories": [{"path":"a"},{"path":"b"},{"path":"c"}]}"#).unwrap();
        assert_eq!(serde_json::to_string(&compact).unwrap(), r#""a/b/c""#);
        assert_eq!(serde_json::to_string(&expanded).unwrap(), r#""a/b/c""#);
    }

    #[test]
    fn test_equality_ignores_case() {
        assert_eq!(Categories::parse("Games/DLC"), Categories::parse("games/dlc"));
        assert_ne!(Categories::parse("games"), Categories::parse("games/dlc"));
    }
}
