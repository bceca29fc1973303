//! Namespace discovery from storefront HTML.
//!
//! Store pages embed their client state in a script:
//!
//! ```text
//! window.__epic_client_state = { ... productInstall: { ... latestValue: {"ns":"slug", ...} ... } ... };
//! ```
//!
//! The object after `latestValue` maps every catalog namespace to its store
//! slug. Extraction walks the page with a small state machine: find each
//! marker in turn, then brace-match the object (skipping braces inside JSON
//! strings) and parse it.

use egs_scraper_core::NamespaceMap;
use tracing::{debug, instrument};

use crate::error::DiscoveryError;

/// Marker of the embedded client state script.
pub const CLIENT_STATE_MARKER: &str = "window.__epic_client_state";

/// Key of the product install section inside the client state.
pub const PRODUCT_INSTALL_MARKER: &str = "productInstall";

/// Key of the namespace mapping inside the product install section.
pub const LATEST_VALUE_MARKER: &str = "latestValue";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    ClientState,
    ProductInstall,
    LatestValue,
    ObjectStart,
    ObjectEnd { start: usize },
}

impl Step {
    fn marker(self) -> Option<&'static str> {
        match self {
            Step::ClientState => Some(CLIENT_STATE_MARKER),
            Step::ProductInstall => Some(PRODUCT_INSTALL_MARKER),
            Step::LatestValue => Some(LATEST_VALUE_MARKER),
            Step::ObjectStart | Step::ObjectEnd { .. } => None,
        }
    }

    fn next(self, found_at: usize) -> Self {
        match self {
            Step::ClientState => Step::ProductInstall,
            Step::ProductInstall => Step::LatestValue,
            Step::LatestValue => Step::ObjectStart,
            Step::ObjectStart => Step::ObjectEnd { start: found_at },
            Step::ObjectEnd { .. } => self,
        }
    }
}

/// Extracts the namespace mapping from a storefront page.
///
/// # Errors
///
/// - [`DiscoveryError::MarkerNotFound`] if a marker or the opening brace is
///   missing
/// - [`DiscoveryError::UnbalancedBraces`] if the object never closes
/// - [`DiscoveryError::InvalidJson`] if the object isn't a string-to-string
///   JSON map
#[instrument(skip(html), fields(len = html.len()))]
pub fn extract_namespaces(html: &str) -> Result<NamespaceMap, DiscoveryError> {
    let bytes = html.as_bytes();
    let mut pos = 0;
    let mut step = Step::ClientState;

    loop {
        match step {
            Step::ClientState | Step::ProductInstall | Step::LatestValue => {
                let marker = step.marker().unwrap_or_default();
                let found = html[pos..]
                    .find(marker)
                    .ok_or(DiscoveryError::MarkerNotFound(marker))?;
                pos += found + marker.len();
                step = step.next(pos);
            }
            Step::ObjectStart => {
                let found = html[pos..]
                    .find('{')
                    .ok_or(DiscoveryError::MarkerNotFound("{"))?;
                pos += found;
                step = step.next(pos);
            }
            Step::ObjectEnd { start } => {
                let end = matching_brace(bytes, start).ok_or(DiscoveryError::UnbalancedBraces)?;
                let json = &html[start..=end];
                debug!(start, end, "Namespace object located");

                let map: NamespaceMap = serde_json::from_str(json)?;
                debug!(count = map.len(), "Namespaces extracted");
                return Ok(map);
            }
        }
    }
}

/// Returns the index of the `}` closing the `{` at `start`.
///
/// Braces inside double-quoted strings are ignored, honoring backslash
/// escapes.
fn matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use egs_scraper_core::{CatalogNamespace, UrlSlug};

    fn page(json: &str) -> String {
        format!(
            "<html><script>window.__epic_client_state = {{productInstall = {{latestValue = \n{json}}}}};</script></html>"
        )
    }

    #[test]
    fn test_extracts_embedded_mapping() {
        let json = r#"{"fn":"fortnite","ue":"unreal-engine","d8a4c98b5020483881eb7f0c3fc4cea3":"some-game"}"#;
        let map = extract_namespaces(&page(json)).unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map[&CatalogNamespace::new("fn")], UrlSlug::new("fortnite"));
        assert_eq!(map[&CatalogNamespace::new("ue")], UrlSlug::new("unreal-engine"));
    }

    #[test]
    fn test_realistic_json_state() {
        let html = r#"<script>window.__epic_client_state = {"productInstall":{"status":"ok","latestValue":{"a":"b","c":"d"},"other":{"x":1}},"more":{}};</script>"#;
        let map = extract_namespaces(html).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_braces_inside_strings() {
        let json = r#"{"weird}":"slug{with}braces","quote\"}":"x"}"#;
        let map = extract_namespaces(&page(json)).unwrap();
        assert_eq!(map[&CatalogNamespace::new("weird}")], UrlSlug::new("slug{with}braces"));
        assert_eq!(map[&CatalogNamespace::new("quote\"}")], UrlSlug::new("x"));
    }

    #[test]
    fn test_missing_markers() {
        assert!(matches!(
            extract_namespaces("<html></html>"),
            Err(DiscoveryError::MarkerNotFound(CLIENT_STATE_MARKER))
        ));
        assert!(matches!(
            extract_namespaces("window.__epic_client_state = {latestValue: {}}"),
            Err(DiscoveryError::MarkerNotFound(PRODUCT_INSTALL_MARKER))
        ));
        assert!(matches!(
            extract_namespaces("window.__epic_client_state = {productInstall: {}}"),
            Err(DiscoveryError::MarkerNotFound(LATEST_VALUE_MARKER))
        ));
        assert!(matches!(
            extract_namespaces("window.__epic_client_state productInstall latestValue"),
            Err(DiscoveryError::MarkerNotFound("{"))
        ));
    }

    #[test]
    fn test_markers_must_appear_in_order() {
        let html = r#"latestValue productInstall window.__epic_client_state = {"x": 1}"#;
        assert!(matches!(
            extract_namespaces(html),
            Err(DiscoveryError::MarkerNotFound(PRODUCT_INSTALL_MARKER))
        ));
    }

    #[test]
    fn test_unbalanced() {
        let html = r#"window.__epic_client_state productInstall latestValue {"a":"b""#;
        assert!(matches!(
            extract_namespaces(html),
            Err(DiscoveryError::UnbalancedBraces)
        ));
    }

    #[test]
    fn test_invalid_json() {
        let html = "window.__epic_client_state productInstall latestValue {a: b}";
        assert!(matches!(
            extract_namespaces(html),
            Err(DiscoveryError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_matching_brace_nested() {
        let s = br#"{"a":{"b":{}}} tail"#;
        assert_eq!(matching_brace(s, 0), Some(13));
    }
}
