//! Serde tests for persisted types.
//!
//! These cover the documents the scraper writes itself and reads back on the
//! next run: the state file, the namespace mapping and item files.

use chrono::{Duration, TimeZone, Utc};

use crate::{
    AccessToken, CatalogItem, CatalogNamespace, Categories, ClientId, ClientSecret, NamespaceMap,
    OAuthCredentials, RefreshToken, ScraperState, UrlSlug,
};

// ============================================================================
// ScraperState
// ============================================================================

#[test]
fn test_state_with_credentials_roundtrip() {
    let issued = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let mut state = ScraperState::new("output", ClientId::new("client"), ClientSecret::new("secret"));
    state.credentials = Some(
        OAuthCredentials::new(
            AccessToken::new("access"),
            issued + Duration::hours(2),
            RefreshToken::new("refresh"),
            issued + Duration::days(23),
            ClientId::new("client"),
        )
        .unwrap(),
    );

    let json = serde_json::to_string_pretty(&state).unwrap();
    assert!(json.contains(r#""accessToken": "access""#));
    assert!(json.contains(r#""refreshExpiresAt": "2024-01-24T12:00:00Z""#));

    let loaded: ScraperState = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded.credentials, state.credentials);
    assert_eq!(loaded.output_folder, state.output_folder);
    assert_eq!(loaded.client_secret, state.client_secret);
}

#[test]
fn test_state_without_credentials_field() {
    let json = r#"{
        "outputFolder": "/data",
        "oAuthClientId": "id",
        "oAuthClientSecret": "secret"
    }"#;
    let state: ScraperState = serde_json::from_str(json).unwrap();
    assert!(state.credentials.is_none());
}

// ============================================================================
// Namespace Mapping
// ============================================================================

#[test]
fn test_namespace_map_is_plain_object() {
    let mut map = NamespaceMap::new();
    map.insert(CatalogNamespace::new("b"), UrlSlug::new("slug-b"));
    map.insert(CatalogNamespace::new("a"), UrlSlug::new("slug-a"));

    let json = serde_json::to_string(&map).unwrap();
    assert_eq!(json, r#"{"a":"slug-a","b":"slug-b"}"#);

    let back: NamespaceMap = serde_json::from_str(&json).unwrap();
    assert_eq!(back, map);
}

// ============================================================================
// Item Files
// ============================================================================

#[test]
fn test_item_file_reloads() {
    let json = r#"{
        "id": "abc",
        "title": "Title",
        "description": "Description",
        "namespace": "ns",
        "categories": [{"path": "games"}, {"path": "games/edition"}],
        "keyImages": [],
        "creationDate": "2020-01-01T00:00:00Z",
        "lastModifiedDate": "2020-01-02T00:00:00Z"
    }"#;
    let item: CatalogItem = serde_json::from_str(json).unwrap();

    let written = serde_json::to_string_pretty(&item).unwrap();
    let reloaded: CatalogItem = serde_json::from_str(&written).unwrap();

    assert_eq!(reloaded, item);
    assert_eq!(reloaded.title, "Title");
    assert_eq!(
        reloaded.categories,
        Some(Categories::parse("games/games/edition"))
    );
}
