//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

use super::json::FailureOutput;
use super::*;
use chrono::{Duration, Utc};
use egs_scraper_catalog::ScrapeSummary;
use egs_scraper_core::{AccessToken, CatalogNamespace, ClientId, OAuthCredentials, RefreshToken};

fn credentials(access_in: Duration, refresh_in: Duration) -> OAuthCredentials {
    let now = Utc::now();
    OAuthCredentials::new(
        AccessToken::new("a"),
        now + access_in,
        RefreshToken::new("r"),
        now + refresh_in,
        ClientId::new("client"),
    )
    .unwrap()
}

fn status(token: Option<TokenOutput>, namespaces: Option<usize>) -> StatusOutput {
    StatusOutput {
        state_file: "scraper.state.json".to_string(),
        output_folder: "output".to_string(),
        client_id: "client".to_string(),
        token,
        namespaces,
        completed: 3,
        interrupted: vec![],
    }
}

mod text_formatter_tests {
    use super::*;

    #[test]
    fn test_status_not_logged_in() {
        let out = TextFormatter::new(false).format_status(&status(None, None), Utc::now());
        assert!(out.contains("not logged in"));
        assert!(out.contains("not discovered yet"));
    }

    #[test]
    fn test_status_with_progress() {
        let creds = credentials(Duration::hours(2), Duration::days(20));
        let token = TokenOutput::new(&creds, Utc::now());
        let out = TextFormatter::new(false).format_status(&status(Some(token), Some(10)), Utc::now());

        assert!(out.contains("Access:  valid"));
        assert!(out.contains("Refresh: valid"));
        assert!(out.contains("3/10"));
        assert!(out.contains("Pending: 7"));
    }

    #[test]
    fn test_status_expired_refresh_suggests_login() {
        let creds = credentials(Duration::days(-3), Duration::days(-1));
        let token = TokenOutput::new(&creds, Utc::now());
        let out = TextFormatter::new(false).format_status(&status(Some(token), None), Utc::now());
        assert!(out.contains("egs-scraper login"));
    }

    #[test]
    fn test_status_lists_interrupted() {
        let mut s = status(None, Some(5));
        s.interrupted = vec!["fn".to_string(), "ue".to_string()];
        let out = TextFormatter::new(false).format_status(&s, Utc::now());
        assert!(out.contains("Interrupted: fn, ue"));
    }

    #[test]
    fn test_scrape_summary_with_failures() {
        let summary = ScrapeSummary {
            completed: 2,
            items: 40,
            skipped: 1,
            failed: vec![(CatalogNamespace::new("broken"), "HTTP 500".to_string())],
        };
        let out = TextFormatter::new(false).format_scrape(&ScrapeOutput::from(&summary));
        assert!(out.contains("Scraped 2 namespaces (40 items), skipped 1"));
        assert!(out.contains("1 failed:"));
        assert!(out.contains("broken"));
        assert!(out.contains("HTTP 500"));
    }

    #[test]
    fn test_login_prints_authorization_url() {
        let login = LoginOutput {
            state_file: "scraper.state.json".to_string(),
            output_folder: "output".to_string(),
            client_id: "client".to_string(),
            authorization_url: Some("https://www.epicgames.com/id/api/redirect?clientId=client".to_string()),
            token: None,
        };
        let out = TextFormatter::new(false).format_login(&login);
        assert!(out.contains("clientId=client"));
        assert!(out.contains("--code"));
    }
}

mod json_formatter_tests {
    use super::*;

    #[test]
    fn test_status_json_shape() {
        let creds = credentials(Duration::hours(2), Duration::days(20));
        let token = TokenOutput::new(&creds, Utc::now());
        let json = JsonFormatter::new(false).format(&status(Some(token), Some(10))).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["stateFile"], "scraper.state.json");
        assert_eq!(value["namespaces"], 10);
        assert_eq!(value["completed"], 3);
        assert_eq!(value["token"]["accessValid"], true);
        assert!(value["token"]["expiresAt"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_status_json_omits_missing_token() {
        let json = JsonFormatter::new(false).format(&status(None, None)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("token").is_none());
        assert!(value.get("namespaces").is_none());
    }

    #[test]
    fn test_scrape_json() {
        let output = ScrapeOutput {
            completed: 1,
            skipped: 0,
            items: 3,
            failed: vec![FailureOutput {
                namespace: "x".to_string(),
                error: "boom".to_string(),
            }],
        };
        let json = JsonFormatter::new(false).format(&output).unwrap();
        assert_eq!(
            json,
            r#"{"completed":1,"skipped":0,"items":3,"failed":[{"namespace":"x","error":"boom"}]}"#
        );
    }

    #[test]
    fn test_pretty_json() {
        let output = NamespacesOutput {
            mapping_file: "out/namespaces.json".to_string(),
            namespaces: 2,
        };
        let json = JsonFormatter::new(true).format(&output).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("\"mappingFile\""));
    }
}
