// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # egs-scraper Store
//!
//! Everything the scraper keeps on disk.
//!
//! - **State file**: OAuth client and credentials ([`state`])
//! - **Token lifecycle**: valid tokens on demand, refresh + write-back
//!   ([`TokenLifecycleManager`])
//! - **Settings**: user preferences with defaults ([`ScraperSettings`])
//! - **Output layout**: namespace mapping merge and the per-namespace
//!   temp-then-rename commit ([`OutputLayout`], [`merge_namespace_mapping`])
//!
//! ## Usage
//!
//! ```ignore
//! use egs_scraper_store::{OutputLayout, PrepareOutcome, TokenLifecycleManager};
//!
//! let tokens = TokenLifecycleManager::load(oauth_client, "scraper.state.json").await?;
//! let token = tokens.get_valid_token(chrono::Utc::now(), &cancel).await?;
//!
//! let layout = OutputLayout::new("output");
//! if let PrepareOutcome::Ready(mut writer) = layout.prepare_namespace(&ns).await? {
//!     writer.write_item(&item).await?;
//!     writer.commit().await?;
//! }
//! ```

pub mod error;
pub mod layout;
pub mod merge;
pub mod persistence;
pub mod settings;
pub mod state;
pub mod token;

pub use error::{AuthError, StoreError};
pub use layout::{NamespaceWriter, OutputLayout, PrepareOutcome};
pub use merge::{merge_json_map, merge_namespace_mapping};
pub use persistence::{
    default_config_dir, default_settings_path, default_state_path, ensure_dir, load_json,
    load_json_or_default, save_json, write_json,
};
pub use settings::{ScraperSettings, DEFAULT_DISCOVERY_URL};
pub use state::{load_state, load_state_if_exists, save_state};
pub use token::{TokenLifecycleManager, TokenProvider};
