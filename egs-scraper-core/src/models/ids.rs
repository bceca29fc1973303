//! String value objects.
//!
//! Thin newtypes over `String` so that a namespace can't be passed where a
//! slug is expected. All of them serialize transparently as JSON strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Declares a transparent string newtype.
///
/// The `secret` form redacts the value in `Debug` output so tokens never end
/// up in logs.
macro_rules! string_value {
    (@impls $name:ident) => {
        impl $name {
            /// Wraps a raw string.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the raw string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the wrapper, returning the raw string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
    (secret $(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        string_value!(@impls $name);

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(<redacted>)", stringify!($name))
            }
        }
    };
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        string_value!(@impls $name);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_value!(
    /// Partitioning key of the store catalog.
    ///
    /// Case-sensitive. Used verbatim as an API path segment and as a
    /// directory name under the output folder.
    CatalogNamespace
);

string_value!(
    /// Human-readable store slug paired with a [`CatalogNamespace`].
    UrlSlug
);

string_value!(
    /// OAuth client identifier.
    ClientId
);

string_value!(secret
    /// OAuth client secret.
    ClientSecret
);

string_value!(secret
    /// Bearer token for the catalog API.
    AccessToken
);

string_value!(secret
    /// Long-lived token used to obtain a new [`AccessToken`].
    RefreshToken
);

string_value!(secret
    /// One-shot code obtained from the interactive browser login.
    AuthorizationCode
);

// ============================================================================
// Catalog Id
// ============================================================================

/// Unique identifier of a catalog item.
///
/// Equality and hashing ignore ASCII case, so `ABC` and `abc` name the same
/// item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(String);

impl CatalogId {
    /// Wraps a raw id.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw id as received from the API.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for CatalogId {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for CatalogId {}

impl Hash for CatalogId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CatalogId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
