//! Physical grid keys.
//!
//! A logical record is addressed by a `(context, key)` pair. How that pair
//! maps onto a physical collection entry depends on the key mapping strategy:
//! per-context collections store the bare key, a shared collection stores a
//! composite of the pair. [`GridKey`] covers both layouts.

use serde::{Deserialize, Serialize};

/// Physical key written to a backing collection.
///
/// The composite variant compares and hashes structurally over the pair, so
/// context `"a:b"` / key `"c"` can never collide with context `"a"` /
/// key `"b:c"` the way a concatenated string key would.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GridKey {
    /// Bare key, used when each context owns its own collection.
    Plain(String),
    /// `(context, key)` pair, used when all contexts share one collection.
    Composite { context: String, key: String },
}

impl GridKey {
    /// Builds a plain key for the per-context layout.
    #[must_use]
    pub fn plain(key: impl Into<String>) -> Self {
        Self::Plain(key.into())
    }

    /// Builds a composite key for the shared layout.
    #[must_use]
    pub fn composite(context: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Composite {
            context: context.into(),
            key: key.into(),
        }
    }

    /// The logical key component.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Plain(key) | Self::Composite { key, .. } => key,
        }
    }

    /// The context component, if this key carries one.
    ///
    /// Plain keys return `None`: their context is the collection they live in.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Plain(_) => None,
            Self::Composite { context, .. } => Some(context),
        }
    }
}
