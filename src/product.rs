//! Product data model and content identity
//!
//! A [`ProductRecord`] is what the extractor produces for one product card.
//! Its [`ContentId`] is a SHA-256 digest over the three field values and is the
//! only key the store deduplicates on.

use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// One product as extracted from a catalogue page
///
/// Any field may be empty when the markup did not contain it. An empty-field
/// record is still a valid record and is stored like any other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductRecord {
    pub title: String,
    /// Display form as found on the page, e.g. `"$19.99"`
    pub price: String,
    pub image_url: String,
}

impl ProductRecord {
    pub fn new(
        title: impl Into<String>,
        price: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            price: price.into(),
            image_url: image_url.into(),
        }
    }

    /// Returns true if no field could be extracted
    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.price.is_empty() && self.image_url.is_empty()
    }

    /// Computes this record's content identity under the given scheme
    pub fn content_id(&self, scheme: IdentityScheme) -> ContentId {
        ContentId::derive(self, scheme)
    }
}

/// How the three field values are encoded before hashing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityScheme {
    /// Each field is written as `<byte length>:<bytes>`, so field boundaries
    /// are unambiguous
    #[default]
    LengthPrefixed,

    /// Fields are concatenated with no separator. Matches identities written by
    /// the legacy scraper; `("AB", "C")` and `("A", "BC")` collide.
    Concatenated,
}

impl IdentityScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LengthPrefixed => "length-prefixed",
            Self::Concatenated => "concatenated",
        }
    }
}

/// Deterministic content digest of a [`ProductRecord`]
///
/// Always 64 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId(String);

impl ContentId {
    /// Length of the hex-encoded digest
    pub const HEX_LEN: usize = 64;

    pub fn derive(record: &ProductRecord, scheme: IdentityScheme) -> Self {
        let mut hasher = Sha256::new();
        let fields = [&record.title, &record.price, &record.image_url];

        match scheme {
            IdentityScheme::LengthPrefixed => {
                for field in fields {
                    hasher.update(field.len().to_string().as_bytes());
                    hasher.update(b":");
                    hasher.update(field.as_bytes());
                }
            }
            IdentityScheme::Concatenated => {
                for field in fields {
                    hasher.update(field.as_bytes());
                }
            }
        }

        Self(hex::encode(hasher.finalize()))
    }

    /// Wraps a digest read back from storage
    ///
    /// Returns `None` unless the value is a 64-character lowercase hex string.
    pub fn from_hex(value: &str) -> Option<Self> {
        let valid = value.len() == Self::HEX_LEN
            && value
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        valid.then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record as persisted by the content store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: ContentId,
    pub record: ProductRecord,
}
