use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Prefix that distinguishes an opaque media reference from a plain URL.
pub const MEDIA_REFERENCE_PREFIX: &str = "gid://";

/// Publication status of a catalog entry.
///
/// Stored records with a missing or unrecognised status read as `Draft`, so
/// nothing is published by accident.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Active,
    #[default]
    Draft,
}

impl ProductStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Active => "ACTIVE",
            ProductStatus::Draft => "DRAFT",
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(ProductStatus::Active),
            "DRAFT" => Ok(ProductStatus::Draft),
            _ => Err(CoreError::InvalidStatus(s.to_owned())),
        }
    }
}

/// A named swatch, e.g. `{ "name": "Midnight", "hex": "#191970" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub name: String,
    pub hex: String,
}

impl FromStr for Color {
    type Err = CoreError;

    /// Parses the `NAME=#HEX` form used on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, hex) = s
            .split_once('=')
            .ok_or_else(|| CoreError::InvalidColor(s.to_owned()))?;
        let name = name.trim();
        let hex = hex.trim();
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let valid_hex = matches!(digits.len(), 3 | 6 | 8)
            && digits.chars().all(|c| c.is_ascii_hexdigit());
        if name.is_empty() || !valid_hex {
            return Err(CoreError::InvalidColor(s.to_owned()));
        }
        Ok(Color {
            name: name.to_owned(),
            hex: format!("#{}", digits.to_ascii_lowercase()),
        })
    }
}

/// Opaque token minted by the media upload side-channel, e.g.
/// `"gid://shopify/MediaImage/1234"`.
///
/// The asset it names may not have a public URL yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaRef(String);

impl MediaRef {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidMediaRef`] if `raw` lacks the
    /// [`MEDIA_REFERENCE_PREFIX`].
    pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        if Self::is_reference(&raw) {
            Ok(MediaRef(raw))
        } else {
            Err(CoreError::InvalidMediaRef(raw))
        }
    }

    /// Returns `true` if `value` is a reference token rather than a plain URL.
    #[must_use]
    pub fn is_reference(value: &str) -> bool {
        value.starts_with(MEDIA_REFERENCE_PREFIX)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MediaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MediaRef {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaRef::new(s.trim())
    }
}

impl TryFrom<String> for MediaRef {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MediaRef::new(value)
    }
}

impl From<MediaRef> for String {
    fn from(value: MediaRef) -> Self {
        value.0
    }
}

/// Input for creating a new catalog entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProduct {
    pub title: String,
    pub description: String,
    /// Single amount (`"1299"`) or range (`"999-1499"`), stored verbatim.
    pub price: String,
    pub currency: String,
    pub status: ProductStatus,
    /// Uploaded images in display order.
    pub images: Vec<MediaRef>,
    pub video: Option<MediaRef>,
    pub colors: Vec<Color>,
    pub sizes: Vec<String>,
    pub related_handles: Vec<String>,
}

/// A partial update. Only `Some` fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub status: Option<ProductStatus>,
    pub colors: Option<Vec<Color>>,
    pub sizes: Option<Vec<String>>,
    pub related_handles: Option<Vec<String>>,
}

impl UpdateProduct {
    /// Returns `true` when the request would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.currency.is_none()
            && self.status.is_none()
            && self.colors.is_none()
            && self.sizes.is_none()
            && self.related_handles.is_none()
    }
}

/// Typed projection of a stored catalog record, as handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    /// Store-assigned identifier.
    pub id: String,
    pub handle: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub currency: String,
    pub status: ProductStatus,
    /// Resolved image URLs. The first is the primary image, the second the
    /// hover preview. Never contains an unresolved reference.
    pub images: Vec<String>,
    pub video: Option<String>,
    pub colors: Vec<Color>,
    pub sizes: Vec<String>,
    pub related_handles: Vec<String>,
}

impl ProductView {
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    #[must_use]
    pub fn hover_image(&self) -> Option<&str> {
        self.images.get(1).map(String::as_str)
    }
}
