//! Field keys and per-field encoding for catalog records.
//!
//! The store has no schema. Everything that maps a stored key to a typed
//! value lives here, one decode function per field, and every decoder
//! falls back to an empty default instead of failing the record.

use atelier_core::{Color, CreateProduct, MediaRef, ProductStatus, UpdateProduct};
use atelier_store::{Field, RawRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CatalogError;

pub const TITLE: &str = "title";
pub const DESCRIPTION: &str = "description";
pub const PRICE: &str = "price";
pub const CURRENCY: &str = "currency";
pub const STATUS: &str = "status";
pub const SLUG: &str = "slug";
pub const COLORS: &str = "colors";
pub const SIZES: &str = "sizes";
pub const RELATED_PRODUCTS: &str = "related_products";
/// JSON array mixing plain URLs and media reference tokens.
pub const IMAGES: &str = "images";
/// A single plain URL or media reference token.
pub const VIDEO: &str = "video";
/// JSON array of resolved image URLs in display order.
pub const RESOLVED_IMAGE_URLS: &str = "resolved_image_urls";
pub const RESOLVED_VIDEO_URL: &str = "resolved_video_url";

/// Encodes a list as a compact JSON array string.
pub(crate) fn encode_list<T: Serialize>(
    field: &'static str,
    items: &[T],
) -> Result<String, CatalogError> {
    serde_json::to_string(items).map_err(|source| CatalogError::Encode { field, source })
}

/// Field list for a new record. Empty composites and absent media are
/// omitted rather than written as empty values.
pub(crate) fn create_fields(
    request: &CreateProduct,
    slug: &str,
) -> Result<Vec<Field>, CatalogError> {
    let mut fields = vec![
        Field::new(TITLE, request.title.trim()),
        Field::new(DESCRIPTION, &request.description),
        Field::new(PRICE, &request.price),
        Field::new(CURRENCY, &request.currency),
        Field::new(STATUS, request.status.as_str()),
        Field::new(SLUG, slug),
    ];

    if !request.colors.is_empty() {
        fields.push(Field::new(COLORS, encode_list(COLORS, &request.colors)?));
    }
    if !request.sizes.is_empty() {
        fields.push(Field::new(SIZES, encode_list(SIZES, &request.sizes)?));
    }
    if !request.related_handles.is_empty() {
        fields.push(Field::new(
            RELATED_PRODUCTS,
            encode_list(RELATED_PRODUCTS, &request.related_handles)?,
        ));
    }
    if !request.images.is_empty() {
        let refs: Vec<&str> = request.images.iter().map(MediaRef::as_str).collect();
        fields.push(Field::new(IMAGES, encode_list(IMAGES, &refs)?));
    }
    if let Some(video) = &request.video {
        fields.push(Field::new(VIDEO, video.as_str()));
    }

    Ok(fields)
}

/// Field list for a partial update: only fields present in `request`.
pub(crate) fn update_fields(request: &UpdateProduct) -> Result<Vec<Field>, CatalogError> {
    let mut fields = Vec::new();

    if let Some(title) = &request.title {
        fields.push(Field::new(TITLE, title.trim()));
    }
    if let Some(description) = &request.description {
        fields.push(Field::new(DESCRIPTION, description));
    }
    if let Some(price) = &request.price {
        fields.push(Field::new(PRICE, price));
    }
    if let Some(currency) = &request.currency {
        fields.push(Field::new(CURRENCY, currency));
    }
    if let Some(status) = request.status {
        fields.push(Field::new(STATUS, status.as_str()));
    }
    if let Some(colors) = &request.colors {
        fields.push(Field::new(COLORS, encode_list(COLORS, colors)?));
    }
    if let Some(sizes) = &request.sizes {
        fields.push(Field::new(SIZES, encode_list(SIZES, sizes)?));
    }
    if let Some(related) = &request.related_handles {
        fields.push(Field::new(
            RELATED_PRODUCTS,
            encode_list(RELATED_PRODUCTS, related)?,
        ));
    }

    Ok(fields)
}

/// Replaces `key` in `fields` or appends it.
pub(crate) fn set_field(fields: &mut Vec<Field>, key: &str, value: String) {
    match fields.iter_mut().find(|f| f.key == key) {
        Some(existing) => existing.value = value,
        None => fields.push(Field::new(key, value)),
    }
}

pub(crate) fn decode_text(record: &RawRecord, key: &str) -> String {
    record.value(key).map(str::to_owned).unwrap_or_default()
}

pub(crate) fn decode_status(record: &RawRecord) -> ProductStatus {
    match record.value(STATUS) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(
                handle = %record.handle,
                field = STATUS,
                value = raw,
                "unrecognised status, reading as DRAFT"
            );
            ProductStatus::Draft
        }),
        None => ProductStatus::Draft,
    }
}

pub(crate) fn decode_colors(record: &RawRecord) -> Vec<Color> {
    decode_json_list(record, COLORS)
}

pub(crate) fn decode_sizes(record: &RawRecord) -> Vec<String> {
    decode_json_list(record, SIZES)
}

pub(crate) fn decode_related_handles(record: &RawRecord) -> Vec<String> {
    decode_json_list(record, RELATED_PRODUCTS)
}

/// Durable resolved URLs, or `None` when the field is absent, empty or
/// malformed. Reference tokens are never passed through.
pub(crate) fn decode_resolved_images(record: &RawRecord) -> Option<Vec<String>> {
    let raw = record.value(RESOLVED_IMAGE_URLS)?;
    let urls: Vec<String> = match serde_json::from_str::<Vec<String>>(raw) {
        Ok(urls) => urls,
        Err(err) => {
            tracing::warn!(
                handle = %record.handle,
                field = RESOLVED_IMAGE_URLS,
                error = %err,
                "malformed resolved image list, falling back to raw media"
            );
            return None;
        }
    };
    let urls: Vec<String> = urls
        .into_iter()
        .filter(|u| !u.trim().is_empty() && !MediaRef::is_reference(u))
        .collect();
    (!urls.is_empty()).then_some(urls)
}

pub(crate) fn decode_resolved_video(record: &RawRecord) -> Option<String> {
    record
        .value(RESOLVED_VIDEO_URL)
        .filter(|v| !MediaRef::is_reference(v))
        .map(str::to_owned)
}

/// Raw entries of a media field: a JSON array of strings, or one bare
/// string for single-valued fields.
pub(crate) fn decode_media_entries(record: &RawRecord, key: &str) -> Vec<String> {
    let Some(raw) = record.value(key) else {
        return Vec::new();
    };
    let trimmed = raw.trim();
    if !trimmed.starts_with('[') {
        return vec![trimmed.to_owned()];
    }
    match serde_json::from_str::<Vec<String>>(trimmed) {
        Ok(entries) => entries
            .into_iter()
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty())
            .collect(),
        Err(err) => {
            tracing::warn!(
                handle = %record.handle,
                field = key,
                error = %err,
                "malformed media list, defaulting to empty"
            );
            Vec::new()
        }
    }
}

fn decode_json_list<T: DeserializeOwned>(record: &RawRecord, key: &str) -> Vec<T> {
    let Some(raw) = record.value(key) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<T>>(raw) {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(
                handle = %record.handle,
                field = key,
                error = %err,
                "malformed field, defaulting to empty"
            );
            Vec::new()
        }
    }
}
