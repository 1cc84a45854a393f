//! Read pipeline: fetch-all, transform, batch repair.

use std::collections::{HashMap, HashSet};

use atelier_core::{fallback_slug, is_plausible_slug, MediaRef, ProductView};
use atelier_store::{ObjectStore, RawRecord};

use crate::error::CatalogError;
use crate::fields;
use crate::Catalog;

/// One media position in display order: either a usable URL or a
/// reference token waiting on batch repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MediaSlot {
    Ready(String),
    Pending(String),
}

impl MediaSlot {
    pub(crate) fn pending(&self) -> Option<&str> {
        match self {
            MediaSlot::Pending(token) => Some(token),
            MediaSlot::Ready(_) => None,
        }
    }

    pub(crate) fn finish(self, resolved: &HashMap<String, String>) -> Option<String> {
        match self {
            MediaSlot::Ready(url) => Some(url),
            MediaSlot::Pending(token) => resolved.get(&token).cloned(),
        }
    }
}

/// A record transformed as far as its own data allows.
///
/// `view.images` and `view.video` stay empty until [`Transformed::finish`]
/// merges in whatever the batch repair resolved.
#[derive(Debug, Clone)]
pub(crate) struct Transformed {
    pub view: ProductView,
    pub images: Vec<MediaSlot>,
    pub video: Option<MediaSlot>,
}

impl Transformed {
    pub fn pending_refs(&self) -> impl Iterator<Item = &str> {
        self.images
            .iter()
            .chain(self.video.iter())
            .filter_map(MediaSlot::pending)
    }

    /// Fills pending slots from `resolved`, dropping any still unresolved so
    /// no reference token ever reaches the view.
    pub fn finish(self, resolved: &HashMap<String, String>) -> ProductView {
        let mut view = self.view;
        view.images = self
            .images
            .into_iter()
            .filter_map(|slot| slot.finish(resolved))
            .collect();
        view.video = self.video.and_then(|slot| slot.finish(resolved));
        view
    }
}

/// Maps one raw record to a [`Transformed`] view.
///
/// Images come from, first match wins:
/// 1. the durable `resolved_image_urls` field, trusted as-is;
/// 2. URLs the store resolved directly alongside the `images` field;
/// 3. plain URLs in the raw `images` list, with reference tokens left pending.
///
/// 2 and 3 are applied entry by entry so display order survives.
pub(crate) fn transform(record: &RawRecord) -> Transformed {
    let title = fields::decode_text(record, fields::TITLE);
    let slug = match record.value(fields::SLUG) {
        Some(stored) if is_plausible_slug(stored) => stored.trim().to_owned(),
        _ => fallback_slug(&title, &record.handle),
    };

    let images = match fields::decode_resolved_images(record) {
        Some(urls) => urls.into_iter().map(MediaSlot::Ready).collect(),
        None => raw_media_slots(record, fields::IMAGES),
    };
    let video = fields::decode_resolved_video(record)
        .map(MediaSlot::Ready)
        .or_else(|| raw_media_slots(record, fields::VIDEO).into_iter().next());

    let view = ProductView {
        id: record.id.clone(),
        handle: record.handle.clone(),
        slug,
        title,
        description: fields::decode_text(record, fields::DESCRIPTION),
        price: fields::decode_text(record, fields::PRICE),
        currency: fields::decode_text(record, fields::CURRENCY),
        status: fields::decode_status(record),
        images: Vec::new(),
        video: None,
        colors: fields::decode_colors(record),
        sizes: fields::decode_sizes(record),
        related_handles: fields::decode_related_handles(record),
    };

    Transformed {
        view,
        images,
        video,
    }
}

/// Slots for a media field, ignoring any durable resolved URLs.
pub(crate) fn raw_media_slots(record: &RawRecord, key: &str) -> Vec<MediaSlot> {
    let direct: HashMap<&str, &str> = record
        .field(key)
        .map(|f| {
            f.references
                .iter()
                .filter_map(|r| r.url.as_deref().map(|url| (r.id.as_str(), url)))
                .collect()
        })
        .unwrap_or_default();

    let entries = fields::decode_media_entries(record, key);
    if entries.is_empty() {
        // Value missing or unreadable: fall back to the references the store
        // attached to the field, in the order it returned them.
        return record
            .field(key)
            .map(|f| {
                f.references
                    .iter()
                    .map(|r| match &r.url {
                        Some(url) => MediaSlot::Ready(url.clone()),
                        None => MediaSlot::Pending(r.id.clone()),
                    })
                    .collect()
            })
            .unwrap_or_default();
    }

    entries
        .into_iter()
        .map(|entry| {
            if !MediaRef::is_reference(&entry) {
                MediaSlot::Ready(entry)
            } else if let Some(url) = direct.get(entry.as_str()) {
                MediaSlot::Ready((*url).to_owned())
            } else {
                MediaSlot::Pending(entry)
            }
        })
        .collect()
}

impl<S: ObjectStore> Catalog<S> {
    /// Lists every catalog entry.
    ///
    /// Costs two store round-trips at most: one fetch, plus one batch
    /// resolution covering every still-pending media reference across the
    /// whole catalog. The repair is best-effort; if it fails, affected
    /// entries are returned without their unresolved media. Nothing is
    /// written back.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Store`] if the fetch itself fails.
    pub async fn list_all(&self) -> Result<Vec<ProductView>, CatalogError> {
        let records = self.store.query_all(&self.object_type).await?;
        let transformed: Vec<Transformed> = records.iter().map(transform).collect();

        let pending: Vec<String> = {
            let mut seen = HashSet::new();
            transformed
                .iter()
                .flat_map(Transformed::pending_refs)
                .filter(|token| seen.insert(*token))
                .map(str::to_owned)
                .collect()
        };

        let resolved = if pending.is_empty() {
            HashMap::new()
        } else {
            match self.store.resolve_references(&pending).await {
                Ok(resolved) => {
                    tracing::debug!(
                        requested = pending.len(),
                        resolved = resolved.len(),
                        "batch media repair finished"
                    );
                    resolved
                }
                Err(err) => {
                    tracing::warn!(
                        requested = pending.len(),
                        error = %err,
                        "batch media repair failed, listing without unresolved media"
                    );
                    HashMap::new()
                }
            }
        };

        Ok(transformed
            .into_iter()
            .map(|t| t.finish(&resolved))
            .collect())
    }

    /// Finds one entry by handle.
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::list_all`].
    pub async fn get_by_handle(&self, handle: &str) -> Result<Option<ProductView>, CatalogError> {
        // TODO: keep a handle -> id index alongside the store so single
        // lookups stop scanning the whole catalog.
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .find(|view| view.handle == handle))
    }

    /// Finds one entry by slug. Scans the catalog like
    /// [`Catalog::get_by_handle`].
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::list_all`].
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<ProductView>, CatalogError> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .find(|view| view.slug == slug))
    }

    /// Fetches the raw stored record for `handle`.
    pub(crate) async fn find_raw(&self, handle: &str) -> Result<Option<RawRecord>, CatalogError> {
        Ok(self
            .store
            .query_all(&self.object_type)
            .await?
            .into_iter()
            .find(|record| record.handle == handle))
    }
}

#[cfg(test)]
mod tests {
    use atelier_core::ProductStatus;
    use atelier_store::{RawField, ResolvedReference};

    use super::*;

    fn field(key: &str, value: &str) -> RawField {
        RawField {
            key: key.to_owned(),
            value: Some(value.to_owned()),
            references: vec![],
        }
    }

    fn record(handle: &str, fields: Vec<RawField>) -> RawRecord {
        RawRecord {
            id: format!("gid://shopify/Metaobject/{handle}"),
            handle: handle.to_owned(),
            fields,
        }
    }

    #[test]
    fn durable_urls_win_over_raw_media() {
        let rec = record(
            "product-a-1",
            vec![
                field(
                    fields::IMAGES,
                    r#"["gid://shopify/MediaImage/1","gid://shopify/MediaImage/2"]"#,
                ),
                field(fields::RESOLVED_IMAGE_URLS, r#"["https://cdn.example.com/1.jpg"]"#),
            ],
        );
        let t = transform(&rec);
        assert_eq!(t.pending_refs().count(), 0);
        let view = t.finish(&HashMap::new());
        assert_eq!(view.images, vec!["https://cdn.example.com/1.jpg"]);
    }

    #[test]
    fn direct_references_fill_slots_and_tokens_stay_pending() {
        let mut images = field(
            fields::IMAGES,
            r#"["gid://shopify/MediaImage/1","https://cdn.example.com/plain.jpg","gid://shopify/MediaImage/2"]"#,
        );
        images.references = vec![
            ResolvedReference {
                id: "gid://shopify/MediaImage/1".to_owned(),
                url: Some("https://cdn.example.com/1.jpg".to_owned()),
            },
            ResolvedReference {
                id: "gid://shopify/MediaImage/2".to_owned(),
                url: None,
            },
        ];
        let t = transform(&record("product-a-1", vec![images]));
        assert_eq!(
            t.pending_refs().collect::<Vec<_>>(),
            vec!["gid://shopify/MediaImage/2"]
        );

        let mut resolved = HashMap::new();
        resolved.insert(
            "gid://shopify/MediaImage/2".to_owned(),
            "https://cdn.example.com/2.jpg".to_owned(),
        );
        let view = t.finish(&resolved);
        assert_eq!(
            view.images,
            vec![
                "https://cdn.example.com/1.jpg",
                "https://cdn.example.com/plain.jpg",
                "https://cdn.example.com/2.jpg",
            ]
        );
    }

    #[test]
    fn unresolved_tokens_are_dropped_not_exposed() {
        let rec = record(
            "product-a-1",
            vec![field(fields::IMAGES, r#"["gid://shopify/MediaImage/9"]"#)],
        );
        let view = transform(&rec).finish(&HashMap::new());
        assert!(view.images.is_empty());
    }

    #[test]
    fn references_used_when_value_unreadable() {
        let mut images = field(fields::IMAGES, "[broken");
        images.references = vec![ResolvedReference {
            id: "gid://shopify/MediaImage/1".to_owned(),
            url: Some("https://cdn.example.com/1.jpg".to_owned()),
        }];
        let view = transform(&record("product-a-1", vec![images])).finish(&HashMap::new());
        assert_eq!(view.images, vec!["https://cdn.example.com/1.jpg"]);
    }

    #[test]
    fn video_prefers_durable_url_then_raw_value() {
        let durable = record(
            "product-a-1",
            vec![
                field(fields::VIDEO, "gid://shopify/Video/1"),
                field(fields::RESOLVED_VIDEO_URL, "https://cdn.example.com/1.mp4"),
            ],
        );
        let t = transform(&durable);
        assert_eq!(t.pending_refs().count(), 0);
        assert_eq!(
            t.finish(&HashMap::new()).video.as_deref(),
            Some("https://cdn.example.com/1.mp4")
        );

        let pending = record(
            "product-a-2",
            vec![field(fields::VIDEO, "gid://shopify/Video/2")],
        );
        let t = transform(&pending);
        assert_eq!(
            t.pending_refs().collect::<Vec<_>>(),
            vec!["gid://shopify/Video/2"]
        );
        assert_eq!(t.finish(&HashMap::new()).video, None);
    }

    #[test]
    fn stored_slug_is_kept_when_plausible() {
        let rec = record(
            "product-a-1",
            vec![field(fields::TITLE, "Gown"), field(fields::SLUG, "gown-x1y2z3")],
        );
        assert_eq!(transform(&rec).view.slug, "gown-x1y2z3");
    }

    #[test]
    fn short_or_missing_slug_is_regenerated_deterministically() {
        let short = record(
            "product-lx3k-q8d0v7r2zt",
            vec![field(fields::TITLE, "Velvet Blazer"), field(fields::SLUG, "vb")],
        );
        let first = transform(&short).view.slug;
        let second = transform(&short).view.slug;
        assert_eq!(first, "velvet-blazer-v7r2zt");
        assert_eq!(first, second);

        let missing = record("product-lx3k-q8d0v7r2zt", vec![]);
        assert_eq!(transform(&missing).view.slug, "product-lx3k-q8d0v7r2zt");
    }

    #[test]
    fn scalar_fields_pass_through_verbatim() {
        let rec = record(
            "product-a-1",
            vec![
                field(fields::TITLE, "Gown"),
                field(fields::PRICE, "999-1499"),
                field(fields::CURRENCY, "EUR"),
                field(fields::STATUS, "ACTIVE"),
                field(fields::COLORS, r##"[{"name":"Ivory","hex":"#fffff0"}]"##),
            ],
        );
        let view = transform(&rec).view;
        assert_eq!(view.price, "999-1499");
        assert_eq!(view.currency, "EUR");
        assert_eq!(view.status, ProductStatus::Active);
        assert_eq!(view.colors.len(), 1);
        assert_eq!(view.colors[0].name, "Ivory");
    }
}
