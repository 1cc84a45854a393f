//! Write pipeline: create, partial update, delete, media repair.
//!
//! Only this module mutates stored records. Resolved media URLs are written
//! back here and nowhere else, so reads never race writes to patch the same
//! record.

use std::collections::{HashMap, HashSet};

use atelier_core::{new_handle, slugify, CreateProduct, MediaRef, ProductView, UpdateProduct};
use atelier_store::{Field, ObjectStore};

use crate::error::CatalogError;
use crate::fields;
use crate::poller;
use crate::read::{self, MediaSlot};
use crate::Catalog;

impl<S: ObjectStore> Catalog<S> {
    /// Creates a catalog entry and resolves its media.
    ///
    /// Steps: mint handle and slug, upsert the field list, poll every media
    /// reference concurrently, then upsert once more with the resolved URLs
    /// appended. References still unresolved after the polling budget are
    /// left out of the returned view; this is a partial success, not an
    /// error. Handles are unique by construction, so there is no retry on
    /// collision.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidRequest`] if the title is blank (no store call).
    /// - [`CatalogError::Store`] if either upsert fails, passed through as-is.
    pub async fn create(&self, request: CreateProduct) -> Result<ProductView, CatalogError> {
        if request.title.trim().is_empty() {
            return Err(CatalogError::InvalidRequest(
                "title must be non-empty".to_string(),
            ));
        }

        let handle = new_handle();
        let slug = slugify(&request.title);
        let mut record_fields = fields::create_fields(&request, &slug)?;

        let id = self
            .store
            .upsert(&self.object_type, &handle, &record_fields)
            .await?;
        tracing::info!(
            handle = %handle,
            id = %id,
            images = request.images.len(),
            video = request.video.is_some(),
            "catalog entry created"
        );

        let mut references = request.images.clone();
        references.extend(request.video.iter().cloned());
        let mut resolutions = poller::resolve_all(&self.store, &references, self.poll).await;
        let video = if request.video.is_some() {
            resolutions.pop().and_then(poller::MediaResolution::into_url)
        } else {
            None
        };
        let images: Vec<String> = resolutions
            .into_iter()
            .filter_map(poller::MediaResolution::into_url)
            .collect();

        if images.len() < request.images.len() || (request.video.is_some() && video.is_none()) {
            tracing::warn!(
                handle = %handle,
                resolved_images = images.len(),
                requested_images = request.images.len(),
                video_resolved = video.is_some(),
                "some media is still unresolved after polling"
            );
        }

        if !images.is_empty() || video.is_some() {
            if !images.is_empty() {
                fields::set_field(
                    &mut record_fields,
                    fields::RESOLVED_IMAGE_URLS,
                    fields::encode_list(fields::RESOLVED_IMAGE_URLS, &images)?,
                );
            }
            if let Some(url) = &video {
                fields::set_field(&mut record_fields, fields::RESOLVED_VIDEO_URL, url.clone());
            }
            self.store
                .upsert(&self.object_type, &handle, &record_fields)
                .await?;
            tracing::info!(handle = %handle, images = images.len(), "resolved media written back");
        }

        Ok(ProductView {
            id,
            handle,
            slug,
            title: request.title.trim().to_owned(),
            description: request.description,
            price: request.price,
            currency: request.currency,
            status: request.status,
            images,
            video,
            colors: request.colors,
            sizes: request.sizes,
            related_handles: request.related_handles,
        })
    }

    /// Writes only the fields set in `request`; everything else on the stored
    /// record is left as it is. Returns the store id.
    ///
    /// Concurrent updates to one handle are not serialized here: the store's
    /// last write wins per field. The store has no conditional write, so an
    /// unknown handle ends up as a new sparse record.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::NoFieldsProvided`] if nothing is set (no store call).
    /// - [`CatalogError::Store`] if the upsert fails, passed through as-is.
    pub async fn update(
        &self,
        handle: &str,
        request: &UpdateProduct,
    ) -> Result<String, CatalogError> {
        if request.is_empty() {
            return Err(CatalogError::NoFieldsProvided {
                handle: handle.to_owned(),
            });
        }

        let update_fields = fields::update_fields(request)?;
        let id = self
            .store
            .upsert(&self.object_type, handle, &update_fields)
            .await?;
        tracing::info!(
            handle,
            id = %id,
            fields = ?update_fields.iter().map(|f| f.key.as_str()).collect::<Vec<_>>(),
            "catalog entry updated"
        );
        Ok(id)
    }

    /// Deletes an entry by store id (not handle) and returns the deleted id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Store`] with the store's errors unmodified.
    pub async fn delete(&self, id: &str) -> Result<String, CatalogError> {
        let deleted = self.store.delete(id).await?;
        tracing::info!(id = %deleted, "catalog entry deleted");
        Ok(deleted)
    }

    /// Re-polls media that never resolved for an existing entry and persists
    /// any newly resolved URLs.
    ///
    /// Rebuilds the media lists from the raw stored references, so images
    /// missing from a partial `resolved_image_urls` get another chance. Writes
    /// only when the result has more images (or a video where there was
    /// none); an entry that is already complete is returned untouched.
    /// Returns `None` if no entry has `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Store`] if the fetch or the write-back fails.
    pub async fn repair_media(&self, handle: &str) -> Result<Option<ProductView>, CatalogError> {
        let Some(record) = self.find_raw(handle).await? else {
            return Ok(None);
        };
        let current = read::transform(&record).finish(&HashMap::new());

        let image_slots = read::raw_media_slots(&record, fields::IMAGES);
        let video_slot = match &current.video {
            Some(url) => Some(MediaSlot::Ready(url.clone())),
            None => read::raw_media_slots(&record, fields::VIDEO).into_iter().next(),
        };

        let images_complete = current.images.len() >= image_slots.len();
        if images_complete && (current.video.is_some() || video_slot.is_none()) {
            tracing::debug!(handle, "media already complete, nothing to repair");
            return Ok(Some(current));
        }

        let references: Vec<MediaRef> = {
            let mut seen = HashSet::new();
            let image_slots = if images_complete { &[][..] } else { &image_slots[..] };
            image_slots
                .iter()
                .chain(video_slot.iter())
                .filter_map(MediaSlot::pending)
                .filter(|token| seen.insert(*token))
                .filter_map(|token| MediaRef::new(token).ok())
                .collect()
        };
        if references.is_empty() {
            return Ok(Some(current));
        }

        let resolutions = poller::resolve_all(&self.store, &references, self.poll).await;
        let resolved: HashMap<String, String> = references
            .iter()
            .zip(resolutions)
            .filter_map(|(reference, resolution)| {
                resolution
                    .into_url()
                    .map(|url| (reference.as_str().to_owned(), url))
            })
            .collect();

        let images: Vec<String> = image_slots
            .into_iter()
            .filter_map(|slot| slot.finish(&resolved))
            .collect();
        let video = video_slot.and_then(|slot| slot.finish(&resolved));

        let gained_images = images.len() > current.images.len();
        let gained_video = current.video.is_none() && video.is_some();
        if !gained_images && !gained_video {
            tracing::debug!(handle, "media repair found nothing new");
            return Ok(Some(current));
        }

        let mut record_fields: Vec<Field> = record
            .fields
            .iter()
            .filter_map(|f| f.value.as_ref().map(|v| Field::new(f.key.as_str(), v)))
            .collect();
        if gained_images {
            fields::set_field(
                &mut record_fields,
                fields::RESOLVED_IMAGE_URLS,
                fields::encode_list(fields::RESOLVED_IMAGE_URLS, &images)?,
            );
        }
        if let (true, Some(url)) = (gained_video, &video) {
            fields::set_field(&mut record_fields, fields::RESOLVED_VIDEO_URL, url.clone());
        }
        self.store
            .upsert(&self.object_type, handle, &record_fields)
            .await?;
        tracing::info!(
            handle,
            images = images.len(),
            video_resolved = video.is_some(),
            "repaired media written back"
        );

        let mut view = current;
        if gained_images {
            view.images = images;
        }
        if gained_video {
            view.video = video;
        }
        Ok(Some(view))
    }
}
