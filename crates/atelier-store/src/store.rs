//! The remote object store seam.

use std::collections::HashMap;
use std::future::Future;

use crate::error::StoreError;
use crate::types::{Field, RawRecord};

/// The four primitive operations the catalog needs from a remote store.
///
/// Implementations surface failures immediately and never retry; use
/// [`StoreError::is_retryable`] to decide whether another attempt makes sense.
pub trait ObjectStore: Send + Sync {
    /// Creates or replaces the object keyed by `(object_type, handle)` and
    /// returns its store id. Keys absent from `fields` are left untouched.
    fn upsert(
        &self,
        object_type: &str,
        handle: &str,
        fields: &[Field],
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Fetches every object of `object_type` with its fields and any media
    /// URLs the store already knows.
    fn query_all(
        &self,
        object_type: &str,
    ) -> impl Future<Output = Result<Vec<RawRecord>, StoreError>> + Send;

    /// Resolves media reference ids to public URLs. Ids that cannot be
    /// resolved yet are omitted from the map.
    fn resolve_references(
        &self,
        ids: &[String],
    ) -> impl Future<Output = Result<HashMap<String, String>, StoreError>> + Send;

    /// Deletes an object by store id and returns the deleted id.
    fn delete(&self, id: &str) -> impl Future<Output = Result<String, StoreError>> + Send;
}
