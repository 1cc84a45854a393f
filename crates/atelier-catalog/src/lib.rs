//! Catalog persistence over a schemaless remote object store.
//!
//! [`Catalog`] owns both pipelines: writes mint identifiers, upsert field
//! lists and persist resolved media URLs; reads transform raw records into
//! [`ProductView`]s and repair missing media URLs with one batch call.

pub mod error;
pub mod fields;
pub mod poller;
pub mod read;
pub mod write;

use atelier_core::AppConfig;
use atelier_store::ObjectStore;

pub use atelier_core::{Color, CreateProduct, MediaRef, ProductStatus, ProductView, UpdateProduct};
pub use error::CatalogError;
pub use poller::{MediaResolution, PollPolicy};

/// Entry point for catalog operations against one metaobject type.
///
/// Holds no mutable state; concurrent calls never contend with each other.
pub struct Catalog<S> {
    store: S,
    object_type: String,
    poll: PollPolicy,
}

impl<S: ObjectStore> Catalog<S> {
    /// Creates a catalog with the default media polling policy.
    pub fn new(store: S, object_type: impl Into<String>) -> Self {
        Self {
            store,
            object_type: object_type.into(),
            poll: PollPolicy::default(),
        }
    }

    /// Creates a catalog using the object type and polling policy from config.
    pub fn from_config(store: S, config: &AppConfig) -> Self {
        Self::new(store, config.metaobject_type.clone()).with_poll_policy(PollPolicy::new(
            config.media_poll_attempts,
            config.media_poll_interval_ms,
        ))
    }

    #[must_use]
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll
    }
}
