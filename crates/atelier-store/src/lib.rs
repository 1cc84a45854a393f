pub mod client;
pub mod error;
pub mod store;
pub mod types;

pub use client::MetaobjectClient;
pub use error::{FieldError, StoreError};
pub use store::ObjectStore;
pub use types::{Field, RawField, RawRecord, ResolvedReference};
