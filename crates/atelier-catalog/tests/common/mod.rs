//! In-memory [`ObjectStore`] with call counters and failure injection.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use atelier_catalog::{Catalog, PollPolicy};
use atelier_store::{
    Field, FieldError, ObjectStore, RawField, RawRecord, ResolvedReference, StoreError,
};

pub const OBJECT_TYPE: &str = "custom_product";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Upsert,
    QueryAll,
    Resolve,
    Delete,
}

#[derive(Debug, Clone)]
enum Media {
    /// Resolvable on the `n`th resolution request for this id (1-based).
    After { polls: u32, url: String },
    Never,
}

#[derive(Debug, Clone)]
struct Stored {
    id: String,
    object_type: String,
    handle: String,
    fields: Vec<(String, String)>,
}

#[derive(Default)]
struct State {
    records: Vec<Stored>,
    next_id: u64,
    media: HashMap<String, Media>,
    polls: HashMap<String, u32>,
    upserts: Vec<(String, Vec<Field>)>,
    resolve_requests: Vec<Vec<String>>,
    query_calls: usize,
    failing: HashSet<Op>,
    direct_resolution: bool,
    rejected_field: Option<String>,
    resolution_rejected: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

fn unavailable() -> StoreError {
    StoreError::UnexpectedStatus {
        status: 503,
        endpoint: "memory://store".to_owned(),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("memory store lock poisoned")
    }

    /// Registers a reference that resolves on its first poll.
    pub fn media_ready(&self, id: &str, url: &str) {
        self.media_after(id, 1, url);
    }

    /// Registers a reference that resolves on its `polls`th poll.
    pub fn media_after(&self, id: &str, polls: u32, url: &str) {
        self.lock().media.insert(
            id.to_owned(),
            Media::After {
                polls,
                url: url.to_owned(),
            },
        );
    }

    /// Registers a reference that never resolves.
    pub fn media_never(&self, id: &str) {
        self.lock().media.insert(id.to_owned(), Media::Never);
    }

    /// Makes `query_all` attach already-known URLs to media fields.
    pub fn resolve_directly(&self) {
        self.lock().direct_resolution = true;
    }

    /// Rejects any upsert that carries `key` with a field error.
    pub fn reject_field(&self, key: &str) {
        self.lock().rejected_field = Some(key.to_owned());
    }

    /// Makes every resolution request fail with a non-retryable GraphQL error.
    pub fn reject_resolution(&self) {
        self.lock().resolution_rejected = true;
    }

    pub fn fail(&self, op: Op) {
        self.lock().failing.insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.lock().failing.remove(&op);
    }

    /// Seeds a record directly, bypassing upsert accounting.
    pub fn insert_raw(&self, handle: &str, fields: &[(&str, &str)]) -> String {
        let mut state = self.lock();
        state.next_id += 1;
        let id = format!("gid://shopify/Metaobject/{}", state.next_id);
        state.records.push(Stored {
            id: id.clone(),
            object_type: OBJECT_TYPE.to_owned(),
            handle: handle.to_owned(),
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        });
        id
    }

    pub fn value(&self, handle: &str, key: &str) -> Option<String> {
        self.lock()
            .records
            .iter()
            .find(|r| r.handle == handle)
            .and_then(|r| r.fields.iter().find(|(k, _)| k == key))
            .map(|(_, v)| v.clone())
    }

    pub fn record_count(&self) -> usize {
        self.lock().records.len()
    }

    pub fn handles(&self) -> Vec<String> {
        self.lock().records.iter().map(|r| r.handle.clone()).collect()
    }

    pub fn upserts(&self) -> Vec<(String, Vec<Field>)> {
        self.lock().upserts.clone()
    }

    pub fn upsert_count(&self) -> usize {
        self.lock().upserts.len()
    }

    pub fn resolve_requests(&self) -> Vec<Vec<String>> {
        self.lock().resolve_requests.clone()
    }

    pub fn resolve_count(&self) -> usize {
        self.lock().resolve_requests.len()
    }

    pub fn polls_for(&self, id: &str) -> u32 {
        self.lock().polls.get(id).copied().unwrap_or(0)
    }

    pub fn query_count(&self) -> usize {
        self.lock().query_calls
    }
}

fn known_url(state: &State, id: &str) -> Option<String> {
    match state.media.get(id) {
        Some(Media::After { polls, url })
            if state.polls.get(id).copied().unwrap_or(0) >= *polls =>
        {
            Some(url.clone())
        }
        _ => None,
    }
}

/// What the query side already knows: media that is ready without polling,
/// or that polling has already resolved.
fn direct_url(state: &State, id: &str) -> Option<String> {
    match state.media.get(id) {
        Some(Media::After { polls: 0 | 1, url }) => Some(url.clone()),
        _ => known_url(state, id),
    }
}

fn references_for(state: &State, key: &str, value: &str) -> Vec<ResolvedReference> {
    if !state.direct_resolution || (key != "images" && key != "video") {
        return vec![];
    }
    let entries: Vec<String> =
        serde_json::from_str(value).unwrap_or_else(|_| vec![value.to_owned()]);
    entries
        .into_iter()
        .filter(|e| e.starts_with("gid://"))
        .map(|id| ResolvedReference {
            url: direct_url(state, &id),
            id,
        })
        .collect()
}

impl ObjectStore for MemoryStore {
    async fn upsert(
        &self,
        object_type: &str,
        handle: &str,
        fields: &[Field],
    ) -> Result<String, StoreError> {
        let mut state = self.lock();
        if state.failing.contains(&Op::Upsert) {
            return Err(unavailable());
        }
        if let Some(rejected) = &state.rejected_field {
            if let Some(index) = fields.iter().position(|f| &f.key == rejected) {
                return Err(StoreError::Validation {
                    operation: "metaobjectUpsert".to_owned(),
                    errors: vec![FieldError {
                        field: Some(format!("metaobject.fields.{index}.value")),
                        message: format!("{rejected} is invalid"),
                        code: Some("INVALID".to_owned()),
                    }],
                });
            }
        }
        state.upserts.push((handle.to_owned(), fields.to_vec()));

        if let Some(existing) = state
            .records
            .iter_mut()
            .find(|r| r.object_type == object_type && r.handle == handle)
        {
            for field in fields {
                match existing.fields.iter_mut().find(|(k, _)| *k == field.key) {
                    Some(slot) => slot.1.clone_from(&field.value),
                    None => existing
                        .fields
                        .push((field.key.clone(), field.value.clone())),
                }
            }
            return Ok(existing.id.clone());
        }

        state.next_id += 1;
        let id = format!("gid://shopify/Metaobject/{}", state.next_id);
        state.records.push(Stored {
            id: id.clone(),
            object_type: object_type.to_owned(),
            handle: handle.to_owned(),
            fields: fields
                .iter()
                .map(|f| (f.key.clone(), f.value.clone()))
                .collect(),
        });
        Ok(id)
    }

    async fn query_all(&self, object_type: &str) -> Result<Vec<RawRecord>, StoreError> {
        let mut state = self.lock();
        state.query_calls += 1;
        if state.failing.contains(&Op::QueryAll) {
            return Err(unavailable());
        }
        let state = &*state;
        Ok(state
            .records
            .iter()
            .filter(|r| r.object_type == object_type)
            .map(|r| RawRecord {
                id: r.id.clone(),
                handle: r.handle.clone(),
                fields: r
                    .fields
                    .iter()
                    .map(|(k, v)| RawField {
                        key: k.clone(),
                        value: Some(v.clone()),
                        references: references_for(state, k, v),
                    })
                    .collect(),
            })
            .collect())
    }

    async fn resolve_references(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, String>, StoreError> {
        let mut state = self.lock();
        state.resolve_requests.push(ids.to_vec());
        if state.failing.contains(&Op::Resolve) {
            return Err(unavailable());
        }
        if state.resolution_rejected {
            return Err(StoreError::GraphQl(vec![
                "Invalid global id 'gid://shopify/MediaImage/oops'".to_owned(),
            ]));
        }
        for id in ids {
            *state.polls.entry(id.clone()).or_insert(0) += 1;
        }
        Ok(ids
            .iter()
            .filter_map(|id| known_url(&state, id).map(|url| (id.clone(), url)))
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<String, StoreError> {
        let mut state = self.lock();
        if state.failing.contains(&Op::Delete) {
            return Err(unavailable());
        }
        let Some(index) = state.records.iter().position(|r| r.id == id) else {
            return Err(StoreError::Validation {
                operation: "metaobjectDelete".to_owned(),
                errors: vec![FieldError {
                    field: Some("id".to_owned()),
                    message: "Record not found".to_owned(),
                    code: Some("RECORD_NOT_FOUND".to_owned()),
                }],
            });
        };
        state.records.remove(index);
        Ok(id.to_owned())
    }
}

/// A catalog over a fresh store that polls without sleeping.
pub fn catalog(attempts: u32) -> Catalog<MemoryStore> {
    Catalog::new(MemoryStore::new(), OBJECT_TYPE)
        .with_poll_policy(PollPolicy::new(attempts, 0))
}
