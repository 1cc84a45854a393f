//! Serde shapes for Admin API responses.

use serde::Deserialize;

use crate::error::FieldError;
use crate::types::{RawField, RawRecord, ResolvedReference};

#[derive(Debug, Deserialize)]
pub(super) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphQlErrorItem {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphQlErrorExtensions {
    #[serde(default)]
    pub code: Option<String>,
}

impl GraphQlErrorItem {
    pub fn is_throttled(&self) -> bool {
        self.extensions.as_ref().and_then(|e| e.code.as_deref()) == Some("THROTTLED")
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl From<UserError> for FieldError {
    fn from(e: UserError) -> Self {
        FieldError {
            field: e.field.filter(|f| !f.is_empty()).map(|f| f.join(".")),
            message: e.message,
            code: e.code,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpsertData {
    pub metaobject_upsert: UpsertPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpsertPayload {
    pub metaobject: Option<MetaobjectRef>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MetaobjectRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeleteData {
    pub metaobject_delete: DeletePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeletePayload {
    pub deleted_id: Option<String>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QueryAllData {
    pub metaobjects: MetaobjectConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MetaobjectConnection {
    pub nodes: Vec<MetaobjectNode>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MetaobjectNode {
    pub id: String,
    pub handle: String,
    #[serde(default)]
    pub fields: Vec<FieldNode>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FieldNode {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub reference: Option<MediaNode>,
    #[serde(default)]
    pub references: Option<MediaConnection>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MediaConnection {
    #[serde(default)]
    pub nodes: Vec<MediaNode>,
}

/// A `MediaImage`, `Video` or `GenericFile`. Other reference types
/// deserialize with every field empty and are skipped.
#[derive(Debug, Default, Deserialize)]
pub(super) struct MediaNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub image: Option<UrlHolder>,
    #[serde(default)]
    pub sources: Option<Vec<UrlHolder>>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UrlHolder {
    #[serde(default)]
    pub url: Option<String>,
}

impl MediaNode {
    /// The asset's public URL, once the store has derived one.
    pub fn public_url(&self) -> Option<String> {
        self.image
            .as_ref()
            .and_then(|i| i.url.clone())
            .or_else(|| {
                self.sources
                    .as_ref()
                    .and_then(|s| s.iter().find_map(|src| src.url.clone()))
            })
            .or_else(|| self.url.clone())
            .filter(|u| !u.is_empty())
    }

    fn into_reference(self) -> Option<ResolvedReference> {
        let url = self.public_url();
        self.id.map(|id| ResolvedReference { id, url })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ResolveData {
    #[serde(default)]
    pub nodes: Vec<Option<MediaNode>>,
}

impl From<MetaobjectNode> for RawRecord {
    fn from(node: MetaobjectNode) -> Self {
        let fields = node
            .fields
            .into_iter()
            .map(|f| {
                let mut references: Vec<ResolvedReference> = f
                    .reference
                    .into_iter()
                    .filter_map(MediaNode::into_reference)
                    .collect();
                if let Some(list) = f.references {
                    references.extend(list.nodes.into_iter().filter_map(MediaNode::into_reference));
                }
                RawField {
                    key: f.key,
                    value: f.value,
                    references,
                }
            })
            .collect();

        RawRecord {
            id: node.id,
            handle: node.handle,
            fields,
        }
    }
}
