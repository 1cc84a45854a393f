//! HTTP client for metaobjects on the Shopify Admin GraphQL API.
//!
//! Wraps `reqwest` with typed error handling for both transport failures and
//! GraphQL-level rejections. Every call is a single attempt: transient
//! failures come back as retryable [`StoreError`]s for the caller to handle.

mod queries;
mod response;

use std::collections::HashMap;
use std::time::Duration;

use atelier_core::AppConfig;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::{FieldError, StoreError};
use crate::store::ObjectStore;
use crate::types::{Field, RawRecord};

use response::{DeleteData, GraphQlResponse, QueryAllData, ResolveData, UpsertData};

/// Objects requested per `metaobjects` page.
///
/// The Admin API rejects a query whose requested cost exceeds 1000 points.
/// Each node costs roughly one point per field plus one per nested
/// reference, so the page size and [`REFERENCES_PER_FIELD`] are bounded
/// together.
const PAGE_SIZE: u32 = 50;

/// Media references fetched alongside each field of a queried object.
const REFERENCES_PER_FIELD: u32 = 10;

/// Maximum number of pages to follow before returning an error.
/// Guards against a cursor that never terminates.
pub(super) const MAX_PAGES: usize = 200;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Client for metaobject reads and writes against one store.
///
/// Use [`MetaobjectClient::new`] for a real store or
/// [`MetaobjectClient::with_endpoint`] to point at a mock server in tests.
pub struct MetaobjectClient {
    client: Client,
    endpoint: Url,
    access_token: String,
}

impl MetaobjectClient {
    /// Creates a client for `https://{shop_domain}/admin/api/{api_version}/graphql.json`.
    ///
    /// `shop_domain` may be given with or without a scheme.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`StoreError::InvalidEndpoint`] if the
    /// resulting URL does not parse.
    pub fn new(
        shop_domain: &str,
        api_version: &str,
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, StoreError> {
        let endpoint = admin_endpoint(shop_domain, api_version);
        Self::with_endpoint(&endpoint, access_token, timeout_secs, user_agent)
    }

    /// Creates a client from loaded application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`MetaobjectClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        Self::new(
            &config.shop_domain,
            &config.api_version,
            &config.admin_token,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Creates a client that posts to an explicit GraphQL endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`StoreError::InvalidEndpoint`] if
    /// `endpoint` is not a valid absolute URL.
    pub fn with_endpoint(
        endpoint: &str,
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let endpoint = Url::parse(endpoint).map_err(|e| StoreError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            endpoint,
            access_token: access_token.to_owned(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Posts one GraphQL operation and returns its `data` payload.
    ///
    /// # Errors
    ///
    /// - [`StoreError::RateLimited`] on HTTP 429 or a `THROTTLED` GraphQL error.
    /// - [`StoreError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`StoreError::Http`] on network or TLS failure.
    /// - [`StoreError::GraphQl`] when the response carries top-level errors
    ///   or no data.
    /// - [`StoreError::Deserialize`] if the body does not match `T`.
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, StoreError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(2);
            return Err(StoreError::RateLimited {
                endpoint: self.endpoint.to_string(),
                retry_after_secs,
            });
        }

        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                endpoint: self.endpoint.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: GraphQlResponse<T> =
            serde_json::from_str(&body).map_err(|e| StoreError::Deserialize {
                context: format!("{operation} response"),
                source: e,
            })?;

        if parsed.errors.iter().any(response::GraphQlErrorItem::is_throttled) {
            return Err(StoreError::RateLimited {
                endpoint: self.endpoint.to_string(),
                retry_after_secs: 1,
            });
        }
        if !parsed.errors.is_empty() {
            return Err(StoreError::GraphQl(
                parsed.errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        parsed
            .data
            .ok_or_else(|| StoreError::GraphQl(vec![format!("{operation} returned no data")]))
    }
}

impl ObjectStore for MetaobjectClient {
    async fn upsert(
        &self,
        object_type: &str,
        handle: &str,
        fields: &[Field],
    ) -> Result<String, StoreError> {
        let variables = json!({
            "handle": { "type": object_type, "handle": handle },
            "metaobject": { "fields": fields },
        });
        let data: UpsertData = self
            .execute("metaobjectUpsert", queries::UPSERT, variables)
            .await?;
        let payload = data.metaobject_upsert;

        if !payload.user_errors.is_empty() {
            return Err(StoreError::Validation {
                operation: "metaobjectUpsert".to_owned(),
                errors: payload.user_errors.into_iter().map(FieldError::from).collect(),
            });
        }

        let id = payload
            .metaobject
            .map(|m| m.id)
            .ok_or_else(|| {
                StoreError::GraphQl(vec!["metaobjectUpsert returned no metaobject".to_owned()])
            })?;
        tracing::debug!(
            object_type,
            handle,
            id = %id,
            fields = fields.len(),
            "metaobject upserted"
        );
        Ok(id)
    }

    async fn query_all(&self, object_type: &str) -> Result<Vec<RawRecord>, StoreError> {
        let mut records: Vec<RawRecord> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(StoreError::PaginationLimit {
                    object_type: object_type.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }

            let variables = json!({
                "type": object_type,
                "first": PAGE_SIZE,
                "references": REFERENCES_PER_FIELD,
                "after": cursor,
            });
            let data: QueryAllData = self
                .execute("metaobjects", queries::QUERY_ALL, variables)
                .await?;
            let connection = data.metaobjects;

            records.extend(connection.nodes.into_iter().map(RawRecord::from));

            cursor = connection
                .page_info
                .end_cursor
                .filter(|_| connection.page_info.has_next_page);
            if cursor.is_none() {
                break;
            }
        }

        tracing::debug!(
            object_type,
            count = records.len(),
            pages = page_count,
            "metaobjects fetched"
        );
        Ok(records)
    }

    async fn resolve_references(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, String>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let data: ResolveData = self
            .execute("nodes", queries::RESOLVE, json!({ "ids": ids }))
            .await?;

        let resolved: HashMap<String, String> = data
            .nodes
            .into_iter()
            .flatten()
            .filter_map(|node| {
                let url = node.public_url()?;
                node.id.map(|id| (id, url))
            })
            .collect();
        Ok(resolved)
    }

    async fn delete(&self, id: &str) -> Result<String, StoreError> {
        let data: DeleteData = self
            .execute("metaobjectDelete", queries::DELETE, json!({ "id": id }))
            .await?;
        let payload = data.metaobject_delete;

        if !payload.user_errors.is_empty() {
            return Err(StoreError::Validation {
                operation: "metaobjectDelete".to_owned(),
                errors: payload.user_errors.into_iter().map(FieldError::from).collect(),
            });
        }

        payload.deleted_id.ok_or_else(|| {
            StoreError::GraphQl(vec![format!("metaobjectDelete returned no id for {id}")])
        })
    }
}

/// Builds the Admin GraphQL endpoint for a shop domain.
///
/// Accepts `"shop.myshopify.com"`, `"https://shop.myshopify.com/"` and
/// similar, always producing an `https` URL.
pub(crate) fn admin_endpoint(shop_domain: &str, api_version: &str) -> String {
    let host = shop_domain
        .trim()
        .strip_prefix("https://")
        .or_else(|| shop_domain.trim().strip_prefix("http://"))
        .unwrap_or(shop_domain.trim())
        .trim_end_matches('/');
    format!("https://{host}/admin/api/{api_version}/graphql.json")
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
