//! HTTP client for the hosted record collection.
//!
//! All translation between the crate's models and the backend's camelCase
//! wire schema lives here; nothing outside this module knows the wire names.

use super::{RemoteError, RemoteStore};
use crate::constants::LIST_LIMIT;
use crate::identity::TenantId;
use crate::models::{NewProduct, PackageRecord, Product, Status};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Wire row for the "packages" collection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageRow {
    object_id: String,
    #[serde(default)]
    tracking_num: Option<String>,
    item_name: String,
    #[serde(default)]
    recipient: Option<String>,
    #[serde(default)]
    sender: Option<String>,
    #[serde(default)]
    cost_price: Option<f64>,
    #[serde(default)]
    quantity: Option<u32>,
    status: Status,
    created_at: DateTime<Utc>,
    #[serde(default)]
    product_id: Option<String>,
}

impl From<PackageRow> for PackageRecord {
    fn from(row: PackageRow) -> Self {
        Self {
            id: row.object_id,
            tracking_number: row.tracking_num,
            item_name: row.item_name,
            recipient: row.recipient,
            sender: row.sender,
            cost_price: row.cost_price,
            quantity: row.quantity.unwrap_or(1),
            status: row.status,
            created_at: row.created_at,
            product_id: row.product_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertPackageBody<'a> {
    tenant_id: &'a str,
    tracking_num: Option<&'a str>,
    item_name: &'a str,
    recipient: Option<&'a str>,
    sender: Option<&'a str>,
    cost_price: Option<f64>,
    quantity: u32,
    status: Status,
    created_at: DateTime<Utc>,
    product_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateStatusBody<'a> {
    tenant_id: &'a str,
    status: Status,
}

/// Wire row for the "products" collection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductRow {
    object_id: String,
    name: String,
    last_price: f64,
    #[serde(default)]
    total_quantity: u64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.object_id,
            name: row.name,
            last_price: row.last_price,
            total_quantity: row.total_quantity,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertProductBody<'a> {
    tenant_id: &'a str,
    name: &'a str,
    last_price: f64,
    total_quantity: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePriceBody<'a> {
    tenant_id: &'a str,
    last_price: f64,
    quantity_delta: u64,
}

/// Extract a human-readable message from an error response body.
fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}

/// reqwest-backed implementation of [`RemoteStore`].
#[derive(Debug)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base: reqwest::Url,
}

impl HttpRemoteStore {
    /// Build a client for the collection at `base_url`.
    ///
    /// # Errors
    /// Returns [`RemoteError::Validation`] for an unparseable base URL and
    /// [`RemoteError::Unavailable`] when the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let base = reqwest::Url::parse(base_url).map_err(|err| {
            RemoteError::Validation(format!("invalid remote URL '{}': {}", base_url, err))
        })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RemoteError::Unavailable(format!("client setup failed: {}", err)))?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, RemoteError> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                RemoteError::Validation("remote URL cannot be used as an API base".to_string())
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn check(
        result: Result<reqwest::Response, reqwest::Error>,
        action: &str,
    ) -> Result<reqwest::Response, RemoteError> {
        let response =
            result.map_err(|err| RemoteError::Unavailable(format!("{}: {}", action, err)))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message_for_response(status, &body);
        match status {
            reqwest::StatusCode::NOT_FOUND => Err(RemoteError::NotFound),
            reqwest::StatusCode::BAD_REQUEST | reqwest::StatusCode::UNPROCESSABLE_ENTITY => {
                Err(RemoteError::Validation(message))
            }
            _ => Err(RemoteError::Unavailable(format!(
                "{} failed ({}): {}",
                action, status, message
            ))),
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        action: &str,
    ) -> Result<T, RemoteError> {
        response.json::<T>().await.map_err(|err| {
            RemoteError::Unavailable(format!("{}: malformed response: {}", action, err))
        })
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list_packages(&self, tenant: &TenantId) -> Result<Vec<PackageRecord>, RemoteError> {
        let endpoint = self.endpoint(&["api", "packages"])?;
        let result = self
            .client
            .get(endpoint)
            .query(&[("tenant", tenant.as_str())])
            .query(&[("limit", LIST_LIMIT)])
            .send()
            .await;
        let response = Self::check(result, "list").await?;
        let rows: Vec<PackageRow> = Self::decode(response, "list").await?;
        Ok(rows.into_iter().map(PackageRecord::from).collect())
    }

    async fn insert_package(
        &self,
        tenant: &TenantId,
        draft: &PackageRecord,
    ) -> Result<PackageRecord, RemoteError> {
        let endpoint = self.endpoint(&["api", "packages"])?;
        let body = InsertPackageBody {
            tenant_id: tenant.as_str(),
            tracking_num: draft.tracking_number.as_deref(),
            item_name: &draft.item_name,
            recipient: draft.recipient.as_deref(),
            sender: draft.sender.as_deref(),
            cost_price: draft.cost_price,
            quantity: draft.quantity,
            status: draft.status,
            created_at: draft.created_at,
            product_id: draft.product_id.as_deref(),
        };
        let result = self.client.post(endpoint).json(&body).send().await;
        let response = Self::check(result, "insert").await?;
        let row: PackageRow = Self::decode(response, "insert").await?;
        Ok(row.into())
    }

    async fn update_status(
        &self,
        tenant: &TenantId,
        id: &str,
        status: Status,
    ) -> Result<(), RemoteError> {
        let endpoint = self.endpoint(&["api", "packages", id, "status"])?;
        let body = UpdateStatusBody {
            tenant_id: tenant.as_str(),
            status,
        };
        let result = self.client.put(endpoint).json(&body).send().await;
        Self::check(result, "update status").await?;
        Ok(())
    }

    async fn delete_package(&self, tenant: &TenantId, id: &str) -> Result<(), RemoteError> {
        let endpoint = self.endpoint(&["api", "packages", id])?;
        let result = self
            .client
            .delete(endpoint)
            .query(&[("tenant", tenant.as_str())])
            .send()
            .await;
        Self::check(result, "delete").await?;
        Ok(())
    }

    async fn find_product(
        &self,
        tenant: &TenantId,
        name: &str,
    ) -> Result<Option<Product>, RemoteError> {
        let endpoint = self.endpoint(&["api", "products"])?;
        let result = self
            .client
            .get(endpoint)
            .query(&[("tenant", tenant.as_str()), ("name", name)])
            .send()
            .await;
        let response = Self::check(result, "find product").await?;
        let rows: Vec<ProductRow> = Self::decode(response, "find product").await?;
        Ok(rows.into_iter().next().map(Product::from))
    }

    async fn insert_product(
        &self,
        tenant: &TenantId,
        draft: &NewProduct,
    ) -> Result<Product, RemoteError> {
        let endpoint = self.endpoint(&["api", "products"])?;
        let body = InsertProductBody {
            tenant_id: tenant.as_str(),
            name: &draft.name,
            last_price: draft.last_price,
            total_quantity: draft.quantity,
        };
        let result = self.client.post(endpoint).json(&body).send().await;
        let response = Self::check(result, "insert product").await?;
        let row: ProductRow = Self::decode(response, "insert product").await?;
        Ok(row.into())
    }

    async fn update_product_price(
        &self,
        tenant: &TenantId,
        id: &str,
        last_price: f64,
        quantity_delta: u64,
    ) -> Result<(), RemoteError> {
        let endpoint = self.endpoint(&["api", "products", id, "price"])?;
        let body = UpdatePriceBody {
            tenant_id: tenant.as_str(),
            last_price,
            quantity_delta,
        };
        let result = self.client.put(endpoint).json(&body).send().await;
        Self::check(result, "update product price").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_encodes_reserved_characters() {
        let store =
            HttpRemoteStore::new("http://127.0.0.1:8787", Duration::from_secs(5)).expect("store");
        let url = store
            .endpoint(&["api", "packages", "id/with?reserved#chars"])
            .expect("endpoint");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8787/api/packages/id%2Fwith%3Freserved%23chars"
        );
    }

    #[test]
    fn endpoint_appends_to_existing_base_path() {
        let store = HttpRemoteStore::new("http://127.0.0.1:8787/base", Duration::from_secs(5))
            .expect("store");
        let url = store.endpoint(&["api", "packages"]).expect("endpoint");
        assert_eq!(url.as_str(), "http://127.0.0.1:8787/base/api/packages");
    }

    #[test]
    fn new_rejects_unparseable_base_url() {
        let err = HttpRemoteStore::new("not a url", Duration::from_secs(5))
            .expect_err("bad URL must fail");
        assert!(matches!(err, RemoteError::Validation(_)));
    }

    #[test]
    fn error_message_prefers_json_error_field() {
        let status = reqwest::StatusCode::NOT_FOUND;
        let message = error_message_for_response(status, r#"{"error":"No such record"}"#);
        assert_eq!(message, "No such record");
    }

    #[test]
    fn error_message_uses_reason_for_empty_body() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        let message = error_message_for_response(status, "   ");
        assert_eq!(message, "Bad Request");
    }

    #[test]
    fn package_row_fills_missing_quantity() {
        let row: PackageRow = serde_json::from_value(serde_json::json!({
            "objectId": "R1",
            "itemName": "Socks",
            "status": "ordered",
            "createdAt": "2026-01-05T10:00:00Z"
        }))
        .expect("parse row");
        let record = PackageRecord::from(row);
        assert_eq!(record.id, "R1");
        assert_eq!(record.quantity, 1);
        assert_eq!(record.status, Status::Pending);
    }
}
