//! Backend orders API client (HIGH PRIVILEGE).
//!
//! Unlike the storefront's read-only catalog access, this client carries a
//! token that can mutate order state. Responses are never cached; staff
//! always see the backend's current view.

pub mod types;

use std::future::Future;
use std::sync::Arc;

use marigold_core::{OrderId, OrderStatus};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::instrument;

use crate::config::OrdersApiConfig;
use crate::orders::StatusEndpoint;

use types::{Order, OrderPage, StatusUpdateResponse};

/// Errors that can occur when talking to the backend orders API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status.
    #[error("Backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend refused the requested status change.
    #[error("Status update rejected: {0}")]
    Rejected(String),
}

/// Client for the backend orders REST API.
#[derive(Clone)]
pub struct OrdersClient {
    inner: Arc<OrdersClientInner>,
}

struct OrdersClientInner {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl OrdersClient {
    /// Create a new orders API client.
    #[must_use]
    pub fn new(config: &OrdersApiConfig) -> Self {
        Self {
            inner: Arc::new(OrdersClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_string(),
                api_token: config.api_token.expose_secret().to_string(),
            }),
        }
    }

    /// Decode a response, mapping error statuses to [`ApiError`] variants.
    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY
            || status == reqwest::StatusCode::CONFLICT
        {
            // The backend owns the status transition rules; a refusal is a
            // normal outcome, not a server fault
            return Err(ApiError::Rejected(body.chars().take(200).collect()));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Orders API returned non-success status"
            );
            return Err(ApiError::Status {
                status,
                body: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse orders API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Execute a GET request against an API path and decode the JSON body.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.inner.base_url);

        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(&self.inner.api_token)
            .query(query)
            .send()
            .await?;

        Self::decode(path, response).await
    }

    /// Execute a POST request with a JSON body and decode the response.
    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.inner.base_url);

        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(&self.inner.api_token)
            .json(body)
            .send()
            .await?;

        Self::decode(path, response).await
    }

    /// Liveness probe against the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let url = format!("{}/health", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status {
                status,
                body: String::new(),
            })
        }
    }

    /// Get a paginated list of orders, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        first: Option<u32>,
        after: Option<String>,
        status: Option<OrderStatus>,
    ) -> Result<OrderPage, ApiError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(first) = first {
            params.push(("first", first.to_string()));
        }
        if let Some(after) = &after {
            params.push(("after", after.clone()));
        }
        if let Some(status) = status {
            params.push(("status", status.to_string()));
        }

        self.get("/orders", &params).await
    }

    /// Get a single order by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: &OrderId) -> Result<Order, ApiError> {
        self.get(&format!("/orders/{order_id}"), &[]).await
    }

    /// Submit a status change for an order.
    ///
    /// The backend enforces the transition rules; an invalid transition
    /// comes back as [`ApiError::Rejected`].
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the change or the request fails.
    #[instrument(skip(self), fields(order_id = %order_id, status = %status))]
    pub async fn update_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<StatusUpdateResponse, ApiError> {
        self.post(
            &format!("/orders/{order_id}/status"),
            &json!({ "status": status }),
        )
        .await
    }
}

impl StatusEndpoint for OrdersClient {
    type Error = ApiError;

    fn submit_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        async move {
            self.update_status(order_id, status).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("/orders/ord_42".to_string());
        assert_eq!(err.to_string(), "Not found: /orders/ord_42");

        let err = ApiError::Rejected("cannot ship a cancelled order".to_string());
        assert_eq!(
            err.to_string(),
            "Status update rejected: cannot ship a cancelled order"
        );
    }

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "upstream down".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Backend returned 502 Bad Gateway: upstream down"
        );
    }
}
