//! HTTP transport for the commerce API.

use crate::{
    api::{
        CommerceApi,
        records::{
            ItemRecord, SaleConfirmation, UserRecord, interpret_folder_products, interpret_member,
            interpret_product, interpret_sale,
        },
    },
    config::app::ApiConfig,
    errors::{Error, Result},
};
use reqwest::{Client, RequestBuilder, StatusCode, header::AUTHORIZATION};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
struct SaleLine {
    product_id: i64,
    quantity: i64,
}

#[derive(Debug, Serialize)]
struct Payment {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct SaleRequest {
    user_id: i64,
    items: Vec<SaleLine>,
    payments: Vec<Payment>,
}

/// Client for the Congressus commerce API.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Clone)]
pub struct CongressusClient {
    http: Client,
    base_url: String,
    token: String,
    default_timeout: Duration,
}

impl std::fmt::Debug for CongressusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CongressusClient")
            .field("base_url", &self.base_url)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

impl CongressusClient {
    /// Builds a client from the `[api]` config section and a bearer token.
    ///
    /// # Errors
    /// Returns `Config` if the TLS backend cannot be initialized.
    pub fn new(config: &ApiConfig, token: String) -> Result<Self> {
        let http = Client::builder().build().map_err(|e| Error::Config {
            message: format!("Failed to build HTTP client: {e}"),
        })?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
            default_timeout: config.timeout(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Sends the request and hands back the status and raw body for interpretation.
    async fn send(
        &self,
        request: RequestBuilder,
        timeout: Option<Duration>,
    ) -> Result<(StatusCode, String)> {
        let response = request
            .header(AUTHORIZATION, format!("Bearer:{}", self.token))
            .timeout(timeout.unwrap_or(self.default_timeout))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "Remote responded");
        Ok((status, body))
    }
}

impl CommerceApi for CongressusClient {
    #[instrument(skip(self))]
    async fn fetch_user(
        &self,
        student_number: &str,
        timeout: Option<Duration>,
    ) -> Result<UserRecord> {
        let request = self
            .http
            .get(self.url("members"))
            .query(&[("username", student_number)]);
        let (status, body) = self.send(request, timeout).await?;
        interpret_member(status, &body, student_number)
    }

    #[instrument(skip(self))]
    async fn fetch_product(&self, item_id: i64, timeout: Option<Duration>) -> Result<ItemRecord> {
        let request = self.http.get(self.url(&format!("products/{item_id}")));
        let (status, body) = self.send(request, timeout).await?;
        interpret_product(status, &body, item_id)
    }

    #[instrument(skip(self))]
    async fn fetch_products_in_folder(
        &self,
        folder_id: i64,
        timeout: Option<Duration>,
    ) -> Result<Vec<ItemRecord>> {
        let request = self
            .http
            .get(self.url("products"))
            .query(&[("folder_id", folder_id)]);
        let (status, body) = self.send(request, timeout).await?;
        interpret_folder_products(status, &body, folder_id)
    }

    #[instrument(skip(self))]
    async fn post_sale(
        &self,
        user_id: i64,
        item_id: i64,
        quantity: i64,
        timeout: Option<Duration>,
    ) -> Result<SaleConfirmation> {
        let payload = SaleRequest {
            user_id,
            items: vec![SaleLine {
                product_id: item_id,
                quantity,
            }],
            payments: vec![Payment {
                kind: "direct_debit",
            }],
        };
        let request = self.http.post(self.url("sales")).json(&payload);
        let (status, body) = self.send(request, timeout).await?;
        interpret_sale(status, &body)
    }
}
