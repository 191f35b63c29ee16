//! HTTP clients for the area and conversion collaborators.
//!
//! Thin reqwest wrappers. Response parsing is split into pure functions so
//! it can be tested without a server.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use serde::Deserialize;

use super::convert::ConversionStatus;
use super::repository::{AreaDelta, AreaRecord, AreaRepository, RepositoryError, SaveReceipt};
use crate::config::ZonemapConfig;

// =============================================================================
// CLIENT
// =============================================================================

fn build_client(config: &ZonemapConfig) -> Result<reqwest::Client, RepositoryError> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .build()
        .map_err(|e| RepositoryError::ClientBuild(e.to_string()))
}

/// Read the status and body of a response.
async fn read_response(response: reqwest::Response) -> Result<(u16, String), RepositoryError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| RepositoryError::Request(e.to_string()))?;
    Ok((status, body))
}

/// [`AreaRepository`] backed by the `/api/cad/area` endpoints.
pub struct HttpAreaRepository {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAreaRepository {
    /// # Errors
    ///
    /// Returns [`RepositoryError::ClientBuild`] if the client cannot be built.
    pub fn new(config: &ZonemapConfig) -> Result<Self, RepositoryError> {
        Ok(Self { http: build_client(config)?, base_url: config.api_base_url.clone() })
    }

    fn list_url(&self, model_id: &str) -> String {
        format!("{}/api/cad/area/list/{model_id}", self.base_url)
    }

    fn save_url(&self) -> String {
        format!("{}/api/cad/area/save", self.base_url)
    }
}

#[async_trait::async_trait]
impl AreaRepository for HttpAreaRepository {
    async fn list(&self, model_id: &str) -> Result<Vec<AreaRecord>, RepositoryError> {
        let response = self
            .http
            .get(self.list_url(model_id))
            .send()
            .await
            .map_err(|e| RepositoryError::Request(e.to_string()))?;
        let (status, body) = read_response(response).await?;
        parse_list(status, &body)
    }

    async fn save(&self, delta: &AreaDelta) -> Result<SaveReceipt, RepositoryError> {
        let response = self
            .http
            .post(self.save_url())
            .json(delta)
            .send()
            .await
            .map_err(|e| RepositoryError::Request(e.to_string()))?;
        let (status, body) = read_response(response).await?;
        parse_receipt(status, &body)
    }
}

/// [`ConversionStatus`] backed by `/api/cad/convert/status`.
pub struct HttpConversionStatus {
    http: reqwest::Client,
    base_url: String,
}

impl HttpConversionStatus {
    /// # Errors
    ///
    /// Returns [`RepositoryError::ClientBuild`] if the client cannot be built.
    pub fn new(config: &ZonemapConfig) -> Result<Self, RepositoryError> {
        Ok(Self { http: build_client(config)?, base_url: config.api_base_url.clone() })
    }
}

#[async_trait::async_trait]
impl ConversionStatus for HttpConversionStatus {
    async fn is_converted(&self, file_name: &str) -> Result<bool, RepositoryError> {
        let response = self
            .http
            .get(format!("{}/api/cad/convert/status", self.base_url))
            .query(&[("fileName", file_name)])
            .send()
            .await
            .map_err(|e| RepositoryError::Request(e.to_string()))?;
        let (status, body) = read_response(response).await?;
        parse_conversion(status, &body)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct ListResponse {
    success: bool,
    #[serde(default)]
    areas: Vec<AreaRecord>,
}

#[derive(Deserialize)]
struct ConversionResponse {
    converted: bool,
}

// =============================================================================
// PARSING
// =============================================================================

fn check_status(status: u16, body: &str) -> Result<(), RepositoryError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(RepositoryError::Status { status, body: body.to_string() })
    }
}

fn parse_json<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, RepositoryError> {
    serde_json::from_str(body).map_err(|e| RepositoryError::Parse(e.to_string()))
}

fn parse_list(status: u16, body: &str) -> Result<Vec<AreaRecord>, RepositoryError> {
    check_status(status, body)?;
    let list: ListResponse = parse_json(body)?;
    if !list.success {
        return Err(RepositoryError::Rejected);
    }
    Ok(list.areas)
}

fn parse_receipt(status: u16, body: &str) -> Result<SaveReceipt, RepositoryError> {
    check_status(status, body)?;
    let receipt: SaveReceipt = parse_json(body)?;
    if !receipt.success {
        return Err(RepositoryError::Rejected);
    }
    Ok(receipt)
}

fn parse_conversion(status: u16, body: &str) -> Result<bool, RepositoryError> {
    check_status(status, body)?;
    let reply: ConversionResponse = parse_json(body)?;
    Ok(reply.converted)
}
