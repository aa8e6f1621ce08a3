//! Thin HTTP client over the deal tracker REST API.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: Uuid,
    pub deal_id: String,
    pub customer_name: String,
    pub current_stage: String,
    pub ta_owner: String,
    pub created_at: DateTime<Utc>,
    pub versions: Vec<Version>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub version_number: i32,
    pub use_cases: String,
    pub roadblocks: String,
    pub solution_recommendations: String,
    pub additional_comments: Option<String>,
    pub edited_by: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionBody {
    pub use_cases: String,
    pub roadblocks: String,
    pub solution_recommendations: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_comments: Option<String>,
    pub edited_by: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDealBody {
    pub deal_id: String,
    pub customer_name: String,
    pub current_stage: String,
    #[serde(rename = "TAOwner")]
    pub ta_owner: String,
    pub version: VersionBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendVersionBody {
    pub version: VersionBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<String>,
}

pub struct DealsClient {
    http: reqwest::Client,
    base_url: String,
}

impl DealsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn list(&self) -> Result<Vec<Deal>> {
        let response = self
            .http
            .get(format!("{}/api/deals", self.base_url))
            .send()
            .await
            .context("request to deal tracker failed")?;
        let response = check(response).await?;
        response.json().await.context("malformed deal list")
    }

    /// Resolve a business deal id (e.g. "D-1") to its full record.
    pub async fn find(&self, deal_id: &str) -> Result<Deal> {
        self.list()
            .await?
            .into_iter()
            .find(|d| d.deal_id == deal_id)
            .with_context(|| format!("no deal with id {deal_id}"))
    }

    pub async fn create(&self, body: &CreateDealBody) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/api/deals", self.base_url))
            .json(body)
            .send()
            .await
            .context("request to deal tracker failed")?;
        check(response).await?;
        Ok(())
    }

    pub async fn append(&self, id: Uuid, body: &AppendVersionBody) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/api/deals/{id}/versions", self.base_url))
            .json(body)
            .send()
            .await
            .context("request to deal tracker failed")?;
        check(response).await?;
        Ok(())
    }
}

/// Surface the server's `{"error": ...}` body on failure.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| status_hint(status));
    bail!("server returned {status}: {detail}")
}

fn status_hint(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("unexpected response")
        .to_string()
}
