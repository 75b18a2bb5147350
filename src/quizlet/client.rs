//! Quizlet v2 REST implementation of the gateway

use super::{DataGateway, GatewayError, ItemId, NavItem, SetDetail, Term};
use crate::credential::Credential;
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.quizlet.com/2.0";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the Quizlet HTTP client
#[derive(Debug, Clone)]
pub struct QuizletConfig {
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for QuizletConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl QuizletConfig {
    pub fn from_env() -> Self {
        let timeout_secs = std::env::var("QUIZLET_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_base: std::env::var("QUIZLET_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Build the shared HTTP client; per-user clients borrow it
    pub fn http_client(&self) -> Result<Client, reqwest::Error> {
        Client::builder().timeout(self.timeout).build()
    }
}

// Wire shapes

#[derive(Debug, Deserialize)]
struct ApiSet {
    id: ItemId,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiClass {
    id: ItemId,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiTerm {
    term: String,
    definition: String,
    rank: u32,
}

#[derive(Debug, Deserialize)]
struct ApiSetDetail {
    id: ItemId,
    title: String,
    #[serde(default)]
    terms: Vec<ApiTerm>,
}

impl From<ApiSet> for NavItem {
    fn from(set: ApiSet) -> Self {
        NavItem::new(set.id, set.title)
    }
}

impl From<ApiClass> for NavItem {
    fn from(class: ApiClass) -> Self {
        NavItem::new(class.id, class.name)
    }
}

impl From<ApiSetDetail> for SetDetail {
    fn from(detail: ApiSetDetail) -> Self {
        SetDetail {
            id: detail.id,
            title: detail.title,
            terms: detail
                .terms
                .into_iter()
                .map(|t| Term::new(t.rank, t.term, t.definition))
                .collect(),
        }
    }
}

/// Gateway bound to one linked user
pub struct QuizletClient {
    client: Client,
    base_url: String,
    credential: Credential,
}

impl QuizletClient {
    pub fn new(client: Client, config: &QuizletConfig, credential: Credential) -> Self {
        Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            credential,
        }
    }

    fn user_path(&self, suffix: &str) -> String {
        format!("/users/{}/{suffix}", self.credential.owner_id)
    }

    async fn send(&self, method: Method, path: &str) -> Result<String, GatewayError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .request(method, &url)
            .bearer_auth(&self.credential.access_token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    GatewayError::network(format!("Connection failed: {e}"))
                } else {
                    GatewayError::server(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let body = self.send(Method::GET, path).await?;
        serde_json::from_str(&body).map_err(|e| {
            GatewayError::invalid_response(format!("Failed to parse response: {e} - body: {body}"))
        })
    }
}

fn classify_error(status: StatusCode, body: &str) -> GatewayError {
    match status.as_u16() {
        401 | 403 => GatewayError::auth_expired(format!("Authentication failed: {body}")),
        404 => GatewayError::not_found(format!("Not found: {body}")),
        _ => GatewayError::server(format!("HTTP {status}: {body}")),
    }
}

#[async_trait]
impl DataGateway for QuizletClient {
    async fn list_sets(&self) -> Result<Vec<NavItem>, GatewayError> {
        let sets: Vec<ApiSet> = self.get_json(&self.user_path("sets")).await?;
        Ok(sets.into_iter().map(NavItem::from).collect())
    }

    async fn list_favorites(&self) -> Result<Vec<NavItem>, GatewayError> {
        let sets: Vec<ApiSet> = self.get_json(&self.user_path("favorites")).await?;
        Ok(sets.into_iter().map(NavItem::from).collect())
    }

    async fn list_classes(&self) -> Result<Vec<NavItem>, GatewayError> {
        let classes: Vec<ApiClass> = self.get_json(&self.user_path("classes")).await?;
        Ok(classes.into_iter().map(NavItem::from).collect())
    }

    async fn list_class_sets(&self, class_id: ItemId) -> Result<Vec<NavItem>, GatewayError> {
        let sets: Vec<ApiSet> = self.get_json(&format!("/classes/{class_id}/sets")).await?;
        Ok(sets.into_iter().map(NavItem::from).collect())
    }

    async fn get_set(&self, set_id: ItemId) -> Result<SetDetail, GatewayError> {
        let detail: ApiSetDetail = self.get_json(&format!("/sets/{set_id}")).await?;
        Ok(detail.into())
    }

    async fn set_favorite(&self, set_id: ItemId, favorite: bool) -> Result<(), GatewayError> {
        let method = if favorite { Method::PUT } else { Method::DELETE };
        self.send(method, &self.user_path(&format!("favorites/{set_id}")))
            .await
            .map(|_| ())
    }
}
