//! REST client for the Wisp backend.
//!
//! Wraps the prompt, collection and tag endpoints using [`reqwest`]. Non-2xx
//! answers become [`WispError::Status`], except `401`/`403` which become
//! [`WispError::Unauthorized`]. Transport failures surface as
//! [`WispError::Network`].
//!
//! ```text
//! GET    /user                 current user
//! GET    /prompts              prompts visible to the user
//! POST   /prompts              create            PATCH /prompts/{id}   update
//! DELETE /prompts/{id}         soft delete
//! POST   /prompts/favorite     {promptId} -> {isFavorite}
//! POST   /prompts/save         {promptId} -> {isSaved}
//! POST   /prompts/restore      {promptId}
//! GET    /collections          POST /collections
//! PATCH  /collections/{id}     DELETE /collections/{id}
//! GET    /tags                 distinct tags
//! ```
//!
//! Ids are appended as single percent-encoded path segments, so an id can
//! never address another resource.

use super::Gateway;
use crate::config::WispConfig;
use crate::error::{Result, WispError};
use crate::model::{
    Collection, CollectionInsert, CollectionUpdate, FavoriteState, Prompt, PromptInsert,
    PromptRef, PromptUpdate, SaveState, User,
};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER: &str = "user";
const PROMPTS: &str = "prompts";
const COLLECTIONS: &str = "collections";
const TAGS: &str = "tags";
const FAVORITE: &str = "favorite";
const SAVE: &str = "save";
const RESTORE: &str = "restore";

pub struct HttpGateway {
    client: reqwest::Client,
    api_url: Url,
    access_token: Option<String>,
}

impl HttpGateway {
    /// * `api_url` - Base URL, e.g. `https://wisp.example.com/api`.
    pub fn new(api_url: &str) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Reuses an existing [`reqwest::Client`] and its connection pool.
    pub fn with_client(client: reqwest::Client, api_url: &str) -> Result<Self> {
        let api_url = Url::parse(api_url)
            .map_err(|e| WispError::Config(format!("invalid api-url {}: {}", api_url, e)))?;
        if api_url.cannot_be_a_base() {
            return Err(WispError::Config(format!(
                "invalid api-url {}: not a base URL",
                api_url
            )));
        }
        Ok(Self {
            client,
            api_url,
            access_token: None,
        })
    }

    /// Builds a client with the configured timeout and token.
    pub fn from_config(config: &WispConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let mut gateway = Self::with_client(client, &config.api_url)?;
        gateway.access_token = config.access_token.clone();
        Ok(gateway)
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        // Checked in the constructor: the base always has path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url(segments);
        tracing::debug!(method = method.as_str(), path = url.path(), "gateway request");
        let builder = self.client.request(method, url);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await?;
        Self::ensure_success(response).await
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(WispError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(WispError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
        let response = Self::send(builder).await?;
        Ok(response.json::<T>().await?)
    }

    /// Decodes a JSON array record by record, skipping the ones that do not
    /// decode (e.g. an out-of-set visibility) instead of failing the list.
    async fn parse_records<T: DeserializeOwned>(builder: RequestBuilder) -> Result<Vec<T>> {
        let raw: Vec<serde_json::Value> = Self::parse(builder).await?;
        Ok(decode_records(raw))
    }

    async fn check(builder: RequestBuilder) -> Result<()> {
        Self::send(builder).await?;
        Ok(())
    }
}

pub(crate) fn decode_records<T: DeserializeOwned>(raw: Vec<serde_json::Value>) -> Vec<T> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(position, value)| match serde_json::from_value::<T>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(position, error = %e, "skipping undecodable record");
                None
            }
        })
        .collect()
}

/// Rejects ids the URL path would fold away (`.` and `..` segments are
/// dropped when appended).
fn record_id(id: &str) -> Result<&str> {
    match id {
        "" | "." | ".." => Err(WispError::Validation(format!("Invalid id {:?}", id))),
        _ => Ok(id),
    }
}

fn prompt_ref(prompt_id: &str) -> PromptRef {
    PromptRef {
        prompt_id: prompt_id.to_string(),
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn current_user(&self) -> Result<User> {
        Self::parse(self.request(Method::GET, &[USER])).await
    }

    async fn list_prompts(&self) -> Result<Vec<Prompt>> {
        Self::parse_records(self.request(Method::GET, &[PROMPTS])).await
    }

    async fn create_prompt(&self, insert: &PromptInsert) -> Result<Prompt> {
        Self::parse(self.request(Method::POST, &[PROMPTS]).json(insert)).await
    }

    async fn update_prompt(&self, id: &str, update: &PromptUpdate) -> Result<Prompt> {
        let request = self.request(Method::PATCH, &[PROMPTS, record_id(id)?]);
        Self::parse(request.json(update)).await
    }

    async fn delete_prompt(&self, id: &str) -> Result<()> {
        Self::check(self.request(Method::DELETE, &[PROMPTS, record_id(id)?])).await
    }

    async fn toggle_favorite(&self, prompt_id: &str) -> Result<FavoriteState> {
        let body = prompt_ref(prompt_id);
        Self::parse(self.request(Method::POST, &[PROMPTS, FAVORITE]).json(&body)).await
    }

    async fn toggle_save(&self, prompt_id: &str) -> Result<SaveState> {
        let body = prompt_ref(prompt_id);
        Self::parse(self.request(Method::POST, &[PROMPTS, SAVE]).json(&body)).await
    }

    async fn restore_prompt(&self, prompt_id: &str) -> Result<()> {
        let body = prompt_ref(prompt_id);
        Self::check(self.request(Method::POST, &[PROMPTS, RESTORE]).json(&body)).await
    }

    async fn list_collections(&self) -> Result<Vec<Collection>> {
        Self::parse_records(self.request(Method::GET, &[COLLECTIONS])).await
    }

    async fn create_collection(&self, insert: &CollectionInsert) -> Result<Collection> {
        Self::parse(self.request(Method::POST, &[COLLECTIONS]).json(insert)).await
    }

    async fn update_collection(&self, id: &str, update: &CollectionUpdate) -> Result<Collection> {
        let request = self.request(Method::PATCH, &[COLLECTIONS, record_id(id)?]);
        Self::parse(request.json(update)).await
    }

    async fn delete_collection(&self, id: &str) -> Result<()> {
        Self::check(self.request(Method::DELETE, &[COLLECTIONS, record_id(id)?])).await
    }

    async fn list_tags(&self) -> Result<Vec<String>> {
        Self::parse(self.request(Method::GET, &[TAGS])).await
    }
}
