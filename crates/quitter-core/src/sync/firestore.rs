//! Remote store over the Firestore REST document API.
//!
//! Documents live at
//! `{base}/v1/projects/{project}/databases/(default)/documents/{collection}/{id}`.
//! Merge writes are a `PATCH` with one `updateMask.fieldPaths` entry per
//! top-level field, so fields not listed keep their stored values.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use super::document_codec::{decode_document, encode_document};
use super::remote::RemoteStore;
use crate::error::StoreError;
use crate::storage::SyncSection;

pub struct FirestoreRemoteStore {
    client: reqwest::Client,
    base_url: Url,
    project_id: String,
    api_key: Option<String>,
    id_token: Option<String>,
}

impl FirestoreRemoteStore {
    pub fn new(base_url: &str, project_id: &str, timeout: Duration) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Misconfigured(format!("invalid base_url '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Misconfigured(format!(
                "base_url '{base_url}' cannot carry a path"
            )));
        }
        if project_id.trim().is_empty() {
            return Err(StoreError::Misconfigured("project_id is empty".into()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            project_id: project_id.to_string(),
            api_key: None,
            id_token: None,
        })
    }

    /// Build from the `[sync]` config section.
    pub fn from_config(section: &SyncSection) -> Result<Self, StoreError> {
        let project_id = section
            .project_id
            .as_deref()
            .ok_or_else(|| StoreError::Misconfigured("sync.project_id is not set".into()))?;
        let store = Self::new(
            &section.base_url,
            project_id,
            Duration::from_secs(section.timeout_secs.max(1)),
        )?;
        Ok(store
            .with_api_key(section.api_key.clone())
            .with_id_token(section.id_token.clone()))
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    pub fn with_id_token(mut self, id_token: Option<String>) -> Self {
        self.id_token = id_token.filter(|t| !t.is_empty());
        self
    }

    pub fn document_url(&self, collection: &str, id: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::Misconfigured("base_url cannot carry a path".into()))?;
            segments.pop_if_empty().extend([
                "v1",
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                collection,
                id,
            ]);
        }
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.id_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn error_from(resp: reqwest::Response) -> StoreError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        StoreError::Http { status, body }
    }
}

#[async_trait]
impl RemoteStore for FirestoreRemoteStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let url = self.document_url(collection, id)?;
        let resp = self.authorize(self.client.get(url)).send().await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Self::error_from(resp).await);
        }
        let doc: Value = resp.json().await?;
        Ok(Some(decode_document(&doc)?))
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: &Value,
        merge: bool,
    ) -> Result<(), StoreError> {
        let body = encode_document(data)?;
        let mut url = self.document_url(collection, id)?;
        if merge {
            if let Some(fields) = data.as_object() {
                let mut pairs = url.query_pairs_mut();
                for key in fields.keys() {
                    pairs.append_pair("updateMask.fieldPaths", key);
                }
            }
        }

        let resp = self
            .authorize(self.client.patch(url))
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::error_from(resp).await);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "firestore"
    }
}
