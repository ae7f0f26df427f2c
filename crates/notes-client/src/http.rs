//! REST transport for the note service.
//!
//! - `GET    {base}/notes?{query}`
//! - `POST   {base}/notes`
//! - `PUT    {base}/notes/{id}` (body without id)
//! - `DELETE {base}/notes/{id}`

use crate::config::Config;
use async_trait::async_trait;
use notes_core::api::Result;
use notes_core::{ApiError, Note, NoteDraft, NoteId, NotesApi};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub struct HttpNotesApi {
    client: Client,
    base_url: Url,
}

impl HttpNotesApi {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended as percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Config only accepts http(s) base URLs, which always have a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn execute(&self, method: &str, url: &Url, request: RequestBuilder) -> Result<Response> {
        debug!("{} {}", method, url);
        let response = request.send().await.map_err(|e| ApiError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T> {
        let body = response.bytes().await.map_err(|e| ApiError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn list(&self, query: &str) -> Result<Vec<Note>> {
        let mut url = self.endpoint(&["notes"]);
        url.set_query(Some(query).filter(|q| !q.is_empty()));

        let response = self
            .execute("GET", &url, self.client.get(url.clone()))
            .await?;
        Self::decode(&url, response).await
    }

    async fn create(&self, draft: &NoteDraft) -> Result<Note> {
        let url = self.endpoint(&["notes"]);
        let response = self
            .execute("POST", &url, self.client.post(url.clone()).json(draft))
            .await?;
        Self::decode(&url, response).await
    }

    async fn update(&self, note: &Note) -> Result<Note> {
        let url = self.endpoint(&["notes", note.id.as_str()]);
        let response = self
            .execute("PUT", &url, self.client.put(url.clone()).json(&note.fields()))
            .await?;
        Self::decode(&url, response).await
    }

    async fn delete(&self, id: &NoteId) -> Result<()> {
        let url = self.endpoint(&["notes", id.as_str()]);
        self.execute("DELETE", &url, self.client.delete(url.clone()))
            .await?;
        Ok(())
    }
}
