//! Persisted topology snippets and the HTTP snippet store.
//!
//! A snippet's `content` is an opaque JSON envelope carrying both the DSL
//! text and the compiled graph, so loading never needs to recompile:
//!
//! ```json
//! {"dsl": "...", "reactFlow": {"nodes": [...], "edges": [...]}}
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::topology::Topology;

use super::types::WireGraph;
use super::{RemoteError, SnippetStore};

/// A persisted topology. `id` and `created_at` are store-assigned;
/// immutable once created except for full deletion.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct SavedEnvelope {
    dsl: String,
    #[serde(rename = "reactFlow")]
    react_flow: WireGraph,
}

/// Serialize a (DSL, graph) pair into snippet content.
pub fn seal_envelope(dsl: &str, graph: &WireGraph) -> Result<String, RemoteError> {
    serde_json::to_string(&SavedEnvelope {
        dsl: dsl.to_string(),
        react_flow: graph.clone(),
    })
    .map_err(|e| RemoteError::Format(e.to_string()))
}

/// Parse snippet content back into the (DSL, Topology) pair. Unparseable
/// JSON and a parsed envelope lacking `dsl`/`reactFlow` fail distinctly;
/// neither ever degrades to a silent empty topology.
pub fn open_envelope(content: &str) -> Result<(String, Topology), RemoteError> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|_| RemoteError::Format("Failed to parse topology data.".to_string()))?;

    let envelope: SavedEnvelope = serde_json::from_value(value).map_err(|_| {
        RemoteError::Format(
            "Selected topology data is corrupted or in an incompatible format.".to_string(),
        )
    })?;

    Ok((envelope.dsl, Topology::from_wire(&envelope.react_flow)))
}

pub struct HttpSnippetStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSnippetStore {
    /// `base_url` is the API root; snippets live under `{base_url}/snippets`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn snippets_url(&self) -> String {
        format!("{}/snippets", self.base_url)
    }
}

#[async_trait]
impl SnippetStore for HttpSnippetStore {
    async fn list(&self) -> Result<Vec<Snippet>, RemoteError> {
        let response = self
            .client
            .get(self.snippets_url())
            .send()
            .await
            .map_err(RemoteError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(RemoteError::transport)?;
        if !status.is_success() {
            return Err(RemoteError::service("List", status.as_u16(), body));
        }

        serde_json::from_str(&body)
            .map_err(|_| RemoteError::Format("Snippet store returned invalid JSON.".to_string()))
    }

    async fn create(&self, title: &str, content: &str) -> Result<Snippet, RemoteError> {
        let response = self
            .client
            .post(self.snippets_url())
            .json(&json!({ "title": title, "content": content }))
            .send()
            .await
            .map_err(RemoteError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(RemoteError::transport)?;
        if !status.is_success() {
            return Err(RemoteError::service("Save", status.as_u16(), body));
        }

        serde_json::from_str(&body)
            .map_err(|_| RemoteError::Format("Snippet store returned invalid JSON.".to_string()))
    }

    async fn delete(&self, id: i64) -> Result<(), RemoteError> {
        let response = self
            .client
            .delete(format!("{}/{}", self.snippets_url(), id))
            .send()
            .await
            .map_err(RemoteError::transport)?;

        let status = response.status();
        // A snippet that is already gone counts as deleted.
        if status.is_success() || status.as_u16() == 404 {
            return Ok(());
        }
        let body = response.text().await.map_err(RemoteError::transport)?;
        Err(RemoteError::service("Delete", status.as_u16(), body))
    }
}
