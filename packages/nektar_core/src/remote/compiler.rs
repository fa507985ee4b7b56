//! HTTP client for the compile/conversion service.
//!
//! Two endpoints on the same backend: `compile_dsl` posts DSL text as JSON
//! and gets a graph back; `convert_xml` uploads a decoded XML document as a
//! multipart file and gets both the decompiled DSL and its graph.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

use super::types::{ConvertOutcome, WireGraph};
use super::{CompileService, RemoteError};

pub struct HttpCompileService {
    client: reqwest::Client,
    compile_url: String,
    convert_url: String,
}

impl HttpCompileService {
    pub fn new(compile_url: impl Into<String>, convert_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            compile_url: compile_url.into(),
            convert_url: convert_url.into(),
        }
    }
}

#[derive(Deserialize)]
struct CompileResponse {
    #[serde(default)]
    react_flow: Option<WireGraph>,
}

#[derive(Deserialize)]
struct ConvertResponse {
    #[serde(default)]
    dsl: Option<String>,
    #[serde(default)]
    react_flow: Option<WireGraph>,
}

#[async_trait]
impl CompileService for HttpCompileService {
    async fn compile_dsl(&self, dsl: &str) -> Result<WireGraph, RemoteError> {
        let response = self
            .client
            .post(&self.compile_url)
            .json(&json!({ "dsl": dsl }))
            .send()
            .await
            .map_err(RemoteError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(RemoteError::transport)?;
        if !status.is_success() {
            return Err(RemoteError::service("Compile", status.as_u16(), body));
        }

        let parsed: CompileResponse = serde_json::from_str(&body)
            .map_err(|_| RemoteError::Format("Compile service returned invalid JSON.".to_string()))?;
        parsed.react_flow.ok_or_else(|| {
            RemoteError::Format("Compile result is missing expected data (react_flow).".to_string())
        })
    }

    async fn convert_xml(&self, xml: &str) -> Result<ConvertOutcome, RemoteError> {
        let part = Part::text(xml.to_string())
            .file_name("input.xml")
            .mime_str("application/xml")
            .map_err(|e| RemoteError::Format(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.convert_url)
            .multipart(form)
            .send()
            .await
            .map_err(RemoteError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(RemoteError::transport)?;
        if !status.is_success() {
            return Err(RemoteError::service("Conversion", status.as_u16(), body));
        }

        let parsed: ConvertResponse = serde_json::from_str(&body).map_err(|_| {
            RemoteError::Format("Conversion service returned invalid JSON.".to_string())
        })?;
        match (parsed.dsl, parsed.react_flow) {
            (Some(dsl), Some(graph)) => Ok(ConvertOutcome { dsl, graph }),
            _ => Err(RemoteError::Format(
                "Conversion result is missing expected data (dsl or react_flow).".to_string(),
            )),
        }
    }
}
