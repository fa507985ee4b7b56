//! HTTP client for the external decode service.
//!
//! The service takes a base64-encoded binary topology file and answers with
//! base64 of a deflate-compressed UTF-8 XML document. Unwrapping that
//! response is the only decoding this module does; interpreting the XML is
//! the conversion service's job.

use std::io::Read;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use flate2::read::ZlibDecoder;
use serde_json::json;

use super::{DecodeService, RemoteError};

pub struct HttpDecodeService {
    client: reqwest::Client,
    url: String,
}

impl HttpDecodeService {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl DecodeService for HttpDecodeService {
    async fn decode_to_xml(&self, payload: &[u8]) -> Result<String, RemoteError> {
        let request = json!({
            "file": BASE64.encode(payload),
            "action": "decode",
        });

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(RemoteError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(RemoteError::transport)?;
        if !status.is_success() {
            return Err(RemoteError::service("Decode", status.as_u16(), body));
        }

        inflate_xml(&body)
    }
}

/// Unwrap a decode response body: base64, then deflate, then UTF-8.
pub fn inflate_xml(body: &str) -> Result<String, RemoteError> {
    let compressed = BASE64
        .decode(body.trim())
        .map_err(|_| RemoteError::Format("Decode service returned invalid data.".to_string()))?;

    let mut xml_bytes = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut xml_bytes)
        .map_err(|_| RemoteError::Format("Decode service returned invalid data.".to_string()))?;

    String::from_utf8(xml_bytes)
        .map_err(|_| RemoteError::Format("Decoded topology XML is not valid UTF-8.".to_string()))
}
