//! Service endpoint configuration.

use serde::{Deserialize, Serialize};

/// Endpoints of the three external collaborators. Defaults point at the
/// deployed decode lambda and a locally running compiler backend.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ServiceConfig {
    /// Decode service: binary topology file in, compressed XML out.
    pub decode_url: String,
    /// DSL-to-graph compile endpoint.
    pub compile_url: String,
    /// XML-to-DSL/graph conversion endpoint.
    pub convert_url: String,
    /// API root of the snippet store; snippets live under `/snippets`.
    pub api_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            decode_url: "https://1nlsyfjbcb.execute-api.eu-south-1.amazonaws.com/default/pka2xml"
                .to_string(),
            compile_url: "http://127.0.0.1:5000/reactflow".to_string(),
            convert_url: "http://127.0.0.1:5000/api/convert".to_string(),
            api_url: "http://127.0.0.1:5000/api".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Defaults overridden by `NEKTAR_DECODE_URL`, `NEKTAR_COMPILE_URL`,
    /// `NEKTAR_CONVERT_URL` and `NEKTAR_API_URL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            decode_url: get("NEKTAR_DECODE_URL").unwrap_or(defaults.decode_url),
            compile_url: get("NEKTAR_COMPILE_URL").unwrap_or(defaults.compile_url),
            convert_url: get("NEKTAR_CONVERT_URL").unwrap_or(defaults.convert_url),
            api_url: get("NEKTAR_API_URL").unwrap_or(defaults.api_url),
        }
    }
}
