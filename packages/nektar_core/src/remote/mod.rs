//! External collaborators: decode service, compiler, snippet store.
//!
//! Each collaborator is a trait so the editing session can run against the
//! HTTP implementations in production and the in-process simulated ones in
//! tests. All of them share one error taxonomy.

pub mod compiler;
pub mod decode;
pub mod simulated;
pub mod snippets;
pub mod types;

pub use compiler::HttpCompileService;
pub use decode::HttpDecodeService;
pub use snippets::{HttpSnippetStore, Snippet};
pub use types::{ConvertOutcome, WireEdge, WireGraph, WireNode, WirePosition};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    /// Service unreachable: connection refused, DNS failure, broken stream.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Service reached but answered with a non-success status.
    #[error("{context} failed: {status} {body}")]
    Service {
        context: String,
        status: u16,
        body: String,
    },

    /// Transport succeeded but the payload is semantically invalid: missing
    /// fields, bad base64, bad compressed data, unparseable envelope.
    #[error("{0}")]
    Format(String),

    /// User input rejected before any network call.
    #[error("{0}")]
    Validation(String),
}

impl RemoteError {
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }

    pub(crate) fn service(context: &str, status: u16, body: impl Into<String>) -> Self {
        Self::Service {
            context: context.to_string(),
            status,
            body: body.into(),
        }
    }
}

/// Turns a proprietary binary topology file into decoded XML text.
#[async_trait]
pub trait DecodeService: Send + Sync {
    /// Submit the raw file payload and return the decompressed UTF-8 XML.
    async fn decode_to_xml(&self, payload: &[u8]) -> Result<String, RemoteError>;
}

/// Converts between DSL text and the graph representation.
#[async_trait]
pub trait CompileService: Send + Sync {
    /// DSL text to graph. An empty node/edge set is an empty topology, not
    /// an error.
    async fn compile_dsl(&self, dsl: &str) -> Result<WireGraph, RemoteError>;

    /// Decoded XML to DSL text plus graph; the decompile tail of the decode
    /// pipeline.
    async fn convert_xml(&self, xml: &str) -> Result<ConvertOutcome, RemoteError>;
}

/// Persisted topology snippets.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Snippet>, RemoteError>;

    /// Store a snippet; `id` and `created_at` are assigned by the store.
    async fn create(&self, title: &str, content: &str) -> Result<Snippet, RemoteError>;

    /// Idempotent from the caller's perspective: deleting an id that is
    /// already gone succeeds.
    async fn delete(&self, id: i64) -> Result<(), RemoteError>;
}
