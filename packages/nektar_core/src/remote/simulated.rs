//! In-process simulated collaborators.
//!
//! Scripted implementations of the service traits, used for pipeline and
//! integration testing without live services. Each one returns configured
//! data, counts its calls, and can be given a one-shot fault to inject on
//! the next call.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::snippets::Snippet;
use super::types::{ConvertOutcome, WireGraph};
use super::{CompileService, DecodeService, RemoteError, SnippetStore};

/// A scripted failure, consumed by the next call to the owning service.
#[derive(Clone, Debug)]
pub enum Fault {
    /// Service unreachable.
    Transport(String),
    /// Service reached, non-success status with a body.
    Status(u16, String),
}

impl Fault {
    fn into_error(self, context: &str) -> RemoteError {
        match self {
            Fault::Transport(message) => RemoteError::Transport(message),
            Fault::Status(status, body) => RemoteError::service(context, status, body),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Decode service returning a fixed XML document.
pub struct SimDecodeService {
    xml: String,
    fault: Mutex<Option<Fault>>,
    calls: AtomicUsize,
}

impl SimDecodeService {
    pub fn new(xml: impl Into<String>) -> Self {
        Self {
            xml: xml.into(),
            fault: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail the next call with the given fault.
    pub fn inject_fault(&self, fault: Fault) {
        *lock(&self.fault) = Some(fault);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecodeService for SimDecodeService {
    async fn decode_to_xml(&self, _payload: &[u8]) -> Result<String, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(fault) = lock(&self.fault).take() {
            return Err(fault.into_error("Decode"));
        }
        Ok(self.xml.clone())
    }
}

/// Compile service answering every request with a configured outcome.
pub struct SimCompileService {
    dsl: Mutex<String>,
    graph: Mutex<WireGraph>,
    fault: Mutex<Option<Fault>>,
    compile_calls: AtomicUsize,
    convert_calls: AtomicUsize,
}

impl SimCompileService {
    pub fn new() -> Self {
        Self {
            dsl: Mutex::new(String::new()),
            graph: Mutex::new(WireGraph::default()),
            fault: Mutex::new(None),
            compile_calls: AtomicUsize::new(0),
            convert_calls: AtomicUsize::new(0),
        }
    }

    /// Graph returned by both `compile_dsl` and `convert_xml`.
    pub fn set_graph(&self, graph: WireGraph) {
        *lock(&self.graph) = graph;
    }

    /// DSL text returned by `convert_xml`.
    pub fn set_decompiled_dsl(&self, dsl: impl Into<String>) {
        *lock(&self.dsl) = dsl.into();
    }

    pub fn inject_fault(&self, fault: Fault) {
        *lock(&self.fault) = Some(fault);
    }

    pub fn compile_calls(&self) -> usize {
        self.compile_calls.load(Ordering::SeqCst)
    }

    pub fn convert_calls(&self) -> usize {
        self.convert_calls.load(Ordering::SeqCst)
    }
}

impl Default for SimCompileService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompileService for SimCompileService {
    async fn compile_dsl(&self, _dsl: &str) -> Result<WireGraph, RemoteError> {
        self.compile_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(fault) = lock(&self.fault).take() {
            return Err(fault.into_error("Compile"));
        }
        Ok(lock(&self.graph).clone())
    }

    async fn convert_xml(&self, _xml: &str) -> Result<ConvertOutcome, RemoteError> {
        self.convert_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(fault) = lock(&self.fault).take() {
            return Err(fault.into_error("Conversion"));
        }
        Ok(ConvertOutcome {
            dsl: lock(&self.dsl).clone(),
            graph: lock(&self.graph).clone(),
        })
    }
}

/// In-memory snippet store with monotonic ids and staggered timestamps, so
/// ordering assertions are deterministic.
pub struct SimSnippetStore {
    snippets: Mutex<Vec<Snippet>>,
    next_id: AtomicI64,
    base_time: DateTime<Utc>,
    fault: Mutex<Option<Fault>>,
}

impl SimSnippetStore {
    pub fn new() -> Self {
        Self {
            snippets: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            base_time: Utc::now(),
            fault: Mutex::new(None),
        }
    }

    pub fn inject_fault(&self, fault: Fault) {
        *lock(&self.fault) = Some(fault);
    }

    pub fn stored(&self) -> Vec<Snippet> {
        lock(&self.snippets).clone()
    }
}

impl Default for SimSnippetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnippetStore for SimSnippetStore {
    async fn list(&self) -> Result<Vec<Snippet>, RemoteError> {
        if let Some(fault) = lock(&self.fault).take() {
            return Err(fault.into_error("List"));
        }
        // Insertion order; ordering is the caller's concern.
        Ok(lock(&self.snippets).clone())
    }

    async fn create(&self, title: &str, content: &str) -> Result<Snippet, RemoteError> {
        if let Some(fault) = lock(&self.fault).take() {
            return Err(fault.into_error("Save"));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let snippet = Snippet {
            id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: self.base_time + Duration::seconds(id),
        };
        lock(&self.snippets).push(snippet.clone());
        Ok(snippet)
    }

    async fn delete(&self, id: i64) -> Result<(), RemoteError> {
        if let Some(fault) = lock(&self.fault).take() {
            return Err(fault.into_error("Delete"));
        }
        lock(&self.snippets).retain(|s| s.id != id);
        Ok(())
    }
}
