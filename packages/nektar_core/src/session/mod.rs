//! Editing session: the single owner of live topology state.
//!
//! All mutations of the topology, the DSL text, the busy flag and the
//! inspection selection go through this struct, so the model invariants are
//! enforceable at one seam instead of at every call site.
//!
//! Lifecycle: `Empty` (nothing loaded) -> `Loaded` (topology present) ->
//! `Inspecting` (a device detail view is open) -> back to `Loaded` on
//! dismiss. A compile or decode from any state replaces the topology
//! wholesale and returns to `Loaded`; old state is discarded, never merged.
//!
//! Sync is one-directional: recompiling the DSL replaces the graph, but
//! graph edits (delete) never regenerate the DSL. The session therefore
//! keeps two topology values: the live one the canvas renders, mutated by
//! graph edits, and the last compiled/decoded snapshot, which is what a
//! save persists alongside the DSL that produced it.

pub mod cabinet;
pub mod canvas;

pub use cabinet::Cabinet;
pub use canvas::{Canvas, CanvasEdge, CanvasNode};

use std::sync::Arc;

use log::{info, warn};

use crate::remote::snippets::{open_envelope, seal_envelope};
use crate::remote::types::WireGraph;
use crate::remote::{CompileService, DecodeService, RemoteError, Snippet, SnippetStore};
use crate::topology::{Device, Topology};

/// Lifecycle state of the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorState {
    Empty,
    Loaded,
    Inspecting,
}

/// A topology file picked by the user, waiting to be decoded.
#[derive(Clone, Debug)]
pub struct PendingFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub struct EditorSession {
    decoder: Arc<dyn DecodeService>,
    compiler: Arc<dyn CompileService>,
    store: Arc<dyn SnippetStore>,

    /// Live working state, mutated by graph edits.
    topology: Option<Topology>,
    /// Last compile/decode output, replaced wholesale, never edited.
    compiled: Option<Topology>,
    dsl: String,
    inspected: Option<Device>,
    pending_file: Option<PendingFile>,
    busy: bool,
    last_error: Option<String>,
}

impl EditorSession {
    pub fn new(
        decoder: Arc<dyn DecodeService>,
        compiler: Arc<dyn CompileService>,
        store: Arc<dyn SnippetStore>,
    ) -> Self {
        Self {
            decoder,
            compiler,
            store,
            topology: None,
            compiled: None,
            dsl: String::new(),
            inspected: None,
            pending_file: None,
            busy: false,
            last_error: None,
        }
    }

    pub fn state(&self) -> EditorState {
        match (&self.topology, &self.inspected) {
            (None, _) => EditorState::Empty,
            (Some(_), None) => EditorState::Loaded,
            (Some(_), Some(_)) => EditorState::Inspecting,
        }
    }

    pub fn dsl(&self) -> &str {
        &self.dsl
    }

    /// The text editor reports its current contents here. Editing text does
    /// not touch the graph until the next compile.
    pub fn set_dsl(&mut self, text: impl Into<String>) {
        self.dsl = text.into();
    }

    pub fn topology(&self) -> Option<&Topology> {
        self.topology.as_ref()
    }

    pub fn inspected(&self) -> Option<&Device> {
        self.inspected.as_ref()
    }

    pub fn pending_file(&self) -> Option<&PendingFile> {
        self.pending_file.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Render projection of the live topology.
    pub fn canvas(&self) -> Canvas {
        self.topology
            .as_ref()
            .map(Canvas::project)
            .unwrap_or_else(Canvas::empty)
    }

    /// Pick a topology file for the next decode. Rejected while a pipeline
    /// is in flight; clears the error surface on success.
    pub fn select_file(
        &mut self,
        name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<(), RemoteError> {
        self.ensure_idle()?;
        self.pending_file = Some(PendingFile {
            name: name.into(),
            bytes,
        });
        self.last_error = None;
        Ok(())
    }

    pub fn clear_file(&mut self) {
        self.pending_file = None;
    }

    /// Decode the selected file and install the resulting (DSL, topology)
    /// pair. On any failure the previous pair is cleared; a partial or
    /// stale mix is never left visible.
    pub async fn decode_file(&mut self) -> Result<(), RemoteError> {
        self.ensure_idle()?;
        let file = self
            .pending_file
            .clone()
            .ok_or_else(|| RemoteError::Validation("No topology file selected.".to_string()))?;

        self.busy = true;
        self.last_error = None;
        self.install(None, String::new());

        info!("decoding topology file {}", file.name);
        let result = self.run_decode(&file.bytes).await;
        self.busy = false;

        match result {
            Ok((dsl, topology)) => {
                info!(
                    "decoded {}: {} devices, {} links",
                    file.name,
                    topology.device_count(),
                    topology.link_count()
                );
                self.install(Some(topology), dsl);
                Ok(())
            }
            Err(err) => {
                warn!("decode of {} failed: {}", file.name, err);
                self.install(None, String::new());
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    async fn run_decode(&self, payload: &[u8]) -> Result<(String, Topology), RemoteError> {
        let xml = self.decoder.decode_to_xml(payload).await?;
        let outcome = self.compiler.convert_xml(&xml).await?;
        Ok((outcome.dsl, Topology::from_wire(&outcome.graph)))
    }

    /// Compile the current DSL text and replace the topology wholesale.
    /// Empty or whitespace-only DSL is a no-op that never reaches the
    /// service. On failure the rendered topology is cleared but the DSL
    /// text survives for the user to fix and retry.
    pub async fn compile(&mut self) -> Result<(), RemoteError> {
        if self.dsl.trim().is_empty() {
            return Ok(());
        }
        self.ensure_idle()?;

        self.busy = true;
        self.last_error = None;
        let result = self.compiler.compile_dsl(&self.dsl).await;
        self.busy = false;

        match result {
            Ok(graph) => {
                let topology = Topology::from_wire(&graph);
                info!(
                    "compiled DSL: {} devices, {} links",
                    topology.device_count(),
                    topology.link_count()
                );
                let dsl = self.dsl.clone();
                self.install(Some(topology), dsl);
                Ok(())
            }
            Err(err) => {
                warn!("compile failed: {}", err);
                self.topology = None;
                self.compiled = None;
                self.inspected = None;
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Open a device's detail view. Returns a snapshot of its fields, or
    /// `None` (no state change) if the id is unknown.
    pub fn select_device(&mut self, id: i64) -> Option<Device> {
        let device = self.topology.as_ref()?.device(id)?.clone();
        self.inspected = Some(device.clone());
        Some(device)
    }

    pub fn dismiss_inspection(&mut self) {
        self.inspected = None;
    }

    /// Remove a device and every link incident to it from the live
    /// topology. Confirmation is the caller's concern. If the removed
    /// device was under inspection the detail view is dropped. The DSL text
    /// is deliberately not regenerated.
    pub fn delete_device(&mut self, id: i64) -> bool {
        let Some(topology) = self.topology.as_mut() else {
            return false;
        };
        let removed = topology.cascade_delete(id);
        if removed && self.inspected.as_ref().map(|d| d.id) == Some(id) {
            self.inspected = None;
        }
        removed
    }

    /// Persist the current (DSL, last compiled topology) pair under a
    /// title. Both the title and the DSL must be non-empty; a topology with
    /// no DSL representation cannot be reloaded and is not a valid save
    /// target.
    pub async fn save(&mut self, title: &str) -> Result<Snippet, RemoteError> {
        self.ensure_idle()?;
        if title.trim().is_empty() {
            return Err(RemoteError::Validation(
                "A title is required to save a topology.".to_string(),
            ));
        }
        if self.dsl.trim().is_empty() {
            return Err(RemoteError::Validation(
                "Cannot save a topology with no DSL content.".to_string(),
            ));
        }

        let graph = self
            .compiled
            .as_ref()
            .map(Topology::to_wire)
            .unwrap_or_else(WireGraph::default);
        let content = seal_envelope(&self.dsl, &graph)?;

        self.busy = true;
        self.last_error = None;
        let result = self.store.create(title, &content).await;
        self.busy = false;

        match result {
            Ok(snippet) => {
                info!("saved topology '{}' as snippet {}", title, snippet.id);
                Ok(snippet)
            }
            Err(err) => {
                warn!("save of '{}' failed: {}", title, err);
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Restore a saved (DSL, topology) pair from a snippet, through the
    /// same wholesale-replacement path as a fresh compile. A corrupt
    /// envelope fails without touching the current state.
    pub fn load_snippet(&mut self, snippet: &Snippet) -> Result<(), RemoteError> {
        match open_envelope(&snippet.content) {
            Ok((dsl, topology)) => {
                info!(
                    "loaded snippet {} '{}': {} devices, {} links",
                    snippet.id,
                    snippet.title,
                    topology.device_count(),
                    topology.link_count()
                );
                self.install(Some(topology), dsl);
                self.pending_file = None;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                warn!("load of snippet {} failed: {}", snippet.id, err);
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Wholesale replacement of the (topology, DSL) pair. Drops any open
    /// inspection; both the live topology and the compiled snapshot start
    /// out identical.
    fn install(&mut self, topology: Option<Topology>, dsl: String) {
        self.compiled = topology.clone();
        self.topology = topology;
        self.dsl = dsl;
        self.inspected = None;
    }

    fn ensure_idle(&self) -> Result<(), RemoteError> {
        if self.busy {
            return Err(RemoteError::Validation(
                "Another operation is in progress.".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::simulated::{Fault, SimCompileService, SimDecodeService, SimSnippetStore};
    use crate::remote::types::{WireEdge, WireNode};

    struct Fixture {
        session: EditorSession,
        decoder: Arc<SimDecodeService>,
        compiler: Arc<SimCompileService>,
        store: Arc<SimSnippetStore>,
    }

    fn make_fixture() -> Fixture {
        let decoder = Arc::new(SimDecodeService::new("<NETWORK/>"));
        let compiler = Arc::new(SimCompileService::new());
        let store = Arc::new(SimSnippetStore::new());
        let session = EditorSession::new(decoder.clone(), compiler.clone(), store.clone());
        Fixture {
            session,
            decoder,
            compiler,
            store,
        }
    }

    fn sample_graph() -> WireGraph {
        WireGraph {
            nodes: [1, 3, 5]
                .iter()
                .map(|id| WireNode {
                    id: Some(id.to_string()),
                    ..Default::default()
                })
                .collect(),
            edges: vec![
                WireEdge {
                    source: Some("1".to_string()),
                    target: Some("3".to_string()),
                },
                WireEdge {
                    source: Some("3".to_string()),
                    target: Some("5".to_string()),
                },
            ],
        }
    }

    #[test]
    fn test_new_session_is_empty() {
        let fixture = make_fixture();
        assert_eq!(fixture.session.state(), EditorState::Empty);
        assert_eq!(fixture.session.dsl(), "");
        assert!(fixture.session.canvas().nodes.is_empty());
        assert!(!fixture.session.is_busy());
    }

    #[tokio::test]
    async fn test_compile_replaces_topology_wholesale() {
        let mut fixture = make_fixture();
        fixture.compiler.set_graph(sample_graph());
        fixture.session.set_dsl("router r1");

        fixture.session.compile().await.unwrap();

        assert_eq!(fixture.session.state(), EditorState::Loaded);
        assert_eq!(fixture.session.dsl(), "router r1");
        let topology = fixture.session.topology().unwrap();
        assert_eq!(topology.device_count(), 3);
        assert_eq!(topology.link_count(), 2);

        // Recompile with a different graph: old state is discarded, not merged.
        fixture.compiler.set_graph(WireGraph {
            nodes: vec![WireNode {
                id: Some("9".to_string()),
                ..Default::default()
            }],
            edges: vec![],
        });
        fixture.session.compile().await.unwrap();
        let topology = fixture.session.topology().unwrap();
        assert_eq!(topology.device_count(), 1);
        assert!(topology.device(9).is_some());
    }

    #[tokio::test]
    async fn test_compile_with_blank_dsl_never_calls_service() {
        let mut fixture = make_fixture();
        fixture.session.set_dsl("   \n  ");

        fixture.session.compile().await.unwrap();

        assert_eq!(fixture.compiler.compile_calls(), 0);
        assert_eq!(fixture.session.state(), EditorState::Empty);
    }

    #[tokio::test]
    async fn test_compile_failure_clears_topology_keeps_dsl() {
        let mut fixture = make_fixture();
        fixture.compiler.set_graph(sample_graph());
        fixture.session.set_dsl("router r1");
        fixture.session.compile().await.unwrap();

        fixture
            .compiler
            .inject_fault(Fault::Status(422, "syntax error on line 1".to_string()));
        let err = fixture.session.compile().await.unwrap_err();

        assert_eq!(err.to_string(), "Compile failed: 422 syntax error on line 1");
        assert_eq!(fixture.session.state(), EditorState::Empty);
        assert_eq!(fixture.session.dsl(), "router r1");
        assert_eq!(
            fixture.session.last_error(),
            Some("Compile failed: 422 syntax error on line 1")
        );
        assert!(!fixture.session.is_busy());
    }

    #[tokio::test]
    async fn test_decode_pipeline_installs_dsl_and_topology() {
        let mut fixture = make_fixture();
        fixture.compiler.set_graph(sample_graph());
        fixture.compiler.set_decompiled_dsl("router r1\nrouter r3");

        fixture
            .session
            .select_file("lab.pkt", vec![1, 2, 3])
            .unwrap();
        fixture.session.decode_file().await.unwrap();

        assert_eq!(fixture.decoder.calls(), 1);
        assert_eq!(fixture.compiler.convert_calls(), 1);
        assert_eq!(fixture.session.state(), EditorState::Loaded);
        assert_eq!(fixture.session.dsl(), "router r1\nrouter r3");
        assert_eq!(fixture.session.topology().unwrap().device_count(), 3);
    }

    #[tokio::test]
    async fn test_decode_failure_clears_everything() {
        let mut fixture = make_fixture();
        fixture.compiler.set_graph(sample_graph());
        fixture.session.set_dsl("stale dsl");
        fixture.session.compile().await.unwrap();

        fixture
            .decoder
            .inject_fault(Fault::Status(500, "bad file".to_string()));
        fixture
            .session
            .select_file("broken.pkt", vec![0xff])
            .unwrap();
        let err = fixture.session.decode_file().await.unwrap_err();

        assert_eq!(err.to_string(), "Decode failed: 500 bad file");
        assert_eq!(fixture.session.state(), EditorState::Empty);
        assert_eq!(fixture.session.dsl(), "");
        assert_eq!(fixture.session.last_error(), Some("Decode failed: 500 bad file"));
    }

    #[tokio::test]
    async fn test_decode_without_file_is_rejected() {
        let mut fixture = make_fixture();
        let err = fixture.session.decode_file().await.unwrap_err();
        assert!(matches!(err, RemoteError::Validation(_)));
        assert_eq!(fixture.decoder.calls(), 0);
    }

    #[tokio::test]
    async fn test_inspection_lifecycle() {
        let mut fixture = make_fixture();
        fixture.compiler.set_graph(sample_graph());
        fixture.session.set_dsl("router r1");
        fixture.session.compile().await.unwrap();

        let snapshot = fixture.session.select_device(3).unwrap();
        assert_eq!(snapshot.id, 3);
        assert_eq!(fixture.session.state(), EditorState::Inspecting);

        fixture.session.dismiss_inspection();
        assert_eq!(fixture.session.state(), EditorState::Loaded);

        // Unknown id: no snapshot, no state change.
        assert!(fixture.session.select_device(42).is_none());
        assert_eq!(fixture.session.state(), EditorState::Loaded);
    }

    #[tokio::test]
    async fn test_delete_device_cascades_and_drops_inspection() {
        let mut fixture = make_fixture();
        fixture.compiler.set_graph(sample_graph());
        fixture.session.set_dsl("router r1");
        fixture.session.compile().await.unwrap();
        fixture.session.select_device(3).unwrap();

        assert!(fixture.session.delete_device(3));

        assert_eq!(fixture.session.state(), EditorState::Loaded);
        let topology = fixture.session.topology().unwrap();
        assert_eq!(topology.device_count(), 2);
        assert_eq!(topology.link_count(), 0);

        // The DSL pane is deliberately left alone by graph edits.
        assert_eq!(fixture.session.dsl(), "router r1");
        // Deleting again is a no-op.
        assert!(!fixture.session.delete_device(3));
    }

    #[tokio::test]
    async fn test_recompile_drops_open_inspection() {
        let mut fixture = make_fixture();
        fixture.compiler.set_graph(sample_graph());
        fixture.session.set_dsl("router r1");
        fixture.session.compile().await.unwrap();
        fixture.session.select_device(1).unwrap();

        fixture.session.compile().await.unwrap();
        assert_eq!(fixture.session.state(), EditorState::Loaded);
    }

    #[tokio::test]
    async fn test_save_requires_title_and_dsl() {
        let mut fixture = make_fixture();
        fixture.compiler.set_graph(sample_graph());
        fixture.session.set_dsl("router r1");
        fixture.session.compile().await.unwrap();

        let err = fixture.session.save("  ").await.unwrap_err();
        assert!(matches!(err, RemoteError::Validation(_)));

        fixture.session.set_dsl("");
        let err = fixture.session.save("my lab").await.unwrap_err();
        assert!(matches!(err, RemoteError::Validation(_)));

        assert!(fixture.store.stored().is_empty());
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let mut fixture = make_fixture();
        fixture.compiler.set_graph(sample_graph());
        fixture.session.set_dsl("router r1\nlink r1 r3");
        fixture.session.compile().await.unwrap();
        let saved_topology = fixture.session.topology().unwrap().clone();

        let snippet = fixture.session.save("my lab").await.unwrap();
        assert_eq!(snippet.title, "my lab");

        // A fresh session restores the identical pair from the snippet alone.
        let mut other = EditorSession::new(
            fixture.decoder.clone(),
            fixture.compiler.clone(),
            fixture.store.clone(),
        );
        other.load_snippet(&snippet).unwrap();
        assert_eq!(other.dsl(), "router r1\nlink r1 r3");
        assert_eq!(other.topology().unwrap(), &saved_topology);
        assert_eq!(other.state(), EditorState::Loaded);
    }

    #[tokio::test]
    async fn test_save_persists_compiled_snapshot_not_graph_edits() {
        let mut fixture = make_fixture();
        fixture.compiler.set_graph(sample_graph());
        fixture.session.set_dsl("router r1");
        fixture.session.compile().await.unwrap();

        // Graph-only edit: the live topology changes, the snapshot does not.
        fixture.session.delete_device(3);
        assert_eq!(fixture.session.topology().unwrap().device_count(), 2);

        let snippet = fixture.session.save("edited lab").await.unwrap();
        let (_, persisted) =
            crate::remote::snippets::open_envelope(&snippet.content).unwrap();
        assert_eq!(persisted.device_count(), 3);
        assert_eq!(persisted.link_count(), 2);
    }

    #[tokio::test]
    async fn test_load_corrupt_snippet_leaves_state_untouched() {
        let mut fixture = make_fixture();
        fixture.compiler.set_graph(sample_graph());
        fixture.session.set_dsl("router r1");
        fixture.session.compile().await.unwrap();

        let snippet = Snippet {
            id: 99,
            title: "corrupt".to_string(),
            content: "{not json".to_string(),
            created_at: chrono::Utc::now(),
        };
        let err = fixture.session.load_snippet(&snippet).unwrap_err();

        assert!(matches!(err, RemoteError::Format(_)));
        assert_eq!(fixture.session.state(), EditorState::Loaded);
        assert_eq!(fixture.session.topology().unwrap().device_count(), 3);
        assert_eq!(fixture.session.dsl(), "router r1");
    }

    #[tokio::test]
    async fn test_busy_session_rejects_new_pipelines() {
        let mut fixture = make_fixture();
        fixture.session.set_dsl("router r1");
        fixture.session.busy = true;

        assert!(matches!(
            fixture.session.compile().await.unwrap_err(),
            RemoteError::Validation(_)
        ));
        assert!(matches!(
            fixture.session.select_file("x.pkt", vec![]).unwrap_err(),
            RemoteError::Validation(_)
        ));
        assert!(matches!(
            fixture.session.save("title").await.unwrap_err(),
            RemoteError::Validation(_)
        ));
        assert_eq!(fixture.compiler.compile_calls(), 0);
        assert!(fixture.store.stored().is_empty());
    }

    #[tokio::test]
    async fn test_selecting_a_file_clears_the_error_surface() {
        let mut fixture = make_fixture();
        fixture
            .compiler
            .inject_fault(Fault::Transport("connection refused".to_string()));
        fixture.session.set_dsl("router r1");
        fixture.session.compile().await.unwrap_err();
        assert!(fixture.session.last_error().is_some());

        fixture.session.select_file("next.pkt", vec![1]).unwrap();
        assert!(fixture.session.last_error().is_none());
    }
}
