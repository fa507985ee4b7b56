//! Local listing of saved topologies.
//!
//! Holds the fetched snippet list so the caller can render it without
//! re-fetching. Deletion updates the listing optimistically on success; a
//! failed delete is reported and leaves the listing as it was.

use std::sync::Arc;

use log::{info, warn};

use crate::remote::{RemoteError, Snippet, SnippetStore};

pub struct Cabinet {
    store: Arc<dyn SnippetStore>,
    snippets: Vec<Snippet>,
    last_error: Option<String>,
}

impl Cabinet {
    pub fn new(store: Arc<dyn SnippetStore>) -> Self {
        Self {
            store,
            snippets: Vec::new(),
            last_error: None,
        }
    }

    /// The listing as of the last refresh, newest first.
    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    pub fn get(&self, id: i64) -> Option<&Snippet> {
        self.snippets.iter().find(|s| s.id == id)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Fetch the listing from the store. The store's order is not trusted:
    /// snippets are sorted newest first by creation time, with the higher
    /// store-assigned id winning a timestamp tie.
    pub async fn refresh(&mut self) -> Result<(), RemoteError> {
        match self.store.list().await {
            Ok(mut snippets) => {
                snippets.sort_by(|a, b| {
                    b.created_at
                        .cmp(&a.created_at)
                        .then_with(|| b.id.cmp(&a.id))
                });
                info!("fetched {} saved topologies", snippets.len());
                self.snippets = snippets;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                warn!("snippet listing failed: {}", err);
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Delete a snippet and drop it from the local listing without a
    /// re-fetch. A failure is recorded and surfaced but the listing keeps
    /// its current contents; the caller may refresh to reconcile.
    pub async fn delete(&mut self, id: i64) -> Result<(), RemoteError> {
        match self.store.delete(id).await {
            Ok(()) => {
                self.snippets.retain(|s| s.id != id);
                info!("deleted snippet {}", id);
                Ok(())
            }
            Err(err) => {
                warn!("delete of snippet {} failed: {}", id, err);
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
