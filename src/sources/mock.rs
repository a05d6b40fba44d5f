//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::models::{CitationHandle, RawCitingWork, RawPublication};
use crate::sources::{CitationSource, SourceError};

/// A mock source for testing that returns predefined responses.
#[derive(Debug, Default)]
pub struct MockSource {
    publications: Mutex<Vec<RawPublication>>,
    citing_works: Mutex<HashMap<CitationHandle, Vec<RawCitingWork>>>,
    failing_handles: Mutex<HashSet<CitationHandle>>,
    fail_publications: Mutex<bool>,
    requested: Mutex<Vec<CitationHandle>>,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a publication to return from `list_publications`.
    pub fn add_publication(&self, publication: RawPublication) {
        self.publications.lock().unwrap().push(publication);
    }

    /// Set the citing works returned for a handle.
    pub fn set_citing_works(&self, handle: &str, works: Vec<RawCitingWork>) {
        self.citing_works
            .lock()
            .unwrap()
            .insert(CitationHandle::new(handle), works);
    }

    /// Make `list_citing_works` fail for a handle.
    pub fn fail_handle(&self, handle: &str) {
        self.failing_handles
            .lock()
            .unwrap()
            .insert(CitationHandle::new(handle));
    }

    /// Make `list_publications` fail.
    pub fn fail_publications(&self) {
        *self.fail_publications.lock().unwrap() = true;
    }

    /// Handles requested so far, in call order.
    pub fn requested_handles(&self) -> Vec<CitationHandle> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl CitationSource for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn list_publications(&self) -> Result<Vec<RawPublication>, SourceError> {
        if *self.fail_publications.lock().unwrap() {
            return Err(SourceError::Network("mock publication listing failed".to_string()));
        }
        Ok(self.publications.lock().unwrap().clone())
    }

    async fn list_citing_works(
        &self,
        handle: &CitationHandle,
        max_results: usize,
    ) -> Result<Vec<RawCitingWork>, SourceError> {
        self.requested.lock().unwrap().push(handle.clone());

        if self.failing_handles.lock().unwrap().contains(handle) {
            return Err(SourceError::Blocked("Mock Source".to_string()));
        }

        let guard = self.citing_works.lock().unwrap();
        Ok(guard
            .get(handle)
            .map(|works| works.iter().take(max_results).cloned().collect())
            .unwrap_or_default())
    }
}

/// Helper function to create a raw citing work for testing.
pub fn make_citing_work(title: &str, authors: &str) -> RawCitingWork {
    RawCitingWork {
        title: title.to_string(),
        authors: authors.to_string(),
    }
}
