use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{ContentError, ContentSource, WorkMetadata};
use crate::constants::WorkId;

#[derive(Default)]
struct MockState {
    bodies: HashMap<WorkId, String>,
    metadata: HashMap<WorkId, WorkMetadata>,
    failing_bodies: HashSet<WorkId>,
    body_calls: HashMap<WorkId, usize>,
    metadata_calls: HashMap<WorkId, usize>,
}

/// In-memory [`ContentSource`] with per-work failure injection and call counting.
#[derive(Default)]
pub struct MockContentSource {
    state: RwLock<MockState>,
}

impl MockContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a work with both body and metadata.
    pub fn insert_work(
        &self,
        work_id: WorkId,
        student_name: &str,
        assignment_name: &str,
        body: &str,
    ) {
        let mut state = self.state.write();
        state.bodies.insert(work_id, body.to_string());
        state
            .metadata
            .insert(work_id, WorkMetadata::new(student_name, assignment_name));
    }

    /// Registers a body without metadata.
    pub fn insert_body(&self, work_id: WorkId, body: &str) {
        self.state.write().bodies.insert(work_id, body.to_string());
    }

    pub fn remove_metadata(&self, work_id: WorkId) {
        self.state.write().metadata.remove(&work_id);
    }

    /// Makes every body download of `work_id` fail.
    pub fn fail_body(&self, work_id: WorkId) {
        self.state.write().failing_bodies.insert(work_id);
    }

    pub fn body_calls(&self, work_id: WorkId) -> usize {
        self.state.read().body_calls.get(&work_id).copied().unwrap_or(0)
    }

    pub fn metadata_calls(&self, work_id: WorkId) -> usize {
        self.state
            .read()
            .metadata_calls
            .get(&work_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_body_calls(&self) -> usize {
        self.state.read().body_calls.values().sum()
    }
}

#[async_trait]
impl ContentSource for MockContentSource {
    async fn fetch_body(&self, work_id: WorkId) -> Result<String, ContentError> {
        let mut state = self.state.write();
        *state.body_calls.entry(work_id).or_default() += 1;

        if state.failing_bodies.contains(&work_id) {
            return Err(ContentError::ContentUnavailable {
                work_id,
                attempts: 1,
                last_error: "injected failure".to_string(),
            });
        }

        state
            .bodies
            .get(&work_id)
            .cloned()
            .ok_or_else(|| ContentError::ContentUnavailable {
                work_id,
                attempts: 1,
                last_error: "storing service returned 404 Not Found".to_string(),
            })
    }

    async fn fetch_metadata(&self, work_id: WorkId) -> Result<WorkMetadata, ContentError> {
        let mut state = self.state.write();
        *state.metadata_calls.entry(work_id).or_default() += 1;

        state
            .metadata
            .get(&work_id)
            .cloned()
            .ok_or_else(|| ContentError::MetadataUnavailable {
                work_id,
                message: "storing service returned 404 Not Found".to_string(),
            })
    }
}
