use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use futures_util::{StreamExt, stream};
use parking_lot::Mutex;

use super::error::StoreError;
use super::model::{NewReport, Report, ReportId};
use super::ReportStore;
use crate::constants::{WorkId, clamp_score};
use crate::peers::{Peer, PeerListError, PeerSource, PeerStream};

#[derive(Debug, Clone)]
struct WorkRow {
    id: WorkId,
    student_name: String,
    assignment_name: String,
}

#[derive(Default)]
struct MemoryState {
    works: Vec<WorkRow>,
    reports: Vec<Report>,
    next_report_id: ReportId,
}

/// In-memory report store and peer source with failure injection.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_peer_query: AtomicBool,
    break_peer_stream: AtomicBool,
    create_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a row to the `works` table.
    pub fn insert_work(&self, id: WorkId, student_name: &str, assignment_name: &str) {
        self.state.lock().works.push(WorkRow {
            id,
            student_name: student_name.to_string(),
            assignment_name: assignment_name.to_string(),
        });
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes `list_peers` itself fail.
    pub fn fail_peer_query(&self, fail: bool) {
        self.fail_peer_query.store(fail, Ordering::SeqCst);
    }

    /// Appends a malformed row after the real peers.
    pub fn break_peer_stream(&self, broken: bool) {
        self.break_peer_stream.store(broken, Ordering::SeqCst);
    }

    pub fn report_count(&self) -> usize {
        self.state.lock().reports.len()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::QueryFailed {
                message: "injected read failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn find_by_work(&self, work_id: WorkId) -> Result<Option<Report>, StoreError> {
        self.check_reads()?;
        let state = self.state.lock();
        Ok(state.reports.iter().find(|r| r.work_id == work_id).cloned())
    }

    async fn find_by_id(&self, id: ReportId) -> Result<Option<Report>, StoreError> {
        self.check_reads()?;
        let state = self.state.lock();
        Ok(state.reports.iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, report: NewReport) -> Result<Report, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::QueryFailed {
                message: "injected write failure".to_string(),
            });
        }

        let mut state = self.state.lock();
        if state.reports.iter().any(|r| r.work_id == report.work_id) {
            return Err(StoreError::Conflict {
                work_id: report.work_id,
            });
        }

        state.next_report_id += 1;
        let created = Report {
            id: state.next_report_id,
            work_id: report.work_id,
            score: clamp_score(report.score),
            sources: report.sources,
            word_cloud_url: report.word_cloud_url,
            checked_at: Utc::now(),
        };
        state.reports.push(created.clone());

        Ok(created)
    }
}

#[async_trait]
impl PeerSource for MemoryStore {
    async fn list_peers(
        &self,
        assignment_name: &str,
        exclude: WorkId,
    ) -> Result<PeerStream, PeerListError> {
        if self.fail_peer_query.load(Ordering::SeqCst) {
            return Err(PeerListError::QueryFailed {
                message: "injected peer query failure".to_string(),
            });
        }

        let mut items: Vec<Result<Peer, PeerListError>> = {
            let state = self.state.lock();
            state
                .works
                .iter()
                .filter(|w| w.assignment_name == assignment_name && w.id != exclude)
                .map(|w| Ok(Peer::new(w.id, w.student_name.clone())))
                .collect()
        };

        if self.break_peer_stream.load(Ordering::SeqCst) {
            items.push(Err(PeerListError::MalformedRow {
                message: "injected malformed row".to_string(),
            }));
        }

        Ok(stream::iter(items).boxed())
    }
}
