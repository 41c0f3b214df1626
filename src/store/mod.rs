//! Report persistence and the relational `works` table.
//!
//! The store handle is built once at startup and injected as
//! `Arc<dyn ReportStore>`; [`ReportStore::close`] ends its lifecycle.
//!
//! `plagiat_reports.work_id` is unique. [`ReportStore::create`] returns
//! [`StoreError::Conflict`] when another request already persisted a report for
//! the same work, and the caller re-reads the existing row.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod memory;
pub mod model;
pub mod postgres;


use async_trait::async_trait;

pub use error::StoreError;
#[cfg(any(test, feature = "mock"))]
pub use memory::MemoryStore;
pub use model::{NewReport, Report, ReportId};
pub use postgres::PgStore;

use crate::constants::WorkId;

#[async_trait]
/// Lookup-or-create access to plagiarism reports.
pub trait ReportStore: Send + Sync {
    /// Returns the report of `work_id`, if one was persisted.
    async fn find_by_work(&self, work_id: WorkId) -> Result<Option<Report>, StoreError>;

    /// Returns the report with identifier `id`.
    async fn find_by_id(&self, id: ReportId) -> Result<Option<Report>, StoreError>;

    /// Persists a report; the store assigns `id` and `checked_at`.
    async fn create(&self, report: NewReport) -> Result<Report, StoreError>;

    /// Releases the underlying connections.
    async fn close(&self) {}
}
