use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod, Runtime};
use futures_util::{StreamExt, stream};
use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};
use postgres_openssl::MakeTlsConnector;
use tokio_postgres::config::SslMode;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};
use tracing::{debug, info};

use super::error::StoreError;
use super::model::{NewReport, Report, ReportId};
use super::ReportStore;
use crate::constants::{WorkId, clamp_score};
use crate::peers::{Peer, PeerListError, PeerSource, PeerStream};

/// `application_name` reported to the server unless the connection string sets one.
pub const APPLICATION_NAME: &str = "file-analysis";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Idempotent schema bootstrap. `works` normally belongs to the storing
/// service; creating it here only matters for a fresh database.
const BOOTSTRAP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS works (
    id SERIAL PRIMARY KEY,
    student_name TEXT NOT NULL,
    assignment_name TEXT NOT NULL,
    uploaded_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS idx_works_assignment_name ON works (assignment_name);

CREATE TABLE IF NOT EXISTS plagiat_reports (
    id BIGSERIAL PRIMARY KEY,
    work_id BIGINT NOT NULL UNIQUE,
    plagiat_score DOUBLE PRECISION NOT NULL,
    plagiat_sources TEXT NOT NULL,
    word_cloud_url TEXT,
    checked_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#;

const FIND_BY_WORK_SQL: &str = "SELECT id, work_id, plagiat_score, plagiat_sources, word_cloud_url, checked_at \
     FROM plagiat_reports WHERE work_id = $1";

const FIND_BY_ID_SQL: &str = "SELECT id, work_id, plagiat_score, plagiat_sources, word_cloud_url, checked_at \
     FROM plagiat_reports WHERE id = $1";

const INSERT_SQL: &str = "INSERT INTO plagiat_reports (work_id, plagiat_score, plagiat_sources, word_cloud_url) \
     VALUES ($1, $2, $3, $4) \
     ON CONFLICT (work_id) DO NOTHING \
     RETURNING id, work_id, plagiat_score, plagiat_sources, word_cloud_url, checked_at";

const LIST_PEERS_SQL: &str = "SELECT id::BIGINT AS id, student_name FROM works \
     WHERE assignment_name = $1 AND id <> $2::BIGINT ORDER BY id";

/// PostgreSQL-backed report store and peer source.
///
/// Every call checks a connection out of a pool. Connections are verified
/// before reuse, so a restarted server or a terminated backend costs one
/// reconnect instead of failing every later call. A peer stream keeps its
/// own connection until it is dropped.
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    /// Builds a pool of at most `max_size` connections from a libpq-style
    /// connection string and bootstraps the schema.
    ///
    /// `sslmode=disable` connects in plain text. `prefer` and `require` go
    /// through OpenSSL without certificate verification.
    pub async fn connect(conninfo: &str, max_size: usize) -> Result<Self, StoreError> {
        let mut pg_config: tokio_postgres::Config =
            conninfo.parse().map_err(|e: tokio_postgres::Error| {
                StoreError::ConnectionFailed {
                    message: e.to_string(),
                }
            })?;
        if pg_config.get_application_name().is_none() {
            pg_config.application_name(APPLICATION_NAME);
        }
        let ssl_mode = pg_config.get_ssl_mode();

        let mut manager_config = ManagerConfig::default();
        manager_config.recycling_method = RecyclingMethod::Verified;

        let manager = match ssl_mode {
            SslMode::Disable => Manager::from_config(pg_config, NoTls, manager_config),
            _ => Manager::from_config(pg_config, tls_connector()?, manager_config),
        };

        let pool = Pool::builder(manager)
            .max_size(max_size.max(1))
            .runtime(Runtime::Tokio1)
            .create_timeout(Some(CONNECT_TIMEOUT))
            .build()
            .map_err(|e| StoreError::ConnectionFailed {
                message: e.to_string(),
            })?;

        let store = Self { pool };
        store.bootstrap().await?;

        info!(max_size, ssl_mode = ?ssl_mode, "Connected to PostgreSQL");
        Ok(store)
    }

    /// Creates missing tables and indexes.
    pub async fn bootstrap(&self) -> Result<(), StoreError> {
        self.conn().await?.batch_execute(BOOTSTRAP_SQL).await?;
        Ok(())
    }

    async fn conn(&self) -> Result<Object, StoreError> {
        Ok(self.pool.get().await?)
    }
}

fn tls_connector() -> Result<MakeTlsConnector, StoreError> {
    let tls_failed = |e: openssl::error::ErrorStack| StoreError::ConnectionFailed {
        message: format!("failed to set up TLS: {}", e),
    };

    let mut builder = SslConnector::builder(SslMethod::tls()).map_err(tls_failed)?;
    builder.set_verify(SslVerifyMode::NONE);
    Ok(MakeTlsConnector::new(builder.build()))
}

fn report_from_row(row: &Row) -> Result<Report, StoreError> {
    Ok(Report {
        id: row.try_get("id")?,
        work_id: row.try_get("work_id")?,
        score: row.try_get("plagiat_score")?,
        sources: row.try_get("plagiat_sources")?,
        word_cloud_url: row.try_get("word_cloud_url")?,
        checked_at: row.try_get("checked_at")?,
    })
}

fn peer_from_row(row: &Row) -> Result<Peer, PeerListError> {
    let malformed = |e: tokio_postgres::Error| PeerListError::MalformedRow {
        message: e.to_string(),
    };

    Ok(Peer {
        work_id: row.try_get("id").map_err(malformed)?,
        owner_name: row.try_get("student_name").map_err(malformed)?,
    })
}

#[async_trait]
impl ReportStore for PgStore {
    async fn find_by_work(&self, work_id: WorkId) -> Result<Option<Report>, StoreError> {
        self.conn()
            .await?
            .query_opt(FIND_BY_WORK_SQL, &[&work_id])
            .await?
            .as_ref()
            .map(report_from_row)
            .transpose()
    }

    async fn find_by_id(&self, id: ReportId) -> Result<Option<Report>, StoreError> {
        self.conn()
            .await?
            .query_opt(FIND_BY_ID_SQL, &[&id])
            .await?
            .as_ref()
            .map(report_from_row)
            .transpose()
    }

    async fn create(&self, report: NewReport) -> Result<Report, StoreError> {
        let score = clamp_score(report.score);
        let row = self
            .conn()
            .await?
            .query_opt(
                INSERT_SQL,
                &[
                    &report.work_id,
                    &score,
                    &report.sources,
                    &report.word_cloud_url,
                ],
            )
            .await?;

        match row {
            Some(row) => {
                let created = report_from_row(&row)?;
                debug!(report_id = created.id, work_id = created.work_id, "Report persisted");
                Ok(created)
            }
            None => Err(StoreError::Conflict {
                work_id: report.work_id,
            }),
        }
    }

    async fn close(&self) {
        self.pool.close();
        info!("PostgreSQL pool closed");
    }
}

#[async_trait]
impl PeerSource for PgStore {
    async fn list_peers(
        &self,
        assignment_name: &str,
        exclude: WorkId,
    ) -> Result<PeerStream, PeerListError> {
        let query_failed = |message: String| PeerListError::QueryFailed { message };

        let conn = self
            .pool
            .get()
            .await
            .map_err(|e| query_failed(e.to_string()))?;

        let params: [&(dyn ToSql + Sync); 2] = [&assignment_name, &exclude];
        let rows = conn
            .query_raw(LIST_PEERS_SQL, params)
            .await
            .map_err(|e| query_failed(e.to_string()))?;

        // The pooled connection travels with the stream and returns to the
        // pool once the consumer drops it.
        let rows = stream::unfold((conn, Box::pin(rows)), |(conn, mut rows)| async move {
            let item = rows.next().await?;
            Some((item, (conn, rows)))
        });

        let peers = rows.map(move |row| {
            let row = row.map_err(|e| query_failed(e.to_string()))?;
            peer_from_row(&row)
        });

        Ok(peers.boxed())
    }
}
