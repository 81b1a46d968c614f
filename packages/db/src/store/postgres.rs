//! PostgreSQL backend.
//!
//! Shard names come from the catalog and are spliced into statements as
//! quoted identifiers; every value is a bound parameter.

use chrono::{DateTime, Utc};
use jobsdb_core::{JobRecord, JobState, JobStatusRecord, ShardName};
use sqlx::PgPool;
use uuid::Uuid;

use super::{RowFilter, ShardStore};
use crate::DbError;

const UNDEFINED_TABLE: &str = "42P01";
const UNDEFINED_COLUMN: &str = "42703";
const UNDEFINED_FUNCTION: &str = "42883";

const TABLE_NAMES: &str = r#"
SELECT tablename::text
FROM pg_catalog.pg_tables
WHERE schemaname <> 'pg_catalog' AND schemaname <> 'information_schema'
ORDER BY tablename
"#;

const DATABASE_NAMES: &str = r#"
SELECT datname::text
FROM pg_catalog.pg_database
WHERE left(datname::text, char_length($1)) = $1
ORDER BY datname
"#;

const TOTAL_RELATION_SIZE: &str = "SELECT pg_total_relation_size(quote_ident($1)::regclass)";

/// Store backed by a caller-owned PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// Job columns as selected from a jobs shard.
#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    job_id: i64,
    uuid: Uuid,
    custom_val: String,
    event_payload: String,
    parameters: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    expire_at: DateTime<Utc>,
}

impl From<JobRow> for JobRecord {
    fn from(row: JobRow) -> Self {
        JobRecord {
            id: row.job_id,
            uuid: row.uuid,
            custom_val: row.custom_val,
            payload: row.event_payload.into_bytes(),
            parameters: row.parameters.unwrap_or_default(),
            created_at: row.created_at,
            expire_at: row.expire_at,
        }
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl ShardStore for PgStore {
    async fn table_names(&self) -> Result<Vec<String>, DbError> {
        let names: Vec<String> = sqlx::query_scalar(TABLE_NAMES)
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    async fn count_rows(&self, shard: &ShardName, filter: &RowFilter) -> Result<u64, DbError> {
        let table = shard.quoted();
        let count = match filter {
            RowFilter::All => {
                let sql = format!("SELECT count(*) FROM {table}");
                sqlx::query_scalar::<_, i64>(&sql).fetch_one(&self.pool).await
            }
            RowFilter::Parameters(params) => {
                let sql =
                    format!("SELECT count(*) FROM {table} WHERE parameters::jsonb = $1::jsonb");
                sqlx::query_scalar::<_, i64>(&sql)
                    .bind(params.to_value())
                    .fetch_one(&self.pool)
                    .await
            }
            RowFilter::State(state) => {
                // `job_state` may be an enum type, which has no `= text` operator.
                let sql = format!("SELECT count(*) FROM {table} WHERE job_state::text = $1");
                sqlx::query_scalar::<_, i64>(&sql)
                    .bind(state.as_str())
                    .fetch_one(&self.pool)
                    .await
            }
        }
        .map_err(|e| shard_error(shard, e))?;

        u64::try_from(count).map_err(|_| DbError::Query(format!("{shard}: negative count {count}")))
    }

    async fn newest_jobs(
        &self,
        shard: &ShardName,
        limit: usize,
    ) -> Result<Vec<JobRecord>, DbError> {
        // Timestamps may be stored without a zone; the session runs in UTC.
        let sql = format!(
            "SELECT job_id, uuid, custom_val, event_payload::text AS event_payload, \
             parameters::jsonb AS parameters, created_at::timestamptz AS created_at, \
             expire_at::timestamptz AS expire_at \
             FROM {} ORDER BY created_at DESC, job_id DESC LIMIT $1",
            shard.quoted()
        );

        let rows: Vec<JobRow> = sqlx::query_as(&sql)
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| shard_error(shard, e))?;

        Ok(rows.into_iter().map(JobRecord::from).collect())
    }

    async fn newest_statuses(
        &self,
        shard: &ShardName,
        state: JobState,
        limit: usize,
    ) -> Result<Vec<JobStatusRecord>, DbError> {
        // Whole rows as JSON, since status shards differ in their extra columns.
        // `created_at` is rewritten with an explicit offset.
        let sql = format!(
            "SELECT to_jsonb(s) || jsonb_build_object('created_at', s.created_at::timestamptz) \
             FROM {} s WHERE s.job_state::text = $1 \
             ORDER BY s.created_at DESC, s.id DESC LIMIT $2",
            shard.quoted()
        );

        let rows: Vec<serde_json::Value> = sqlx::query_scalar(&sql)
            .bind(state.as_str())
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| shard_error(shard, e))?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(|e| DbError::mismatch(shard, e)))
            .collect()
    }

    async fn total_relation_size(&self, relation: &str) -> Result<u64, DbError> {
        let size: i64 = sqlx::query_scalar(TOTAL_RELATION_SIZE)
            .bind(relation)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if database_code(&e).as_deref() == Some(UNDEFINED_TABLE) {
                    DbError::NotFound(format!("relation {relation}"))
                } else {
                    DbError::Connection(e)
                }
            })?;

        u64::try_from(size)
            .map_err(|_| DbError::Query(format!("{relation}: negative relation size {size}")))
    }

    async fn database_names_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DbError> {
        let names: Vec<String> = sqlx::query_scalar(DATABASE_NAMES)
            .bind(prefix)
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// SQLSTATE of a server-side error.
fn database_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.code().map(|code| code.into_owned()),
        _ => None,
    }
}

/// Classify a failed per-shard statement.
fn shard_error(shard: &ShardName, err: sqlx::Error) -> DbError {
    let decode_failure = matches!(
        err,
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) | sqlx::Error::Decode(_)
    );
    if decode_failure {
        return DbError::mismatch(shard, err);
    }

    match database_code(&err).as_deref() {
        Some(UNDEFINED_COLUMN) | Some(UNDEFINED_FUNCTION) => DbError::mismatch(shard, err),
        Some(UNDEFINED_TABLE) => DbError::NotFound(format!("shard {shard}")),
        Some(_) => DbError::Query(format!("{shard}: {err}")),
        None => DbError::Connection(err),
    }
}
