//! Command execution and output.

use chrono::{DateTime, Utc};
use db::{DbConfig, DbError, PgInspector};
use jobsdb_core::{JobRecord, ShardName};
use recovery::RecoveryError;
use serde::Serialize;

use crate::{Args, Commands, ConnectionArgs, DbCommands};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Recovery(#[from] RecoveryError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Job as printed: the payload is shown as text.
#[derive(Debug, Serialize)]
struct JobView {
    id: i64,
    uuid: uuid::Uuid,
    custom_val: String,
    payload: String,
    parameters: serde_json::Value,
    created_at: DateTime<Utc>,
    expire_at: DateTime<Utc>,
}

impl From<JobRecord> for JobView {
    fn from(job: JobRecord) -> Self {
        Self {
            payload: job.payload_lossy().into_owned(),
            id: job.id,
            uuid: job.uuid,
            custom_val: job.custom_val,
            parameters: job.parameters,
            created_at: job.created_at,
            expire_at: job.expire_at,
        }
    }
}

pub async fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Commands::Recovery { path } => {
            let state = recovery::load_recovery_state(&path).await?;
            print_json(&state)
        }
        Commands::Db(command) => {
            let config = db_config(&args.connection)?;
            let inspector = db::open(&config).await?;
            let outcome = inspect(&inspector, command).await;
            inspector.store().pool().close().await;
            outcome
        }
    }
}

fn db_config(connection: &ConnectionArgs) -> Result<DbConfig, DbError> {
    let config = match &connection.database_url {
        Some(url) => DbConfig::new(url.clone()),
        None => DbConfig::from_env()?,
    };
    Ok(match connection.max_connections {
        Some(max) => config.with_max_connections(max),
        None => config,
    })
}

async fn inspect(inspector: &PgInspector, command: DbCommands) -> Result<(), CliError> {
    match command {
        DbCommands::Shards { prefix } => {
            let shards = inspector.list_shards(&prefix).await?;
            print_json(&shards)
        }
        DbCommands::Count {
            queue,
            source_id: Some(source_id),
            destination_id: Some(destination_id),
        } => {
            let count = inspector
                .count_jobs_for(&queue, &source_id, &destination_id)
                .await?;
            print_json(&serde_json::json!({
                "queue": queue,
                "source_id": source_id,
                "destination_id": destination_id,
                "count": count,
            }))
        }
        DbCommands::Count { queue, .. } => {
            let count = inspector.count_jobs(&queue).await?;
            print_json(&serde_json::json!({ "queue": queue, "count": count }))
        }
        DbCommands::CountState { queue, state } => {
            let count = inspector.count_by_state(&queue, state).await?;
            print_json(&serde_json::json!({ "queue": queue, "state": state, "count": count }))
        }
        DbCommands::Jobs { queue, limit } => {
            let jobs: Vec<JobView> = inspector
                .fetch_jobs(&queue, limit)
                .await?
                .into_iter()
                .map(JobView::from)
                .collect();
            print_json(&jobs)
        }
        DbCommands::Statuses {
            queue,
            state,
            limit,
        } => {
            let statuses = inspector.fetch_job_statuses(&queue, limit, state).await?;
            print_json(&statuses)
        }
        DbCommands::Size { shard } => {
            let shard = ShardName::new(shard);
            let bytes = inspector.table_size(&shard).await?;
            print_json(&serde_json::json!({ "shard": shard, "bytes": bytes }))
        }
        DbCommands::Snapshots { queue } => {
            let snapshots = inspector.list_maintenance_snapshots(&queue).await?;
            print_json(&snapshots)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
