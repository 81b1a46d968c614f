use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args as ClapArgs, Parser, Subcommand};
use jobsdb_core::JobState;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "jobsdb-inspect")]
#[command(version)]
#[command(about = "Inspect the shards of a sharded jobs database")]
#[command(propagate_version = true)]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ClapArgs, Debug)]
struct ConnectionArgs {
    /// PostgreSQL connection URL (falls back to DATABASE_URL)
    #[arg(long, global = true, env = "JOBSDB_DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum pooled connections
    #[arg(long, global = true)]
    max_connections: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the recovery state stored in a file
    Recovery {
        /// Path to the recovery file
        path: PathBuf,
    },

    #[command(flatten)]
    Db(DbCommands),
}

/// Commands that read the jobs database.
#[derive(Subcommand, Debug)]
enum DbCommands {
    /// List shard tables whose name starts with a prefix
    Shards {
        /// Lower-case table name prefix, e.g. "gw_jobs_"
        prefix: String,
    },

    /// Count jobs of a queue, optionally for one source/destination pair
    Count {
        /// Queue name, e.g. "gw"
        queue: String,

        #[arg(long, requires = "destination_id")]
        source_id: Option<String>,

        #[arg(long, requires = "source_id")]
        destination_id: Option<String>,
    },

    /// Count status events of a queue in one state
    CountState {
        queue: String,
        /// Exact state name, e.g. "failed"
        state: JobState,
    },

    /// Show the newest jobs of a queue
    Jobs {
        queue: String,

        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show the newest status events of a queue in one state
    Statuses {
        queue: String,
        state: JobState,

        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Report the on-disk size of one shard
    Size {
        /// Shard table name
        shard: String,
    },

    /// List maintenance snapshot databases of a queue
    Snapshots { queue: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match commands::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Inspection failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_methods)]

    use super::*;

    #[test]
    fn parses_counts_with_pair() {
        let args = Args::try_parse_from([
            "jobsdb-inspect",
            "count",
            "gw",
            "--source-id",
            "src",
            "--destination-id",
            "dst",
        ])
        .unwrap();
        match args.command {
            Commands::Db(DbCommands::Count {
                queue,
                source_id,
                destination_id,
            }) => {
                assert_eq!(queue, "gw");
                assert_eq!(source_id.as_deref(), Some("src"));
                assert_eq!(destination_id.as_deref(), Some("dst"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn half_a_pair_is_rejected() {
        let result = Args::try_parse_from(["jobsdb-inspect", "count", "gw", "--source-id", "src"]);
        assert!(result.is_err());
    }

    #[test]
    fn states_are_parsed_exactly() {
        let args =
            Args::try_parse_from(["jobsdb-inspect", "statuses", "gw", "waiting_retry"]).unwrap();
        assert!(matches!(
            args.command,
            Commands::Db(DbCommands::Statuses {
                state: JobState::WaitingRetry,
                limit: 10,
                ..
            })
        ));

        let result = Args::try_parse_from(["jobsdb-inspect", "count-state", "gw", "Failed"]);
        assert!(result.is_err());
    }

    #[test]
    fn recovery_needs_only_a_path() {
        let args =
            Args::try_parse_from(["jobsdb-inspect", "recovery", "/tmp/recovery.json"]).unwrap();
        assert!(matches!(args.command, Commands::Recovery { .. }));
    }

    #[test]
    fn database_url_is_global() {
        let args = Args::try_parse_from([
            "jobsdb-inspect",
            "size",
            "gw_jobs_1",
            "--database-url",
            "postgres://localhost/jobsdb",
        ])
        .unwrap();
        assert_eq!(
            args.connection.database_url.as_deref(),
            Some("postgres://localhost/jobsdb")
        );
    }
}
