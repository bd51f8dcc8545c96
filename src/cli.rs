//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser};

use crate::app::{AppContext, AppFlags};
use crate::commands;
use crate::domain::StagingConfig;

/// Staging environment control for AWS
#[derive(Parser)]
#[command(name = "stagectl", version, arg_required_else_help = true)]
pub struct Cli {
    /// Stop all app servers connected to the staging load balancer
    #[arg(short = 's', long)]
    pub stop: bool,

    /// Upload the build artifact to the staging bucket
    #[arg(short = 'u', long)]
    pub upload: bool,

    /// Start N app servers and attach them to the staging load balancer.
    /// Does not stop existing servers
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub start: Option<u32>,

    /// Upload the artifact, stop all app servers, then start N fresh ones
    #[arg(short = 'r', long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub restart: Option<u32>,

    /// Ensure the staging database instance is running and DNS points at it
    #[arg(long = "start-db", alias = "startdb")]
    pub start_db: bool,

    /// Stop all app servers and the staging database
    #[arg(long = "stop-all", alias = "stopall")]
    pub stop_all: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Skip confirmation prompts
    #[arg(short = 'y', long)]
    pub yes: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Environment configuration, overridable per flag or `STAGECTL_*` env var.
#[derive(Args)]
pub struct ConfigArgs {
    /// AWS region hosting the staging environment
    #[arg(long, env = "STAGECTL_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Path to the build artifact [default: ~/build/staging/app.tar.gz]
    #[arg(long, env = "STAGECTL_ARTIFACT", value_name = "PATH")]
    pub artifact: Option<PathBuf>,

    /// Path to the database boot script [default: ~/scripts/staging-db-init.sh]
    #[arg(long = "db-user-data", env = "STAGECTL_DB_USER_DATA", value_name = "PATH")]
    pub db_user_data: Option<PathBuf>,

    /// Path to the app server boot script [default: ~/scripts/staging-app-init.sh]
    #[arg(long = "app-user-data", env = "STAGECTL_APP_USER_DATA", value_name = "PATH")]
    pub app_user_data: Option<PathBuf>,

    /// Bucket receiving the build artifact
    #[arg(long, env = "STAGECTL_BUCKET", default_value = "staging-deploys")]
    pub bucket: String,

    /// Object key the artifact is stored under
    #[arg(long = "object-key", env = "STAGECTL_OBJECT_KEY", default_value = "app.tar.gz")]
    pub object_key: String,

    /// Name of the staging load balancer
    #[arg(long = "load-balancer", env = "STAGECTL_LOAD_BALANCER", default_value = "staging")]
    pub load_balancer: String,

    /// Hosted zone containing the staging database record
    #[arg(long, env = "STAGECTL_ZONE", default_value = "staging.example.com")]
    pub zone: String,

    /// A-record updated to the database's private address
    #[arg(long, env = "STAGECTL_RECORD", default_value = "db.staging.example.com")]
    pub record: String,

    /// Seconds between instance state polls
    #[arg(
        long = "poll-interval",
        env = "STAGECTL_POLL_INTERVAL",
        value_name = "SECONDS",
        default_value_t = 10
    )]
    pub poll_interval: u64,

    /// Seconds to wait for an instance to leave pending before giving up on it
    #[arg(
        long = "launch-timeout",
        env = "STAGECTL_LAUNCH_TIMEOUT",
        value_name = "SECONDS",
        default_value_t = 600
    )]
    pub launch_timeout: u64,

    /// Seconds to wait after a DNS update for caches to expire
    #[arg(
        long = "dns-grace",
        env = "STAGECTL_DNS_GRACE",
        value_name = "SECONDS",
        default_value_t = 60
    )]
    pub dns_grace: u64,
}

impl ConfigArgs {
    /// Resolve the final configuration, filling unset paths from `$HOME`.
    fn into_config(self) -> Result<StagingConfig> {
        let artifact = match self.artifact {
            Some(path) => path,
            None => home()?.join("build/staging/app.tar.gz"),
        };
        let db_user_data = match self.db_user_data {
            Some(path) => path,
            None => home()?.join("scripts/staging-db-init.sh"),
        };
        let app_user_data = match self.app_user_data {
            Some(path) => path,
            None => home()?.join("scripts/staging-app-init.sh"),
        };
        Ok(StagingConfig {
            region: self.region,
            artifact,
            db_user_data,
            app_user_data,
            bucket: self.bucket,
            object_key: self.object_key,
            load_balancer: self.load_balancer,
            zone: self.zone,
            record: self.record,
            poll_interval: Duration::from_secs(self.poll_interval),
            launch_timeout: Duration::from_secs(self.launch_timeout),
            dns_grace: Duration::from_secs(self.dns_grace),
        })
    }
}

fn home() -> Result<PathBuf> {
    dirs::home_dir().context("home directory not found")
}

impl Cli {
    /// Execute the requested actions.
    ///
    /// Flags combine in a single invocation; execution order is fixed
    /// regardless of where each flag appeared on the command line.
    ///
    /// # Errors
    ///
    /// Returns an error if any provider call or local file read fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            stop,
            upload,
            start,
            restart,
            start_db,
            stop_all,
            quiet,
            no_color,
            yes,
            config,
        } = self;
        let config = config.into_config()?;
        let app = AppContext::new(
            &AppFlags {
                no_color,
                quiet,
                yes,
            },
            config,
        )
        .await;

        if stop {
            commands::stop::run(&app).await?;
        }
        if upload {
            commands::upload::run(&app).await?;
        }
        if let Some(count) = start {
            commands::start::run(&app, count).await?;
        }
        if let Some(count) = restart {
            commands::restart::run(&app, count).await?;
        }
        if start_db {
            commands::start_db::run(&app).await?;
        }
        if stop_all {
            commands::stop_all::run(&app).await?;
        }

        if !quiet {
            println!("finished");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn flags_combine_in_one_invocation() {
        let cli = Cli::try_parse_from(["stagectl", "--upload", "--start", "2"]).expect("parse");
        assert!(cli.upload);
        assert_eq!(cli.start, Some(2));
        assert!(!cli.stop);
    }

    #[test]
    fn restart_takes_a_count() {
        let cli = Cli::try_parse_from(["stagectl", "-r", "3"]).expect("parse");
        assert_eq!(cli.restart, Some(3));
    }

    #[test]
    fn start_db_accepts_the_legacy_spelling() {
        let cli = Cli::try_parse_from(["stagectl", "--startdb"]).expect("parse");
        assert!(cli.start_db);
    }

    #[test]
    fn config_defaults_cover_the_environment_names() {
        let cli = Cli::try_parse_from(["stagectl", "--stop"]).expect("parse");
        assert_eq!(cli.config.load_balancer, "staging");
        assert_eq!(cli.config.bucket, "staging-deploys");
        assert_eq!(cli.config.poll_interval, 10);
        assert_eq!(cli.config.launch_timeout, 600);
    }

    #[test]
    fn zero_counts_are_rejected() {
        assert!(Cli::try_parse_from(["stagectl", "--start", "0"]).is_err());
        assert!(Cli::try_parse_from(["stagectl", "--restart", "0"]).is_err());
    }
}
