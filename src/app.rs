//! Application context - config, output, and provider clients wired once.
//!
//! `AppContext` is constructed once in `Cli::run()` and passed as
//! `&AppContext` to every command handler. Provider clients are explicitly
//! constructed here and injected into services through the port traits, so
//! tests can substitute fakes.

use anyhow::Result;
use aws_config::{BehaviorVersion, Region};

use crate::domain::StagingConfig;
use crate::infra::ec2::Ec2Compute;
use crate::infra::elb::ClassicElb;
use crate::infra::route53::Route53Dns;
use crate::infra::s3::S3ArtifactStore;
use crate::output::OutputContext;
use crate::output::reporter::TerminalReporter;

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Skip confirmation prompts (also set by `CI` / `STAGECTL_YES` env vars).
    pub yes: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Resolved configuration (paths, names, timing).
    pub config: StagingConfig,
    /// EC2 adapter.
    pub compute: Ec2Compute,
    /// Classic ELB adapter.
    pub balancer: ClassicElb,
    /// S3 adapter.
    pub store: S3ArtifactStore,
    /// Route 53 adapter.
    pub dns: Route53Dns,
    /// When `true`, skip interactive prompts and use defaults.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags and resolved
    /// configuration.
    pub async fn new(flags: &AppFlags, config: StagingConfig) -> Self {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("STAGECTL_YES").is_ok();
        let non_interactive = flags.yes || ci_env;

        let sdk = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            compute: Ec2Compute::new(&sdk),
            balancer: ClassicElb::new(&sdk),
            store: S3ArtifactStore::new(&sdk),
            dns: Route53Dns::new(&sdk),
            config,
            non_interactive,
        }
    }

    /// Returns a `ProgressReporter` bound to this context's terminal output.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true` (CI, `--yes` flag, or `STAGECTL_YES`
    /// env), returns `default` immediately without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}
