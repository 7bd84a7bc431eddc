//! Orchestrator for the module catalog ingestion/validation/assembly
//! pipeline (component C6).
//!
//! This crate owns no network or filesystem logic of its own beyond the
//! catalog persistence layer ([`catalog_io`]); it wires together
//! `modcat-platform`, `modcat-validate`, `modcat-catalog` and
//! `modcat-notify` into the full and incremental run modes described in
//! §4.6, and resolves the one credential the pipeline needs.

mod catalog_io;
mod orchestrator;

use std::env;

use anyhow::{bail, Result};

use modcat_config::Config;
use modcat_platform::{GitHubClient, NotificationApi, OrgRepositoryApi};

pub use catalog_io::{load_catalog, save_catalog, save_graphql_snapshot};

/// Progress/diagnostic sink, implemented by callers (the CLI's
/// TTY-aware progress bar, or a plain stderr logger in tests).
pub trait Reporter {
    fn info(&mut self, msg: &str);
    fn warn(&mut self, msg: &str);
    fn error(&mut self, msg: &str);
}

/// The environment variable carrying the platform access token. Required;
/// checked before any network I/O so a misconfigured run fails fast.
const TOKEN_ENV_VAR: &str = "GRAPHQL_TOKEN";

/// Resolve the platform access token from the environment. Fatal (and
/// reported before any network call is attempted) if unset or blank.
pub fn resolve_token() -> Result<String> {
    match env::var(TOKEN_ENV_VAR) {
        Ok(token) if !token.trim().is_empty() => Ok(token),
        Ok(_) => bail!("{TOKEN_ENV_VAR} is set but empty"),
        Err(_) => bail!("{TOKEN_ENV_VAR} must be set to a valid platform access token"),
    }
}

/// Build the platform client and run the pipeline end to end: resolves the
/// token, constructs a [`GitHubClient`], and dispatches to full or
/// incremental mode per §4.6.
pub fn run(config: &Config, reporter: &mut dyn Reporter) -> Result<()> {
    let token = resolve_token()?;
    let client = GitHubClient::new(token);
    run_with_platform(&client, &client, config, reporter)
}

/// Entry point parameterized over the platform traits, so tests (and any
/// future non-GitHub backend) can supply a fake in place of
/// [`GitHubClient`].
pub fn run_with_platform(
    org_api: &dyn OrgRepositoryApi,
    notify_api: &dyn NotificationApi,
    config: &Config,
    reporter: &mut dyn Reporter,
) -> Result<()> {
    orchestrator::run(org_api, notify_api, config, reporter)
}
