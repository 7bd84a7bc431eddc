//! The Orchestrator (component C6): wires the platform client, the Module
//! Validator, the Catalog Assembler and the Notification Dispatcher into the
//! two run modes described in §4.6.

use anyhow::{bail, Context, Result};

use modcat_catalog::assemble_module;
use modcat_config::Config;
use modcat_notify::dispatch;
use modcat_platform::{NotificationApi, OrgRepositoryApi, RepoRef};
use modcat_types::Catalog;
use modcat_validate::{validate_module, ModuleValidationConfig};

use crate::catalog_io::{load_catalog, save_catalog, save_graphql_snapshot};
use crate::Reporter;

/// Page size for the organization-listing GraphQL query (§6: "page size
/// 10, ordered by update time descending, public only").
const PAGE_SIZE: u32 = 10;

fn validation_config(config: &Config) -> ModuleValidationConfig {
    ModuleValidationConfig {
        inner_concurrency: config.inner_concurrency,
        require_numeric_tag_prefix: config.require_numeric_tag_prefix,
        reserved_names_override: config.reserved_names.clone(),
    }
}

/// Entry point: selects full or incremental mode per §4.6 ("incremental iff
/// `REPO` is set and a prior catalog file exists, else full").
pub fn run(
    org_api: &dyn OrgRepositoryApi,
    notify_api: &dyn NotificationApi,
    config: &Config,
    reporter: &mut dyn Reporter,
) -> Result<()> {
    let repo_env = std::env::var("REPO").ok().filter(|v| !v.trim().is_empty());
    let existing = load_catalog(&config.catalog_path())?;

    match (repo_env, existing) {
        (Some(repo_value), Some(existing_catalog)) => {
            run_incremental(org_api, notify_api, config, reporter, &repo_value, existing_catalog)
        }
        _ => run_full(org_api, config, reporter),
    }
}

/// Re-index the whole organization: list every public repository, validate
/// and assemble each into a module, drop failures silently (§4.6 full mode
/// notifies nobody — it is a bulk reindex, not a per-release event), sort
/// and persist.
fn run_full(org_api: &dyn OrgRepositoryApi, config: &Config, reporter: &mut dyn Reporter) -> Result<()> {
    reporter.info(&format!("listing repositories for organization '{}'", config.organization));
    let repositories = org_api
        .list_org_repositories(&config.organization, PAGE_SIZE)
        .context("failed to list organization repositories")?;
    let total = repositories.len();
    reporter.info(&format!("fetched {total} repositories"));

    save_graphql_snapshot(&config.graphql_snapshot_path(), &repositories)
        .context("failed to write GraphQL snapshot")?;

    let validation = validation_config(config);
    let outcomes = modcat_concurrency::bounded_map(repositories, config.outer_concurrency, |repo| {
        let result = validate_module(&repo, &validation);
        (repo, result)
    });

    let mut modules = Vec::new();
    for (repo, result) in outcomes {
        match result {
            Ok(accepted_releases) => modules.push(assemble_module(&repo, accepted_releases)),
            Err(skip) => reporter.warn(&format!("{}: skipped ({})", repo.id, skip.reason.code())),
        }
    }
    reporter.info(&format!("{}/{total} repositories accepted as modules", modules.len()));

    let mut catalog = Catalog::new(modules);
    catalog.sort();
    save_catalog(&config.catalog_path(), &catalog).context("failed to write catalog")?;
    reporter.info(&format!("wrote catalog with {} modules", catalog.0.len()));

    Ok(())
}

/// Revalidate a single repository named by the `REPO` environment variable
/// and merge it into the existing catalog (§4.6 incremental mode). A
/// notifiable failure is dispatched as a commit comment; either kind of
/// failure exits non-zero, since the module did not make it into the
/// catalog.
fn run_incremental(
    org_api: &dyn OrgRepositoryApi,
    notify_api: &dyn NotificationApi,
    config: &Config,
    reporter: &mut dyn Reporter,
    repo_value: &str,
    mut existing_catalog: Catalog,
) -> Result<()> {
    let (owner, name) = modcat_config::parse_repo_env(repo_value, &config.organization);
    reporter.info(&format!("revalidating {owner}/{name}"));

    let repo = org_api
        .get_repository(&owner, &name)
        .context("failed to fetch repository detail")?
        .with_context(|| format!("repository {owner}/{name} not found or not visible"))?;

    let validation = validation_config(config);
    let repo_ref = RepoRef::new(owner, name);

    match validate_module(&repo, &validation) {
        Ok(accepted_releases) => {
            let module = assemble_module(&repo, accepted_releases);
            reporter.info(&format!("{}: accepted", module.module_id));
            existing_catalog.upsert(module);
            save_catalog(&config.catalog_path(), &existing_catalog).context("failed to write catalog")?;
            Ok(())
        }
        Err(skip) => {
            reporter.warn(&format!("{}: skipped ({})", repo.id, skip.reason.code()));
            if skip.should_notify && skip.tag_name.is_some() {
                dispatch(notify_api, &repo_ref, &skip);
            }
            bail!("{}: {}", repo.id, skip.message)
        }
    }
}
