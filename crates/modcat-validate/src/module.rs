//! Module Validator (component C4).
//!
//! Applies the repository-level predicates, runs the Release Validator over
//! the repository's release set under the inner bounded mapper, and decides
//! whether the module is accepted, and if not, which skip (if any) should
//! carry a notification.

use std::sync::LazyLock;

use regex::Regex;
use tracing::instrument;

use modcat_concurrency::bounded_map;
use modcat_types::{AcceptedRelease, RawRepository, SkipInfo, SkipReason};

use crate::release::{is_eligible_for_deep_inspection, validate_release};

/// Repository identifiers the platform or its tooling already claims.
const RESERVED_NAMES: &[&str] = &[
    ".github",
    "submission",
    "developers",
    "modules",
    "org.kernelsu.example",
    "module_release",
];

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9._-]+$").expect("static regex"));

/// Knobs the orchestrator resolves from `modcat_config::Config` and threads
/// down into each Module Validator invocation.
#[derive(Debug, Clone)]
pub struct ModuleValidationConfig {
    pub inner_concurrency: usize,
    pub require_numeric_tag_prefix: bool,
    /// Overrides the built-in reserved-name set when non-empty.
    pub reserved_names_override: Vec<String>,
}

impl Default for ModuleValidationConfig {
    fn default() -> Self {
        Self {
            inner_concurrency: 100,
            require_numeric_tag_prefix: true,
            reserved_names_override: Vec::new(),
        }
    }
}

/// Validate one repository, producing its accepted release set or a single
/// module-level [`SkipInfo`] (§4.4's "Decision after release processing").
#[instrument(level = "info", skip_all, fields(id = %repo.id))]
pub fn validate_module(
    repo: &RawRepository,
    config: &ModuleValidationConfig,
) -> Result<Vec<AcceptedRelease>, SkipInfo> {
    let is_reserved = if config.reserved_names_override.is_empty() {
        RESERVED_NAMES.contains(&repo.id.as_str())
    } else {
        config.reserved_names_override.iter().any(|n| n == &repo.id)
    };
    if is_reserved {
        return Err(SkipInfo::new(SkipReason::ReservedName, true));
    }
    if !NAME_RE.is_match(&repo.id) {
        return Err(SkipInfo::new(SkipReason::InvalidName, true));
    }
    if repo.description.as_deref().map(str::trim).unwrap_or_default().is_empty() {
        return Err(SkipInfo::new(SkipReason::NoDescription, true));
    }

    let releases = release_set_with_latest_appended(repo);
    let latest_tag = repo.latest_release.as_ref().map(|r| r.tag_name.as_str());

    let eligible: Vec<_> = releases
        .into_iter()
        .filter(|r| is_eligible_for_deep_inspection(r, config.require_numeric_tag_prefix))
        .collect();

    if eligible.is_empty() {
        return Err(SkipInfo::new(SkipReason::NoValidReleases, true));
    }

    let repo_id = repo.id.clone();
    let repo_url = repo.url.clone();
    let outcomes = bounded_map(eligible, config.inner_concurrency, move |release| {
        validate_release(&repo_id, &repo_url, &release)
    });

    let mut accepted = Vec::new();
    let mut skips = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(release) => accepted.push(release),
            Err(skip) => skips.push(skip),
        }
    }

    if !accepted.is_empty() {
        return Ok(accepted);
    }

    if let Some(latest_tag) = latest_tag {
        if let Some(failing) = skips.iter().find(|s| s.tag_name.as_deref() == Some(latest_tag)) {
            let mut notifying = failing.clone();
            notifying.should_notify = true;
            return Err(notifying);
        }
    }

    Err(SkipInfo::new(SkipReason::NoValidReleases, false))
}

/// §4.4 release-set processing: if the repository's `latestRelease` tag is
/// absent from `releases`, append the embedded release object.
fn release_set_with_latest_appended(repo: &RawRepository) -> Vec<modcat_types::RawRelease> {
    let mut releases = repo.releases.clone();
    if let Some(latest) = &repo.latest_release {
        if !releases.iter().any(|r| r.tag_name == latest.tag_name) {
            releases.push(latest.clone());
        }
    }
    releases
}

#[cfg(test)]
mod tests {
    use super::*;
    use modcat_types::{Asset, RawRelease};

    fn config() -> ModuleValidationConfig {
        ModuleValidationConfig {
            inner_concurrency: 8,
            require_numeric_tag_prefix: false,
            reserved_names_override: Vec::new(),
        }
    }

    fn zip_asset() -> Asset {
        Asset {
            filename: "module.zip".into(),
            content_type: "application/zip".into(),
            download_url: "https://example.invalid/module.zip".into(),
            download_count: 0,
            size_bytes: 0,
        }
    }

    fn release(tag: &str) -> RawRelease {
        RawRelease {
            tag_name: tag.into(),
            name: tag.into(),
            description_markdown: None,
            description_html: None,
            created_at: None,
            published_at: None,
            updated_at: None,
            is_draft: false,
            is_prerelease: false,
            is_immutable: true,
            is_latest: false,
            assets: vec![zip_asset()],
        }
    }

    fn repo() -> RawRepository {
        RawRepository {
            id: "foo.bar".into(),
            description: Some("Foo Bar".into()),
            url: "https://github.com/o/foo.bar".into(),
            homepage_url: None,
            collaborators: vec![],
            readme: None,
            manifest: None,
            latest_release: None,
            releases: vec![],
            stargazer_count: 0,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn reserved_name_is_rejected_before_anything_else() {
        let mut r = repo();
        r.id = "submission".into();
        r.description = None;
        let err = validate_module(&r, &config()).unwrap_err();
        assert_eq!(err.reason.code(), "RESERVED_NAME");
        assert!(err.should_notify);
    }

    #[test]
    fn single_character_identifier_is_invalid() {
        let mut r = repo();
        r.id = "a".into();
        let err = validate_module(&r, &config()).unwrap_err();
        assert_eq!(err.reason.code(), "INVALID_NAME");
    }

    #[test]
    fn missing_description_is_rejected() {
        let mut r = repo();
        r.description = Some("   ".into());
        let err = validate_module(&r, &config()).unwrap_err();
        assert_eq!(err.reason.code(), "NO_DESCRIPTION");
    }

    #[test]
    fn only_draft_or_mutable_releases_yields_no_valid_releases_notify_true() {
        let mut r = repo();
        let mut draft = release("1-v1");
        draft.is_draft = true;
        r.releases = vec![draft];
        let err = validate_module(&r, &config()).unwrap_err();
        assert_eq!(err.reason.code(), "NO_VALID_RELEASES");
        assert!(err.should_notify);
    }

    #[test]
    fn latest_release_pointer_absent_from_list_is_appended() {
        let mut r = repo();
        r.releases = vec![]; // the probe below fails, but we only assert it was considered
        r.latest_release = Some(release("9-latest"));
        // No real zip content to probe, so this will still fail deep
        // validation (MISSING_MODULE_PROP) -- the point is it's reachable.
        let err = validate_module(&r, &config()).unwrap_err();
        assert_eq!(err.tag_name.as_deref(), Some("9-latest"));
    }
}
