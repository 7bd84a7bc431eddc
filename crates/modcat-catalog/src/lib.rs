//! Catalog Assembler (component C5).
//!
//! Turns a validated repository and its accepted releases into a catalog
//! [`Module`]: author resolution, summary/source-url extraction,
//! latest/beta/snapshot pointer selection, and README rendering.

mod authors;
mod manifest;

use std::sync::LazyLock;

use regex::Regex;

use modcat_types::{epoch_zero, AcceptedRelease, Module, RawRepository};

pub use authors::resolve_authors;
pub use manifest::{extract_metamodule, extract_source_url, extract_summary, parse_manifest};

/// `^(snapshot|nightly).*$`, case-insensitive, matched against a release's
/// display name to distinguish snapshot/nightly prereleases from ordinary
/// betas (§4.5 latest-by-kind selection).
static SNAPSHOT_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(snapshot|nightly).*$").expect("static regex"));

/// Assemble the catalog [`Module`] for a repository that the Module
/// Validator has already accepted, given its ordered `accepted_releases`
/// (newest-first, as returned by the data source — the Module Validator
/// must not reorder them).
pub fn assemble_module(repo: &RawRepository, accepted_releases: Vec<AcceptedRelease>) -> Module {
    let manifest = parse_manifest(repo.manifest.as_deref());
    let authors = resolve_authors(&repo.collaborators, &manifest.additional_authors);
    let summary = extract_summary(&manifest.summary);
    let source_url = extract_source_url(&manifest.source_url);
    let metamodule = extract_metamodule(&manifest.metamodule);

    let latest_release = accepted_releases.iter().find(|r| !r.is_prerelease);
    let latest_beta_release = accepted_releases
        .iter()
        .find(|r| r.is_prerelease && !SNAPSHOT_NAME_RE.is_match(&r.name))
        .or(latest_release);
    let latest_snapshot_release = accepted_releases
        .iter()
        .find(|r| r.is_prerelease && SNAPSHOT_NAME_RE.is_match(&r.name))
        .or(latest_beta_release);

    let readme = repo.readme.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let readme_html = readme.and_then(modcat_markdown::render);

    Module {
        module_id: repo.id.clone(),
        module_name: repo.description.clone().unwrap_or_default(),
        url: repo.url.clone(),
        homepage_url: repo.homepage_url.clone(),
        authors,
        latest_release_name: latest_release.map(|r| r.name.clone()),
        latest_release_time: latest_release.and_then(|r| r.published_at).unwrap_or_else(epoch_zero),
        latest_beta_release_time: latest_beta_release.and_then(|r| r.published_at).unwrap_or_else(epoch_zero),
        latest_snapshot_release_time: latest_snapshot_release
            .and_then(|r| r.published_at)
            .unwrap_or_else(epoch_zero),
        releases: accepted_releases,
        readme: readme.map(str::to_string),
        readme_html,
        summary,
        source_url,
        created_at: repo.created_at.unwrap_or_else(epoch_zero),
        updated_at: repo.updated_at.unwrap_or_else(epoch_zero),
        stargazer_count: repo.stargazer_count,
        metamodule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use modcat_types::Asset;

    fn repo() -> RawRepository {
        RawRepository {
            id: "foo.bar".into(),
            description: Some("Foo Bar".into()),
            url: "https://github.com/o/foo.bar".into(),
            homepage_url: None,
            collaborators: vec![],
            readme: Some("# Hi\n".into()),
            manifest: None,
            latest_release: None,
            releases: vec![],
            stargazer_count: 5,
            created_at: None,
            updated_at: None,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
    }

    fn release(name: &str, is_prerelease: bool, published: i64) -> AcceptedRelease {
        AcceptedRelease {
            tag_name: name.to_lowercase(),
            name: name.into(),
            url: "https://example.com".into(),
            description_html: None,
            created_at: Some(at(published)),
            published_at: Some(at(published)),
            updated_at: Some(at(published)),
            is_prerelease,
            assets: vec![Asset {
                filename: "m.zip".into(),
                content_type: "application/zip".into(),
                download_url: "https://example.com/m.zip".into(),
                download_count: 0,
                size_bytes: 0,
            }],
            version: "1.0".into(),
            version_code: "1".into(),
        }
    }

    #[test]
    fn picks_first_non_prerelease_as_latest() {
        let releases = vec![release("v2", false, 200), release("v1", false, 100)];
        let module = assemble_module(&repo(), releases);
        assert_eq!(module.latest_release_name.as_deref(), Some("v2"));
        assert_eq!(module.latest_release_time, at(200));
    }

    #[test]
    fn snapshot_named_prerelease_becomes_snapshot_pointer_not_beta() {
        let releases = vec![release("Snapshot build 3", true, 300), release("v1", false, 100)];
        let module = assemble_module(&repo(), releases);
        assert_eq!(module.latest_snapshot_release_time, at(300));
        // No ordinary beta exists, so beta falls back to the stable release.
        assert_eq!(module.latest_beta_release_time, at(100));
    }

    #[test]
    fn beta_falls_back_to_latest_release_when_absent() {
        let releases = vec![release("v1", false, 100)];
        let module = assemble_module(&repo(), releases);
        assert_eq!(module.latest_beta_release_time, at(100));
        assert_eq!(module.latest_snapshot_release_time, at(100));
    }

    #[test]
    fn missing_timestamps_default_to_epoch_zero() {
        let module = assemble_module(&repo(), vec![]);
        assert_eq!(module.latest_release_time, epoch_zero());
        assert_eq!(module.latest_beta_release_time, epoch_zero());
        assert_eq!(module.latest_snapshot_release_time, epoch_zero());
        assert_eq!(module.latest_release_name, None);
    }

    #[test]
    fn readme_is_rendered_when_present() {
        let module = assemble_module(&repo(), vec![]);
        assert!(module.readme.is_some());
        assert!(module.readme_html.unwrap().contains("<h1>"));
    }

    #[test]
    fn blank_readme_renders_to_none() {
        let mut r = repo();
        r.readme = Some("   \n  ".into());
        let module = assemble_module(&r, vec![]);
        assert_eq!(module.readme, None);
        assert_eq!(module.readme_html, None);
    }
}
