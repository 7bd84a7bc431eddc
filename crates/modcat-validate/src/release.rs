//! Release Validator (component C3).
//!
//! A release is either dropped silently by the pre-filter, produces a
//! tagged [`SkipInfo`], or becomes an [`AcceptedRelease`]. Ordering of the
//! deep-validation checks is significant: the first failing check wins.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::instrument;

use modcat_types::{AcceptedRelease, RawRelease, SkipInfo, SkipReason};

/// `^\d+-.+$`, the optional tag-prefix pre-filter condition (§9 Open
/// Question, resolved default-on via `Config::require_numeric_tag_prefix`).
static NUMERIC_TAG_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+-.+$").expect("static regex"));

/// `https://github.com/{owner}/{repo}/assets/{num}/{uuid}` in raw markdown.
static PUBLIC_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https://github\.com/[^/\s]+/[^/\s]+/assets/\d+/([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})",
    )
    .expect("static regex")
});

/// `https://private-user-images.githubusercontent.com/{n}/{n}-{uuid}...`
/// up to (not including) the next `"`, as it appears embedded in HTML.
static PRIVATE_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"https://private-user-images\.githubusercontent\.com/\d+/\d+-([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})[^"]*"#,
    )
    .expect("static regex")
});

/// §4.3 pre-filter: `!isDraft ∧ isImmutable ∧ ∃ zip asset`, plus the
/// feature-flagged numeric tag-prefix condition.
pub fn is_eligible_for_deep_inspection(release: &RawRelease, require_numeric_tag_prefix: bool) -> bool {
    if release.is_draft || !release.is_immutable {
        return false;
    }
    if require_numeric_tag_prefix && !NUMERIC_TAG_PREFIX_RE.is_match(&release.tag_name) {
        return false;
    }
    release.first_zip_asset().is_some()
}

/// Run the ordered deep-validation checks on a release already known to be
/// pre-filter-eligible. Every `Err` here carries `should_notify = false`;
/// the Module Validator (§4.4) decides notification based on whether the
/// failing tag is the repository's declared latest.
#[instrument(level = "debug", skip_all, fields(repo = repo_id, tag = %release.tag_name))]
pub fn validate_release(
    repo_id: &str,
    repo_url: &str,
    release: &RawRelease,
) -> Result<AcceptedRelease, SkipInfo> {
    let skip = |reason: SkipReason| SkipInfo::new(reason, false).with_tag(release.tag_name.clone());

    let Some(zip_asset) = release.first_zip_asset() else {
        return Err(skip(SkipReason::NoZipAsset));
    };

    let props = modcat_archive::probe_module_prop(&zip_asset.download_url);
    if props.is_empty() {
        return Err(skip(SkipReason::MissingModuleProp));
    }

    let module_id = props.get("id").unwrap_or_default();
    if module_id != repo_id {
        return Err(skip(SkipReason::ModuleIdMismatch {
            repo_name: repo_id.to_string(),
            module_id: module_id.to_string(),
        }));
    }

    let version = props.get("version").filter(|v| !v.is_empty()).map(str::to_string);
    let version_code = props
        .get("versionCode")
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let (Some(version), Some(version_code)) = (version.clone(), version_code.clone()) else {
        return Err(skip(SkipReason::MissingVersion { version, version_code }));
    };

    let description_html = release.description_html.as_deref().map(|html| {
        rewrite_private_images(release.description_markdown.as_deref().unwrap_or(""), html)
    });

    Ok(AcceptedRelease {
        tag_name: release.tag_name.clone(),
        name: release.name.clone(),
        url: format!("{}/releases/tag/{}", repo_url.trim_end_matches('/'), release.tag_name),
        description_html,
        created_at: release.created_at,
        published_at: release.published_at,
        updated_at: release.updated_at,
        is_prerelease: release.is_prerelease,
        assets: release.assets.clone(),
        version,
        version_code,
    })
}

/// §4.3 private-image rewrite: map each UUID seen in a public
/// `github.com/.../assets/...` URL within `markdown` to its full URL, then
/// replace any `private-user-images.githubusercontent.com` URL in `html`
/// sharing that UUID with the public form. UUIDs with no public match are
/// left untouched. Idempotent: after rewriting, `html` no longer contains
/// the private-images domain, so a second pass is a no-op.
pub fn rewrite_private_images(markdown: &str, html: &str) -> String {
    let mut public_by_uuid: HashMap<String, String> = HashMap::new();
    for caps in PUBLIC_IMAGE_RE.captures_iter(markdown) {
        let full = caps.get(0).expect("group 0 always matches").as_str().to_string();
        let uuid = caps[1].to_lowercase();
        public_by_uuid.insert(uuid, full);
    }

    if public_by_uuid.is_empty() {
        return html.to_string();
    }

    PRIVATE_IMAGE_RE
        .replace_all(html, |caps: &Captures| {
            let uuid = caps[1].to_lowercase();
            public_by_uuid
                .get(&uuid)
                .cloned()
                .unwrap_or_else(|| caps.get(0).expect("group 0 always matches").as_str().to_string())
        })
        .into_owned()
}
