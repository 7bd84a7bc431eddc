//! Data model for the modcat ingestion/validation/catalog-assembly pipeline.
//!
//! Every type here is a plain, serde-decodable value — no network or
//! filesystem access lives in this crate. Raw GitHub input types model every
//! field as `Option<T>` so a missing or null leaf degrades to `None` rather
//! than a decode error; derived types (`AcceptedRelease`, `Module`) are
//! produced by `modcat-validate` and `modcat-catalog`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `1970-01-01T00:00:00Z`, the default timestamp for a catalog field whose
/// underlying release is absent.
pub fn epoch_zero() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// A direct collaborator on a repository, as returned by the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub login: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A single downloadable artifact attached to a release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub filename: String,
    pub content_type: String,
    pub download_url: String,
    #[serde(default)]
    pub download_count: u64,
    #[serde(default)]
    pub size_bytes: u64,
}

impl Asset {
    pub fn is_zip(&self) -> bool {
        self.content_type == "application/zip"
    }
}

/// A release as returned verbatim by the platform, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRelease {
    pub tag_name: String,
    pub name: String,
    #[serde(default)]
    pub description_markdown: Option<String>,
    #[serde(default)]
    pub description_html: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub is_prerelease: bool,
    #[serde(default)]
    pub is_immutable: bool,
    #[serde(default)]
    pub is_latest: bool,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl RawRelease {
    /// The first asset whose content type is `application/zip`, if any.
    pub fn first_zip_asset(&self) -> Option<&Asset> {
        self.assets.iter().find(|a| a.is_zip())
    }
}

/// A repository as returned verbatim by the platform, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRepository {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub homepage_url: Option<String>,
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
    #[serde(default)]
    pub readme: Option<String>,
    #[serde(default)]
    pub manifest: Option<String>,
    /// The repository's `latestRelease` pointer. The hosting platform
    /// returns this as a full release object (not just a tag), which is
    /// what lets §4.4's release-set processing append it to `releases`
    /// when the paginated releases connection's first page omitted it.
    #[serde(default)]
    pub latest_release: Option<RawRelease>,
    #[serde(default)]
    pub releases: Vec<RawRelease>,
    #[serde(default)]
    pub stargazer_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A `key=value` manifest extracted from a release's zip asset. Key order is
/// not meaningful; duplicate keys take the last occurrence (see
/// `modcat-archive`'s parser).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMap(BTreeMap<String, String>);

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: String, value: String) {
        self.0.insert(key, value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize back to `key=value` lines, sorted by key. Used by the
    /// round-trip property test; not part of the on-wire protocol.
    pub fn to_lines(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A release that passed C3 validation, ready for catalog inclusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedRelease {
    pub tag_name: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description_html: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub is_prerelease: bool,
    pub assets: Vec<Asset>,
    pub version: String,
    pub version_code: String,
}

/// An author credited on a catalog module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub link: String,
}

/// The closed set of validation failure reasons. Each variant carries
/// exactly the detail fields its message template needs; `modcat-notify`
/// performs a total `match` over this enum rather than keying off a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("repository name is invalid")]
    InvalidName,
    #[error("repository has no description")]
    NoDescription,
    #[error("repository has no valid releases")]
    NoValidReleases,
    #[error("repository name is reserved")]
    ReservedName,
    #[error("release has no zip asset")]
    NoZipAsset,
    #[error("module id mismatch: repo={repo_name} module.prop id={module_id}")]
    ModuleIdMismatch { repo_name: String, module_id: String },
    #[error("module.prop is missing version or versionCode")]
    MissingVersion {
        version: Option<String>,
        version_code: Option<String>,
    },
    #[error("module.prop is missing or unparsable")]
    MissingModuleProp,
}

impl SkipReason {
    /// Stable symbolic name, used as the notification template key and in
    /// any serialized form of a `SkipInfo`.
    pub fn code(&self) -> &'static str {
        match self {
            SkipReason::InvalidName => "INVALID_NAME",
            SkipReason::NoDescription => "NO_DESCRIPTION",
            SkipReason::NoValidReleases => "NO_VALID_RELEASES",
            SkipReason::ReservedName => "RESERVED_NAME",
            SkipReason::NoZipAsset => "NO_ZIP_ASSET",
            SkipReason::ModuleIdMismatch { .. } => "MODULE_ID_MISMATCH",
            SkipReason::MissingVersion { .. } => "MISSING_VERSION",
            SkipReason::MissingModuleProp => "MISSING_MODULE_PROP",
        }
    }
}

/// A validation failure, at either module or release granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipInfo {
    pub reason: SkipReason,
    pub message: String,
    pub should_notify: bool,
    pub tag_name: Option<String>,
}

impl SkipInfo {
    pub fn new(reason: SkipReason, should_notify: bool) -> Self {
        let message = reason.to_string();
        Self {
            reason,
            message,
            should_notify,
            tag_name: None,
        }
    }

    pub fn with_tag(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = Some(tag_name.into());
        self
    }
}

/// A validated, catalog-eligible repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub module_id: String,
    pub module_name: String,
    pub url: String,
    #[serde(default)]
    pub homepage_url: Option<String>,
    pub authors: Vec<Author>,
    #[serde(default)]
    pub latest_release_name: Option<String>,
    pub latest_release_time: DateTime<Utc>,
    pub latest_beta_release_time: DateTime<Utc>,
    pub latest_snapshot_release_time: DateTime<Utc>,
    pub releases: Vec<AcceptedRelease>,
    #[serde(default)]
    pub readme: Option<String>,
    #[serde(default)]
    pub readme_html: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub stargazer_count: u64,
    #[serde(default)]
    pub metamodule: bool,
}

impl Module {
    /// `max(latestReleaseTime, latestBetaReleaseTime, latestSnapshotReleaseTime)`,
    /// the catalog's sort key (§3 invariant).
    pub fn sort_key(&self) -> DateTime<Utc> {
        self.latest_release_time
            .max(self.latest_beta_release_time)
            .max(self.latest_snapshot_release_time)
    }
}

/// The sorted, serialized array of `Module` records that constitutes the
/// pipeline's output. Serializes as a bare JSON array (no wrapper object),
/// matching `<cache>/modules.json` in §6.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog(pub Vec<Module>);

impl Catalog {
    pub fn new(modules: Vec<Module>) -> Self {
        Self(modules)
    }

    /// Sort descending by `Module::sort_key`, stable against ties (§4.6).
    pub fn sort(&mut self) {
        self.0.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
    }

    pub fn find_index(&self, module_id: &str) -> Option<usize> {
        self.0.iter().position(|m| m.module_id == module_id)
    }

    /// Replace the module with a matching id, or prepend it if absent, then
    /// resort. Used by incremental mode (§4.6).
    pub fn upsert(&mut self, module: Module) {
        match self.find_index(&module.module_id) {
            Some(idx) => self.0[idx] = module,
            None => self.0.insert(0, module),
        }
        self.sort();
    }

    /// Catalog uniqueness invariant (§8): no two modules share a module id.
    pub fn has_unique_ids(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.0.iter().all(|m| seen.insert(m.module_id.as_str()))
    }

    /// Sort-stability invariant (§8): non-increasing sort key.
    pub fn is_sorted_descending(&self) -> bool {
        self.0.windows(2).all(|w| w[0].sort_key() >= w[1].sort_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_map_round_trips_without_duplicates_or_hashes() {
        let mut map = PropertyMap::new();
        map.insert("id".into(), "foo.bar".into());
        map.insert("version".into(), "1.0".into());
        map.insert("versionCode".into(), "1".into());

        let serialized = map.to_lines();
        let mut reparsed = PropertyMap::new();
        for line in serialized.lines() {
            let (k, v) = line.split_once('=').unwrap();
            reparsed.insert(k.to_string(), v.to_string());
        }
        assert_eq!(map, reparsed);
    }

    #[test]
    fn catalog_upsert_replaces_existing_by_id() {
        let make = |id: &str, t: i64| Module {
            module_id: id.into(),
            module_name: id.into(),
            url: String::new(),
            homepage_url: None,
            authors: vec![],
            latest_release_name: None,
            latest_release_time: DateTime::<Utc>::from_timestamp(t, 0).unwrap(),
            latest_beta_release_time: epoch_zero(),
            latest_snapshot_release_time: epoch_zero(),
            releases: vec![],
            readme: None,
            readme_html: None,
            summary: None,
            source_url: None,
            created_at: epoch_zero(),
            updated_at: epoch_zero(),
            stargazer_count: 0,
            metamodule: false,
        };

        let mut catalog = Catalog::new(vec![make("a", 100), make("b", 50)]);
        catalog.upsert(make("b", 200));

        assert!(catalog.has_unique_ids());
        assert!(catalog.is_sorted_descending());
        assert_eq!(catalog.0[0].module_id, "b");
    }

    #[test]
    fn skip_reason_code_is_stable() {
        assert_eq!(SkipReason::ReservedName.code(), "RESERVED_NAME");
        assert_eq!(
            SkipReason::ModuleIdMismatch {
                repo_name: "a".into(),
                module_id: "b".into()
            }
            .code(),
            "MODULE_ID_MISMATCH"
        );
    }
}
