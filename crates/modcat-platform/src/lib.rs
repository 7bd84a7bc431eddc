//! Hosting-platform client: the GraphQL org-listing/detail queries and the
//! REST endpoints the Notification Dispatcher uses (§6).
//!
//! The two trait boundaries (`OrgRepositoryApi`, `NotificationApi`) exist so
//! the Orchestrator and `modcat-notify` can be exercised against a fake or a
//! `wiremock` server without a live GitHub account. [`GitHubClient`]
//! implements both over `reqwest::blocking`.

mod client;
mod queries;

pub use client::GitHubClient;

use modcat_types::RawRepository;

/// A repository identified by owner/name, as used by the REST endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self { owner: owner.into(), name: name.into() }
    }
}

/// The login on a release, as returned by `getReleaseByTag` (§4.7 step 1).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReleaseAuthor {
    pub login: Option<String>,
}

/// The object a ref currently points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefObject {
    pub object_sha: String,
    pub object_type: RefObjectType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefObjectType {
    Commit,
    Tag,
}

/// An annotated tag object, dereferenced to the commit it ultimately points
/// to (§4.7's "Commit resolution").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagObject {
    pub commit_sha: String,
}

/// The only error type a caller of this crate is expected to pattern-match
/// on — everything else (notably transient network failures) propagates as
/// `anyhow::Error` at the orchestration seam, per §7 kind 2.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("repository not found: {0}")]
    RepositoryNotFound(String),
    #[error("request to {url} failed")]
    Transport { url: String, #[source] source: reqwest::Error },
    #[error("unexpected status {status} from {url}: {body}")]
    UnexpectedStatus { status: u16, url: String, body: String },
    #[error("failed to decode response from {url}")]
    Decode { url: String, #[source] source: reqwest::Error },
    #[error("GraphQL query returned errors: {0}")]
    GraphQlErrors(String),
}

/// Lists and fetches repositories belonging to the organization (§6 GraphQL
/// listing + detail queries).
pub trait OrgRepositoryApi {
    /// Page the organization's public repositories, newest-updated-first,
    /// following cursor pagination until exhausted.
    fn list_org_repositories(&self, org: &str, page_size: u32) -> anyhow::Result<Vec<RawRepository>>;

    /// Fetch a single repository by owner/name. `Ok(None)` if it does not
    /// exist or is not visible to the configured token.
    fn get_repository(&self, owner: &str, name: &str) -> anyhow::Result<Option<RawRepository>>;
}

/// The REST endpoints used exclusively by the Notification Dispatcher (§4.7,
/// §6).
pub trait NotificationApi {
    fn get_release_by_tag(&self, repo: &RepoRef, tag: &str) -> anyhow::Result<Option<ReleaseAuthor>>;
    fn list_collaborators(&self, repo: &RepoRef) -> anyhow::Result<Vec<modcat_types::Collaborator>>;
    fn get_ref(&self, repo: &RepoRef, tag: &str) -> anyhow::Result<RefObject>;
    fn get_tag(&self, repo: &RepoRef, sha: &str) -> anyhow::Result<TagObject>;
    fn create_commit_comment(&self, repo: &RepoRef, commit_sha: &str, body: &str) -> anyhow::Result<()>;
}
