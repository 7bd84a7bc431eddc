//! GraphQL query text and response decoding.
//!
//! The query text itself is explicitly out of scope as a design problem
//! (§1) — it is written out concretely here only so the crate builds
//! end-to-end against a real GitHub GraphQL schema shape.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use modcat_types::{Asset, Collaborator, RawRelease, RawRepository};

const REPOSITORY_FIELDS: &str = r#"
name
description
url
homepageUrl
stargazerCount
createdAt
updatedAt
collaborators(affiliation: DIRECT, first: 100) {
  nodes { login name }
}
readmeObj: object(expression: "HEAD:README.md") {
  ... on Blob { text }
}
manifestObj: object(expression: "HEAD:.github/module-manifest.json") {
  ... on Blob { text }
}
latestRelease { ...releaseFields }
releases(first: 50, orderBy: { field: CREATED_AT, direction: DESC }) {
  nodes { ...releaseFields }
}
"#;

const RELEASE_FIELDS: &str = r#"
fragment releaseFields on Release {
  tagName
  name
  description
  descriptionHTML
  createdAt
  publishedAt
  updatedAt
  isDraft
  isPrerelease
  isLatest
  releaseAssets(first: 20) {
    nodes { name downloadUrl downloadCount size contentType }
  }
}
"#;

pub fn org_repositories_query() -> String {
    format!(
        r#"query($org: String!, $pageSize: Int!, $cursor: String) {{
  organization(login: $org) {{
    repositories(first: $pageSize, after: $cursor, orderBy: {{ field: UPDATED_AT, direction: DESC }}, privacy: PUBLIC) {{
      pageInfo {{ hasNextPage endCursor }}
      nodes {{ {REPOSITORY_FIELDS} }}
    }}
  }}
}}
{RELEASE_FIELDS}"#
    )
}

pub fn single_repository_query() -> String {
    format!(
        r#"query($owner: String!, $name: String!) {{
  repository(owner: $owner, name: $name) {{ {REPOSITORY_FIELDS} }}
}}
{RELEASE_FIELDS}"#
    )
}

#[derive(Debug, Deserialize)]
pub struct GqlEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GqlError>>,
}

#[derive(Debug, Deserialize)]
pub struct GqlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct OrgRepositoriesData {
    pub organization: Option<OrganizationNode>,
}

#[derive(Debug, Deserialize)]
pub struct OrganizationNode {
    pub repositories: RepositoryConnection,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryConnection {
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
    pub nodes: Vec<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
    #[serde(rename = "endCursor")]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SingleRepositoryData {
    pub repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryNode {
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    #[serde(rename = "homepageUrl")]
    pub homepage_url: Option<String>,
    #[serde(rename = "stargazerCount")]
    pub stargazer_count: u64,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
    pub collaborators: Option<CollaboratorConnection>,
    #[serde(rename = "readmeObj")]
    pub readme_obj: Option<BlobNode>,
    #[serde(rename = "manifestObj")]
    pub manifest_obj: Option<BlobNode>,
    #[serde(rename = "latestRelease")]
    pub latest_release: Option<ReleaseNode>,
    pub releases: ReleaseConnection,
}

#[derive(Debug, Deserialize)]
pub struct BlobNode {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CollaboratorConnection {
    pub nodes: Vec<CollaboratorNode>,
}

#[derive(Debug, Deserialize)]
pub struct CollaboratorNode {
    pub login: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseConnection {
    pub nodes: Vec<ReleaseNode>,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseNode {
    #[serde(rename = "tagName")]
    pub tag_name: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "descriptionHTML")]
    pub description_html: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "isDraft")]
    pub is_draft: bool,
    #[serde(rename = "isPrerelease")]
    pub is_prerelease: bool,
    #[serde(rename = "isLatest")]
    pub is_latest: bool,
    #[serde(rename = "releaseAssets")]
    pub release_assets: AssetConnection,
}

#[derive(Debug, Deserialize)]
pub struct AssetConnection {
    pub nodes: Vec<AssetNode>,
}

#[derive(Debug, Deserialize)]
pub struct AssetNode {
    pub name: String,
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
    #[serde(rename = "downloadCount")]
    pub download_count: u64,
    pub size: u64,
    #[serde(rename = "contentType")]
    pub content_type: Option<String>,
}

pub fn map_repository(node: RepositoryNode) -> RawRepository {
    RawRepository {
        id: node.name,
        description: node.description,
        url: node.url,
        homepage_url: node.homepage_url,
        collaborators: node
            .collaborators
            .map(|c| c.nodes.into_iter().map(map_collaborator).collect())
            .unwrap_or_default(),
        readme: node.readme_obj.and_then(|b| b.text),
        manifest: node.manifest_obj.and_then(|b| b.text),
        latest_release: node.latest_release.map(map_release),
        releases: node.releases.nodes.into_iter().map(map_release).collect(),
        stargazer_count: node.stargazer_count,
        created_at: node.created_at,
        updated_at: node.updated_at,
    }
}

fn map_collaborator(node: CollaboratorNode) -> Collaborator {
    Collaborator { login: node.login, display_name: node.name }
}

fn map_release(node: ReleaseNode) -> RawRelease {
    RawRelease {
        tag_name: node.tag_name,
        name: node.name,
        description_markdown: node.description,
        description_html: node.description_html,
        created_at: node.created_at,
        published_at: node.published_at,
        updated_at: node.updated_at,
        is_draft: node.is_draft,
        is_prerelease: node.is_prerelease,
        // GitHub's schema has no first-class "immutable" flag: a published
        // (non-draft) release's tag and assets cannot change, so treat
        // "not a draft" as the immutability signal.
        is_immutable: !node.is_draft,
        is_latest: node.is_latest,
        assets: node.release_assets.nodes.into_iter().map(map_asset).collect(),
    }
}

fn map_asset(node: AssetNode) -> Asset {
    Asset {
        filename: node.name,
        content_type: node.content_type.unwrap_or_default(),
        download_url: node.download_url,
        download_count: node.download_count,
        size_bytes: node.size,
    }
}
