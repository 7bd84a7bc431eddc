use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::json;

use modcat_types::{Collaborator, RawRepository};

use crate::queries::{
    self, GqlEnvelope, OrgRepositoriesData, SingleRepositoryData,
};
use crate::{NotificationApi, OrgRepositoryApi, PlatformError, RefObject, RefObjectType, RepoRef, ReleaseAuthor, TagObject};

const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";
const GITHUB_REST_BASE: &str = "https://api.github.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("modcat/", env!("CARGO_PKG_VERSION"));

/// A GitHub client implementing both [`OrgRepositoryApi`] and
/// [`NotificationApi`] over `reqwest::blocking`.
///
/// `graphql_url` and `rest_base` are configurable so tests can point the
/// client at a local mock server instead of live GitHub.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::blocking::Client,
    token: String,
    graphql_url: String,
    rest_base: String,
}

impl GitHubClient {
    /// A client pointed at the real GitHub API.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_endpoints(token, GITHUB_GRAPHQL_URL, GITHUB_REST_BASE)
    }

    /// A client pointed at an arbitrary GraphQL endpoint and REST base URL,
    /// e.g. a `wiremock::MockServer`'s local URI in tests.
    pub fn with_endpoints(
        token: impl Into<String>,
        graphql_url: impl Into<String>,
        rest_base: impl Into<String>,
    ) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());

        Self {
            client,
            token: token.into(),
            graphql_url: graphql_url.into(),
            rest_base: rest_base.into(),
        }
    }

    fn graphql<T: for<'de> Deserialize<'de>>(&self, query: &str, variables: serde_json::Value) -> Result<T> {
        let response = self
            .client
            .post(&self.graphql_url)
            .bearer_auth(&self.token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .map_err(|source| PlatformError::Transport { url: self.graphql_url.clone(), source })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            bail!(PlatformError::UnexpectedStatus { status, url: self.graphql_url.clone(), body });
        }

        let envelope: GqlEnvelope<T> = response
            .json()
            .map_err(|source| PlatformError::Decode { url: self.graphql_url.clone(), source })?;

        if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
            let joined = errors.into_iter().map(|e| e.message).collect::<Vec<_>>().join("; ");
            bail!(PlatformError::GraphQlErrors(joined));
        }

        envelope.data.context("GraphQL response carried neither data nor errors")
    }

    fn rest_get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<Option<T>> {
        let url = format!("{}{path}", self.rest_base);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .map_err(|source| PlatformError::Transport { url: url.clone(), source })?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response
                    .json()
                    .map_err(|source| PlatformError::Decode { url: url.clone(), source })?;
                Ok(Some(body))
            }
            status => {
                let body = response.text().unwrap_or_default();
                bail!(PlatformError::UnexpectedStatus { status: status.as_u16(), url, body })
            }
        }
    }
}

impl OrgRepositoryApi for GitHubClient {
    fn list_org_repositories(&self, org: &str, page_size: u32) -> Result<Vec<RawRepository>> {
        let query = queries::org_repositories_query();
        let mut cursor: Option<String> = None;
        let mut repositories = Vec::new();

        loop {
            let variables = json!({ "org": org, "pageSize": page_size, "cursor": cursor });
            let data: OrgRepositoriesData = self
                .graphql(&query, variables)
                .with_context(|| format!("failed to list repositories for organization {org}"))?;

            let Some(organization) = data.organization else {
                bail!(PlatformError::RepositoryNotFound(org.to_string()));
            };

            let connection = organization.repositories;
            let has_next = connection.page_info.has_next_page;
            let next_cursor = connection.page_info.end_cursor.clone();
            repositories.extend(connection.nodes.into_iter().map(queries::map_repository));

            if !has_next || next_cursor.is_none() {
                break;
            }
            cursor = next_cursor;
        }

        Ok(repositories)
    }

    fn get_repository(&self, owner: &str, name: &str) -> Result<Option<RawRepository>> {
        let query = queries::single_repository_query();
        let variables = json!({ "owner": owner, "name": name });
        let data: SingleRepositoryData = self
            .graphql(&query, variables)
            .with_context(|| format!("failed to fetch repository {owner}/{name}"))?;

        Ok(data.repository.map(queries::map_repository))
    }
}

#[derive(Debug, Deserialize)]
struct RestReleaseResponse {
    author: Option<RestUser>,
}

#[derive(Debug, Deserialize)]
struct RestUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RestCollaborator {
    login: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestRef {
    object: RestGitObject,
}

#[derive(Debug, Deserialize)]
struct RestGitObject {
    sha: String,
    #[serde(rename = "type")]
    object_type: String,
}

#[derive(Debug, Deserialize)]
struct RestTag {
    object: RestGitObject,
}

impl NotificationApi for GitHubClient {
    fn get_release_by_tag(&self, repo: &RepoRef, tag: &str) -> Result<Option<ReleaseAuthor>> {
        let path = format!("/repos/{}/{}/releases/tags/{}", repo.owner, repo.name, tag);
        let release: Option<RestReleaseResponse> = self
            .rest_get(&path)
            .with_context(|| format!("failed to fetch release {tag} for {}/{}", repo.owner, repo.name))?;

        Ok(release.map(|r| ReleaseAuthor { login: r.author.map(|a| a.login) }))
    }

    fn list_collaborators(&self, repo: &RepoRef) -> Result<Vec<Collaborator>> {
        let path = format!("/repos/{}/{}/collaborators?affiliation=direct", repo.owner, repo.name);
        let collaborators: Option<Vec<RestCollaborator>> = self
            .rest_get(&path)
            .with_context(|| format!("failed to list collaborators for {}/{}", repo.owner, repo.name))?;

        Ok(collaborators
            .unwrap_or_default()
            .into_iter()
            .map(|c| Collaborator { login: c.login, display_name: c.name })
            .collect())
    }

    fn get_ref(&self, repo: &RepoRef, tag: &str) -> Result<RefObject> {
        let path = format!("/repos/{}/{}/git/ref/tags/{}", repo.owner, repo.name, tag);
        let reference: Option<RestRef> = self
            .rest_get(&path)
            .with_context(|| format!("failed to resolve tag ref {tag} for {}/{}", repo.owner, repo.name))?;

        let reference = reference.ok_or_else(|| PlatformError::RepositoryNotFound(format!("{}/{}@{tag}", repo.owner, repo.name)))?;
        let object_type = match reference.object.object_type.as_str() {
            "tag" => RefObjectType::Tag,
            _ => RefObjectType::Commit,
        };
        Ok(RefObject { object_sha: reference.object.sha, object_type })
    }

    fn get_tag(&self, repo: &RepoRef, sha: &str) -> Result<TagObject> {
        let path = format!("/repos/{}/{}/git/tags/{}", repo.owner, repo.name, sha);
        let tag: Option<RestTag> = self
            .rest_get(&path)
            .with_context(|| format!("failed to fetch annotated tag {sha} for {}/{}", repo.owner, repo.name))?;

        let tag = tag.ok_or_else(|| PlatformError::RepositoryNotFound(format!("{}/{} tag {sha}", repo.owner, repo.name)))?;
        Ok(TagObject { commit_sha: tag.object.sha })
    }

    fn create_commit_comment(&self, repo: &RepoRef, commit_sha: &str, body: &str) -> Result<()> {
        let url = format!("{}/repos/{}/{}/commits/{commit_sha}/comments", self.rest_base, repo.owner, repo.name);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&json!({ "body": body }))
            .send()
            .map_err(|source| PlatformError::Transport { url: url.clone(), source })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            bail!(PlatformError::UnexpectedStatus { status, url, body });
        }

        Ok(())
    }
}
