//! Addressee resolution (§4.7 step 1-3).

use modcat_platform::{NotificationApi, RepoRef};

/// Logins known to belong to automation rather than a human author.
const KNOWN_BOTS: &[&str] = &["github-actions[bot]", "dependabot[bot]", "renovate[bot]"];

fn is_bot(login: &str) -> bool {
    KNOWN_BOTS.contains(&login)
}

/// Resolve the set of logins to `@mention` in the notification comment.
/// Empty means "post without mentions" (§9 Open Question 2).
pub fn resolve_mentions(platform: &dyn NotificationApi, repo: &RepoRef, tag: &str) -> Vec<String> {
    match platform.get_release_by_tag(repo, tag) {
        Ok(Some(author)) => {
            if let Some(login) = author.login.filter(|l| !is_bot(l)) {
                return vec![login];
            }
        }
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(%err, tag, "failed to look up release author, falling back to collaborators");
        }
    }

    match platform.list_collaborators(repo) {
        Ok(collaborators) => collaborators
            .into_iter()
            .map(|c| c.login)
            .filter(|login| !is_bot(login))
            .collect(),
        Err(err) => {
            tracing::warn!(%err, "failed to list collaborators, posting without mentions");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modcat_platform::{RefObject, RefObjectType, ReleaseAuthor, TagObject};
    use modcat_types::Collaborator;

    #[test]
    fn known_bots_are_recognized() {
        assert!(is_bot("dependabot[bot]"));
        assert!(!is_bot("octocat"));
    }

    #[derive(Default)]
    struct FakeApi {
        release_author: Option<String>,
        collaborators: Vec<&'static str>,
    }

    impl NotificationApi for FakeApi {
        fn get_release_by_tag(&self, _repo: &RepoRef, _tag: &str) -> anyhow::Result<Option<ReleaseAuthor>> {
            Ok(Some(ReleaseAuthor { login: self.release_author.clone() }))
        }

        fn list_collaborators(&self, _repo: &RepoRef) -> anyhow::Result<Vec<Collaborator>> {
            Ok(self
                .collaborators
                .iter()
                .map(|login| Collaborator { login: login.to_string(), display_name: None })
                .collect())
        }

        fn get_ref(&self, _repo: &RepoRef, _tag: &str) -> anyhow::Result<RefObject> {
            Ok(RefObject { object_sha: "deadbeef".into(), object_type: RefObjectType::Commit })
        }

        fn get_tag(&self, _repo: &RepoRef, _sha: &str) -> anyhow::Result<TagObject> {
            Ok(TagObject { commit_sha: "deadbeef".into() })
        }

        fn create_commit_comment(&self, _repo: &RepoRef, _commit_sha: &str, _body: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn repo() -> RepoRef {
        RepoRef::new("o", "r")
    }

    #[test]
    fn release_author_is_preferred_over_collaborators() {
        let api = FakeApi {
            release_author: Some("octocat".into()),
            collaborators: vec!["other"],
        };
        assert_eq!(resolve_mentions(&api, &repo(), "1-v1"), vec!["octocat".to_string()]);
    }

    #[test]
    fn bot_release_author_falls_back_to_non_bot_collaborators() {
        let api = FakeApi {
            release_author: Some("github-actions[bot]".into()),
            collaborators: vec!["dependabot[bot]", "octocat"],
        };
        assert_eq!(resolve_mentions(&api, &repo(), "1-v1"), vec!["octocat".to_string()]);
    }

    #[test]
    fn no_author_and_bot_only_collaborators_yields_no_mentions() {
        let api = FakeApi { release_author: None, collaborators: vec!["renovate[bot]"] };
        assert!(resolve_mentions(&api, &repo(), "1-v1").is_empty());
    }
}
