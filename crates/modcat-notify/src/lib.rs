//! Notification Dispatcher (component C7).
//!
//! Turns a release-level [`SkipInfo`] into a human-readable comment on the
//! commit the offending tag points to, with addressee resolution (§4.7).

mod addressee;
mod templates;

use modcat_platform::{NotificationApi, RefObjectType, RepoRef};
use modcat_types::SkipInfo;

/// Resolve `tags/{tag}` to the commit it ultimately points to: dereference
/// once if the ref is an annotated tag object (§4.7 "Commit resolution").
fn resolve_commit_sha(platform: &dyn NotificationApi, repo: &RepoRef, tag: &str) -> anyhow::Result<String> {
    let reference = platform.get_ref(repo, tag)?;
    match reference.object_type {
        RefObjectType::Commit => Ok(reference.object_sha),
        RefObjectType::Tag => {
            let tag_object = platform.get_tag(repo, &reference.object_sha)?;
            Ok(tag_object.commit_sha)
        }
    }
}

fn assemble_body(mentions: &[String], title: &str, body: &str) -> String {
    let mention_line = if mentions.is_empty() {
        String::new()
    } else {
        format!("{}\n\n", mentions.iter().map(|m| format!("@{m}")).collect::<Vec<_>>().join(" "))
    };

    format!(
        "{mention_line}**{title}**\n\n{body}\n\n---\n_This comment was posted automatically by the module catalog pipeline._"
    )
}

/// Publish a notification for `skip` (must carry `tag_name`) on `repo`.
/// Never returns an `Err`: per §4.7's idempotence note, a transient failure
/// during notification is logged and otherwise swallowed, not raised, since
/// the release that triggered it cannot be republished and so cannot be
/// retried meaningfully at this layer.
pub fn dispatch(platform: &dyn NotificationApi, repo: &RepoRef, skip: &SkipInfo) {
    let Some(tag) = skip.tag_name.as_deref() else {
        tracing::error!(reason = skip.reason.code(), "dispatch called without a tag_name");
        return;
    };

    let mentions = addressee::resolve_mentions(platform, repo, tag);
    let (title, body_text) = templates::render_template(&skip.reason);
    let body = assemble_body(&mentions, &title, &body_text);

    let result = resolve_commit_sha(platform, repo, tag)
        .and_then(|commit_sha| platform.create_commit_comment(repo, &commit_sha, &body));

    if let Err(err) = result {
        tracing::error!(%err, tag, owner = %repo.owner, name = %repo.name, "failed to post notification comment");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_body_omits_mention_line_when_empty() {
        let body = assemble_body(&[], "Title", "Body text");
        assert!(body.starts_with("**Title**"));
    }

    #[test]
    fn assemble_body_prefixes_mentions() {
        let body = assemble_body(&["octocat".to_string(), "hubot".to_string()], "Title", "Body text");
        assert!(body.starts_with("@octocat @hubot\n\n**Title**"));
    }
}
