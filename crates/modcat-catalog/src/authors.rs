//! Author resolution (§4.5): collaborators, patched by the auxiliary
//! manifest's `additionalAuthors` array.

use modcat_types::{Author, Collaborator};

use crate::manifest::AdditionalAuthorEntry;

const GITHUB_BASE: &str = "https://github.com";

/// A candidate author still carrying its source login (when derived from a
/// collaborator), so a later `remove` entry can match on login as well as
/// on display name, per §4.5.
struct Candidate {
    name: String,
    link: String,
    login: Option<String>,
}

/// Resolve the final author list: collaborators rendered as
/// `{name: displayName ?? login, link: "<platform>/<login>"}`, then patched
/// in order by `additional_authors`. Duplicate-by-name entries are dropped
/// silently (first occurrence wins); relative order of survivors is
/// preserved.
pub fn resolve_authors(
    collaborators: &[Collaborator],
    additional_authors: &[AdditionalAuthorEntry],
) -> Vec<Author> {
    let mut candidates: Vec<Candidate> = collaborators
        .iter()
        .map(|c| Candidate {
            name: c.display_name.clone().unwrap_or_else(|| c.login.clone()),
            link: format!("{GITHUB_BASE}/{}", c.login),
            login: Some(c.login.clone()),
        })
        .collect();

    for entry in additional_authors {
        match entry.kind.as_deref() {
            Some("remove") => {
                candidates.retain(|c| c.name != entry.name && c.login.as_deref() != Some(entry.name.as_str()));
            }
            Some("add") | None => {
                if !candidates.iter().any(|c| c.name == entry.name) {
                    candidates.push(Candidate {
                        name: entry.name.clone(),
                        link: entry.link.clone().unwrap_or_default(),
                        login: None,
                    });
                }
            }
            Some(_) => {}
        }
    }

    candidates
        .into_iter()
        .map(|c| Author { name: c.name, link: c.link })
        .collect()
}
