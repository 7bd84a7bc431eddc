//! Static reason → message template table (§4.7 "Body assembly").
//!
//! Templates are the sole user-visible vocabulary; everything upstream
//! refers to reasons symbolically via [`modcat_types::SkipReason`].

use modcat_types::SkipReason;

/// `(title, body)` for `reason`, with `{placeholder}` fields filled from the
/// reason's own detail fields. Unknown/absent values render as `N/A`.
pub fn render_template(reason: &SkipReason) -> (String, String) {
    match reason {
        SkipReason::InvalidName => (
            "Module name is invalid".to_string(),
            "This repository's name doesn't match the required module-identifier format.".to_string(),
        ),
        SkipReason::NoDescription => (
            "Module is missing a description".to_string(),
            "Add a repository description; it becomes this module's catalog name.".to_string(),
        ),
        SkipReason::NoValidReleases => (
            "No valid releases found".to_string(),
            "None of this repository's releases passed validation.".to_string(),
        ),
        SkipReason::ReservedName => (
            "Module name is reserved".to_string(),
            "This repository's name is reserved by the platform and cannot be used as a module id.".to_string(),
        ),
        SkipReason::NoZipAsset => (
            "Release is missing its module archive".to_string(),
            "Attach a `.zip` asset with content type `application/zip` to this release.".to_string(),
        ),
        SkipReason::ModuleIdMismatch { repo_name, module_id } => (
            "Module id mismatch".to_string(),
            format!(
                "This release's `module.prop` declares id `{}`, but the repository is `{}`.",
                placeholder(module_id),
                placeholder(repo_name)
            ),
        ),
        SkipReason::MissingVersion { version, version_code } => (
            "Release is missing version metadata".to_string(),
            format!(
                "`module.prop` must define both `version` ({}) and `versionCode` ({}).",
                placeholder_opt(version.as_deref()),
                placeholder_opt(version_code.as_deref())
            ),
        ),
        SkipReason::MissingModuleProp => (
            "Release is missing module.prop".to_string(),
            "Could not find or parse `module.prop` inside this release's zip asset.".to_string(),
        ),
    }
}

fn placeholder(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

fn placeholder_opt(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "N/A",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_id_mismatch_interpolates_both_values() {
        let (_, body) = render_template(&SkipReason::ModuleIdMismatch {
            repo_name: "foo.bar".into(),
            module_id: "foo.baz".into(),
        });
        assert!(body.contains("foo.bar"));
        assert!(body.contains("foo.baz"));
    }

    #[test]
    fn missing_version_renders_na_for_absent_fields() {
        let (_, body) = render_template(&SkipReason::MissingVersion { version: None, version_code: None });
        assert!(body.contains("N/A"));
    }
}
