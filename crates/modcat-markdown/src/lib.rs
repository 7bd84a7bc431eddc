//! README rendering used by the Catalog Assembler (§4.5).
//!
//! A thin wrapper around `comrak`, configured for exactly the extensions
//! §4.5/§9 call out as behavioral contracts: task-list checkboxes,
//! footnotes, alert-block admonitions, emoji shortcodes, HTML passthrough,
//! link auto-detection, and typographic substitution.

use comrak::{markdown_to_html, Options};

/// Render `readme` (raw markdown) to HTML per the Catalog Assembler's
/// README rendering rule. Returns `None` if `readme` is empty after
/// trimming.
pub fn render(readme: &str) -> Option<String> {
    let trimmed = readme.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(markdown_to_html(trimmed, &options()))
}

fn options() -> Options {
    let mut opts = Options::default();

    opts.extension.autolink = true;
    opts.extension.tasklist = true;
    opts.extension.footnotes = true;
    opts.extension.strikethrough = true;
    opts.extension.table = true;
    opts.extension.alerts = true;
    opts.extension.shortcodes = true;

    opts.parse.smart = true;

    // The README is first-party content authored by the module's own
    // maintainers, not untrusted user input; passthrough HTML is expected
    // (badges, centered headers, collapsible sections).
    opts.render.unsafe_ = true;

    opts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_readme_renders_to_none() {
        assert_eq!(render(""), None);
        assert_eq!(render("   \n\t  "), None);
    }

    #[test]
    fn renders_basic_markdown() {
        let html = render("# Title\n\nSome **bold** text.").unwrap();
        assert!(html.contains("<h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn renders_task_lists() {
        let html = render("- [x] done\n- [ ] todo\n").unwrap();
        assert!(html.contains("checkbox"));
    }

    #[test]
    fn autolinks_bare_urls() {
        let html = render("See https://example.com for details.").unwrap();
        assert!(html.contains("<a href=\"https://example.com\""));
    }

    #[test]
    fn passes_through_raw_html() {
        let html = render("<div align=\"center\">centered</div>").unwrap();
        assert!(html.contains("<div align=\"center\">"));
    }

    #[test]
    fn renders_footnotes() {
        let html = render("text[^1]\n\n[^1]: a footnote\n").unwrap();
        assert!(html.contains("footnote"));
    }
}
