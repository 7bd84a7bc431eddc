//! Property-file probe (component C2).
//!
//! Extracts `module.prop` from the zip archive at a release asset's
//! download URL, via the `runzip` extractor subprocess (§6), and parses it
//! into a [`PropertyMap`]. Any I/O error, non-zero exit, empty output, or
//! output exceeding the 64 KiB cap yields an empty map rather than an
//! error — callers uniformly see this as `MISSING_MODULE_PROP` further up
//! the validation chain (§4.2).

use std::io::Read;
use std::process::{Command, Stdio};

use modcat_types::PropertyMap;

/// Name of the entry extracted from the release archive.
pub const MODULE_PROP_ENTRY: &str = "module.prop";

/// Maximum number of bytes read from the extractor's stdout. Output beyond
/// this is treated as an extraction failure, not a truncation.
pub const PROPERTY_FILE_CAP_BYTES: usize = 65_536;

/// Run the full probe: extract `module.prop` from `download_url` and parse
/// it. Never fails; returns an empty map on any problem.
pub fn probe_module_prop(download_url: &str) -> PropertyMap {
    match extract_module_prop(download_url) {
        Some(bytes) => parse_property_file(&String::from_utf8_lossy(&bytes)),
        None => {
            tracing::debug!(url = download_url, "module.prop extraction failed or empty");
            PropertyMap::new()
        }
    }
}

/// Invoke `runzip -p <url> module.prop`, returning its stdout bytes if the
/// process exits successfully, produced at least one byte, and stayed
/// within the cap. Kills the child (best-effort) once the cap is reached
/// so a misbehaving archive can't block the calling thread indefinitely.
fn extract_module_prop(download_url: &str) -> Option<Vec<u8>> {
    let mut child = Command::new("runzip")
        .arg("-p")
        .arg(download_url)
        .arg(MODULE_PROP_ENTRY)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .stdin(Stdio::null())
        .spawn()
        .inspect_err(|err| tracing::warn!(url = download_url, %err, "failed to spawn runzip"))
        .ok()?;

    let mut stdout = child.stdout.take()?;
    let mut buf = Vec::new();
    let mut limited = (&mut stdout).take((PROPERTY_FILE_CAP_BYTES + 1) as u64);
    let read_result = limited.read_to_end(&mut buf);

    // Whether or not the cap was exceeded, stop waiting on the child's own
    // output; reap it so it never becomes a zombie.
    let _ = child.kill();
    let status = child.wait().ok()?;

    read_result.ok()?;

    if !status.success() {
        return None;
    }
    if buf.is_empty() || buf.len() > PROPERTY_FILE_CAP_BYTES {
        return None;
    }

    Some(buf)
}

/// Parse `key=value` lines per §4.2: trim whitespace, skip blank lines and
/// lines whose first non-space character is `#`, split on the first `=`
/// (requiring at least one character before it), trim both sides, and let
/// later keys override earlier ones.
pub fn parse_property_file(text: &str) -> PropertyMap {
    let mut map = PropertyMap::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some(eq_idx) = line.find('=') else {
            continue;
        };
        if eq_idx == 0 {
            continue;
        }

        let key = line[..eq_idx].trim();
        let value = line[eq_idx + 1..].trim();
        if key.is_empty() {
            continue;
        }

        map.insert(key.to_string(), value.to_string());
    }

    map
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_accepted_shape() {
        let map = parse_property_file("id=foo.bar\nversion=1.0\nversionCode=1\n");
        assert_eq!(map.get("id"), Some("foo.bar"));
        assert_eq!(map.get("version"), Some("1.0"));
        assert_eq!(map.get("versionCode"), Some("1"));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let map = parse_property_file("# a comment\n\n  \nid=x\n   # indented comment\n");
        assert_eq!(map.get("id"), Some("x"));
        assert_eq!(map.iter().count(), 1);
    }

    #[test]
    fn later_key_overrides_earlier() {
        let map = parse_property_file("version=1\nversion=2\n");
        assert_eq!(map.get("version"), Some("2"));
    }

    #[test]
    fn requires_at_least_one_char_before_equals() {
        let map = parse_property_file("=novalue\nid=x\n");
        assert_eq!(map.iter().count(), 1);
        assert_eq!(map.get("id"), Some("x"));
    }

    #[test]
    fn trims_key_and_value_whitespace() {
        let map = parse_property_file("  id  =  foo.bar  \n");
        assert_eq!(map.get("id"), Some("foo.bar"));
    }

    #[test]
    fn line_without_equals_is_ignored() {
        let map = parse_property_file("not a property line\nid=x\n");
        assert_eq!(map.iter().count(), 1);
    }

    proptest::proptest! {
        #[test]
        fn parse_never_panics_on_arbitrary_text(s in ".*") {
            let _ = parse_property_file(&s);
        }
    }
}
