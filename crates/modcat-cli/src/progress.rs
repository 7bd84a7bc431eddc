//! TTY-aware progress reporting: a progress bar when stdout is a terminal,
//! plain line-oriented `eprintln!` output otherwise.

use atty::Stream;
use indicatif::{ProgressBar, ProgressStyle};
use modcat::Reporter;

pub fn is_tty() -> bool {
    atty::is(Stream::Stdout)
}

pub struct ProgressReporter {
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = if is_tty() {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            Some(pb)
        } else {
            None
        };
        Self { bar }
    }

    pub fn silent() -> Self {
        Self { bar: None }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ProgressReporter {
    fn info(&mut self, msg: &str) {
        match &self.bar {
            Some(pb) => pb.set_message(msg.to_string()),
            None => eprintln!("[info] {msg}"),
        }
    }

    fn warn(&mut self, msg: &str) {
        match &self.bar {
            Some(pb) => pb.println(format!("[warn] {msg}")),
            None => eprintln!("[warn] {msg}"),
        }
    }

    fn error(&mut self, msg: &str) {
        match &self.bar {
            Some(pb) => pb.println(format!("[error] {msg}")),
            None => eprintln!("[error] {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_reporter_has_no_bar() {
        let reporter = ProgressReporter::silent();
        assert!(reporter.bar.is_none());
    }

    #[test]
    fn silent_reporter_accepts_all_levels() {
        let mut reporter = ProgressReporter::silent();
        reporter.info("hi");
        reporter.warn("careful");
        reporter.error("boom");
    }
}
