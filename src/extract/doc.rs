//! Documentation file collection
//!
//! Walks a working copy and concatenates every documentation file into one
//! text stream, each file preceded by a `File: <relative path>` header.

use super::{has_extension, read_text, walk_files};
use crate::config::FailurePolicy;
use crate::error::{Error, Result};
use crate::progress::Progress;
use std::io::Write;
use std::path::Path;

/// Predicate deciding from its content that a file must be left out
pub type ExcludeFn = Box<dyn Fn(&str) -> bool>;

/// A documentation file selected for output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedFile {
    /// Path relative to the collection root
    pub relative_path: String,
    /// Full file content, verbatim
    pub content: String,
}

impl CollectedFile {
    /// Write the header line, the content and two blank lines
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "File: {}", self.relative_path)?;
        out.write_all(self.content.as_bytes())?;
        out.write_all(b"\n\n")
    }
}

/// Counts reported after a collection pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectSummary {
    /// Files written to the sink
    pub emitted: usize,
    /// Files rejected by the exclusion predicate
    pub excluded: usize,
    /// Files passed over by the skip policy
    pub skipped: usize,
}

/// Collects documentation files by extension
pub struct DocCollector {
    extensions: Vec<String>,
    exclude: Option<ExcludeFn>,
    ignore_dirs: Vec<String>,
    policy: FailurePolicy,
}

impl DocCollector {
    /// Create a collector selecting files ending in `.<ext>` for each extension
    pub fn new(extensions: Vec<String>) -> Self {
        Self {
            extensions,
            exclude: None,
            ignore_dirs: Vec::new(),
            policy: FailurePolicy::Abort,
        }
    }

    /// Leave out files whose content satisfies `predicate`
    pub fn exclude_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + 'static,
    {
        self.exclude = Some(Box::new(predicate));
        self
    }

    /// Directory names not to descend into
    pub fn ignore_dirs(mut self, dirs: Vec<String>) -> Self {
        self.ignore_dirs = dirs;
        self
    }

    /// Policy for files that are not valid UTF-8
    pub fn on_error(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Walk `root` and write every selected file to `out`
    pub fn collect<W: Write>(
        &self,
        root: &Path,
        out: &mut W,
        progress: &dyn Progress,
    ) -> Result<CollectSummary> {
        let mut summary = CollectSummary::default();

        for path in walk_files(root, &self.ignore_dirs) {
            let path = path?;
            if !has_extension(&path, &self.extensions) {
                continue;
            }

            progress.file_read(&path);
            let content = match read_text(&path) {
                Ok(content) => content,
                Err(e) if e.is_per_file() && self.policy == FailurePolicy::Skip => {
                    progress.file_skipped(&path, &e.to_string());
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            if self.exclude.as_ref().is_some_and(|excluded| excluded(content.as_str())) {
                tracing::debug!("Excluding placeholder {:?}", path);
                summary.excluded += 1;
                continue;
            }

            let relative_path = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .into_owned();

            CollectedFile {
                relative_path,
                content,
            }
            .write_to(out)
            .map_err(Error::Output)?;
            summary.emitted += 1;
        }

        Ok(summary)
    }
}

/// Predicate matching Markdown files that carry a toctree directive
pub fn toctree_placeholder(marker: &str) -> impl Fn(&str) -> bool + 'static {
    let marker = marker.to_owned();
    move |content: &str| content.contains(marker.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Silent;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn collect_to_string(collector: &DocCollector, root: &Path) -> (String, CollectSummary) {
        let mut out = Vec::new();
        let summary = collector.collect(root, &mut out, &Silent).unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    #[test]
    fn test_header_then_verbatim_content() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docs/api")).unwrap();
        std::fs::write(dir.path().join("README.md"), "# Title\r\nBody\n").unwrap();
        std::fs::write(dir.path().join("docs/api/index.rst"), "API\n===").unwrap();
        std::fs::write(dir.path().join("main.py"), "print('hi')\n").unwrap();

        let collector = DocCollector::new(exts(&["rst", "md"]));
        let (output, summary) = collect_to_string(&collector, dir.path());

        assert!(output.contains("File: README.md\n# Title\r\nBody\n\n\n"));
        let rst_header = format!("File: {}\n", Path::new("docs/api/index.rst").display());
        assert!(output.contains(&format!("{rst_header}API\n===\n\n")));
        assert!(!output.contains("main.py"));
        assert_eq!(summary.emitted, 2);
        assert_eq!(output.matches("File: ").count(), 2);
    }

    #[test]
    fn test_toctree_placeholder_excluded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.md"),
            "# Contents\n\n```{toctree}\n:maxdepth: 2\n\nguide\n```\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("guide.md"), "# Guide\n").unwrap();

        let collector =
            DocCollector::new(exts(&["md"])).exclude_when(toctree_placeholder("{toctree}"));
        let (output, summary) = collect_to_string(&collector, dir.path());

        assert_eq!(output, "File: guide.md\n# Guide\n\n\n");
        assert_eq!(summary.emitted, 1);
        assert_eq!(summary.excluded, 1);
    }

    #[test]
    fn test_without_predicate_everything_is_emitted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.md"), "```{toctree}\n```\n").unwrap();

        let collector = DocCollector::new(exts(&["md"]));
        let (output, summary) = collect_to_string(&collector, dir.path());

        assert!(output.starts_with("File: index.md\n```{toctree}"));
        assert_eq!(summary.excluded, 0);
    }

    #[test]
    fn test_invalid_utf8_aborts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.md"), [b'#', 0xc3, 0x28]).unwrap();

        let collector = DocCollector::new(exts(&["md"]));
        let mut out = Vec::new();
        let result = collector.collect(dir.path(), &mut out, &Silent);

        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn test_invalid_utf8_skipped_on_request() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.md"), [b'#', 0xc3, 0x28]).unwrap();
        std::fs::write(dir.path().join("good.md"), "fine").unwrap();

        let collector = DocCollector::new(exts(&["md"])).on_error(FailurePolicy::Skip);
        let (output, summary) = collect_to_string(&collector, dir.path());

        assert_eq!(output, "File: good.md\nfine\n\n");
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.emitted, 1);
    }

    #[test]
    fn test_ignored_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git/description.md"), "git").unwrap();
        std::fs::write(dir.path().join("a.md"), "a").unwrap();

        let collector = DocCollector::new(exts(&["md"])).ignore_dirs(exts(&[".git"]));
        let (output, _) = collect_to_string(&collector, dir.path());
        assert_eq!(output, "File: a.md\na\n\n");
    }
}
