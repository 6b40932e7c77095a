//! Run orchestration
//!
//! Ties fetching, collection and docstring extraction together for the two
//! run modes. Every run owns a [`Workspace`]; artifacts are staged there and
//! copied to their final location only once the whole run has succeeded.

use crate::config::{Config, FailurePolicy};
use crate::error::{Error, Result};
use crate::extract::{
    has_extension, toctree_placeholder, walk_files, CollectSummary, DocCollector,
    DocstringExtractor,
};
use crate::progress::Progress;
use crate::repo::{Fetcher, Workspace};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default artifact of single-repo mode
pub const SINGLE_OUTPUT: &str = "output.txt";
/// Default artifact of docs+library mode
pub const COMBINED_OUTPUT: &str = "combined_output.md";

const MANUAL_DOCS: &str = "manual_docs.txt";
const DOCSTRINGS: &str = "docstrings.txt";

/// Counts reported after a docstring dump
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocstringSummary {
    /// Source files parsed
    pub files: usize,
    /// Records written
    pub records: usize,
    /// Files passed over by the skip policy
    pub skipped: usize,
}

/// Counts reported after a docs+library run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombinedSummary {
    pub docs: CollectSummary,
    pub docstrings: DocstringSummary,
}

/// Runs the pipeline with injected fetcher and progress observer
pub struct Aggregator<'a> {
    config: &'a Config,
    fetcher: &'a dyn Fetcher,
    progress: &'a dyn Progress,
}

impl<'a> Aggregator<'a> {
    pub fn new(config: &'a Config, fetcher: &'a dyn Fetcher, progress: &'a dyn Progress) -> Self {
        Self {
            config,
            fetcher,
            progress,
        }
    }

    /// Clone one repository and write its `.rst`/`.md` files to `output`
    pub fn single_repo(&self, url: &str, output: &Path) -> Result<CollectSummary> {
        let workspace = Workspace::acquire()?;
        let checkout = workspace.checkout_dir("repo");
        self.fetch(url, &checkout)?;

        let collector = DocCollector::new(self.config.doc_extensions.clone())
            .ignore_dirs(self.config.ignore_dirs.clone())
            .on_error(self.config.on_error);

        let staged = workspace.artifact(SINGLE_OUTPUT);
        let summary = write_artifact(&staged, |out| {
            collector.collect(&checkout, out, self.progress)
        })?;

        self.publish(&staged, output)?;
        workspace.close()?;
        Ok(summary)
    }

    /// Clone a documentation repository and a library repository and write
    /// the Markdown dump followed by the docstring dump to `output`
    pub fn docs_and_library(
        &self,
        docs_url: &str,
        library_url: &str,
        output: &Path,
    ) -> Result<CombinedSummary> {
        let workspace = Workspace::acquire()?;
        let docs_dir = workspace.checkout_dir("docs");
        let library_dir = workspace.checkout_dir("library");
        self.fetch(docs_url, &docs_dir)?;
        self.fetch(library_url, &library_dir)?;

        let collector = DocCollector::new(self.config.markdown_extensions.clone())
            .exclude_when(toctree_placeholder(&self.config.toctree_marker))
            .ignore_dirs(self.config.ignore_dirs.clone())
            .on_error(self.config.on_error);

        let manual_docs = workspace.artifact(MANUAL_DOCS);
        let docs = write_artifact(&manual_docs, |out| {
            collector.collect(&docs_dir, out, self.progress)
        })?;
        self.progress.artifact_written(&manual_docs);

        let docstrings_path = workspace.artifact(DOCSTRINGS);
        let docstrings = write_artifact(&docstrings_path, |out| {
            self.dump_docstrings(&library_dir, out)
        })?;
        self.progress.artifact_written(&docstrings_path);

        let staged = workspace.artifact(COMBINED_OUTPUT);
        write_artifact(&staged, |out| {
            self.combine(&manual_docs, &docstrings_path, out)
        })?;

        self.publish(&staged, output)?;
        workspace.close()?;
        Ok(CombinedSummary { docs, docstrings })
    }

    /// Extract docstrings from every source file under `root` into `out`
    pub fn dump_docstrings<W: Write>(&self, root: &Path, out: &mut W) -> Result<DocstringSummary> {
        let mut extractor = DocstringExtractor::with_traversal(self.config.traversal)?;
        let mut summary = DocstringSummary::default();

        for path in walk_files(root, &self.config.ignore_dirs) {
            let path = path?;
            if !has_extension(&path, &self.config.source_extensions) {
                continue;
            }

            self.progress.file_read(&path);
            let records = match extractor.extract(&path) {
                Ok(records) => records,
                Err(e) if e.is_per_file() && self.config.on_error == FailurePolicy::Skip => {
                    self.progress.file_skipped(&path, &e.to_string());
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            self.progress.docstrings_found(&path, records.len());
            for record in &records {
                tracing::debug!(
                    "{} {} at {:?}:{}",
                    record.kind,
                    record.symbol_name,
                    path,
                    record.line
                );
                record.write_to(out).map_err(Error::Output)?;
            }

            summary.files += 1;
            summary.records += records.len();
        }

        Ok(summary)
    }

    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        self.progress.fetch_started(url, dest);
        self.fetcher.fetch(url, dest)?;
        self.progress.fetch_finished(url);
        Ok(())
    }

    fn combine<W: Write>(&self, manual_docs: &Path, docstrings: &Path, out: &mut W) -> Result<()> {
        writeln!(out, "{}\n", self.config.docs_header).map_err(Error::Output)?;
        copy_into(manual_docs, out)?;
        writeln!(out, "\n{}\n", self.config.docstrings_header).map_err(Error::Output)?;
        copy_into(docstrings, out)
    }

    fn publish(&self, staged: &Path, output: &Path) -> Result<()> {
        std::fs::copy(staged, output).map_err(|e| Error::io(output, e))?;
        self.progress.artifact_written(output);
        Ok(())
    }
}

/// Create `path` and hand a buffered writer to `body`, flushing afterwards
fn write_artifact<T>(path: &Path, body: impl FnOnce(&mut BufWriter<File>) -> Result<T>) -> Result<T> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut out = BufWriter::new(file);
    let value = body(&mut out)?;
    out.flush().map_err(|e| Error::io(path, e))?;
    Ok(value)
}

fn copy_into<W: Write>(path: &Path, out: &mut W) -> Result<()> {
    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    std::io::copy(&mut file, out).map_err(Error::Output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::{init_origin, GitFetcher};
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Remembers clone destinations so tests can check workspace cleanup
    #[derive(Default)]
    struct Recorder {
        destinations: RefCell<Vec<PathBuf>>,
        skipped: RefCell<Vec<PathBuf>>,
    }

    impl Progress for Recorder {
        fn fetch_started(&self, _url: &str, dest: &Path) {
            self.destinations.borrow_mut().push(dest.to_path_buf());
        }

        fn file_skipped(&self, path: &Path, _reason: &str) {
            self.skipped.borrow_mut().push(path.to_path_buf());
        }
    }

    impl Recorder {
        fn workspace_root(&self) -> PathBuf {
            self.destinations.borrow()[0].parent().unwrap().to_path_buf()
        }
    }

    struct Unreachable;

    impl Fetcher for Unreachable {
        fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
            Err(Error::Fetch {
                url: url.to_string(),
                dest: dest.to_path_buf(),
                source: git2::Error::from_str("could not resolve host"),
            })
        }
    }

    fn origin(files: &[(&str, &[u8])]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        init_origin(dir.path(), files);
        dir
    }

    fn url(dir: &tempfile::TempDir) -> &str {
        dir.path().to_str().unwrap()
    }

    #[test]
    fn test_single_repo() {
        let repo = origin(&[
            ("README.md", b"# Project\n"),
            ("docs/usage.rst", b"Usage\n-----\n"),
            ("src/lib.py", b"\"\"\"not collected\"\"\"\n"),
        ]);
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join(SINGLE_OUTPUT);
        let config = Config::default();
        let recorder = Recorder::default();

        let summary = Aggregator::new(&config, &GitFetcher, &recorder)
            .single_repo(url(&repo), &output)
            .unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(summary.emitted, 2);
        assert!(text.contains("File: README.md\n# Project\n\n\n"));
        let rst_header = format!("File: {}\n", Path::new("docs/usage.rst").display());
        assert!(text.contains(&format!("{rst_header}Usage\n-----\n\n\n")));
        assert!(!text.contains("lib.py"));
        assert!(!recorder.workspace_root().exists());
    }

    #[test]
    fn test_docs_and_library() {
        let docs = origin(&[
            ("index.md", b"```{toctree}\nguide\n```\n"),
            ("guide.md", b"# Guide\n"),
            ("notes.rst", b"rst is not collected here\n"),
        ]);
        let library = origin(&[(
            "pkg/a.py",
            b"\"\"\"mod doc\"\"\"\n\ndef f():\n    \"\"\"f doc\"\"\"\n",
        )]);
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join(COMBINED_OUTPUT);
        let config = Config::default();
        let recorder = Recorder::default();

        let summary = Aggregator::new(&config, &GitFetcher, &recorder)
            .docs_and_library(url(&docs), url(&library), &output)
            .unwrap();

        assert_eq!(summary.docs.emitted, 1);
        assert_eq!(summary.docs.excluded, 1);
        assert_eq!(summary.docstrings.files, 1);
        assert_eq!(summary.docstrings.records, 2);

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("# Manual Documentation\n\nFile: guide.md\n# Guide\n"));
        assert!(!text.contains("toctree"));
        assert!(!text.contains("notes.rst"));

        let docs_at = text.find("File: guide.md").unwrap();
        let header_at = text.find("# Library Docstrings").unwrap();
        let module_at = text.find("Function/Class: <module>\nDocstring:\nmod doc\n\n").unwrap();
        let function_at = text.find("Function/Class: f\nDocstring:\nf doc\n\n").unwrap();
        assert!(docs_at < header_at && header_at < module_at && module_at < function_at);

        let a_py = recorder.destinations.borrow()[1].join("pkg").join("a.py");
        assert!(text.contains(&format!("File: {}\n", a_py.display())));
        assert!(!recorder.workspace_root().exists());
    }

    #[test]
    fn test_fetch_failure_cleans_up() {
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join(SINGLE_OUTPUT);
        let config = Config::default();
        let recorder = Recorder::default();

        let result = Aggregator::new(&config, &Unreachable, &recorder)
            .single_repo("https://example.invalid/repo.git", &output);

        assert!(matches!(result, Err(Error::Fetch { .. })));
        assert!(!output.exists());
        assert!(!recorder.workspace_root().exists());
    }

    #[test]
    fn test_second_clone_failure_leaves_nothing_behind() {
        let docs = origin(&[("guide.md", b"# Guide\n")]);
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join(COMBINED_OUTPUT);
        let missing = out_dir.path().join("no-such-repo");
        let config = Config::default();
        let recorder = Recorder::default();

        let result = Aggregator::new(&config, &GitFetcher, &recorder).docs_and_library(
            url(&docs),
            missing.to_str().unwrap(),
            &output,
        );

        assert!(matches!(result, Err(Error::Fetch { .. })));
        assert!(!output.exists());
        assert!(!recorder.workspace_root().exists());
    }

    #[test]
    fn test_syntax_error_aborts_by_default() {
        let docs = origin(&[("guide.md", b"# Guide\n")]);
        let library = origin(&[("bad.py", b"def broken(:\n    pass\n")]);
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join(COMBINED_OUTPUT);
        let config = Config::default();
        let recorder = Recorder::default();

        let result = Aggregator::new(&config, &GitFetcher, &recorder)
            .docs_and_library(url(&docs), url(&library), &output);

        assert!(matches!(result, Err(Error::Syntax { .. })));
        assert!(!output.exists());
        assert!(!recorder.workspace_root().exists());
    }

    #[test]
    fn test_skip_policy_continues_past_bad_files() {
        let docs = origin(&[("guide.md", b"# Guide\n"), ("latin1.md", b"caf\xe9\n")]);
        let library = origin(&[
            ("bad.py", b"def broken(:\n    pass\n"),
            ("good.py", b"def ok():\n    \"\"\"fine\"\"\"\n"),
        ]);
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join(COMBINED_OUTPUT);
        let config = Config {
            on_error: FailurePolicy::Skip,
            ..Config::default()
        };
        let recorder = Recorder::default();

        let summary = Aggregator::new(&config, &GitFetcher, &recorder)
            .docs_and_library(url(&docs), url(&library), &output)
            .unwrap();

        assert_eq!(summary.docs.skipped, 1);
        assert_eq!(summary.docstrings.skipped, 1);
        assert_eq!(summary.docstrings.records, 1);
        assert_eq!(recorder.skipped.borrow().len(), 2);

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.contains("Function/Class: ok\nDocstring:\nfine\n"));
        assert!(!text.contains("broken"));
    }
}
