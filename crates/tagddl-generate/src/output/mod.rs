mod directory;

pub use directory::{DirectorySink, write_bytes_atomic};

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use tagddl_core::Project;

use crate::errors::GenerationError;

/// Durable destination for generated text.
pub trait FileSink {
    /// Write `text` at `path`, replacing any existing content.
    fn write(&mut self, path: &str, text: &str) -> Result<(), GenerationError>;
}

/// Keeps written files in memory, keyed by path.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub files: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}

impl FileSink for MemorySink {
    fn write(&mut self, path: &str, text: &str) -> Result<(), GenerationError> {
        self.files.insert(path.to_string(), text.to_string());
        Ok(())
    }
}

/// Result of [`ArtifactWriter::write_pair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    Written,
    /// Nothing to write: the create script was empty.
    Empty,
    /// The stem was already written during this run; nothing was written.
    Duplicate,
}

/// Writes `<stem>_create.sql` / `<stem>_drop.sql` pairs with a short header,
/// honouring the drop-file switch. Each stem is written at most once per run.
pub struct ArtifactWriter<'a> {
    sink: &'a mut dyn FileSink,
    drop_statements: bool,
    project: String,
    author: Option<String>,
    stems: BTreeSet<String>,
    written: Vec<String>,
}

impl<'a> ArtifactWriter<'a> {
    pub fn new(sink: &'a mut dyn FileSink, drop_statements: bool, project: &Project) -> Self {
        Self {
            sink,
            drop_statements,
            project: project.name.clone(),
            author: project
                .author
                .as_deref()
                .map(str::trim)
                .filter(|author| !author.is_empty())
                .map(str::to_string),
            stems: BTreeSet::new(),
            written: Vec::new(),
        }
    }

    /// Write the pair. Nothing is written when `create` is empty or the stem
    /// was written before; the drop file additionally needs drop statements
    /// enabled and a non-empty body.
    pub fn write_pair(
        &mut self,
        stem: &str,
        create: &str,
        drop: &str,
    ) -> Result<PairOutcome, GenerationError> {
        if create.trim().is_empty() {
            return Ok(PairOutcome::Empty);
        }
        if !self.stems.insert(stem.to_string()) {
            warn!(event = "duplicate_artifact", stem = %stem);
            return Ok(PairOutcome::Duplicate);
        }
        self.write_file(&format!("{stem}_create.sql"), create)?;

        if self.drop_statements && !drop.trim().is_empty() {
            self.write_file(&format!("{stem}_drop.sql"), drop)?;
        }
        Ok(PairOutcome::Written)
    }

    /// Paths written so far, in write order.
    pub fn written(&self) -> &[String] {
        &self.written
    }

    fn write_file(&mut self, path: &str, body: &str) -> Result<(), GenerationError> {
        let mut text = format!("-- {path} for {}\n", self.project);
        if let Some(author) = &self.author {
            text.push_str(&format!("-- author: {author}\n"));
        }
        text.push('\n');
        text.push_str(body);

        self.sink.write(path, &text)?;
        info!(event = "file_written", path = %path, bytes = text.len());
        self.written.push(path.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_file_follows_switch() {
        let mut project = Project::new("Shop");
        project.author = Some("Ada".to_string());

        let mut sink = MemorySink::new();
        let mut writer = ArtifactWriter::new(&mut sink, false, &project);
        writer
            .write_pair("db", "CREATE DATABASE shop;\n", "DROP DATABASE shop;\n")
            .expect("write pair");
        let empty = writer.write_pair("empty", "", "DROP TABLE x;\n").expect("skip empty");
        assert_eq!(empty, PairOutcome::Empty);
        assert_eq!(writer.written(), ["db_create.sql".to_string()]);

        assert_eq!(
            sink.get("db_create.sql"),
            Some("-- db_create.sql for Shop\n-- author: Ada\n\nCREATE DATABASE shop;\n")
        );
        assert!(!sink.contains("db_drop.sql"));
        assert!(!sink.contains("empty_create.sql"));
    }

    #[test]
    fn stem_is_written_once() {
        let project = Project::new("Shop");
        let mut sink = MemorySink::new();
        let mut writer = ArtifactWriter::new(&mut sink, true, &project);

        let first = writer
            .write_pair("sales_function", "CREATE OR REPLACE FUNCTION f\n", "DROP FUNCTION f;\n")
            .expect("first pair");
        let second = writer
            .write_pair("sales_function", "CREATE TABLE public.orders (\n);\n", "DROP TABLE x;\n")
            .expect("second pair");

        assert_eq!(first, PairOutcome::Written);
        assert_eq!(second, PairOutcome::Duplicate);
        assert_eq!(writer.written().len(), 2);
        assert!(
            sink.get("sales_function_create.sql")
                .expect("create file")
                .contains("CREATE OR REPLACE FUNCTION f")
        );
    }
}
