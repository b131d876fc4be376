//! Board document store
//!
//! A board lives in a single file, either markdown or mdast JSON (chosen by
//! the `.json` extension). Writes are atomic (temp file + rename). Edits from
//! separate processes are serialized with an exclusive lock on a sibling
//! `<file>.lock` file, since the rename replaces the document's inode.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

use super::markdown::{parse_markdown, render_markdown};
use super::mdast::{parse_mdast, to_json, MdastError};
use crate::domain::Ast;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid mdast document {path}: {source}")]
    Mdast {
        path: PathBuf,
        #[source]
        source: MdastError,
    },
}

/// On-disk representation of a board document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Markdown,
    Mdast,
}

impl DocumentFormat {
    /// Picks the format from a file extension
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Mdast,
            _ => DocumentFormat::Markdown,
        }
    }
}

/// A board document on disk
#[derive(Debug, Clone)]
pub struct BoardDocument {
    path: PathBuf,
    format: DocumentFormat,
}

impl BoardDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = DocumentFormat::for_path(&path);
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Reads and parses the document; a missing file is an empty document
    pub fn load(&self) -> Result<Ast> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "board document missing, starting empty");
            return Ok(Ast::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read board document: {}", self.path.display()))?;

        let ast = match self.format {
            DocumentFormat::Markdown => parse_markdown(&content),
            DocumentFormat::Mdast => {
                parse_mdast(&content).map_err(|source| DocumentError::Mdast {
                    path: self.path.clone(),
                    source,
                })?
            }
        };

        debug!(path = %self.path.display(), bytes = content.len(), "loaded board document");
        Ok(ast)
    }

    /// Serializes the tree in the document's format
    pub fn render(&self, ast: &Ast) -> Result<String> {
        match self.format {
            DocumentFormat::Markdown => Ok(render_markdown(ast)),
            DocumentFormat::Mdast => {
                let mut text = serde_json::to_string_pretty(&to_json(ast))
                    .context("Failed to serialize mdast document")?;
                text.push('\n');
                Ok(text)
            }
        }
    }

    /// Writes the tree back atomically
    pub fn save(&self, ast: &Ast) -> Result<()> {
        let content = self.render(ast)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.sibling("tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.write_all(content.as_bytes())
                .context("Failed to write board document")?;
            file.sync_all().context("Failed to flush board document")?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        debug!(path = %self.path.display(), bytes = content.len(), "saved board document");
        Ok(())
    }

    /// Takes the exclusive edit lock, blocking until it is free
    pub fn lock(&self) -> Result<DocumentLock> {
        let lock_path = self.sibling("lock");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;

        file.lock_exclusive()
            .with_context(|| format!("Failed to lock board document: {}", self.path.display()))?;

        debug!(path = %lock_path.display(), "acquired document lock");
        Ok(DocumentLock { file })
    }

    /// `KANBAN.md` → `KANBAN.md.<suffix>`
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("board"));
        name.push(".");
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

/// Held for the duration of a load → edit → save cycle; released on drop
#[derive(Debug)]
pub struct DocumentLock {
    file: File,
}

impl Drop for DocumentLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Board, SequentialIds};
    use tempfile::TempDir;

    #[test]
    fn format_from_extension() {
        assert_eq!(DocumentFormat::for_path(Path::new("KANBAN.md")), DocumentFormat::Markdown);
        assert_eq!(DocumentFormat::for_path(Path::new("board.JSON")), DocumentFormat::Mdast);
        assert_eq!(DocumentFormat::for_path(Path::new("board")), DocumentFormat::Markdown);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let doc = BoardDocument::new(dir.path().join("KANBAN.md"));

        let ast = doc.load().unwrap();
        assert!(ast.children(ast.root()).is_empty());
    }

    #[test]
    fn markdown_save_and_load() {
        let dir = TempDir::new().unwrap();
        let doc = BoardDocument::new(dir.path().join("KANBAN.md"));

        let mut board = Board::parse(Ast::new(), &mut SequentialIds::new("id"));
        board.add_new_lane("todo", "Todo").unwrap();
        board.add_new_task("todo", "t1", "Write docs").unwrap();
        doc.save(board.ast()).unwrap();

        let text = fs::read_to_string(doc.path()).unwrap();
        assert_eq!(text, "### Todo\n\n- Write docs\n");
        assert!(!dir.path().join("KANBAN.md.tmp").exists());

        let reloaded = Board::parse(doc.load().unwrap(), &mut SequentialIds::new("id"));
        assert_eq!(reloaded.lanes()[0].cards[0].title, "Write docs");
    }

    #[test]
    fn mdast_save_and_load() {
        let dir = TempDir::new().unwrap();
        let doc = BoardDocument::new(dir.path().join("board.json"));

        let ast = parse_markdown("### Todo\n\n- Task\n");
        doc.save(&ast).unwrap();

        let text = fs::read_to_string(doc.path()).unwrap();
        assert!(text.contains("\"type\": \"heading\""));
        assert_eq!(doc.load().unwrap(), ast);
    }

    #[test]
    fn invalid_mdast_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.json");
        fs::write(&path, "{\"type\": \"paragraph\"}").unwrap();

        let err = BoardDocument::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("board.json"));
    }

    #[test]
    fn lock_uses_sibling_file() {
        let dir = TempDir::new().unwrap();
        let doc = BoardDocument::new(dir.path().join("KANBAN.md"));

        let guard = doc.lock().unwrap();
        assert!(dir.path().join("KANBAN.md.lock").exists());
        drop(guard);

        // Re-acquirable once released
        let _guard = doc.lock().unwrap();
    }
}
