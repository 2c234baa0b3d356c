//! Bookmarked questions and their storage.
//!
//! [`BookmarkStore`] owns the in-memory list and writes the full list through a
//! [`BookmarkRepository`] on every change. The file repository keeps a single JSON array.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A saved code problem: title, code, and free-text description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkedQuestion {
    pub id: String,
    pub title: String,
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub timestamp: String,
}

impl BookmarkedQuestion {
    /// New bookmark stamped with the current time; the id is the creation time in milliseconds.
    pub fn new(
        title: impl Into<String>,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, BookmarkError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(BookmarkError::EmptyTitle);
        }
        let now = chrono::Utc::now();
        Ok(Self {
            id: now.timestamp_millis().to_string(),
            title,
            code: code.into(),
            description: description.into(),
            timestamp: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookmarkError {
    #[error("bookmark title is required")]
    EmptyTitle,
    #[error("bookmark storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("bookmark storage format: {0}")]
    Format(#[from] serde_json::Error),
}

/// Durable storage for the whole bookmark list.
pub trait BookmarkRepository {
    fn load(&self) -> Result<Vec<BookmarkedQuestion>, BookmarkError>;
    fn save(&self, items: &[BookmarkedQuestion]) -> Result<(), BookmarkError>;
}

/// JSON array in a single file. A missing file loads as an empty list.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BookmarkRepository for JsonFileRepository {
    fn load(&self) -> Result<Vec<BookmarkedQuestion>, BookmarkError> {
        let s = match std::fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("bookmarks file not found, starting empty: {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        if s.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&s)?)
    }

    fn save(&self, items: &[BookmarkedQuestion]) -> Result<(), BookmarkError> {
        let json = serde_json::to_string_pretty(items)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Volatile repository; contents live as long as the value.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    items: Mutex<Vec<BookmarkedQuestion>>,
}

impl MemoryRepository {
    pub fn new(items: Vec<BookmarkedQuestion>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    /// What was last saved.
    pub fn snapshot(&self) -> Vec<BookmarkedQuestion> {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl BookmarkRepository for MemoryRepository {
    fn load(&self) -> Result<Vec<BookmarkedQuestion>, BookmarkError> {
        Ok(self.snapshot())
    }

    fn save(&self, items: &[BookmarkedQuestion]) -> Result<(), BookmarkError> {
        *self.items.lock().unwrap_or_else(|e| e.into_inner()) = items.to_vec();
        Ok(())
    }
}

/// Bookmark list loaded once from a repository and rewritten in full on each add/remove.
pub struct BookmarkStore<R: BookmarkRepository> {
    repo: R,
    items: Vec<BookmarkedQuestion>,
}

impl<R: BookmarkRepository> BookmarkStore<R> {
    pub fn open(repo: R) -> Result<Self, BookmarkError> {
        let items = repo.load()?;
        log::debug!("loaded {} bookmark(s)", items.len());
        Ok(Self { repo, items })
    }

    pub fn list(&self) -> &[BookmarkedQuestion] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&BookmarkedQuestion> {
        self.items.iter().find(|q| q.id == id)
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Append and persist. Returns false, without writing, when the id is already present.
    pub fn add(&mut self, question: BookmarkedQuestion) -> Result<bool, BookmarkError> {
        if self.items.iter().any(|q| q.id == question.id) {
            return Ok(false);
        }
        self.items.push(question);
        if let Err(e) = self.repo.save(&self.items) {
            self.items.pop();
            return Err(e);
        }
        Ok(true)
    }

    /// Remove and persist. Returns false, without writing, when no bookmark has `id`.
    pub fn remove(&mut self, id: &str) -> Result<bool, BookmarkError> {
        let Some(pos) = self.items.iter().position(|q| q.id == id) else {
            return Ok(false);
        };
        let removed = self.items.remove(pos);
        if let Err(e) = self.repo.save(&self.items) {
            self.items.insert(pos, removed);
            return Err(e);
        }
        Ok(true)
    }
}
