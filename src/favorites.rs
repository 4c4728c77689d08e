//! Favorite titles, kept in memory and mirrored to a JSON file.
//!
//! The file holds a plain array of [`MovieSummary`] in OMDb's field names. It is
//! read once at startup and rewritten in full (temp file + rename) after every
//! toggle. A missing or unreadable file never fails startup; the store just
//! begins empty.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::PersistenceError;
use crate::omdb::MovieSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoritesEvent {
    Added,
    Removed,
}

#[derive(Debug)]
pub struct FavoritesStore {
    path: PathBuf,
    entries: Vec<MovieSummary>,
}

impl FavoritesStore {
    /// Loads favorites from `path`, falling back to an empty set on any failure.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path) {
            Ok(Some(entries)) => dedupe(entries),
            Ok(None) => {
                debug!(path = ?path, "no favorites file yet, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(path = ?path, "Ignoring unreadable favorites file: {}", e);
                Vec::new()
            }
        };
        debug!(count = entries.len(), "favorites loaded");
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[MovieSummary] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_favorite(&self, imdb_id: &str) -> bool {
        self.entries.iter().any(|m| m.imdb_id == imdb_id)
    }

    /// Adds the title if absent, removes it otherwise, then persists.
    ///
    /// A failed write is logged and the in-memory change kept.
    pub fn toggle(&mut self, summary: &MovieSummary) -> FavoritesEvent {
        let event = if let Some(pos) = self
            .entries
            .iter()
            .position(|m| m.imdb_id == summary.imdb_id)
        {
            self.entries.remove(pos);
            FavoritesEvent::Removed
        } else {
            self.entries.push(summary.clone());
            FavoritesEvent::Added
        };
        debug!(imdb_id = %summary.imdb_id, event = ?event, "favorites toggled");
        if let Err(e) = self.persist() {
            warn!(path = ?self.path, "Failed to persist favorites: {}", e);
        }
        event
    }

    /// Overwrites the file with the full current set.
    pub fn persist(&self) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp_path = tmp_path(&self.path);
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// Sibling of `path` with `.tmp` appended to the full file name.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "favorites".into());
    name.push(".tmp");
    path.with_file_name(name)
}

fn read_entries(path: &Path) -> Result<Option<Vec<MovieSummary>>, PersistenceError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    let entries = serde_json::from_str(&contents)?;
    Ok(Some(entries))
}

fn dedupe(entries: Vec<MovieSummary>) -> Vec<MovieSummary> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|m| seen.insert(m.imdb_id.clone()))
        .collect()
}
