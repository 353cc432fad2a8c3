//! Game catalog — JSON-lines storage of the games the agent knows about.
//!
//! Each line is a JSON-encoded `GameDocument`:
//!
//! ```text
//! {"title": "Tetris", "author": "Alexey Pajitnov", "year": "1984"}
//! ```
//!
//! Storage location: `~/.gamewise/games.jsonl` (configurable).

use gamewise_core::catalog::GameDocument;
use gamewise_core::error::RetrievalError;
use std::path::Path;
use tracing::{debug, warn};

/// An in-memory copy of the game catalog.
#[derive(Debug, Clone, Default)]
pub struct GameCatalog {
    documents: Vec<GameDocument>,
}

impl GameCatalog {
    /// Build a catalog from documents, assigning row-number IDs where missing.
    pub fn from_documents(documents: Vec<GameDocument>) -> Self {
        let documents = documents
            .into_iter()
            .enumerate()
            .map(|(i, mut doc)| {
                if doc.id.is_empty() {
                    doc.id = i.to_string();
                }
                doc
            })
            .collect();
        Self { documents }
    }

    /// Load a catalog from a JSONL file.
    ///
    /// Corrupted lines are skipped with a warning; a missing or unreadable
    /// file is an error because nothing can be answered without it.
    pub fn load(path: &Path) -> Result<Self, RetrievalError> {
        let content = std::fs::read_to_string(path).map_err(|e| RetrievalError::CatalogLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let documents: Vec<GameDocument> = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(line_no, line)| {
                match serde_json::from_str::<GameDocument>(line) {
                    Ok(doc) => Some(doc),
                    Err(e) => {
                        warn!(line = line_no + 1, error = %e, "Skipping corrupted catalog entry");
                        None
                    }
                }
            })
            .collect();

        debug!(path = %path.display(), count = documents.len(), "Game catalog loaded");
        Ok(Self::from_documents(documents))
    }

    /// Write the catalog back out as JSONL.
    pub fn save(&self, path: &Path) -> Result<(), RetrievalError> {
        let mut content = String::new();
        for doc in &self.documents {
            let line = serde_json::to_string(doc).map_err(|e| RetrievalError::CatalogLoad {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            content.push_str(&line);
            content.push('\n');
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RetrievalError::CatalogLoad {
                path: parent.display().to_string(),
                reason: e.to_string(),
            })?;
        }

        std::fs::write(path, content).map_err(|e| RetrievalError::CatalogLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// A small starter catalog written by `gamewise onboard`.
    pub fn sample() -> Self {
        Self::from_documents(vec![
            GameDocument::new("Tetris", "Alexey Pajitnov", "1984"),
            GameDocument::new("Super Mario Bros.", "Nintendo", "1985"),
            GameDocument::new("The Legend of Zelda", "Nintendo", "1986"),
            GameDocument::new("Doom", "id Software", "1993"),
            GameDocument::new("Half-Life", "Valve", "1998"),
            GameDocument::new("Minecraft", "Mojang", "2011"),
            GameDocument::new("Portal 2", "Valve", "2011"),
            GameDocument::new("Hollow Knight", "Team Cherry", "2017"),
        ])
    }

    pub fn documents(&self) -> &[GameDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
