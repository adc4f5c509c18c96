//! Character persistence.
//!
//! Saves characters as human-readable JSON with a version stamp and
//! quick-access metadata, so a save picker can list characters without
//! deserializing entire sheets.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use crate::model::Character;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("No saved character named \"{0}\"")]
    UnknownSave(String),
}

/// Current save file version.
const SAVE_VERSION: u32 = 1;

/// A saved character with everything needed to restore the sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCharacter {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// Unix timestamp in seconds of when the save was written.
    pub saved_at: u64,

    /// The complete character data.
    pub character: Character,

    /// Quick-access metadata about the character.
    pub metadata: SaveMetadata,
}

/// Metadata about a saved character for quick display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub name: String,
    pub class_name: String,
    pub level: u32,
}

impl SavedCharacter {
    /// Wrap a character in a save envelope stamped with the current
    /// version and time.
    pub fn new(character: Character) -> Self {
        let metadata = SaveMetadata {
            name: character.name.clone(),
            class_name: character.class_name.clone(),
            level: character.level,
        };

        Self {
            version: SAVE_VERSION,
            saved_at: unix_now(),
            character,
            metadata,
        }
    }

    /// Save to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Load from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        let saved: Self = serde_json::from_str(&content)?;

        if saved.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: saved.version,
            });
        }

        Ok(saved)
    }

    /// Get metadata without loading the full character.
    pub async fn peek_metadata(path: impl AsRef<Path>) -> Result<SaveMetadata, PersistError> {
        let content = fs::read_to_string(path).await?;

        // Parse just enough to get metadata
        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: SaveMetadata,
        }

        let partial: Partial = serde_json::from_str(&content)?;

        if partial.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: partial.version,
            });
        }

        Ok(partial.metadata)
    }
}

/// Information about a save file.
#[derive(Debug, Clone)]
pub struct SaveInfo {
    /// Path to the save file.
    pub path: String,

    /// Character metadata.
    pub metadata: SaveMetadata,
}

/// List all character save files in a directory, sorted by name.
pub async fn list_saves(dir: impl AsRef<Path>) -> Result<Vec<SaveInfo>, PersistError> {
    let mut saves = Vec::new();

    // Create the directory if it doesn't exist
    let dir_path = dir.as_ref();
    if !dir_path.exists() {
        fs::create_dir_all(dir_path).await?;
        return Ok(saves);
    }

    let mut entries = fs::read_dir(dir_path).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            if let Ok(metadata) = SavedCharacter::peek_metadata(&path).await {
                saves.push(SaveInfo {
                    path: path.to_string_lossy().to_string(),
                    metadata,
                });
            }
        }
    }

    saves.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
    Ok(saves)
}

/// Load a character by display name from a save directory.
pub async fn load_by_name(
    dir: impl AsRef<Path>,
    name: &str,
) -> Result<SavedCharacter, PersistError> {
    let path = save_path(dir, name);
    if !path.exists() {
        return Err(PersistError::UnknownSave(name.to_string()));
    }
    SavedCharacter::load_json(path).await
}

/// Generate a save path for a character name.
pub fn save_path(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    let sanitized = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>();
    dir.as_ref().join(format!("{sanitized}.json"))
}

fn unix_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
