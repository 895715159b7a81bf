use std::collections::HashMap;
use std::path::Path;

use crate::error::Error;

/// Value type of a database entry. `Cmd` entries are stateless console
/// commands; every other type is a persistent cvar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Boolean,
    Cmd,
    Float,
    Integer,
    Number,
    String,
    Vector2,
    Vector3,
    Vector4,
}

/// One command or cvar known to the static database.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CommandEntry {
    /// Command or cvar name as typed in the console.
    pub command: String,
    /// Default value, if the dump records one. Scalars or short vectors.
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    /// Human-readable description from the dump.
    #[serde(default)]
    pub description: String,
    /// Flag tokens from the dump (`sv`, `cl`, `cheat`, ...).
    #[serde(default)]
    pub flags: Vec<String>,
    /// Value type; `cmd` marks a stateless command.
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl CommandEntry {
    /// Whether this entry is a persistent cvar rather than a command.
    pub fn is_cvar(&self) -> bool {
        self.value_type != ValueType::Cmd
    }
}

/// Static command/cvar database backed by a JSON array dump.
///
/// Loading is strict: a non-array document or an entry with missing or
/// mistyped required fields fails with a descriptive error instead of being
/// coerced. Lookups are case-insensitive; when a name appears twice, the
/// last entry wins.
#[derive(Debug, Default)]
pub struct CommandDatabase {
    entries: Vec<CommandEntry>,
    index: HashMap<String, usize>,
}

impl CommandDatabase {
    /// Parse a database from raw JSON text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` for invalid JSON, `Error::DatabaseNotArray`
    /// when the document is not an array, or `Error::DatabaseEntry` naming
    /// the first entry that fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let document: serde_json::Value = serde_json::from_str(json)?;
        let Some(raw_entries) = document.as_array() else {
            return Err(Error::DatabaseNotArray);
        };

        let mut entries = Vec::with_capacity(raw_entries.len());
        for (index, raw) in raw_entries.iter().enumerate() {
            let entry: CommandEntry = serde_json::from_value(raw.clone())
                .map_err(|e| Error::DatabaseEntry {
                    index,
                    reason: e.to_string(),
                })?;
            entries.push(entry);
        }

        tracing::debug!(entries = entries.len(), "command database loaded");
        Ok(Self {
            index: build_index(&entries),
            entries,
        })
    }

    /// Load a database from a JSON file on disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::DatabaseNotFound` for a missing file, `Error::Io`
    /// for other read failures, plus everything `from_json_str` reports.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::DatabaseNotFound {
                    path: path.to_path_buf(),
                });
            },
            Err(e) => return Err(Error::Io(e)),
        };
        Self::from_json_str(&json)
    }

    /// Re-read the database from disk. On failure the previous data stays
    /// in place and the error is returned.
    ///
    /// # Errors
    ///
    /// Same as [`CommandDatabase::from_path`].
    pub fn reload(&mut self, path: &Path) -> Result<(), Error> {
        *self = Self::from_path(path)?;
        Ok(())
    }

    /// All entries in database order.
    pub fn all(&self) -> &[CommandEntry] {
        &self.entries
    }

    /// Look up a command by name, case-insensitively.
    pub fn get(&self, command: &str) -> Option<&CommandEntry> {
        self.index
            .get(&command.to_lowercase())
            .and_then(|&i| self.entries.get(i))
    }

    pub fn has(&self, command: &str) -> bool {
        self.index.contains_key(&command.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lowercased name → entry position; later entries overwrite earlier ones.
fn build_index(entries: &[CommandEntry]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        index.insert(entry.command.to_lowercase(), i);
    }
    index
}
