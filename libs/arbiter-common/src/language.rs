// Language table: maps language names to judge language ids
// Loaded once at startup, read-only afterwards

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub name: String,
    pub judge_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguagesFile {
    languages: Vec<LanguageEntry>,
}

/// Registry of languages the judge accepts
/// This is the authoritative source for which language ids may be submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTable {
    by_name: BTreeMap<String, i64>,
}

impl LanguageTable {
    pub fn from_entries(entries: impl IntoIterator<Item = LanguageEntry>) -> Result<Self> {
        let mut by_name = BTreeMap::new();
        for entry in entries {
            let name = entry.name.trim().to_lowercase();
            if name.is_empty() {
                bail!("Language entry with empty name (judge id {})", entry.judge_id);
            }
            if entry.judge_id <= 0 {
                bail!("Language '{}' has invalid judge id {}", name, entry.judge_id);
            }
            if by_name.insert(name.clone(), entry.judge_id).is_some() {
                bail!("Duplicate language '{}' in language table", name);
            }
        }

        if by_name.is_empty() {
            bail!("No languages configured");
        }

        Ok(Self { by_name })
    }

    /// Load language table from a languages.json file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let file: LanguagesFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Self::from_entries(file.languages)
    }

    /// Judge language id for a name (case-insensitive)
    pub fn id_for(&self, name: &str) -> Option<i64> {
        self.by_name.get(&name.trim().to_lowercase()).copied()
    }

    pub fn supports_id(&self, judge_id: i64) -> bool {
        self.by_name.values().any(|&id| id == judge_id)
    }

    pub fn names(&self) -> Vec<&str> {
        self.by_name.keys().map(String::as_str).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, i64)> {
        self.by_name.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        let by_name = [("javascript", 63), ("python3", 71)]
            .into_iter()
            .map(|(name, id)| (name.to_string(), id))
            .collect();
        Self { by_name }
    }
}
