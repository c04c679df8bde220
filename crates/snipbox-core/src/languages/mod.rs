//! Language registry
//!
//! Maps file extensions and language names to immutable [`LanguageProfile`]s.
//! The table is filled once at construction and never changes, so it can be
//! shared behind an `Arc` and read concurrently without locking.

mod defaults;
mod profile;

pub use defaults::{COMPILED_TIMEOUT_FACTOR, default_profiles};
pub use profile::{CommandTemplate, LanguageProfile};

use crate::error::{SnipError, SnipResult};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Read-only lookup table of language profiles
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    by_extension: HashMap<String, Arc<LanguageProfile>>,
    by_name: HashMap<String, Arc<LanguageProfile>>,
}

impl LanguageRegistry {
    /// Build the registry from the compiled-in defaults
    pub fn with_defaults(base_timeout: Duration) -> Self {
        Self::from_profiles(default_profiles(base_timeout))
    }

    /// Build the registry from an explicit profile list
    pub fn from_profiles(profiles: impl IntoIterator<Item = LanguageProfile>) -> Self {
        let mut by_extension = HashMap::new();
        let mut by_name = HashMap::new();

        for profile in profiles {
            let profile = Arc::new(profile);
            by_extension.insert(profile.extension.to_lowercase(), profile.clone());
            by_name.insert(profile.name.to_lowercase(), profile.clone());
            for alias in &profile.aliases {
                by_name.insert(alias.to_lowercase(), profile.clone());
            }
        }

        Self {
            by_extension,
            by_name,
        }
    }

    /// Resolve an extension (`.py`, `py`) or a language name (`python`, `c++`)
    pub fn resolve(&self, key: &str) -> SnipResult<Arc<LanguageProfile>> {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return Err(SnipError::UnsupportedLanguage(key));
        }

        let found = if key.starts_with('.') {
            self.by_extension.get(&key)
        } else {
            self.by_name
                .get(&key)
                .or_else(|| self.by_extension.get(&format!(".{}", key)))
        };

        found
            .cloned()
            .ok_or(SnipError::UnsupportedLanguage(key))
    }

    /// Resolve the profile for a file from its extension
    pub fn resolve_path(&self, path: &Path) -> SnipResult<Arc<LanguageProfile>> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.resolve(&format!(".{}", ext)),
            None => Err(SnipError::UnsupportedLanguage(path.display().to_string())),
        }
    }

    /// Whether files with this extension can be executed
    pub fn is_supported_extension(&self, extension: &str) -> bool {
        let ext = extension.to_lowercase();
        let ext = if ext.starts_with('.') { ext } else { format!(".{}", ext) };
        self.by_extension.contains_key(&ext)
    }

    /// All profiles, sorted by language name
    pub fn profiles(&self) -> Vec<Arc<LanguageProfile>> {
        let mut profiles: Vec<_> = self.by_extension.values().cloned().collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        profiles
    }

    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}
