//! Translation catalogues.
//!
//! Catalogues are loaded once at startup into a [`Translations`] context
//! that is shared read-only with every request.
//!
//! ```text
//! locales/
//!     en.json      {"errors": {"missing": "{field} is required"}}
//!     zh_CN.json   {"errors": {"missing": "{field} 是必填项"}}
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static CATALOGUE_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]+(_[A-Z]+)?\.json$").expect("catalogue file pattern must compile")
});

/// Errors raised while loading catalogues.
#[derive(Debug, thiserror::Error)]
pub enum I18nError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalogue {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Loaded catalogues keyed by locale code.
#[derive(Debug, Clone)]
pub struct Translations {
    default_locale: String,
    catalogues: HashMap<String, Value>,
}

impl Translations {
    /// An empty context; every lookup falls back to its placeholder.
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
            catalogues: HashMap::new(),
        }
    }

    /// Load every `<locale>.json` file in `path`.
    pub fn load(path: &Path, default_locale: impl Into<String>) -> Result<Self, I18nError> {
        let mut translations = Self::new(default_locale);
        let dir = path.display().to_string();
        let entries = fs::read_dir(path).map_err(|source| I18nError::Io {
            path: dir.clone(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| I18nError::Io {
                path: dir.clone(),
                source,
            })?;
            let filename = entry.file_name().to_string_lossy().into_owned();
            if !CATALOGUE_FILE.is_match(&filename) {
                continue;
            }
            let file_path = entry.path();
            let file_display = file_path.display().to_string();
            let content = fs::read_to_string(&file_path).map_err(|source| I18nError::Io {
                path: file_display.clone(),
                source,
            })?;
            let catalogue: Value = serde_json::from_str(&content).map_err(|source| I18nError::Parse {
                path: file_display,
                source,
            })?;
            let locale = filename.trim_end_matches(".json").to_string();
            translations.insert(locale, catalogue);
        }

        tracing::info!(
            path = %dir,
            locales = translations.catalogues.len(),
            "Translations loaded"
        );
        Ok(translations)
    }

    pub fn insert(&mut self, locale: impl Into<String>, catalogue: Value) {
        self.catalogues.insert(locale.into(), catalogue);
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Closest supported locale for `code`.
    ///
    /// `zh-cn` is normalised to `zh_CN`; if that is not loaded the bare
    /// language `zh` is tried, then the default locale.
    pub fn closest(&self, code: &str) -> String {
        let code = code.replace('-', "_");
        let parts: Vec<&str> = code.split('_').collect();
        let normalised = if parts.len() == 2 {
            format!("{}_{}", parts[0].to_lowercase(), parts[1].to_uppercase())
        } else {
            code.clone()
        };
        if self.catalogues.contains_key(&normalised) {
            return normalised;
        }
        let language = parts[0].to_lowercase();
        if self.catalogues.contains_key(&language) {
            return language;
        }
        self.default_locale.clone()
    }

    /// Translate a dotted placeholder such as `errors.missing`.
    ///
    /// Unknown placeholders translate to themselves. `{name}` markers are
    /// substituted from `args`.
    pub fn translate(&self, code: &str, placeholder: &str, args: &[(&str, &str)]) -> String {
        let message = self
            .catalogues
            .get(&self.closest(code))
            .and_then(|catalogue| {
                placeholder
                    .split('.')
                    .try_fold(catalogue, |node, key| node.get(key))
            })
            .and_then(Value::as_str)
            .unwrap_or(placeholder);

        args.iter().fold(message.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{name}}}"), value)
        })
    }
}

impl Default for Translations {
    fn default() -> Self {
        Self::new("en")
    }
}
