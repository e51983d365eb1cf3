//! Search engine registry loaded from search_engines.ini.
//!
//! One section per engine:
//!
//! ```ini
//! [google]
//! name = Google
//! url = https://www.google.com/search?q={query}
//! ```
//!
//! Entries whose URL lacks the `{query}` placeholder are skipped with a
//! warning. An empty or unreadable file falls back to the built-in set.

use std::fs;
use std::path::Path;

use ini::Ini;

use sheetseek_engine::query::{SearchEngine, QUERY_PLACEHOLDER};

fn default_engines() -> Vec<SearchEngine> {
    vec![
        SearchEngine::new("Google", "https://www.google.com/search?q={query}"),
        SearchEngine::new("Bing", "https://www.bing.com/search?q={query}"),
        SearchEngine::new("DuckDuckGo", "https://duckduckgo.com/?q={query}"),
        SearchEngine::new("Perplexity", "https://www.perplexity.ai/search?q={query}"),
    ]
}

/// Ordered engine registry. Order follows the INI file, so the first entry
/// doubles as the fallback when a configured name is missing.
pub struct EngineRegistry {
    engines: Vec<SearchEngine>,
}

impl EngineRegistry {
    /// Load the registry, creating the file with defaults if absent.
    pub fn load_or_create(path: &Path) -> Self {
        if !path.exists() {
            write_default_file(path);
        }
        Self::load(path)
    }

    pub fn load(path: &Path) -> Self {
        let ini = match Ini::load_from_file(path) {
            Ok(ini) => ini,
            Err(e) => {
                eprintln!(
                    "warning: {}: {}; using built-in search engines",
                    path.display(),
                    e
                );
                return EngineRegistry {
                    engines: default_engines(),
                };
            }
        };

        let mut engines = Vec::new();
        for (section, props) in ini.iter() {
            let Some(section) = section else { continue };
            let name = props.get("name").unwrap_or(section);
            let url = props.get("url").unwrap_or("");
            if !url.contains(QUERY_PLACEHOLDER) {
                eprintln!(
                    "warning: search engine '{}' has no {} placeholder, skipping",
                    name, QUERY_PLACEHOLDER
                );
                continue;
            }
            engines.push(SearchEngine::new(name, url));
        }

        if engines.is_empty() {
            engines = default_engines();
        }
        EngineRegistry { engines }
    }

    pub fn engines(&self) -> &[SearchEngine] {
        &self.engines
    }

    pub fn names(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&SearchEngine> {
        self.engines.iter().find(|e| e.name == name)
    }

    /// Engine by name, or the first configured engine when the name is
    /// unknown (the registry is never empty).
    pub fn get_or_first(&self, name: &str) -> &SearchEngine {
        self.get(name).unwrap_or(&self.engines[0])
    }
}

fn write_default_file(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("warning: cannot create {}: {}", parent.display(), e);
            return;
        }
    }
    let mut ini = Ini::new();
    for engine in default_engines() {
        ini.with_section(Some(engine.name.to_lowercase()))
            .set("name", &engine.name)
            .set("url", &engine.url_template);
    }
    if let Err(e) = ini.write_to_file(path) {
        eprintln!("warning: cannot write {}: {}", path.display(), e);
    }
}
