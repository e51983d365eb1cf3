//! Viewer settings loaded from config.ini.
//!
//! ```ini
//! [general]
//! default_engine = Google
//! alt_engine = Perplexity
//!
//! [display]
//! max_column_width = 40
//! overflow = truncate
//! zebra = true
//! zebra_color = darkgray
//! highlight_color = white
//!
//! [keys]
//! sort = s
//! search_alt = x
//! filter = /
//! copy_cell = y
//! copy_url = Y
//! full_text = v
//! reload = r
//! ```
//!
//! Every key is optional; malformed values fall back to the default for
//! that key with a warning. Settings never abort startup.

use std::fs;
use std::path::Path;

use ini::Ini;

use sheetseek_engine::layout::DEFAULT_MAX_COL_WIDTH;

/// What happens to content wider than the column cap: cut it off with an
/// ellipsis, or keep it reachable via horizontal scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    Truncate,
    Scroll,
}

/// Single-character bindings for viewer actions. Navigation keys are fixed;
/// only the action keys are rebindable.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    pub sort: char,
    pub search_alt: char,
    pub filter: char,
    pub copy_cell: char,
    pub copy_url: char,
    pub full_text: char,
    pub reload: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            sort: 's',
            search_alt: 'x',
            filter: '/',
            copy_cell: 'y',
            copy_url: 'Y',
            full_text: 'v',
            reload: 'r',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub default_engine: String,
    pub alt_engine: String,
    pub max_column_width: usize,
    pub overflow: Overflow,
    pub zebra: bool,
    /// Named colors, resolved by the TUI layer (unknown names fall back)
    pub zebra_color: String,
    pub highlight_color: String,
    pub keys: KeyBindings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_engine: "Google".to_string(),
            alt_engine: "Perplexity".to_string(),
            max_column_width: DEFAULT_MAX_COL_WIDTH,
            overflow: Overflow::Truncate,
            zebra: true,
            zebra_color: "darkgray".to_string(),
            highlight_color: "white".to_string(),
            keys: KeyBindings::default(),
        }
    }
}

impl Settings {
    /// Load settings, creating the file with defaults if absent.
    pub fn load_or_create(path: &Path) -> Self {
        if !path.exists() {
            let settings = Settings::default();
            settings.save(path);
            return settings;
        }
        Self::load(path)
    }

    pub fn load(path: &Path) -> Self {
        let ini = match Ini::load_from_file(path) {
            Ok(ini) => ini,
            Err(e) => {
                eprintln!("warning: {}: {}; using default settings", path.display(), e);
                return Settings::default();
            }
        };

        let mut settings = Settings::default();
        let get = |section: &str, key: &str| -> Option<String> {
            ini.section(Some(section))
                .and_then(|p| p.get(key))
                .map(|s| s.to_string())
        };

        if let Some(v) = get("general", "default_engine") {
            settings.default_engine = v;
        }
        if let Some(v) = get("general", "alt_engine") {
            settings.alt_engine = v;
        }
        if let Some(v) = get("display", "max_column_width") {
            match v.parse::<usize>() {
                Ok(n) if n > 0 => settings.max_column_width = n,
                _ => warn_malformed(path, "max_column_width", &v),
            }
        }
        if let Some(v) = get("display", "overflow") {
            match v.to_lowercase().as_str() {
                "truncate" => settings.overflow = Overflow::Truncate,
                "scroll" => settings.overflow = Overflow::Scroll,
                _ => warn_malformed(path, "overflow", &v),
            }
        }
        if let Some(v) = get("display", "zebra") {
            match v.to_lowercase().parse::<bool>() {
                Ok(b) => settings.zebra = b,
                Err(_) => warn_malformed(path, "zebra", &v),
            }
        }
        if let Some(v) = get("display", "zebra_color") {
            settings.zebra_color = v;
        }
        if let Some(v) = get("display", "highlight_color") {
            settings.highlight_color = v;
        }

        let mut bind = |key: &str, slot: &mut char| {
            if let Some(v) = get("keys", key) {
                let mut chars = v.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => *slot = c,
                    _ => warn_malformed(path, key, &v),
                }
            }
        };
        bind("sort", &mut settings.keys.sort);
        bind("search_alt", &mut settings.keys.search_alt);
        bind("filter", &mut settings.keys.filter);
        bind("copy_cell", &mut settings.keys.copy_cell);
        bind("copy_url", &mut settings.keys.copy_url);
        bind("full_text", &mut settings.keys.full_text);
        bind("reload", &mut settings.keys.reload);

        settings
    }

    /// Write settings back (used to persist the default engine choice).
    /// Failures warn and are otherwise ignored; config is never fatal.
    pub fn save(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("warning: cannot create {}: {}", parent.display(), e);
                return;
            }
        }
        let mut ini = Ini::new();
        ini.with_section(Some("general"))
            .set("default_engine", &self.default_engine)
            .set("alt_engine", &self.alt_engine);
        ini.with_section(Some("display"))
            .set("max_column_width", self.max_column_width.to_string())
            .set(
                "overflow",
                match self.overflow {
                    Overflow::Truncate => "truncate",
                    Overflow::Scroll => "scroll",
                },
            )
            .set("zebra", self.zebra.to_string())
            .set("zebra_color", &self.zebra_color)
            .set("highlight_color", &self.highlight_color);
        ini.with_section(Some("keys"))
            .set("sort", self.keys.sort.to_string())
            .set("search_alt", self.keys.search_alt.to_string())
            .set("filter", self.keys.filter.to_string())
            .set("copy_cell", self.keys.copy_cell.to_string())
            .set("copy_url", self.keys.copy_url.to_string())
            .set("full_text", self.keys.full_text.to_string())
            .set("reload", self.keys.reload.to_string());
        if let Err(e) = ini.write_to_file(path) {
            eprintln!("warning: cannot write {}: {}", path.display(), e);
        }
    }
}

fn warn_malformed(path: &Path, key: &str, value: &str) {
    eprintln!(
        "warning: {}: malformed value '{}' for {}, using default",
        path.display(),
        value,
        key
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_ini(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn missing_file_yields_defaults_and_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        let settings = Settings::load_or_create(&path);
        assert_eq!(settings, Settings::default());
        assert!(path.exists());
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        let mut settings = Settings::default();
        settings.default_engine = "Bing".to_string();
        settings.max_column_width = 80;
        settings.overflow = Overflow::Scroll;
        settings.keys.sort = 'o';
        settings.save(&path);
        assert_eq!(Settings::load(&path), settings);
    }

    #[test]
    fn malformed_values_fall_back_per_key() {
        let f = write_ini(
            "[general]\ndefault_engine = Bing\n\
             [display]\nmax_column_width = banana\nzebra = maybe\noverflow = sideways\n",
        );
        let settings = Settings::load(f.path());
        // The good key applies, the bad ones fall back individually
        assert_eq!(settings.default_engine, "Bing");
        assert_eq!(settings.max_column_width, DEFAULT_MAX_COL_WIDTH);
        assert!(settings.zebra);
        assert_eq!(settings.overflow, Overflow::Truncate);
    }

    #[test]
    fn zero_width_cap_rejected() {
        let f = write_ini("[display]\nmax_column_width = 0\n");
        let settings = Settings::load(f.path());
        assert_eq!(settings.max_column_width, DEFAULT_MAX_COL_WIDTH);
    }

    #[test]
    fn key_bindings_parsed_single_char_only() {
        let f = write_ini("[keys]\nsort = o\nfilter = toolong\n");
        let settings = Settings::load(f.path());
        assert_eq!(settings.keys.sort, 'o');
        assert_eq!(settings.keys.filter, '/');
    }

    #[test]
    fn unreadable_ini_falls_back_whole() {
        let f = write_ini("[unclosed\nnot ini at all");
        let settings = Settings::load(f.path());
        assert_eq!(settings, Settings::default());
    }
}
