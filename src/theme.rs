//! Light/dark theme preference.
//!
//! The preference lives under the `theme` key of a small key-value store.
//! When nothing valid is stored, the environment's color-scheme signal picks
//! the default.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context as _;

pub const THEME_KEY: &str = "theme";
pub const PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => anyhow::bail!("unknown theme {other:?}"),
        }
    }
}

pub trait PreferenceStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// JSON object on disk. A missing file is an empty store.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(state_dir: &Path) -> Self {
        Self::new(state_dir.join(PREFERENCES_FILE))
    }

    fn read_all(&self) -> anyhow::Result<BTreeMap<String, String>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", self.path.display()));
            }
        };
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", self.path.display()))
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut all = match self.read_all() {
            Ok(all) => all,
            Err(err) => {
                tracing::warn!(
                    error = %format!("{err:#}"),
                    "replacing unreadable preferences file"
                );
                BTreeMap::new()
            }
        };
        all.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_vec_pretty(&all).context("serialize preferences")?;
        std::fs::write(&self.path, json).with_context(|| format!("write {}", self.path.display()))
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    entries: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("preference store poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("preference store poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub trait ColorSchemeSignal {
    fn prefers_dark(&self) -> bool;
}

/// Terminal `COLORFGBG` convention (`"15;0"`): background index 0-6 or 8 is dark.
pub struct EnvColorScheme;

impl EnvColorScheme {
    pub fn from_value(value: Option<&str>) -> bool {
        let Some(bg) = value.and_then(|v| v.rsplit(';').next()) else {
            return false;
        };
        matches!(bg.trim().parse::<u8>(), Ok(0..=6 | 8))
    }
}

impl ColorSchemeSignal for EnvColorScheme {
    fn prefers_dark(&self) -> bool {
        Self::from_value(std::env::var("COLORFGBG").ok().as_deref())
    }
}

pub struct FixedColorScheme(pub Theme);

impl ColorSchemeSignal for FixedColorScheme {
    fn prefers_dark(&self) -> bool {
        self.0 == Theme::Dark
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeSource {
    Stored,
    System,
}

impl fmt::Display for ThemeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ThemeSource::Stored => "stored preference",
            ThemeSource::System => "system color scheme",
        })
    }
}

pub struct ThemeController<S> {
    store: S,
    current: Theme,
    source: ThemeSource,
}

impl<S: PreferenceStore> ThemeController<S> {
    pub fn load(store: S, signal: &dyn ColorSchemeSignal) -> Self {
        let stored = match store.get(THEME_KEY) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "could not read theme preference");
                None
            }
        };

        let stored = stored.and_then(|v| match v.parse::<Theme>() {
            Ok(theme) => Some(theme),
            Err(_) => {
                tracing::warn!(value = %v, "ignoring invalid stored theme");
                None
            }
        });

        let (current, source) = match stored {
            Some(theme) => (theme, ThemeSource::Stored),
            None if signal.prefers_dark() => (Theme::Dark, ThemeSource::System),
            None => (Theme::Light, ThemeSource::System),
        };
        tracing::debug!(theme = %current, %source, "theme resolved");

        Self {
            store,
            current,
            source,
        }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn source(&self) -> ThemeSource {
        self.source
    }

    /// Inverts and persists. A failed write is logged; the new value still applies.
    pub fn toggle(&mut self) -> Theme {
        self.current = self.current.toggled();
        self.source = ThemeSource::Stored;
        if let Err(err) = self.store.set(THEME_KEY, self.current.as_str()) {
            tracing::warn!(error = %format!("{err:#}"), "could not persist theme preference");
        }
        self.current
    }

    #[cfg(test)]
    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn system_signal_decides_when_nothing_stored() {
        let dark = ThemeController::load(MemoryStore::default(), &FixedColorScheme(Theme::Dark));
        assert_eq!(dark.current(), Theme::Dark);
        assert_eq!(dark.source(), ThemeSource::System);

        let light = ThemeController::load(MemoryStore::default(), &FixedColorScheme(Theme::Light));
        assert_eq!(light.current(), Theme::Light);
    }

    #[test]
    fn toggle_persists_and_reload_ignores_signal() {
        let mut controller =
            ThemeController::load(MemoryStore::default(), &FixedColorScheme(Theme::Light));
        assert_eq!(controller.toggle(), Theme::Dark);

        let store = controller.into_store();
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));

        let reloaded = ThemeController::load(store, &FixedColorScheme(Theme::Light));
        assert_eq!(reloaded.current(), Theme::Dark);
        assert_eq!(reloaded.source(), ThemeSource::Stored);
    }

    #[test]
    fn invalid_stored_value_falls_back_to_signal() {
        let store = MemoryStore::default();
        store.set(THEME_KEY, "sepia").unwrap();
        let controller = ThemeController::load(store, &FixedColorScheme(Theme::Dark));
        assert_eq!(controller.current(), Theme::Dark);
        assert_eq!(controller.source(), ThemeSource::System);
    }

    #[test]
    fn file_store_survives_reload() {
        let tmp = tempdir().unwrap();
        let state_dir = tmp.path().join("state");

        let mut controller =
            ThemeController::load(FileStore::in_dir(&state_dir), &FixedColorScheme(Theme::Dark));
        assert_eq!(controller.current(), Theme::Dark);
        assert_eq!(controller.toggle(), Theme::Light);

        let raw = std::fs::read_to_string(state_dir.join(PREFERENCES_FILE)).unwrap();
        assert!(raw.contains("\"theme\": \"light\""));

        let reloaded =
            ThemeController::load(FileStore::in_dir(&state_dir), &FixedColorScheme(Theme::Dark));
        assert_eq!(reloaded.current(), Theme::Light);
    }

    #[test]
    fn corrupt_file_reads_as_absent() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join(PREFERENCES_FILE);
        std::fs::write(&path, "not json").unwrap();

        let controller =
            ThemeController::load(FileStore::new(path), &FixedColorScheme(Theme::Light));
        assert_eq!(controller.current(), Theme::Light);
        assert_eq!(controller.source(), ThemeSource::System);
    }

    #[test]
    fn colorfgbg_background_index() {
        assert!(EnvColorScheme::from_value(Some("15;0")));
        assert!(EnvColorScheme::from_value(Some("15;default;8")));
        assert!(!EnvColorScheme::from_value(Some("0;15")));
        assert!(!EnvColorScheme::from_value(Some("garbage")));
        assert!(!EnvColorScheme::from_value(None));
    }
}
