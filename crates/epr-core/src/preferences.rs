//! Session preferences: selected Kibana version and prerelease inclusion.
//!
//! Preferences are the only state carried across page loads. They live in
//! a [`SessionStorage`] under the keys [`VERSION_KEY`] and
//! [`PRERELEASE_KEY`].

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const VERSION_KEY: &str = "registryVersion";
pub const PRERELEASE_KEY: &str = "includePrerelease";

/// Supported Kibana versions, newest first. The registry has no
/// version-enumeration endpoint.
pub const KIBANA_VERSIONS: &[&str] = &[
    "9.2.0", "9.1.0", "9.0.0", "8.19.0", "8.18.0", "8.17.0", "8.16.0", "8.15.0", "8.14.0",
    "8.13.0", "8.12.0", "8.11.0", "8.10.0", "8.9.0", "8.8.0", "8.7.0", "8.6.0", "8.5.0",
    "8.4.0", "8.3.0", "8.2.0", "8.1.0", "8.0.0",
];

/// Descending list of selectable versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionList {
    versions: Vec<String>,
}

impl Default for VersionList {
    fn default() -> Self {
        Self::builtin()
    }
}

impl VersionList {
    pub fn builtin() -> Self {
        Self {
            versions: KIBANA_VERSIONS.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Build from configured versions: invalid entries are dropped,
    /// duplicates removed, result sorted newest first. Falls back to the
    /// builtin list when nothing valid remains.
    pub fn new<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed: Vec<semver::Version> = versions
            .into_iter()
            .filter_map(|v| {
                let v = v.as_ref();
                semver::Version::parse(v)
                    .inspect_err(|e| {
                        tracing::warn!(version = v, error = %e, "Ignoring invalid version")
                    })
                    .ok()
            })
            .collect();
        parsed.sort_by(|a, b| b.cmp(a));
        parsed.dedup();

        if parsed.is_empty() {
            return Self::builtin();
        }
        Self {
            versions: parsed.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn newest(&self) -> &str {
        self.versions
            .first()
            .map(String::as_str)
            .unwrap_or(KIBANA_VERSIONS[0])
    }

    pub fn contains(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.versions
    }

    /// Version following `current`, wrapping around
    pub fn cycle(&self, current: &str) -> &str {
        let position = self.versions.iter().position(|v| v == current);
        let next = position.map(|p| (p + 1) % self.versions.len()).unwrap_or(0);
        self.versions
            .get(next)
            .map(String::as_str)
            .unwrap_or_else(|| self.newest())
    }
}

/// The two cross-page preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub kibana_version: String,
    pub include_prerelease: bool,
}

/// Version selector control: options plus the preselected value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSelector {
    pub options: Vec<String>,
    pub selected: String,
}

/// Session-scoped key/value storage
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn clear(&mut self) -> anyhow::Result<()>;
}

/// Storage that lives as long as the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self) -> anyhow::Result<()> {
        self.entries.clear();
        Ok(())
    }
}

/// Storage persisted to a small TOML file so consecutive CLI invocations
/// share one session
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Default session file under the user cache directory
    pub fn default_path() -> anyhow::Result<PathBuf> {
        Ok(dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine cache directory"))?
            .join("epr")
            .join("session.toml"))
    }

    pub fn with_defaults() -> anyhow::Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// Open the session file, starting empty when it does not exist
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session file: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse session file: {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> anyhow::Result<()> {
        let content =
            toml::to_string(&self.entries).context("Failed to serialize session to TOML")?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write session file: {}", self.path.display()))?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn clear(&mut self) -> anyhow::Result<()> {
        self.entries.clear();
        if self.path.exists() {
            std::fs::remove_file(&self.path).with_context(|| {
                format!("Failed to remove session file: {}", self.path.display())
            })?;
        }
        Ok(())
    }
}

/// Single source of truth for the session preferences
#[derive(Debug, Clone)]
pub struct PreferenceStore<S> {
    storage: S,
    versions: VersionList,
}

impl<S: SessionStorage> PreferenceStore<S> {
    pub fn new(storage: S, versions: VersionList) -> Self {
        Self { storage, versions }
    }

    pub fn versions(&self) -> &VersionList {
        &self.versions
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Stored preferences, or the newest version without prereleases.
    /// A stored version that is no longer supported is ignored.
    pub fn load(&self) -> Preferences {
        let kibana_version = self
            .stored_version()
            .unwrap_or_else(|| self.versions.newest().to_string());
        let include_prerelease = self.storage.get(PRERELEASE_KEY).as_deref() == Some("true");

        Preferences {
            kibana_version,
            include_prerelease,
        }
    }

    /// The stored version, when one is stored and still supported
    pub fn stored_version(&self) -> Option<String> {
        self.storage
            .get(VERSION_KEY)
            .filter(|v| self.versions.contains(v))
    }

    pub fn save(&mut self, preferences: &Preferences) -> anyhow::Result<()> {
        self.storage.set(VERSION_KEY, &preferences.kibana_version)?;
        self.storage.set(
            PRERELEASE_KEY,
            if preferences.include_prerelease {
                "true"
            } else {
                "false"
            },
        )?;
        tracing::debug!(
            version = %preferences.kibana_version,
            prerelease = preferences.include_prerelease,
            "Saved preferences"
        );
        Ok(())
    }

    /// Change the selected version. Rejects versions outside the list.
    pub fn set_version(&mut self, version: &str) -> anyhow::Result<Preferences> {
        if !self.versions.contains(version) {
            anyhow::bail!(
                "Unsupported Kibana version: {}. Run 'epr versions' to list supported versions",
                version
            );
        }
        let mut preferences = self.load();
        preferences.kibana_version = version.to_string();
        self.save(&preferences)?;
        Ok(preferences)
    }

    pub fn set_prerelease(&mut self, include: bool) -> anyhow::Result<Preferences> {
        let mut preferences = self.load();
        preferences.include_prerelease = include;
        self.save(&preferences)?;
        Ok(preferences)
    }

    pub fn reset(&mut self) -> anyhow::Result<Preferences> {
        self.storage.clear()?;
        Ok(self.load())
    }

    /// Populate the version selector, preselecting the stored version
    pub fn selector(&self) -> VersionSelector {
        VersionSelector {
            options: self.versions.as_slice().to_vec(),
            selected: self.load().kibana_version,
        }
    }
}
