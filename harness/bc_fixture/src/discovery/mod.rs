//! Fixture discovery.
//!
//! Lists the fixture directories of one category in lexicographic order and
//! loads each one's configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::category::FixtureCategory;
use crate::config::{ConfigFile, FixtureConfig, SourcemapSpec};
use crate::hooks::HookRegistry;

/// Configuration unit, relative to the fixture directory.
pub const CONFIG_FILE: &str = "_config.json";
/// Entry module, relative to the fixture directory.
pub const ENTRY_FILE: &str = "main.js";
/// Recorded output, relative to the fixture directory.
pub const EXPECTED_DIR: &str = "_expected";
/// Freshly written output, relative to the fixture directory.
pub const ACTUAL_DIR: &str = "_actual";

/// A discovered fixture. Immutable once loaded.
#[derive(Clone, Debug)]
pub struct Fixture {
    /// Directory name; unique within the category.
    pub name: String,
    pub category: FixtureCategory,
    pub dir: PathBuf,
    pub config: Arc<FixtureConfig>,
}

impl Fixture {
    /// `category/name`.
    pub fn id(&self) -> String {
        format!("{}/{}", self.category, self.name)
    }

    pub fn entry(&self) -> PathBuf {
        self.dir.join(ENTRY_FILE)
    }

    pub fn expected_dir(&self) -> PathBuf {
        self.dir.join(EXPECTED_DIR)
    }

    pub fn actual_dir(&self) -> PathBuf {
        self.dir.join(ACTUAL_DIR)
    }
}

/// Why a fixture (or a whole category) could not be registered.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("could not read fixture directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{fixture}: missing _config.json")]
    MissingConfig { fixture: String },
    #[error("{fixture}: could not read _config.json: {source}")]
    ReadConfig {
        fixture: String,
        #[source]
        source: io::Error,
    },
    #[error("{fixture}: invalid _config.json: {source}")]
    InvalidConfig {
        fixture: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{fixture}: {message}")]
    ConflictingHooks { fixture: String, message: String },
    #[error("{fixture}: sourcemap fixtures must declare a `test` assertion")]
    MissingSourcemapTest { fixture: String },
    #[error("{fixture}: the sourcemap `test` must list sources or mappings to check")]
    EmptySourcemapTest { fixture: String },
}

impl DiscoveryError {
    /// `category/name` of the affected fixture, if the error is about one.
    pub fn fixture(&self) -> Option<&str> {
        match self {
            DiscoveryError::ReadDir { .. } => None,
            DiscoveryError::MissingConfig { fixture }
            | DiscoveryError::ReadConfig { fixture, .. }
            | DiscoveryError::InvalidConfig { fixture, .. }
            | DiscoveryError::ConflictingHooks { fixture, .. }
            | DiscoveryError::MissingSourcemapTest { fixture }
            | DiscoveryError::EmptySourcemapTest { fixture } => Some(fixture),
        }
    }
}

/// List the fixtures of `category` under `root`.
///
/// Entries whose names start with `.` are skipped, as are plain files. The
/// outer error means the category root exists but could not be read; each
/// inner error belongs to one fixture and does not affect its siblings. A
/// missing category root yields no fixtures.
pub fn list_fixtures(
    root: &Path,
    category: FixtureCategory,
    hooks: &HookRegistry,
) -> Result<Vec<Result<Fixture, DiscoveryError>>, DiscoveryError> {
    let category_root = root.join(category.dir_name());
    let entries = match fs::read_dir(&category_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(root = %category_root.display(), "no fixtures for category");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(DiscoveryError::ReadDir {
                path: category_root,
                source,
            })
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| DiscoveryError::ReadDir {
            path: category_root.clone(),
            source,
        })?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        // Skip hidden entries (.DS_Store, editor files, ...)
        if name.starts_with('.') || !entry.path().is_dir() {
            continue;
        }
        names.push(name);
    }
    names.sort();

    Ok(names
        .into_iter()
        .map(|name| load_fixture(&category_root, category, name, hooks))
        .collect())
}

fn load_fixture(
    category_root: &Path,
    category: FixtureCategory,
    name: String,
    hooks: &HookRegistry,
) -> Result<Fixture, DiscoveryError> {
    let dir = category_root.join(&name);
    let id = format!("{category}/{name}");
    let hooks = hooks.get(category, &name);

    let config = match fs::read_to_string(dir.join(CONFIG_FILE)) {
        Ok(text) => {
            let file: ConfigFile = serde_json::from_str(&text)
                .map_err(|source| DiscoveryError::InvalidConfig {
                    fixture: id.clone(),
                    source,
                })?;
            if file.test.as_ref().is_some_and(SourcemapSpec::is_empty) {
                return Err(DiscoveryError::EmptySourcemapTest { fixture: id });
            }
            FixtureConfig::lower(&name, file, hooks).map_err(|message| {
                DiscoveryError::ConflictingHooks {
                    fixture: id.clone(),
                    message,
                }
            })?
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if category.requires_config() {
                return Err(DiscoveryError::MissingConfig { fixture: id });
            }
            match hooks {
                Some(hooks) => FixtureConfig::lower(&name, ConfigFile::default(), Some(hooks))
                    .map_err(|message| DiscoveryError::ConflictingHooks {
                        fixture: id.clone(),
                        message,
                    })?,
                None => FixtureConfig::synthesized(&name),
            }
        }
        Err(source) => {
            return Err(DiscoveryError::ReadConfig {
                fixture: id,
                source,
            })
        }
    };

    if category == FixtureCategory::Sourcemaps && config.test.is_none() {
        return Err(DiscoveryError::MissingSourcemapTest { fixture: id });
    }

    Ok(Fixture {
        name,
        category,
        dir,
        config: Arc::new(config),
    })
}
