//! Loads, validates and writes `deedcheck.toml`.
//!
//! The file is rewritten only when it is missing, incomplete, or carries
//! sections this version doesn't know. Writes go through a sibling temp file
//! and a rename. `update_section` touches one table and leaves the rest of
//! the file (comments included) as it is on disk.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item, Table};

use super::settings::{ConfigSection, Settings};

const FILE_HEADER: &str =
    "# DeedCheck configuration\n# Unknown sections are dropped when this file is rewritten.\n";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Config is not valid TOML for these settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not edit config document: {0}")]
    Edit(#[from] toml_edit::TomlError),

    #[error("No config file at {0}")]
    NotFound(PathBuf),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// What [`ConfigManager::load_or_create`] did to the file on disk.
///
/// Returned rather than logged so callers can report it once logging is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file was read as is.
    Loaded,
    /// No file existed; defaults were written.
    Created,
    /// The file was rewritten. Each entry names one thing that was fixed.
    Normalized(Vec<String>),
}

/// Owns the settings and the file they came from.
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Manager for `config_path`, holding defaults until loaded.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// In-memory only until [`save`](Self::save) or
    /// [`update_section`](Self::update_section).
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Read and validate an existing file. Never writes.
    pub fn load(&mut self) -> ConfigResult<()> {
        let content = self
            .read_existing()?
            .ok_or_else(|| ConfigError::NotFound(self.config_path.clone()))?;
        let settings: Settings = toml::from_str(&content)?;
        validate(&settings)?;
        self.settings = settings;
        Ok(())
    }

    /// Load the file, writing defaults first if it doesn't exist.
    ///
    /// An existing file with missing keys or unknown sections is rewritten
    /// in full with the values it did contain.
    pub fn load_or_create(&mut self) -> ConfigResult<LoadOutcome> {
        let Some(content) = self.read_existing()? else {
            self.settings = Settings::default();
            self.save()?;
            return Ok(LoadOutcome::Created);
        };

        let settings: Settings = toml::from_str(&content)?;
        validate(&settings)?;

        let problems = shape_problems(&content.parse::<DocumentMut>()?, &settings)?;
        self.settings = settings;

        if problems.is_empty() {
            return Ok(LoadOutcome::Loaded);
        }
        self.save()?;
        Ok(LoadOutcome::Normalized(problems))
    }

    /// Create the logs folder if needed.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        fs::create_dir_all(self.logs_folder())?;
        Ok(())
    }

    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.logs_folder)
    }

    /// Write every section, replacing the whole file.
    pub fn save(&self) -> ConfigResult<()> {
        let mut doc = DocumentMut::new();
        let mut lead = String::from(FILE_HEADER);

        for section in ConfigSection::ALL {
            let mut table = section_table(&self.settings, section)?;
            table
                .decor_mut()
                .set_prefix(format!("{}\n{}\n", lead, section.comment()));
            lead.clear();
            doc.insert(section.table_name(), Item::Table(table));
        }

        write_atomically(&self.config_path, &doc.to_string())?;
        Ok(())
    }

    /// Replace one table in the on-disk file with the in-memory values.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        validate(&self.settings)?;

        let mut doc = match self.read_existing()? {
            Some(content) if !content.trim().is_empty() => content.parse::<DocumentMut>()?,
            _ => DocumentMut::new(),
        };

        let mut table = section_table(&self.settings, section)?;
        if let Some(old) = doc.get(section.table_name()).and_then(Item::as_table) {
            *table.decor_mut() = old.decor().clone();
        }
        doc.insert(section.table_name(), Item::Table(table));

        write_atomically(&self.config_path, &doc.to_string())?;
        tracing::debug!("Updated [{}] in {}", section.table_name(), self.config_path.display());
        Ok(())
    }

    /// File contents, or `None` if there is no file.
    fn read_existing(&self) -> ConfigResult<Option<String>> {
        match fs::read_to_string(&self.config_path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Reject values the rest of the crate can't work with.
fn validate(settings: &Settings) -> ConfigResult<()> {
    if settings.api.base_url.trim().is_empty() {
        return Err(ConfigError::invalid("api.base_url", "must not be empty"));
    }
    if settings.api.model.trim().is_empty() {
        return Err(ConfigError::invalid("api.model", "must not be empty"));
    }
    if settings.api.request_timeout_secs == 0 {
        return Err(ConfigError::invalid("api.request_timeout_secs", "must be at least 1"));
    }
    let scale = settings.progress.size_scale_per_mb;
    if !scale.is_finite() || scale < 0.0 {
        return Err(ConfigError::invalid(
            "progress.size_scale_per_mb",
            format!("must be a non-negative number, got {}", scale),
        ));
    }
    Ok(())
}

/// Differences between the document on disk and what `save` would write.
fn shape_problems(doc: &DocumentMut, settings: &Settings) -> ConfigResult<Vec<String>> {
    let mut problems: Vec<String> = doc
        .iter()
        .map(|(key, _)| key)
        .filter(|key| !ConfigSection::ALL.iter().any(|s| s.table_name() == *key))
        .map(|key| format!("unknown section [{}]", key))
        .collect();

    for section in ConfigSection::ALL {
        let name = section.table_name();
        let Some(present) = doc.get(name).and_then(Item::as_table) else {
            problems.push(format!("missing section [{}]", name));
            continue;
        };
        for (key, _) in section_table(settings, section)?.iter() {
            if !present.contains_key(key) {
                problems.push(format!("missing key {}.{}", name, key));
            }
        }
    }

    Ok(problems)
}

/// One section serialized as a standalone table.
fn section_table(settings: &Settings, section: ConfigSection) -> ConfigResult<Table> {
    let body = match section {
        ConfigSection::Api => toml::to_string(&settings.api)?,
        ConfigSection::Progress => toml::to_string(&settings.progress)?,
        ConfigSection::Logging => toml::to_string(&settings.logging)?,
        ConfigSection::Paths => toml::to_string(&settings.paths)?,
    };
    let parsed: DocumentMut = body.parse()?;
    Ok(parsed.as_table().clone())
}

/// Write through `<name>.tmp` in the same directory, then rename over.
fn write_atomically(path: &Path, content: &str) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let staging = path.with_extension("toml.tmp");
    let mut file = fs::File::create(&staging)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&staging, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn missing_file_is_created_with_every_section() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".config").join("deedcheck.toml");

        let outcome = ConfigManager::new(&path).load_or_create().unwrap();
        assert_eq!(outcome, LoadOutcome::Created);

        let written = read(&path);
        for section in ConfigSection::ALL {
            assert!(written.contains(&format!("[{}]", section.table_name())));
            assert!(written.contains(section.comment()));
        }

        let mut again = ConfigManager::new(&path);
        again.load().unwrap();
        assert_eq!(again.settings().api.base_url, "http://localhost:8000");
        assert_eq!(again.settings().progress.tick_interval_ms, 100);
    }

    #[test]
    fn partial_file_keeps_values_and_gains_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deedcheck.toml");
        fs::write(&path, "[api]\nbase_url = \"https://verify.example.com\"\n").unwrap();

        let mut manager = ConfigManager::new(&path);
        let outcome = manager.load_or_create().unwrap();
        assert!(matches!(outcome, LoadOutcome::Normalized(ref problems) if !problems.is_empty()));
        assert_eq!(manager.settings().api.base_url, "https://verify.example.com");

        let written = read(&path);
        assert!(written.contains("https://verify.example.com"));
        assert!(written.contains("size_scale_per_mb"));
        assert!(written.contains("[paths]"));
    }

    #[test]
    fn unknown_section_is_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deedcheck.toml");
        ConfigManager::new(&path).load_or_create().unwrap();

        let mut content = read(&path);
        content.push_str("\n[legacy]\nold = 1\n");
        fs::write(&path, content).unwrap();

        let outcome = ConfigManager::new(&path).load_or_create().unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Normalized(vec!["unknown section [legacy]".to_string()])
        );
        assert!(!read(&path).contains("[legacy]"));
    }

    #[test]
    fn complete_file_is_not_rewritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deedcheck.toml");
        ConfigManager::new(&path).load_or_create().unwrap();

        let mut content = read(&path);
        content.push_str("# staging server below\n");
        fs::write(&path, &content).unwrap();

        let outcome = ConfigManager::new(&path).load_or_create().unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert!(read(&path).contains("# staging server below"));
    }

    #[test]
    fn load_requires_a_file() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("absent.toml"));
        assert!(matches!(manager.load(), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deedcheck.toml");
        fs::write(&path, "[progress]\nsize_scale_per_mb = -1.0\n").unwrap();

        let err = ConfigManager::new(&path).load_or_create().unwrap_err();
        match err {
            ConfigError::Invalid { key, .. } => assert_eq!(key, "progress.size_scale_per_mb"),
            other => panic!("unexpected error: {:?}", other),
        }

        fs::write(&path, "[api]\nmodel = \"  \"\n").unwrap();
        assert!(matches!(
            ConfigManager::new(&path).load(),
            Err(ConfigError::Invalid { key: "api.model", .. })
        ));
    }

    #[test]
    fn update_section_leaves_other_tables_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deedcheck.toml");

        let mut manager = ConfigManager::new(&path);
        manager.load_or_create().unwrap();

        // Someone edits [api] by hand while we hold stale settings
        fs::write(&path, read(&path).replace("\"standard\"", "\"premium\"")).unwrap();

        manager.settings_mut().progress.tick_interval_ms = 50;
        manager.update_section(ConfigSection::Progress).unwrap();

        let written = read(&path);
        assert!(written.contains("tick_interval_ms = 50"));
        assert!(written.contains("\"premium\""));
        assert!(written.contains(ConfigSection::Progress.comment()));
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn update_section_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deedcheck.toml");

        let mut manager = ConfigManager::new(&path);
        manager.settings_mut().logging.log_to_file = true;
        manager.update_section(ConfigSection::Logging).unwrap();

        let written = read(&path);
        assert!(written.contains("[logging]"));
        assert!(written.contains("log_to_file = true"));
        assert!(!written.contains("[api]"));
    }
}
