use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::Deserialize;

use crate::dailylog::tools::columns::DEFAULT_HEADER_SCAN_ROWS;
use crate::dailylog::tools::date::{DateNormalizer, WeekdayNames};
use crate::dailylog::tools::error::{Result, ToolError};
use crate::dailylog::tools::flatten::DEFAULT_SHEET_NAME;

const APP_DIR: &str = "dailylog";
const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "daily_log.db";

/// Spreadsheet exchange settings shared by export and import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSettings {
    /// Sheet written on export and looked up first on import.
    pub sheet_name: String,
    /// Leading rows searched for a header row on import.
    pub header_scan_rows: usize,
    /// Export the current store next to the source file before an import.
    pub backup_on_import: bool,
    /// Directory for import backups instead of the source file's directory.
    pub backup_dir: Option<PathBuf>,
    pub weekday_names: WeekdayNames,
}

impl SheetSettings {
    pub fn normalizer(&self) -> DateNormalizer {
        DateNormalizer::new(self.weekday_names)
    }
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            header_scan_rows: DEFAULT_HEADER_SCAN_ROWS,
            backup_on_import: true,
            backup_dir: None,
            weekday_names: WeekdayNames::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite file holding the journal.
    pub database_path: PathBuf,
    pub sheet: SheetSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    database_path: Option<PathBuf>,
    sheet_name: Option<String>,
    weekday_names: Option<WeekdayNames>,
    backup_on_import: Option<bool>,
    backup_dir: Option<PathBuf>,
    header_scan_rows: Option<usize>,
}

impl Config {
    /// Loads `explicit` when given, otherwise the first config file found in
    /// the standard locations. No file at all means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file_config = match explicit {
            Some(path) => Self::read_file_config(path)?,
            None => match Self::config_file_paths().into_iter().find(|path| path.exists()) {
                Some(path) => Self::read_file_config(&path)?,
                None => FileConfig::default(),
            },
        };
        Ok(Self::from_file_config(file_config))
    }

    /// Parses configuration text, applying defaults for absent keys.
    pub fn parse(source: &str, origin: &Path) -> Result<Self> {
        let file_config = toml::from_str::<FileConfig>(source).map_err(|err| ToolError::Config {
            path: origin.to_path_buf(),
            message: err.to_string(),
        })?;
        Ok(Self::from_file_config(file_config))
    }

    fn from_file_config(file_config: FileConfig) -> Self {
        let defaults = SheetSettings::default();
        let sheet = SheetSettings {
            sheet_name: file_config
                .sheet_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.sheet_name),
            header_scan_rows: file_config
                .header_scan_rows
                .filter(|rows| *rows > 0)
                .unwrap_or(defaults.header_scan_rows),
            backup_on_import: file_config
                .backup_on_import
                .unwrap_or(defaults.backup_on_import),
            backup_dir: file_config.backup_dir,
            weekday_names: file_config
                .weekday_names
                .unwrap_or(defaults.weekday_names),
        };

        Self {
            database_path: file_config
                .database_path
                .unwrap_or_else(Self::default_database_path),
            sheet,
        }
    }

    fn read_file_config(path: &Path) -> Result<FileConfig> {
        let source = fs::read_to_string(path).map_err(|err| ToolError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        toml::from_str(&source).map_err(|err| ToolError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Default database: `{data_dir}/dailylog/daily_log.db`
    /// - macOS:   `~/Library/Application Support/dailylog`
    /// - Linux:   `$XDG_DATA_HOME/dailylog` or `~/.local/share/dailylog`
    /// - Windows: `%APPDATA%\dailylog`
    fn default_database_path() -> PathBuf {
        match BaseDirs::new() {
            Some(base) => base.data_dir().join(APP_DIR).join(DATABASE_FILE),
            None => PathBuf::from(DATABASE_FILE),
        }
    }

    fn config_file_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(base) = BaseDirs::new() {
            paths.push(base.home_dir().join(".config").join(APP_DIR).join(CONFIG_FILE));
            paths.push(base.config_dir().join(APP_DIR).join(CONFIG_FILE));
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::parse("", Path::new("config.toml")).expect("parsed");
        assert_eq!(config.sheet, SheetSettings::default());
        assert!(config.database_path.ends_with(DATABASE_FILE));
    }

    #[test]
    fn keys_override_defaults() {
        let source = r#"
            database_path = "/tmp/journal.db"
            sheet_name = "Journal"
            weekday_names = "english"
            backup_on_import = false
            backup_dir = "/tmp/backups"
            header_scan_rows = 20
        "#;
        let config = Config::parse(source, Path::new("config.toml")).expect("parsed");
        assert_eq!(config.database_path, PathBuf::from("/tmp/journal.db"));
        assert_eq!(config.sheet.sheet_name, "Journal");
        assert_eq!(config.sheet.weekday_names, WeekdayNames::English);
        assert!(!config.sheet.backup_on_import);
        assert_eq!(config.sheet.backup_dir, Some(PathBuf::from("/tmp/backups")));
        assert_eq!(config.sheet.header_scan_rows, 20);
    }

    #[test]
    fn zero_scan_rows_falls_back_to_default() {
        let config = Config::parse("header_scan_rows = 0", Path::new("c.toml")).expect("parsed");
        assert_eq!(config.sheet.header_scan_rows, DEFAULT_HEADER_SCAN_ROWS);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = Config::parse("colour = \"blue\"", Path::new("c.toml")).expect_err("rejected");
        assert!(matches!(error, ToolError::Config { .. }));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "sheet_name = \"Other\"").expect("config written");
        let config = Config::load(Some(&path)).expect("loaded");
        assert_eq!(config.sheet.sheet_name, "Other");

        let missing = dir.path().join("missing.toml");
        assert!(Config::load(Some(&missing)).is_err());
    }
}
