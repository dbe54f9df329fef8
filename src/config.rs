//! Persisted panel configuration.
//!
//! The switcher row count lives in a one-line plain-text file in the user's
//! home directory; the dynamic-workspaces flag lives in the host's settings
//! store and is reached through [`SettingsStore`].

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::constants::{MAX_ROWS, MIN_ROWS, ROWS_FILE_NAME};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("row count {0} outside {min}..={max}", min = MIN_ROWS, max = MAX_ROWS)]
    RowsOutOfRange(usize),
    #[error("row count is not a number: {0:?}")]
    RowsNotNumeric(String),
    #[error("no home directory to hold {name}", name = ROWS_FILE_NAME)]
    NoHomeDir,
    #[error("rows file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Number of rows in the workspace switcher grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rows(usize);

impl Rows {
    pub const ONE: Rows = Rows(1);

    pub fn new(rows: usize) -> Result<Self, ConfigError> {
        if (MIN_ROWS..=MAX_ROWS).contains(&rows) {
            Ok(Rows(rows))
        } else {
            Err(ConfigError::RowsOutOfRange(rows))
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for Rows {
    fn default() -> Self {
        Rows::ONE
    }
}

impl fmt::Display for Rows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Rows {
    type Err = ConfigError;

    /// Parses a leading integer the way the rows file is written: digits,
    /// optional surrounding whitespace, anything after the digits ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value =
            parse_leading_int(s).ok_or_else(|| ConfigError::RowsNotNumeric(s.to_string()))?;
        Rows::new(value)
    }
}

/// Leading unsigned integer of `s` after optional whitespace; trailing text
/// is ignored.
pub(crate) fn parse_leading_int(s: &str) -> Option<usize> {
    let digits: String = s
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Load/save port for the row count.
pub trait RowsStore {
    fn load(&self) -> Option<Rows>;
    fn save(&mut self, rows: Rows) -> Result<(), ConfigError>;
}

/// Row count stored as `"<n>\n"` in a plain-text file.
#[derive(Debug, Clone)]
pub struct RowsFile {
    path: PathBuf,
}

impl RowsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The per-user default location.
    pub fn default_location() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::new(home.join(ROWS_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Rows, ConfigError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        contents.parse()
    }
}

impl RowsStore for RowsFile {
    /// A missing, unreadable or malformed file means "use the default".
    fn load(&self) -> Option<Rows> {
        match self.read() {
            Ok(rows) => Some(rows),
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                None
            }
            Err(err) => {
                tracing::debug!(path = %self.path.display(), %err, "ignoring rows file");
                None
            }
        }
    }

    fn save(&mut self, rows: Rows) -> Result<(), ConfigError> {
        fs::write(&self.path, format!("{rows}\n")).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Rows kept in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryRows {
    rows: Option<Rows>,
}

impl MemoryRows {
    pub fn new(rows: Option<Rows>) -> Self {
        Self { rows }
    }
}

impl RowsStore for MemoryRows {
    fn load(&self) -> Option<Rows> {
        self.rows
    }

    fn save(&mut self, rows: Rows) -> Result<(), ConfigError> {
        self.rows = Some(rows);
        Ok(())
    }
}

/// Schema-based boolean settings owned by the host.
pub trait SettingsStore {
    fn get_bool(&self, schema: &str, key: &str) -> bool;
    fn set_bool(&mut self, schema: &str, key: &str, value: bool);
}

#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: BTreeMap<(String, String), bool>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get_bool(&self, schema: &str, key: &str) -> bool {
        self.values
            .get(&(schema.to_string(), key.to_string()))
            .copied()
            .unwrap_or(false)
    }

    fn set_bool(&mut self, schema: &str, key: &str, value: bool) {
        self.values
            .insert((schema.to_string(), key.to_string()), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_parse_accepts_leading_integer() {
        assert_eq!("3\n".parse::<Rows>().unwrap().get(), 3);
        assert_eq!("  2 rows".parse::<Rows>().unwrap().get(), 2);
        assert!(matches!(
            "0".parse::<Rows>(),
            Err(ConfigError::RowsOutOfRange(0))
        ));
        assert!(matches!(
            "6".parse::<Rows>(),
            Err(ConfigError::RowsOutOfRange(6))
        ));
        assert!(matches!(
            "rows".parse::<Rows>(),
            Err(ConfigError::RowsNotNumeric(_))
        ));
    }

    #[test]
    fn rows_file_round_trip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RowsFile::new(dir.path().join("rows"));
        assert_eq!(file.load(), None);
        file.save(Rows::new(4).unwrap()).unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "4\n");
        assert_eq!(file.load(), Some(Rows::new(4).unwrap()));
    }

    #[test]
    fn malformed_rows_file_falls_back_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows");
        fs::write(&path, "nine\n").unwrap();
        assert_eq!(RowsFile::new(&path).load(), None);
        fs::write(&path, "9\n").unwrap();
        assert_eq!(RowsFile::new(&path).load(), None);
    }

    #[test]
    fn memory_settings_default_false() {
        let mut s = MemorySettings::new();
        assert!(!s.get_bool("schema", "key"));
        s.set_bool("schema", "key", true);
        assert!(s.get_bool("schema", "key"));
        assert!(!s.get_bool("other", "key"));
    }
}
