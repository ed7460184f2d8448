use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "practicedb";
const CONFIG_FILE: &str = "practicedb.yaml";

const DEFAULT_DATABASE: &str = "../practice.db";
const DEFAULT_SCHEMA: &str = "../sql/create_tables.sql";
const DEFAULT_DATA_DIR: &str = "../data";

/// Load the practice CSV data set into a fresh SQLite database and print it back.
#[derive(Debug, Default, Parser)]
#[command(name = "practicedb", version, about)]
pub struct Cli {
    /// YAML settings file (defaults to practicedb.yaml in the app config dir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Database file to recreate
    #[arg(long, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// SQL script with the CREATE TABLE statements
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Directory holding employees.csv, departments.csv and sales.csv
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Skip printing the table contents after the load
    #[arg(long)]
    pub no_dump: bool,

    /// Append log lines to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// On-disk settings. Every key is optional and overrides the built-in default.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub database: Option<PathBuf>,
    pub schema: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub dump: Option<bool>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<FileConfig> {
        let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        // An empty document deserializes as unit, not as a map.
        if data.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(FileConfig::default());
        }
        serde_yaml::from_slice(&data)
            .with_context(|| format!("failed to parse YAML at {}", path.display()))
    }
}

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: PathBuf,
    pub schema: PathBuf,
    pub data_dir: PathBuf,
    pub dump: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            schema: PathBuf::from(DEFAULT_SCHEMA),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            dump: true,
            log_file: None,
        }
    }
}

impl Settings {
    /// Resolve settings from defaults, the YAML file and the command line, in
    /// increasing order of precedence.
    pub fn resolve(cli: &Cli) -> Result<Settings> {
        let file = match &cli.config {
            Some(path) => {
                let path = expand_path(path)
                    .ok_or_else(|| anyhow::anyhow!("cannot expand path {}", path.display()))?;
                FileConfig::load(&path)?
            }
            None => match default_config_file() {
                Some(path) if path.is_file() => FileConfig::load(&path)?,
                _ => FileConfig::default(),
            },
        };
        Settings::merge(file, cli)
    }

    pub fn merge(file: FileConfig, cli: &Cli) -> Result<Settings> {
        let base = Settings::default();
        let pick = |flag: &Option<PathBuf>, from_file: Option<PathBuf>, fallback: PathBuf| {
            let raw = flag.clone().or(from_file).unwrap_or(fallback);
            expand_path(&raw).ok_or_else(|| anyhow::anyhow!("cannot expand path {}", raw.display()))
        };

        let log_file = match cli.log_file.clone().or(file.log_file) {
            Some(raw) => Some(
                expand_path(&raw)
                    .ok_or_else(|| anyhow::anyhow!("cannot expand path {}", raw.display()))?,
            ),
            None => None,
        };

        Ok(Settings {
            database: pick(&cli.database, file.database, base.database)?,
            schema: pick(&cli.schema, file.schema, base.schema)?,
            data_dir: pick(&cli.data_dir, file.data_dir, base.data_dir)?,
            dump: !cli.no_dump && file.dump.unwrap_or(base.dump),
            log_file,
        })
    }

    /// Source CSV for a table: `<data_dir>/<table>.csv`.
    pub fn csv_path(&self, table: &str) -> PathBuf {
        self.data_dir.join(format!("{table}.csv"))
    }
}

/// Return the application config directory path. Unlike the log directory
/// this is never created; a missing directory just means no settings file.
pub fn app_config_dir() -> Option<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs_next::home_dir().map(|h| h.join(".config"))
    } else {
        dirs_next::config_dir()
    }?;
    Some(base.join(APP_NAME))
}

fn default_config_file() -> Option<PathBuf> {
    app_config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Expand a leading `~` and `$VAR` (unix) / `%VAR%` (windows) path segments.
pub fn expand_path(path: &Path) -> Option<PathBuf> {
    let mut expanded_path = PathBuf::new();
    let mut path_iter = path.iter();
    if path.starts_with("~") {
        path_iter.next()?;
        expanded_path = expanded_path.join(dirs_next::home_dir()?);
    }
    for segment in path_iter {
        let segment = segment.to_str()?;
        expanded_path = if cfg!(unix) && segment.starts_with('$') {
            expanded_path.join(std::env::var(segment.strip_prefix('$')?).unwrap_or_default())
        } else if cfg!(windows) && segment.starts_with('%') && segment.ends_with('%') {
            expanded_path.join(
                std::env::var(segment.strip_prefix('%')?.strip_suffix('%')?).unwrap_or_default(),
            )
        } else {
            expanded_path.join(segment)
        }
    }
    Some(expanded_path)
}
