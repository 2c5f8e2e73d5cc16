use anyhow::{anyhow, Result};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

pub struct StaffdbConfig {
    /// Path to the directory holding the staff database
    pub data_dir: String,

    /// Reconcile fetched rows through identity maps (default: true)
    pub identity_map: bool,
}

const EMPTY_CONFIG: &str = r#"### staffdb configuration file

### directory holding the staff database
# data_dir = "~/.staffdb"

### return one shared instance per persisted row
# identity_map = true
"#;

impl Default for StaffdbConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());

        Self {
            data_dir: format!("{}/.staffdb", home_dir),
            identity_map: true,
        }
    }
}

impl StaffdbConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<StaffdbConfig> {
        let mut builder = Config::builder();

        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                let staffdb_dir = Self::default_dir()?;
                std::fs::create_dir_all(staffdb_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create staffdb directory: {}", e))?;
                let p = format!("{}/staffdb.toml", staffdb_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // E.g., `STAFFDB_DATA_DIR=/tmp/staff ./staffdb` would set the data directory
        builder = builder.add_source(config::Environment::with_prefix("STAFFDB"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Self::from_map(&config)
    }

    fn from_map(config: &HashMap<String, String>) -> Result<StaffdbConfig> {
        let data_dir = match config.get("data_dir") {
            Some(p) => expand_home(p)?,
            None => Self::default_dir()?,
        };

        let identity_map = match config.get("identity_map") {
            Some(v) => v
                .parse::<bool>()
                .map_err(|e| anyhow!("Invalid identity_map value '{}': {}", v, e))?,
            None => true,
        };

        Ok(StaffdbConfig {
            data_dir,
            identity_map,
        })
    }

    fn default_dir() -> Result<String> {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        let home_str = home
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?;
        Ok(format!("{}/.staffdb", home_str))
    }

    /// Get the path to the SQLite database file
    pub fn sqlite_path(&self) -> String {
        let data_dir = self.data_dir.trim_end_matches('/');
        format!("{}/staffdb.sqlite3", data_dir)
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        [
            format!("Data Directory:     {}", self.data_dir),
            format!("SQLite Path:        {}", self.sqlite_path()),
            format!("Identity Map:       {}", self.identity_map),
        ]
        .join("\n")
    }

    /// Get the default config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.staffdb/staffdb.toml", home_dir)
    }
}

fn expand_home(path: &str) -> Result<String> {
    match path.strip_prefix("~") {
        Some(rest) => {
            let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
            Ok(format!("{}{}", home.to_string_lossy(), rest))
        }
        None => Ok(path.to_string()),
    }
}

// =============================================================================
// Database info (used by the database status command)
// =============================================================================

/// Information about the SQLite database
#[derive(Debug, Serialize, Clone)]
pub struct SqliteDatabaseInfo {
    pub path: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub schema_initialized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<u64>,
}

/// Get SQLite database information
///
/// The file is inspected as it is: no tables are created and an outdated
/// schema is not reset. Row counts are only read from a current schema.
pub fn get_sqlite_info(config: &StaffdbConfig) -> SqliteDatabaseInfo {
    use crate::database::{
        DatabaseConn, Department, Employee, Entity, SchemaManager, SchemaStatus, SCHEMA_VERSION,
    };

    let sqlite_path = config.sqlite_path();
    let sqlite_exists = Path::new(&sqlite_path).exists();
    let sqlite_size = if sqlite_exists {
        std::fs::metadata(&sqlite_path).ok().map(|m| m.len())
    } else {
        None
    };

    let mut info = SqliteDatabaseInfo {
        path: sqlite_path.clone(),
        exists: sqlite_exists,
        size_bytes: sqlite_size,
        schema_initialized: false,
        schema_version: None,
        schema_updated: None,
        department_count: None,
        employee_count: None,
    };

    if !sqlite_exists {
        return info;
    }

    let db = match DatabaseConn::open(Some(&sqlite_path)) {
        Ok(db) => db,
        Err(_) => return info,
    };

    let manager = SchemaManager::new(&db.conn);
    let status = match manager.check_status() {
        Ok(status) => status,
        Err(_) => return info,
    };
    let version = match status {
        SchemaStatus::Current => Some(SCHEMA_VERSION),
        SchemaStatus::NeedsMigration { from, to: _ } => Some(from),
        SchemaStatus::Incompatible {
            database_version,
            required_version: _,
        } => Some(database_version),
        SchemaStatus::NotInitialized | SchemaStatus::Corrupted => None,
    };

    info.schema_initialized = version.is_some();
    info.schema_version = version;

    if info.schema_initialized {
        info.schema_updated = manager
            .get_meta_updated_at("schema_version")
            .ok()
            .flatten()
            .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    }

    if status == SchemaStatus::Current {
        info.department_count = db.table_count(Department::TABLE).ok();
        info.employee_count = db.table_count(Employee::TABLE).ok();
    }

    info
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
