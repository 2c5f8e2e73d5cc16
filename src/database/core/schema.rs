//! Database schema management
//!
//! Table definitions for the staff database live here so that the mappers
//! and the schema manager agree on them.

use anyhow::{anyhow, Result};
use rusqlite::Connection;
use tracing::info;

/// Current schema version
/// Increment this when making breaking schema changes
pub const SCHEMA_VERSION: u32 = 1;

/// Schema definitions for all tables in the staff database
pub struct SchemaDefinitions;

impl SchemaDefinitions {
    /// SQL for creating the meta table (tracks schema version)
    pub const META_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS staffdb_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );
    "#;

    pub const DEPARTMENTS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS departments (
            id INTEGER PRIMARY KEY,
            name TEXT,
            location TEXT
        );
    "#;

    pub const DROP_DEPARTMENTS_TABLE: &'static str = "DROP TABLE IF EXISTS departments";

    pub const EMPLOYEES_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS employees (
            id INTEGER PRIMARY KEY,
            name TEXT,
            job_title TEXT,
            department_id INTEGER REFERENCES departments(id)
        );
    "#;

    pub const DROP_EMPLOYEES_TABLE: &'static str = "DROP TABLE IF EXISTS employees";

    /// Tables every initialized database must contain
    pub const REQUIRED_TABLES: &'static [&'static str] =
        &["staffdb_meta", "departments", "employees"];
}

/// Schema manager for the staff database
///
/// Handles schema initialization, version checking and teardown.
pub struct SchemaManager<'a> {
    conn: &'a Connection,
}

impl<'a> SchemaManager<'a> {
    /// Create a new schema manager for the given connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Initialize the database schema
    ///
    /// Creates the meta, departments and employees tables if they don't exist
    /// and records the schema version. Departments are created first since
    /// employees reference them.
    pub fn initialize(&self) -> Result<()> {
        self.conn
            .execute(SchemaDefinitions::META_TABLE, [])
            .map_err(|e| anyhow!("Failed to create meta table: {}", e))?;

        self.set_meta("schema_version", &SCHEMA_VERSION.to_string())?;

        self.conn
            .execute(SchemaDefinitions::DEPARTMENTS_TABLE, [])
            .map_err(|e| anyhow!("Failed to create departments table: {}", e))?;

        self.conn
            .execute(SchemaDefinitions::EMPLOYEES_TABLE, [])
            .map_err(|e| anyhow!("Failed to create employees table: {}", e))?;

        info!("Initialized staffdb schema v{}", SCHEMA_VERSION);
        Ok(())
    }

    /// Check the current schema status
    pub fn check_status(&self) -> Result<SchemaStatus> {
        if !self.table_exists("staffdb_meta")? {
            return Ok(SchemaStatus::NotInitialized);
        }

        let current_version = self.get_schema_version()?;

        if current_version == SCHEMA_VERSION {
            if self.verify_integrity()? {
                Ok(SchemaStatus::Current)
            } else {
                Ok(SchemaStatus::Corrupted)
            }
        } else if current_version < SCHEMA_VERSION {
            Ok(SchemaStatus::NeedsMigration {
                from: current_version,
                to: SCHEMA_VERSION,
            })
        } else {
            Ok(SchemaStatus::Incompatible {
                database_version: current_version,
                required_version: SCHEMA_VERSION,
            })
        }
    }

    /// Get the current schema version from the database
    pub fn get_schema_version(&self) -> Result<u32> {
        let version = self
            .get_meta("schema_version")?
            .unwrap_or_else(|| "0".to_string());

        version
            .parse()
            .map_err(|e| anyhow!("Invalid schema version: {}", e))
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let exists: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .map_err(|e| anyhow!("Failed to check table {}: {}", table, e))?;
        Ok(exists > 0)
    }

    fn verify_integrity(&self) -> Result<bool> {
        for table in SchemaDefinitions::REQUIRED_TABLES {
            if !self.table_exists(table)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Set a metadata value
    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO staffdb_meta (key, value, updated_at) VALUES (?1, ?2, strftime('%s', 'now'))",
                [key, value],
            )
            .map_err(|e| anyhow!("Failed to set meta value: {}", e))?;
        Ok(())
    }

    /// Get a metadata value
    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let result: Result<String, _> = self.conn.query_row(
            "SELECT value FROM staffdb_meta WHERE key = ?1",
            [key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(anyhow!("Failed to get meta value: {}", e)),
        }
    }

    /// Unix timestamp of the last write to a metadata key
    pub fn get_meta_updated_at(&self, key: &str) -> Result<Option<i64>> {
        let result: Result<i64, _> = self.conn.query_row(
            "SELECT updated_at FROM staffdb_meta WHERE key = ?1",
            [key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(anyhow!("Failed to get meta timestamp: {}", e)),
        }
    }

    /// Reset the database by dropping all tables
    ///
    /// Employees go first: dropping departments while employee rows still
    /// reference them violates the foreign key.
    pub fn reset(&self) -> Result<()> {
        self.conn
            .execute(SchemaDefinitions::DROP_EMPLOYEES_TABLE, [])
            .map_err(|e| anyhow!("Failed to drop employees table: {}", e))?;
        self.conn
            .execute(SchemaDefinitions::DROP_DEPARTMENTS_TABLE, [])
            .map_err(|e| anyhow!("Failed to drop departments table: {}", e))?;
        self.conn
            .execute("DROP TABLE IF EXISTS staffdb_meta", [])
            .map_err(|e| anyhow!("Failed to drop meta table: {}", e))?;

        info!("Dropped all staffdb tables");
        Ok(())
    }
}

/// Status of the database schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStatus {
    /// Database is not initialized (fresh database)
    NotInitialized,

    /// Schema is current and valid
    Current,

    /// Schema needs migration from an older version
    NeedsMigration { from: u32, to: u32 },

    /// Database is from a newer version (incompatible)
    Incompatible {
        database_version: u32,
        required_version: u32,
    },

    /// Schema is corrupted (missing tables)
    Corrupted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn create_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys=ON", []).unwrap();
        conn
    }

    #[test]
    fn test_schema_not_initialized() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);

        assert_eq!(
            manager.check_status().unwrap(),
            SchemaStatus::NotInitialized
        );
    }

    #[test]
    fn test_schema_initialize() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);

        manager.initialize().unwrap();

        assert_eq!(manager.check_status().unwrap(), SchemaStatus::Current);
        assert_eq!(manager.get_schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);

        manager.initialize().unwrap();
        manager.initialize().unwrap();

        assert_eq!(manager.check_status().unwrap(), SchemaStatus::Current);
    }

    #[test]
    fn test_missing_table_is_corrupted() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);

        manager.initialize().unwrap();
        conn.execute(SchemaDefinitions::DROP_EMPLOYEES_TABLE, [])
            .unwrap();

        assert_eq!(manager.check_status().unwrap(), SchemaStatus::Corrupted);
    }

    #[test]
    fn test_version_mismatch() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);
        manager.initialize().unwrap();

        manager
            .set_meta("schema_version", &(SCHEMA_VERSION + 1).to_string())
            .unwrap();
        assert_eq!(
            manager.check_status().unwrap(),
            SchemaStatus::Incompatible {
                database_version: SCHEMA_VERSION + 1,
                required_version: SCHEMA_VERSION,
            }
        );

        manager.set_meta("schema_version", "0").unwrap();
        assert_eq!(
            manager.check_status().unwrap(),
            SchemaStatus::NeedsMigration {
                from: 0,
                to: SCHEMA_VERSION,
            }
        );
    }

    #[test]
    fn test_meta_operations() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);

        manager.initialize().unwrap();

        manager.set_meta("test_key", "test_value").unwrap();
        let value = manager.get_meta("test_key").unwrap();
        assert_eq!(value, Some("test_value".to_string()));
        assert!(manager.get_meta_updated_at("test_key").unwrap().is_some());

        let missing = manager.get_meta("nonexistent").unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_schema_reset_with_rows() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);

        manager.initialize().unwrap();
        conn.execute(
            "INSERT INTO departments (name, location) VALUES ('Payroll', 'Building A')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO employees (name, job_title, department_id) VALUES ('Amir', 'Accountant', 1)",
            [],
        )
        .unwrap();

        manager.reset().unwrap();
        assert_eq!(
            manager.check_status().unwrap(),
            SchemaStatus::NotInitialized
        );
    }
}
