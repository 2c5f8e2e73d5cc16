//! Database connection management
//!
//! This module provides the shared storage handle every mapper issues its SQL through.

use anyhow::{anyhow, Result};
use rusqlite::{Connection, OptionalExtension, Params, Row};

/// Shared SQLite storage handle
///
/// `DatabaseConn` wraps a single `rusqlite::Connection`, file-based or
/// in-memory, and applies the same pragmas to both. Foreign keys are always
/// enabled so that an employee can only reference an existing department.
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open a database at the specified path
    ///
    /// If the path is `None`, an in-memory database is created.
    pub fn open(path: Option<&str>) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p)
                .map_err(|e| anyhow!("Failed to open database at '{}': {}", p, e))?,
            None => Connection::open_in_memory()
                .map_err(|e| anyhow!("Failed to create in-memory database: {}", e))?,
        };

        let db = DatabaseConn { conn };
        db.configure()?;
        Ok(db)
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(None)
    }

    fn configure(&self) -> Result<()> {
        // in-memory databases answer "memory" here, which is fine
        let _: String = self
            .conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to set journal mode: {}", e))?;

        self.conn
            .execute("PRAGMA synchronous=NORMAL", [])
            .map_err(|e| anyhow!("Failed to set synchronous mode: {}", e))?;

        self.conn
            .execute("PRAGMA temp_store=MEMORY", [])
            .map_err(|e| anyhow!("Failed to set temp store: {}", e))?;

        // departments <- employees referential constraint depends on this
        self.conn
            .execute("PRAGMA foreign_keys=ON", [])
            .map_err(|e| anyhow!("Failed to enable foreign keys: {}", e))?;

        Ok(())
    }

    /// Execute a SQL statement without parameters, returning affected rows
    pub fn execute(&self, sql: &str) -> Result<usize> {
        self.conn
            .execute(sql, [])
            .map_err(|e| anyhow!("Failed to execute SQL: {}", e))
    }

    /// Execute a SQL statement with parameters, returning affected rows
    pub fn execute_with_params<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        self.conn
            .execute(sql, params)
            .map_err(|e| anyhow!("Failed to execute SQL with params: {}", e))
    }

    /// Execute an INSERT and return the rowid SQLite assigned to the new row
    pub fn insert<P: Params>(&self, sql: &str, params: P) -> Result<i64> {
        self.conn
            .execute(sql, params)
            .map_err(|e| anyhow!("Failed to insert row: {}", e))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Fetch the first row of a query, if any, mapped through `f`
    pub fn query_one<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.conn
            .query_row(sql, params, f)
            .optional()
            .map_err(|e| anyhow!("Failed to fetch row: {}", e))
    }

    /// Fetch every row of a query, mapped through `f`
    pub fn query_all<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| anyhow!("Failed to prepare query: {}", e))?;

        let rows = stmt
            .query_map(params, f)
            .map_err(|e| anyhow!("Failed to run query: {}", e))?;

        rows.collect::<rusqlite::Result<Vec<T>>>()
            .map_err(|e| anyhow!("Failed to read row: {}", e))
    }

    /// Check if a table exists in the database
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let count: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [table_name],
                |row| row.get(0),
            )
            .map_err(|e| anyhow!("Failed to check table existence: {}", e))?;
        Ok(count > 0)
    }

    /// Get the row count for a table
    pub fn table_count(&self, table_name: &str) -> Result<u64> {
        let query = format!("SELECT COUNT(*) FROM {}", table_name);
        let count: u64 = self
            .conn
            .query_row(&query, [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to get table count: {}", e))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = DatabaseConn::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let enabled: i64 = db
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_insert_returns_rowid() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();

        let first = db
            .insert("INSERT INTO test (name) VALUES (?1)", ["a"])
            .unwrap();
        let second = db
            .insert("INSERT INTO test (name) VALUES (?1)", ["b"])
            .unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[test]
    fn test_query_one_and_all() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();
        db.execute("INSERT INTO test (name) VALUES ('a'), ('b'), ('c')")
            .unwrap();

        let name: Option<String> = db
            .query_one("SELECT name FROM test WHERE id = ?1", [2], |row| row.get(0))
            .unwrap();
        assert_eq!(name.as_deref(), Some("b"));

        let missing: Option<String> = db
            .query_one("SELECT name FROM test WHERE id = ?1", [42], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(missing.is_none());

        let names: Vec<String> = db
            .query_all("SELECT name FROM test ORDER BY id", [], |row| row.get(0))
            .unwrap();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_table_exists() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();

        assert!(db.table_exists("test_table").unwrap());
        assert!(!db.table_exists("nonexistent_table").unwrap());
    }

    #[test]
    fn test_table_count() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();
        db.execute("INSERT INTO test_table (id) VALUES (1), (2), (3)")
            .unwrap();

        assert_eq!(db.table_count("test_table").unwrap(), 3);
    }
}
