//! Company database storage
//!
//! This module provides the department and employee mappers and the
//! database type that owns their shared storage handle:
//! - Departments - SQLite `departments` table
//! - Employees - SQLite `employees` table, referencing departments
//!
//! Each mapper converts rows through an [`IdentityMap`] owned by
//! [`CompanyDatabase`], so one persisted row has one live instance for as
//! long as the database value exists.

mod department;
mod employee;
mod entity;
mod identity_map;

pub use department::{Department, DepartmentRepository};
pub use employee::{Employee, EmployeeRepository};
pub use entity::{shared, DepartmentLookup, EmployeeLookup, Entity, Shared};
pub use identity_map::IdentityMap;

use crate::config::StaffdbConfig;
use crate::database::core::{DatabaseConn, SchemaManager, SchemaStatus};
use anyhow::{anyhow, Result};
use tracing::{info, warn};

/// Main staff database (SQLite backend)
///
/// `CompanyDatabase` provides a unified interface to both mappers. It handles:
/// - Schema initialization and version checks
/// - Ownership of the per-entity identity maps
/// - Access to the department and employee repositories
pub struct CompanyDatabase {
    db: DatabaseConn,
    departments: IdentityMap<Department>,
    employees: IdentityMap<Employee>,
}

impl CompanyDatabase {
    /// Open the staff database at the specified path
    ///
    /// If the database doesn't exist, it will be created and initialized.
    pub fn open(path: &str) -> Result<Self> {
        Self::open_with_options(Some(path), true)
    }

    /// Open the staff database from a data directory
    ///
    /// Creates the standard database file path: `{data_dir}/staffdb.sqlite3`
    pub fn open_in_dir(data_dir: &str) -> Result<Self> {
        let path = format!("{}/staffdb.sqlite3", data_dir.trim_end_matches('/'));
        Self::open(&path)
    }

    /// Create an in-memory staff database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::open_with_options(None, true)
    }

    /// Open the database described by a configuration
    pub fn from_config(config: &StaffdbConfig) -> Result<Self> {
        crate::database::ensure_data_dir(&config.data_dir)?;
        Self::open_with_options(Some(&config.sqlite_path()), config.identity_map)
    }

    /// Open a file (or in-memory, for `None`) database, choosing whether
    /// fetched rows are reconciled through identity maps
    pub fn open_with_options(path: Option<&str>, identity_map: bool) -> Result<Self> {
        let db = DatabaseConn::open(path)?;
        Self::prepare_schema(&db)?;

        Ok(Self {
            db,
            departments: IdentityMap::with_enabled(identity_map),
            employees: IdentityMap::with_enabled(identity_map),
        })
    }

    fn prepare_schema(db: &DatabaseConn) -> Result<()> {
        let schema = SchemaManager::new(&db.conn);

        match schema.check_status()? {
            SchemaStatus::Current => {
                info!("Staff database schema is current");
            }
            SchemaStatus::NotInitialized => {
                info!("Initializing staff database schema");
                schema.initialize()?;
            }
            SchemaStatus::Corrupted => {
                // every DDL statement is IF NOT EXISTS, existing rows survive
                warn!("Staff database is missing tables, recreating them");
                schema.initialize()?;
            }
            SchemaStatus::NeedsMigration { from, to } => {
                warn!(
                    "Staff database needs migration from v{} to v{}, resetting",
                    from, to
                );
                schema.reset()?;
                schema.initialize()?;
            }
            SchemaStatus::Incompatible {
                database_version,
                required_version,
            } => {
                return Err(anyhow!(
                    "Staff database schema v{} is newer than supported v{}",
                    database_version,
                    required_version
                ));
            }
        }

        Ok(())
    }

    /// Get the department repository
    pub fn departments(&self) -> DepartmentRepository<'_> {
        DepartmentRepository::new(&self.db, &self.departments)
    }

    /// Get the employee repository
    pub fn employees(&self) -> EmployeeRepository<'_> {
        EmployeeRepository::new(&self.db, &self.employees)
    }

    /// Employees of a department, through the employee mapper
    pub fn department_employees(&self, department: &Department) -> Result<Vec<Shared<Employee>>> {
        self.departments()
            .list_employees(department, &self.employees())
    }

    /// Department an employee belongs to, through the department mapper
    pub fn employee_department(&self, employee: &Employee) -> Result<Option<Shared<Department>>> {
        self.employees()
            .department(employee, &self.departments())
    }

    /// Get the shared storage handle
    pub fn database(&self) -> &DatabaseConn {
        &self.db
    }

    /// Get the underlying database connection (for advanced queries)
    pub fn connection(&self) -> &rusqlite::Connection {
        &self.db.conn
    }

    /// Forget every live instance in both identity maps
    ///
    /// Handles already given out stay valid but are no longer returned by
    /// later fetches.
    pub fn clear_identity_maps(&self) {
        self.departments.clear();
        self.employees.clear();
    }

    /// Drop and recreate every table in one transaction, emptying both maps
    pub fn reset(&self) -> Result<()> {
        let tx = self
            .db
            .conn
            .unchecked_transaction()
            .map_err(|e| anyhow!("Failed to begin transaction: {}", e))?;

        {
            let schema = SchemaManager::new(&tx);
            schema.reset()?;
            schema.initialize()?;
        }

        tx.commit()
            .map_err(|e| anyhow!("Failed to commit reset: {}", e))?;

        self.clear_identity_maps();
        info!("Staff database reset");
        Ok(())
    }

    /// Get metadata value from the database
    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let schema = SchemaManager::new(&self.db.conn);
        schema.get_meta(key)
    }

    /// Set metadata value in the database
    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        let schema = SchemaManager::new(&self.db.conn);
        schema.set_meta(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::core::SCHEMA_VERSION;
    use std::rc::Rc;

    #[test]
    fn test_open_in_memory() {
        let db = CompanyDatabase::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_repositories_start_empty() {
        let db = CompanyDatabase::open_in_memory().unwrap();

        assert!(db.departments().is_empty());
        assert!(db.employees().is_empty());
    }

    #[test]
    fn test_payroll_example() {
        let db = CompanyDatabase::open_in_memory().unwrap();

        let payroll = db.departments().create("Payroll", "Building A").unwrap();
        let payroll_id = payroll.borrow().id.unwrap();
        db.employees()
            .create("Amir", "Accountant", payroll_id)
            .unwrap();

        let staff = db.department_employees(&payroll.borrow()).unwrap();
        assert_eq!(staff.len(), 1);
        assert_eq!(staff[0].borrow().name, "Amir");
        assert_eq!(staff[0].borrow().department_id, payroll_id);

        let department = db.employee_department(&staff[0].borrow()).unwrap().unwrap();
        assert!(Rc::ptr_eq(&department, &payroll));
    }

    #[test]
    fn test_reset_clears_rows_and_maps() {
        let db = CompanyDatabase::open_in_memory().unwrap();
        let payroll = db.departments().create("Payroll", "Building A").unwrap();
        let payroll_id = payroll.borrow().id.unwrap();
        db.employees()
            .create("Amir", "Accountant", payroll_id)
            .unwrap();

        db.reset().unwrap();

        assert!(db.departments().is_empty());
        assert!(db.employees().is_empty());
        assert!(db.departments().find_by_id(payroll_id).unwrap().is_none());
        assert_eq!(
            db.get_meta("schema_version").unwrap(),
            Some(SCHEMA_VERSION.to_string())
        );
    }

    #[test]
    fn test_reopen_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staff.sqlite3");
        let path = path.to_str().unwrap();

        let first_id = {
            let db = CompanyDatabase::open(path).unwrap();
            let department = db.departments().create("Payroll", "Building A").unwrap();
            let id = department.borrow().id.unwrap();
            id
        };

        let db = CompanyDatabase::open(path).unwrap();
        let found = db.departments().find_by_id(first_id).unwrap().unwrap();
        assert_eq!(found.borrow().name, "Payroll");
    }

    #[test]
    fn test_missing_table_is_recreated_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staff.sqlite3");
        let path = path.to_str().unwrap();

        {
            let db = CompanyDatabase::open(path).unwrap();
            db.departments().create("Payroll", "Building A").unwrap();
            db.employees().drop_table().unwrap();
        }

        let db = CompanyDatabase::open(path).unwrap();
        assert!(db.database().table_exists("employees").unwrap());
        assert_eq!(db.departments().count().unwrap(), 1);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staff.sqlite3");
        let path = path.to_str().unwrap();

        {
            let db = CompanyDatabase::open(path).unwrap();
            db.set_meta("schema_version", &(SCHEMA_VERSION + 1).to_string())
                .unwrap();
        }

        assert!(CompanyDatabase::open(path).is_err());
    }

    #[test]
    fn test_meta_operations() {
        let db = CompanyDatabase::open_in_memory().unwrap();

        db.set_meta("test_key", "test_value").unwrap();
        let value = db.get_meta("test_key").unwrap();
        assert_eq!(value, Some("test_value".to_string()));
    }
}
