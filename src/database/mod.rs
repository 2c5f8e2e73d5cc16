//! Database module
//!
//! This module provides all database functionality for staffdb, organized into:
//!
//! - **core**: Core database infrastructure (SQLite connection, schema management)
//! - **company**: The department and employee mappers and the database owning them
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/             # Foundation
//! │   ├── connection    # SQLite DatabaseConn wrapper
//! │   └── schema        # Table definitions and schema management
//! │
//! └── company/          # Mappers
//!     ├── department    # departments table <-> Department
//!     ├── employee      # employees table <-> Employee (owns the foreign key)
//!     └── identity_map  # one live instance per persisted row
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use staffdb::database::CompanyDatabase;
//!
//! let db = CompanyDatabase::open_in_dir("/var/lib/staffdb")?;
//!
//! let payroll = db.departments().create("Payroll", "Building A")?;
//! let payroll_id = payroll.borrow().id.unwrap_or_default();
//! db.employees().create("Amir", "Accountant", payroll_id)?;
//!
//! for employee in db.department_employees(&payroll.borrow())? {
//!     println!("{}", employee.borrow());
//! }
//! ```

pub mod company;
pub mod core;

// SQLite connection and schema management
pub use core::{DatabaseConn, SchemaDefinitions, SchemaManager, SchemaStatus, SCHEMA_VERSION};

// Mappers and the database owning them
pub use company::{
    shared, CompanyDatabase, Department, DepartmentLookup, DepartmentRepository, Employee,
    EmployeeLookup, EmployeeRepository, Entity, IdentityMap, Shared,
};

/// Ensure the data directory exists
pub fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data directory '{}': {}", data_dir, e))
}
