#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! staffdb - departments and employees over SQLite
//!
//! staffdb persists a one-to-many relationship (a department has many
//! employees, an employee belongs to one department) through two
//! hand-written data mappers. It can be used as both a command-line
//! application and a library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | (none) | SQLite mappers, config | `rusqlite`, `config` |
//! | `lens` | Roster views and table/JSON output | `tabled` |
//! | `cli` | The `staffdb` binary | All above + `clap` |
//!
//! # Architecture
//!
//! - **[`database`]**: All database functionality (always available)
//!   - `core`: SQLite connection management and schema definitions
//!   - `company`: department and employee mappers, identity maps
//! - **`lens`**: Roster views combining both mappers (requires `lens`)
//! - **[`config`]**: Configuration management
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use staffdb::database::CompanyDatabase;
//!
//! let db = CompanyDatabase::open_in_memory()?;
//!
//! let payroll = db.departments().create("Payroll", "Building A")?;
//! let payroll_id = payroll.borrow().id.unwrap_or_default();
//! db.employees().create("Amir", "Accountant", payroll_id)?;
//!
//! // computed from the employees table on every call
//! let staff = db.department_employees(&payroll.borrow())?;
//! assert_eq!(staff[0].borrow().name, "Amir");
//!
//! // the identity map hands back the very same instance
//! let again = db.departments().find_by_id(payroll_id)?;
//! ```

pub mod config;
pub mod database;

#[cfg(feature = "lens")]
pub mod lens;

// =============================================================================
// Configuration (always available)
// =============================================================================

pub use config::StaffdbConfig;
pub use config::{format_size, get_sqlite_info, SqliteDatabaseInfo};

// =============================================================================
// Database Module - Re-export commonly used types (always available)
// =============================================================================

pub use database::CompanyDatabase;

pub use database::{DatabaseConn, SchemaDefinitions, SchemaManager, SchemaStatus, SCHEMA_VERSION};

pub use database::{
    shared, Department, DepartmentLookup, DepartmentRepository, Employee, EmployeeLookup,
    EmployeeRepository, Entity, IdentityMap, Shared,
};

// =============================================================================
// Lens Module - Feature-gated exports
// =============================================================================

#[cfg(feature = "lens")]
pub use lens::roster::RosterLens;

#[cfg(feature = "lens")]
pub use lens::utils::OutputFormat;
