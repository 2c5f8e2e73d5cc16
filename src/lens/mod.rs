//! Lens module
//!
//! This module provides high-level "lens" abstractions that combine the
//! mappers with output formatting. Lenses are reusable across interfaces;
//! the `staffdb` binary is one of them.
//!
//! Each lens module exports:
//! - A **Lens struct** (e.g., `RosterLens`) - the main entry point for all operations
//! - **Output types** - flat rows ready for tables or JSON
//!
//! ```rust,ignore
//! use staffdb::database::CompanyDatabase;
//! use staffdb::lens::roster::RosterLens;
//! use staffdb::lens::utils::{format_rows, OutputFormat};
//!
//! let db = CompanyDatabase::open_in_dir("/var/lib/staffdb")?;
//! let lens = RosterLens::new(&db);
//! println!("{}", format_rows(&lens.departments()?, OutputFormat::Table)?);
//! ```

pub mod roster;
pub mod utils;
