pub mod config;
pub mod database;
pub mod department;
pub mod employee;

use serde::Serialize;
use staffdb::lens::utils::{format_rows, OutputFormat};
use staffdb::{CompanyDatabase, StaffdbConfig};
use tabled::Tabled;

/// Open the configured database, exiting on failure
pub(crate) fn open_database(config: &StaffdbConfig) -> CompanyDatabase {
    match CompanyDatabase::from_config(config) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("ERROR: Failed to open database: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print rows in the requested format, exiting on failure
pub(crate) fn print_rows<T: Tabled + Serialize>(rows: &[T], output_format: OutputFormat) {
    match format_rows(rows, output_format) {
        Ok(out) => println!("{}", out),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    }
}
