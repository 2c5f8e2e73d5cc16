use clap::{Args, Subcommand};
use staffdb::lens::roster::{DepartmentSummary, EmployeeRow, RosterLens};
use staffdb::lens::utils::OutputFormat;
use staffdb::{CompanyDatabase, Department, Shared, StaffdbConfig};

use super::{open_database, print_rows};

/// Arguments for the Department command
#[derive(Args)]
pub struct DepartmentArgs {
    #[clap(subcommand)]
    pub command: DepartmentCommands,
}

/// Department subcommands
#[derive(Subcommand)]
pub enum DepartmentCommands {
    /// Create a department
    Create {
        /// Department name, e.g. "Payroll"
        name: String,

        /// Where the department is located
        location: String,
    },

    /// List all departments with their headcount
    List,

    /// Show one department by id or name
    Show {
        #[clap(value_name = "ID_OR_NAME")]
        department: String,
    },

    /// Find the first department with exactly this name
    Find {
        name: String,
    },

    /// Change the name and/or location of a department
    Update {
        #[clap(value_name = "ID_OR_NAME")]
        department: String,

        /// New name
        #[clap(long)]
        name: Option<String>,

        /// New location
        #[clap(long)]
        location: Option<String>,
    },

    /// Delete a department (must have no employees)
    Delete {
        #[clap(value_name = "ID_OR_NAME")]
        department: String,
    },

    /// List the employees of a department
    Employees {
        #[clap(value_name = "ID_OR_NAME")]
        department: String,
    },
}

pub fn run(config: &StaffdbConfig, args: DepartmentArgs, output_format: OutputFormat) {
    let db = open_database(config);
    let lens = RosterLens::new(&db);

    match args.command {
        DepartmentCommands::Create { name, location } => {
            match db.departments().create(&name, &location) {
                Ok(department) => print_department(&db, &department, output_format),
                Err(e) => {
                    eprintln!("ERROR: {}", e);
                    std::process::exit(1);
                }
            }
        }
        DepartmentCommands::List => match lens.departments() {
            Ok(rows) => print_rows(&rows, output_format),
            Err(e) => {
                eprintln!("ERROR: {}", e);
                std::process::exit(1);
            }
        },
        DepartmentCommands::Show { department } => {
            let department = resolve(&lens, &department);
            print_department(&db, &department, output_format);
        }
        DepartmentCommands::Find { name } => match db.departments().find_by_name(&name) {
            Ok(Some(department)) => print_department(&db, &department, output_format),
            Ok(None) => {
                eprintln!("ERROR: No department named '{}'", name);
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("ERROR: {}", e);
                std::process::exit(1);
            }
        },
        DepartmentCommands::Update {
            department,
            name,
            location,
        } => {
            let department = resolve(&lens, &department);
            {
                let mut current = department.borrow_mut();
                if let Some(name) = name {
                    current.name = name;
                }
                if let Some(location) = location {
                    current.location = location;
                }
            }
            match db.departments().update(&department.borrow()) {
                Ok(()) => print_department(&db, &department, output_format),
                Err(e) => {
                    eprintln!("ERROR: {}", e);
                    std::process::exit(1);
                }
            };
        }
        DepartmentCommands::Delete { department } => {
            let department = resolve(&lens, &department);
            let label = department.borrow().to_string();
            match db.departments().delete(&department) {
                Ok(()) => eprintln!("Deleted {}", label),
                Err(e) => {
                    eprintln!("ERROR: {}", e);
                    std::process::exit(1);
                }
            }
        }
        DepartmentCommands::Employees { department } => {
            let department = resolve(&lens, &department);
            let department = department.borrow();
            match db.department_employees(&department) {
                Ok(employees) => {
                    let mut rows: Vec<EmployeeRow> = employees
                        .iter()
                        .map(|e| EmployeeRow::new(&e.borrow(), Some(&*department)))
                        .collect();
                    rows.sort_by_key(|r| r.id);
                    if output_format.is_table() {
                        rows = rows.iter().map(EmployeeRow::truncated).collect();
                    }
                    print_rows(&rows, output_format);
                }
                Err(e) => {
                    eprintln!("ERROR: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn resolve(lens: &RosterLens<'_>, key: &str) -> Shared<Department> {
    match lens.resolve_department(key) {
        Ok(Some(department)) => department,
        Ok(None) => {
            eprintln!("ERROR: No department matches '{}'", key);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_department(
    db: &CompanyDatabase,
    department: &Shared<Department>,
    output_format: OutputFormat,
) {
    let department = department.borrow();
    match db.department_employees(&department) {
        Ok(employees) => {
            let summary = DepartmentSummary::new(&department, employees.len());
            print_rows(&[summary], output_format);
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    }
}
