use clap::{Args, Subcommand};
use staffdb::lens::roster::{DepartmentSummary, EmployeeRow, RosterLens};
use staffdb::lens::utils::OutputFormat;
use staffdb::{Employee, Shared, StaffdbConfig};

use super::{open_database, print_rows};

/// Arguments for the Employee command
#[derive(Args)]
pub struct EmployeeArgs {
    #[clap(subcommand)]
    pub command: EmployeeCommands,
}

/// Employee subcommands
#[derive(Subcommand)]
pub enum EmployeeCommands {
    /// Create an employee in an existing department
    Create {
        /// Employee name
        name: String,

        /// Job title, e.g. "Accountant"
        job_title: String,

        /// Department id or name
        #[clap(short, long, value_name = "ID_OR_NAME")]
        department: String,
    },

    /// List all employees
    List,

    /// Show one employee by id or name
    Show {
        #[clap(value_name = "ID_OR_NAME")]
        employee: String,
    },

    /// Find the first employee with exactly this name
    Find {
        name: String,
    },

    /// Change the name, job title and/or department of an employee
    Update {
        #[clap(value_name = "ID_OR_NAME")]
        employee: String,

        /// New name
        #[clap(long)]
        name: Option<String>,

        /// New job title
        #[clap(long)]
        job_title: Option<String>,

        /// Move to another department (id or name)
        #[clap(long, value_name = "ID_OR_NAME")]
        department: Option<String>,
    },

    /// Delete an employee
    Delete {
        #[clap(value_name = "ID_OR_NAME")]
        employee: String,
    },

    /// Show the department an employee belongs to
    Department {
        #[clap(value_name = "ID_OR_NAME")]
        employee: String,
    },
}

pub fn run(config: &StaffdbConfig, args: EmployeeArgs, output_format: OutputFormat) {
    let db = open_database(config);
    let lens = RosterLens::new(&db);

    match args.command {
        EmployeeCommands::Create {
            name,
            job_title,
            department,
        } => {
            let department_id = resolve_department_id(&lens, &department);
            match db.employees().create(&name, &job_title, department_id) {
                Ok(employee) => print_employee(&lens, &employee, output_format),
                Err(e) => {
                    eprintln!("ERROR: {}", e);
                    std::process::exit(1);
                }
            }
        }
        EmployeeCommands::List => match lens.employees() {
            Ok(rows) => {
                let rows: Vec<EmployeeRow> = if output_format.is_table() {
                    rows.iter().map(EmployeeRow::truncated).collect()
                } else {
                    rows
                };
                print_rows(&rows, output_format);
            }
            Err(e) => {
                eprintln!("ERROR: {}", e);
                std::process::exit(1);
            }
        },
        EmployeeCommands::Show { employee } => {
            let employee = resolve(&lens, &employee);
            print_employee(&lens, &employee, output_format);
        }
        EmployeeCommands::Find { name } => match db.employees().find_by_name(&name) {
            Ok(Some(employee)) => print_employee(&lens, &employee, output_format),
            Ok(None) => {
                eprintln!("ERROR: No employee named '{}'", name);
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("ERROR: {}", e);
                std::process::exit(1);
            }
        },
        EmployeeCommands::Update {
            employee,
            name,
            job_title,
            department,
        } => {
            let employee = resolve(&lens, &employee);
            let department_id = department.map(|key| resolve_department_id(&lens, &key));
            {
                let mut current = employee.borrow_mut();
                if let Some(name) = name {
                    current.name = name;
                }
                if let Some(job_title) = job_title {
                    current.job_title = job_title;
                }
                if let Some(department_id) = department_id {
                    current.department_id = department_id;
                }
            }
            match db.employees().update(&employee.borrow()) {
                Ok(()) => print_employee(&lens, &employee, output_format),
                Err(e) => {
                    eprintln!("ERROR: {}", e);
                    std::process::exit(1);
                }
            };
        }
        EmployeeCommands::Delete { employee } => {
            let employee = resolve(&lens, &employee);
            let label = employee.borrow().to_string();
            match db.employees().delete(&employee) {
                Ok(()) => eprintln!("Deleted {}", label),
                Err(e) => {
                    eprintln!("ERROR: {}", e);
                    std::process::exit(1);
                }
            }
        }
        EmployeeCommands::Department { employee } => {
            let employee = resolve(&lens, &employee);
            // listing the department's staff refreshes this employee in place
            let employee = employee.borrow().clone();
            match db.employee_department(&employee) {
                Ok(Some(department)) => {
                    let department = department.borrow();
                    match db.department_employees(&department) {
                        Ok(staff) => {
                            let summary = DepartmentSummary::new(&department, staff.len());
                            print_rows(&[summary], output_format);
                        }
                        Err(e) => {
                            eprintln!("ERROR: {}", e);
                            std::process::exit(1);
                        }
                    }
                }
                Ok(None) => {
                    eprintln!(
                        "ERROR: Department {} of {} does not exist",
                        employee.department_id, employee
                    );
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("ERROR: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn resolve(lens: &RosterLens<'_>, key: &str) -> Shared<Employee> {
    match lens.resolve_employee(key) {
        Ok(Some(employee)) => employee,
        Ok(None) => {
            eprintln!("ERROR: No employee matches '{}'", key);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    }
}

fn resolve_department_id(lens: &RosterLens<'_>, key: &str) -> i64 {
    let department = match lens.resolve_department(key) {
        Ok(Some(department)) => department,
        Ok(None) => {
            eprintln!("ERROR: No department matches '{}'", key);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let id = department.borrow().id;
    match id {
        Some(id) => id,
        None => {
            eprintln!("ERROR: Department '{}' has not been persisted", key);
            std::process::exit(1);
        }
    }
}

fn print_employee(lens: &RosterLens<'_>, employee: &Shared<Employee>, output_format: OutputFormat) {
    match lens.employee_row(&employee.borrow()) {
        Ok(row) => print_rows(&[row], output_format),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    }
}
