use clap::{Args, Subcommand};
use serde::Serialize;
use staffdb::lens::utils::OutputFormat;
use staffdb::{format_size, get_sqlite_info, SqliteDatabaseInfo, StaffdbConfig};

use super::open_database;

/// Arguments for the Database command
#[derive(Args)]
pub struct DatabaseArgs {
    #[clap(subcommand)]
    pub command: Option<DatabaseCommands>,
}

/// Database subcommands
#[derive(Subcommand)]
pub enum DatabaseCommands {
    /// Show database status (default when no subcommand)
    Status,

    /// Create the database file and tables if missing
    Init,

    /// Drop all tables and recreate an empty schema
    Reset {
        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },
}

pub fn run(config: &StaffdbConfig, args: DatabaseArgs, output_format: OutputFormat) {
    match args.command {
        None | Some(DatabaseCommands::Status) => run_status(config, output_format),
        Some(DatabaseCommands::Init) => run_init(config, output_format),
        Some(DatabaseCommands::Reset { yes }) => run_reset(config, yes, output_format),
    }
}

fn run_status(config: &StaffdbConfig, output_format: OutputFormat) {
    let sqlite_info = get_sqlite_info(config);

    match output_format {
        OutputFormat::JsonPretty => print_json(&sqlite_info, true),
        OutputFormat::Json | OutputFormat::JsonLine => print_json(&sqlite_info, false),
        _ => print_status_table(&sqlite_info),
    }
}

fn print_status_table(sqlite: &SqliteDatabaseInfo) {
    println!("Staff Database Status");
    println!("=====================\n");

    println!("SQLite Database:");
    println!("  Path:           {}", sqlite.path);
    println!(
        "  Status:         {}",
        if sqlite.exists {
            "exists"
        } else {
            "not created"
        }
    );
    if let Some(size) = sqlite.size_bytes {
        println!("  Size:           {}", format_size(size));
    }
    println!(
        "  Schema:         {}",
        if sqlite.schema_initialized {
            format!("initialized (v{})", sqlite.schema_version.unwrap_or(0))
        } else {
            "not initialized".to_string()
        }
    );
    if let Some(updated) = &sqlite.schema_updated {
        println!("  Updated:        {}", updated);
    }
    if let Some(count) = sqlite.department_count {
        println!("  Departments:    {}", count);
    }
    if let Some(count) = sqlite.employee_count {
        println!("  Employees:      {}", count);
    }
}

fn run_init(config: &StaffdbConfig, output_format: OutputFormat) {
    open_database(config);
    let sqlite_info = get_sqlite_info(config);
    if output_format.is_json() {
        print_json(&sqlite_info, output_format == OutputFormat::JsonPretty);
    } else {
        println!("Initialized {}", sqlite_info.path);
    }
}

#[derive(Debug, Serialize)]
struct ResetResult {
    path: String,
    success: bool,
    message: String,
}

fn run_reset(config: &StaffdbConfig, skip_confirm: bool, output_format: OutputFormat) {
    if !skip_confirm && !output_format.is_json() {
        eprintln!(
            "This will delete every department and employee in {}",
            config.sqlite_path()
        );
        eprint!("Are you sure? [y/N] ");

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_ok() {
            let input = input.trim().to_lowercase();
            if input != "y" && input != "yes" {
                eprintln!("Aborted.");
                return;
            }
        } else {
            eprintln!("Aborted.");
            return;
        }
    }

    let db = open_database(config);

    let result = match db.reset() {
        Ok(()) => ResetResult {
            path: config.sqlite_path(),
            success: true,
            message: "database reset".to_string(),
        },
        Err(e) => ResetResult {
            path: config.sqlite_path(),
            success: false,
            message: e.to_string(),
        },
    };

    if output_format.is_json() {
        print_json(&result, output_format == OutputFormat::JsonPretty);
    } else if result.success {
        println!("✓ {}: {}", result.path, result.message);
    } else {
        eprintln!("✗ {}: {}", result.path, result.message);
    }

    if !result.success {
        std::process::exit(1);
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match json {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("ERROR: Failed to serialize output: {}", e);
            std::process::exit(1);
        }
    }
}
