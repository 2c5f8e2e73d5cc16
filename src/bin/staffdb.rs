use clap::{Parser, Subcommand};
use staffdb::lens::utils::OutputFormat;
use staffdb::StaffdbConfig;
use tracing::Level;

mod commands;

use commands::database::DatabaseArgs;
use commands::department::DepartmentArgs;
use commands::employee::EmployeeArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.staffdb/staffdb.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    /// Output format: table, markdown, json, json-pretty, json-line, psv
    #[clap(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, inspect and remove departments
    Department(DepartmentArgs),

    /// Create, inspect and remove employees
    Employee(EmployeeArgs),

    /// Database status and lifecycle
    Database(DatabaseArgs),

    /// Show the active configuration
    Config,
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            // filter spans/events with level INFO or higher.
            .with_max_level(Level::INFO)
            .init();
    }

    let config = match StaffdbConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Department(args) => commands::department::run(&config, args, cli.format),
        Commands::Employee(args) => commands::employee::run(&config, args, cli.format),
        Commands::Database(args) => commands::database::run(&config, args, cli.format),
        Commands::Config => commands::config::run(&config, cli.format),
    }
}
