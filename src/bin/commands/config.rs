use serde::Serialize;
use staffdb::lens::utils::OutputFormat;
use staffdb::{format_size, get_sqlite_info, StaffdbConfig};

#[derive(Debug, Serialize)]
struct ConfigInfo {
    config_file: String,
    data_dir: String,
    sqlite_path: String,
    identity_map: bool,
    database_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
}

pub fn run(config: &StaffdbConfig, output_format: OutputFormat) {
    let sqlite_info = get_sqlite_info(config);
    let config_info = ConfigInfo {
        config_file: StaffdbConfig::config_file_path(),
        data_dir: config.data_dir.clone(),
        sqlite_path: config.sqlite_path(),
        identity_map: config.identity_map,
        database_exists: sqlite_info.exists,
        size_bytes: sqlite_info.size_bytes,
    };

    match output_format {
        OutputFormat::Json | OutputFormat::JsonLine => match serde_json::to_string(&config_info) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("ERROR: Failed to serialize config: {}", e);
                std::process::exit(1);
            }
        },
        OutputFormat::JsonPretty => match serde_json::to_string_pretty(&config_info) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("ERROR: Failed to serialize config: {}", e);
                std::process::exit(1);
            }
        },
        _ => {
            println!("Staffdb Configuration");
            println!("=====================\n");
            println!("Config File:        {}", config_info.config_file);
            println!("{}", config.summary());
            match config_info.size_bytes {
                Some(size) => println!("Database Size:      {}", format_size(size)),
                None => println!("Database Size:      not created"),
            }
            eprintln!();
            eprintln!("Tips:");
            eprintln!("  Use --format json for machine-readable output");
            eprintln!("  Set STAFFDB_DATA_DIR to override the data directory");
        }
    }
}
