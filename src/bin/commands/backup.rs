use std::path::Path;

use clap::Args;
use sqlboot::{BootConfig, DatabaseConn};

use super::{print_json, OutputFormat};

/// Arguments for the Backup command
#[derive(Args)]
pub struct BackupArgs {
    /// Destination path for the backup
    #[clap(value_name = "DEST")]
    pub destination: String,
}

pub fn run(config: &BootConfig, args: BackupArgs, output_format: OutputFormat) {
    let sqlite_path = config.sqlite_path();
    let dest_path = Path::new(&args.destination);

    // Determine if destination is a directory or file
    let dest_file = if dest_path.is_dir() || args.destination.ends_with('/') {
        if let Err(e) = std::fs::create_dir_all(dest_path) {
            eprintln!("ERROR: Failed to create destination directory: {}", e);
            std::process::exit(1);
        }
        dest_path.join("sqlboot.sqlite3")
    } else {
        if let Some(parent) = dest_path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    eprintln!("ERROR: Failed to create destination directory: {}", e);
                    std::process::exit(1);
                }
            }
        }
        dest_path.to_path_buf()
    };

    if !Path::new(&sqlite_path).exists() {
        eprintln!("ERROR: Database file does not exist: {}", sqlite_path);
        std::process::exit(1);
    }

    eprintln!("Backing up database...");
    let result = DatabaseConn::open_path(&sqlite_path).and_then(|db| db.backup_to(&dest_file));
    if let Err(e) = result {
        eprintln!("ERROR: Failed to backup database: {}", e);
        std::process::exit(1);
    }

    if output_format.is_json() {
        print_json(
            &serde_json::json!({
                "success": true,
                "file": dest_file.to_string_lossy(),
            }),
            output_format,
        );
    } else {
        println!("Backup written to {}", dest_file.display());
    }
}
