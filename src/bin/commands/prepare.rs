use clap::Args;
use sqlboot::{
    BootConfig, BootError, CapabilityDescriptor, DatabaseConn, SchemaInitializer,
    SqliteSchemaTarget,
};

use super::{print_json, OutputFormat};

/// Arguments for the Prepare command
#[derive(Args)]
pub struct PrepareArgs {
    /// SQLite database file, overrides the configured path
    #[clap(short, long)]
    pub database: Option<String>,
}

pub fn run(config: &BootConfig, args: PrepareArgs, output_format: OutputFormat) {
    if let Err(e) = prepare(config, args, output_format) {
        let history = e.downcast_ref::<BootError>().and_then(BootError::history);
        if output_format.is_json() {
            print_json(
                &serde_json::json!({
                    "success": false,
                    "error": e.to_string(),
                    "history": history,
                }),
                output_format,
            );
        } else {
            eprintln!("ERROR: {}", e);
        }
        // a half-initialized database must not be served
        std::process::exit(1);
    }
}

fn prepare(
    config: &BootConfig,
    args: PrepareArgs,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let path = args.database.unwrap_or_else(|| config.sqlite_path());

    // checked before the database file is created
    let scripts = config.scripts_for(CapabilityDescriptor::SQLITE)?;
    let model = config.schema_model()?;
    let initializer = SchemaInitializer::new(config.required_table_set()?, scripts);

    let db = DatabaseConn::open_path(&path)?;
    let target = SqliteSchemaTarget::new(&db, &model);

    let report = initializer.prepare(&target)?;

    if output_format.is_json() {
        print_json(
            &serde_json::json!({ "success": true, "database": path, "report": report }),
            output_format,
        );
    } else if report.was_noop() {
        println!("Database {} is ready, schema already present", path);
    } else {
        println!(
            "Database {} initialized: {} custom command(s) applied",
            path, report.statements_applied
        );
    }
    Ok(())
}
