use sqlboot::BootConfig;

use super::{print_json, OutputFormat};

pub fn run(config: &BootConfig, output_format: OutputFormat) {
    if output_format.is_json() {
        print_json(
            &serde_json::json!({
                "config_file": BootConfig::config_file_path(),
                "sqlite_path": config.sqlite_path(),
                "install_dir": config.install_dir(),
                "scripts": config.scripts(),
                "capabilities": config.backend.capabilities(),
                "config": config,
            }),
            output_format,
        );
        return;
    }

    println!("Config File:        {}", BootConfig::config_file_path());
    println!("{}", config.summary());
}
