use clap::Args;
use sqlboot::{Backend, BootConfig, CapabilityDescriptor};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{print_json, OutputFormat};

/// Arguments for the Capabilities command
#[derive(Args)]
pub struct CapabilitiesArgs {
    /// Backend to describe (sqlserver, sqlite), defaults to the configured one
    #[clap(short, long)]
    pub backend: Option<String>,

    /// Describe every supported backend
    #[clap(long, short)]
    pub all: bool,
}

/// One backend per table row
#[derive(Tabled)]
struct CapabilityRow {
    backend: &'static str,
    stored_procedures: &'static str,
    backup: &'static str,
    max_hashed_binary: String,
    placeholder: String,
}

impl From<&CapabilityDescriptor> for CapabilityRow {
    fn from(caps: &CapabilityDescriptor) -> Self {
        let max_hashed_binary = if caps.supports_hashing() {
            format!("{} bytes", caps.max_hashed_binary_length())
        } else {
            "unsupported".to_string()
        };

        CapabilityRow {
            backend: caps.backend().display_name(),
            stored_procedures: yes_no(caps.supports_stored_procedures()),
            backup: yes_no(caps.supports_backup()),
            max_hashed_binary,
            placeholder: caps.new_parameter().with_name("name").placeholder(),
        }
    }
}

pub fn run(config: &BootConfig, args: CapabilitiesArgs, output_format: OutputFormat) {
    let backends = if args.all {
        Backend::all()
    } else {
        match args.backend.as_deref().map(str::parse::<Backend>) {
            Some(Ok(b)) => vec![b],
            Some(Err(e)) => {
                eprintln!("ERROR: {}", e);
                std::process::exit(1);
            }
            None => vec![config.backend],
        }
    };

    let descriptors: Vec<CapabilityDescriptor> =
        backends.iter().map(|b| b.capabilities()).collect();

    if output_format.is_json() {
        print_json(&descriptors, output_format);
        return;
    }

    let rows: Vec<CapabilityRow> = descriptors.iter().map(CapabilityRow::from).collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
