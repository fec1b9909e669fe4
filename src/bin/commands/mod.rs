use serde::Serialize;

pub mod backup;
pub mod capabilities;
pub mod config;
pub mod prepare;
pub mod split;

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
}

impl OutputFormat {
    pub fn from_flags(json: bool, pretty: bool) -> Self {
        match (json, pretty) {
            (_, true) => OutputFormat::JsonPretty,
            (true, false) => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }

    pub fn is_json(&self) -> bool {
        !matches!(self, OutputFormat::Text)
    }
}

/// Print a value as JSON in the requested style
pub(crate) fn print_json<T: Serialize>(value: &T, output_format: OutputFormat) {
    let result = match output_format {
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value),
        _ => serde_json::to_string(value),
    };
    match result {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("ERROR: Failed to serialize to JSON: {}", e),
    }
}
