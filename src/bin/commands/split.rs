use std::path::PathBuf;

use clap::Args;
use sqlboot::{read_script, split_statements, split_statements_nonblank};

use super::{print_json, OutputFormat};

/// Arguments for the Split command
#[derive(Args)]
pub struct SplitArgs {
    /// Script file to split
    #[clap(name = "FILE")]
    pub file: PathBuf,

    /// Drop statements made only of whitespace
    #[clap(long)]
    pub nonblank: bool,
}

pub fn run(args: SplitArgs, output_format: OutputFormat) {
    let SplitArgs { file, nonblank } = args;

    let text = match read_script(&file, true) {
        Ok(text) => text.unwrap_or_default(),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };
    let statements = if nonblank {
        split_statements_nonblank(&text)
    } else {
        split_statements(&text)
    };

    if output_format.is_json() {
        print_json(&statements, output_format);
        return;
    }

    for (idx, statement) in statements.iter().enumerate() {
        println!("-- statement {}", idx + 1);
        print!("{}", statement);
        if !statement.ends_with('\n') {
            println!();
        }
    }
}
