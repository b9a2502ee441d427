use std::path::PathBuf;
use std::process;

use clap::Parser;

use shorturl_rs::common::io::{open_input_or_stdin, stdout_sink};
use shorturl_rs::common::{log, reset_sigpipe, tool_name};
use shorturl_rs::export::export_csv;

#[derive(Parser)]
#[command(
    name = "furlcsv",
    version,
    about = "Convert a short-code URL file to CSV (url,code,,)"
)]
struct Cli {
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Record file; standard input when omitted or "-"
    in_file: Option<PathBuf>,
}

fn main() {
    reset_sigpipe();
    let cli = Cli::parse();
    let tool = tool_name("furlcsv");

    if let Err(e) = log::init_logging(cli.verbose) {
        eprintln!("{}: logging disabled: {}", tool, e);
    }

    let result = open_input_or_stdin(cli.in_file.as_deref()).and_then(|mut input| {
        let mut out = stdout_sink();
        export_csv(&mut input, &mut out)
    });

    if let Err(e) = result {
        eprintln!("{}: {}", tool, e);
        process::exit(e.exit_code());
    }
}
