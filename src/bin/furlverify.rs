use std::path::PathBuf;
use std::process;

use clap::Parser;

use shorturl_rs::common::{log, reset_sigpipe, tool_name};
use shorturl_rs::verify::verify_file;

#[derive(Parser)]
#[command(
    name = "furlverify",
    version,
    about = "Check that a short-code URL file is sorted"
)]
struct Cli {
    /// Log the record count to stderr on success
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// File to check
    in_file: PathBuf,
}

fn main() {
    reset_sigpipe();
    let cli = Cli::parse();
    let tool = tool_name("furlverify");

    if let Err(e) = log::init_logging(cli.verbose) {
        eprintln!("{}: logging disabled: {}", tool, e);
    }

    if let Err(e) = verify_file(&cli.in_file) {
        eprintln!("{}: {}", tool, e);
        process::exit(e.exit_code());
    }
}
