use std::path::PathBuf;
use std::process;

use clap::Parser;

use shorturl_rs::common::io::{open_input_or_stdin, stdout_sink};
use shorturl_rs::common::{log, reset_sigpipe, tool_name};
use shorturl_rs::repair::{DEFAULT_BAD_URLS, Repairer, repair_lines};

#[derive(Parser)]
#[command(
    name = "furlrepair",
    version,
    about = "Strip zero padding from codes and drop records without a usable URL"
)]
struct Cli {
    /// Also drop records pointing at URL (repeatable)
    #[arg(long = "bad-url", value_name = "URL")]
    bad_urls: Vec<String>,

    /// Only drop the URLs given with --bad-url
    #[arg(long = "no-default-bad-urls")]
    no_default_bad_urls: bool,

    /// Log a summary to stderr (-v), or every dropped line (-vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Record file; standard input when omitted or "-"
    in_file: Option<PathBuf>,
}

fn main() {
    reset_sigpipe();
    let cli = Cli::parse();
    let tool = tool_name("furlrepair");

    if let Err(e) = log::init_logging(cli.verbose) {
        eprintln!("{}: logging disabled: {}", tool, e);
    }

    let defaults: &[&str] = if cli.no_default_bad_urls {
        &[]
    } else {
        DEFAULT_BAD_URLS
    };
    let repairer = Repairer::with_bad_urls(
        defaults
            .iter()
            .map(|u| u.as_bytes())
            .chain(cli.bad_urls.iter().map(|u| u.as_bytes())),
    );

    let result = open_input_or_stdin(cli.in_file.as_deref()).and_then(|mut input| {
        let mut out = stdout_sink();
        repair_lines(&mut input, &mut out, &repairer)
    });

    if let Err(e) = result {
        eprintln!("{}: {}", tool, e);
        process::exit(e.exit_code());
    }
}
