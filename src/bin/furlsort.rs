use std::path::PathBuf;
use std::process;

use clap::Parser;

use shorturl_rs::common::{log, reset_sigpipe, tool_name};
use shorturl_rs::sort::{DEFAULT_WINDOW, SortConfig, parse_window, sort_file};

#[derive(Parser)]
#[command(
    name = "furlsort",
    version,
    about = "Sort a short-code URL file whose records are only slightly out of order"
)]
struct Cli {
    /// Maximum distance (in records) between any two records that need reordering
    #[arg(
        short = 'w',
        long = "window",
        value_name = "N",
        env = "FURL_WINDOW",
        default_value_t = DEFAULT_WINDOW,
        value_parser = parse_window
    )]
    window: usize,

    /// Change the number of sort threads to N
    #[arg(long = "parallel", value_name = "N")]
    parallel: Option<usize>,

    /// Log progress to stderr (-v summary, -vv every loop)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// File to sort
    in_file: PathBuf,

    /// Where to write the sorted records; must not exist yet
    out_file: PathBuf,
}

fn main() {
    reset_sigpipe();
    let cli = Cli::parse();
    let tool = tool_name("furlsort");

    if let Err(e) = log::init_logging(cli.verbose) {
        eprintln!("{}: logging disabled: {}", tool, e);
    }

    let config = SortConfig {
        parallel: cli.parallel,
        ..SortConfig::with_window(cli.window)
    };

    if let Err(e) = sort_file(&cli.in_file, &cli.out_file, &config) {
        eprintln!("{}: {}", tool, e);
        process::exit(e.exit_code());
    }
}
