use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use smallbank::telemetry::{self, LogFormat};
use smallbank::{run, run_async};

#[derive(Parser)]
#[command(
    name = "smallbank",
    version,
    about = "Replays a SmallBank request log against an in-memory ledger",
    long_about = "Reads a CSV request log (one `operation,arg,...` record per line), \
                  executes every request in its own transaction and writes one \
                  result row per request to stdout."
)]
struct Cli {
    /// Request log to replay
    input: PathBuf,

    /// Read the log on a separate task and process requests as they stream in
    #[arg(long = "async")]
    use_async: bool,

    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, env = "SMALLBANK_LOG_FORMAT", default_value_t = LogFormat::Plain)]
    log_format: LogFormat,
}

fn main() {
    let cli = Cli::parse();
    telemetry::init(cli.log_format);

    if let Err(err) = run_app(cli) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run_app(cli: Cli) -> anyhow::Result<()> {
    if cli.use_async {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(run_async(cli.input, io::stdout()))
    } else {
        run(cli.input, io::stdout().lock())
    }
}
