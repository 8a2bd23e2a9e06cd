use std::{
    io::{self, IsTerminal},
    process::ExitCode,
};

use circulation::{
    Library, LibraryConfig, ListingFormat, library::DEFAULT_HISTORY_SIZE, menu::Menu,
    observers::TransactionLogger,
};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the front-desk terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level for diagnostics on stderr (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Number of check-outs and check-ins kept in the circulation history
    #[arg(long, default_value_t = DEFAULT_HISTORY_SIZE)]
    history_size: usize,

    /// Name shown in the welcome banner
    #[arg(long, default_value = "Norco Library")]
    name: String,

    /// Print listings as JSON
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

/// Install the stderr log subscriber
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

/// Run the front desk on stdin and stdout until the user exits
fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let color = !args.no_color && io::stdout().is_terminal();
    colored::control::set_override(color);

    let mut library = Library::with_config(LibraryConfig { history_size: args.history_size });
    library.register_observer(Box::new(TransactionLogger));

    let format = if args.json { ListingFormat::Json } else { ListingFormat::Text };
    let mut menu = Menu::new(library, io::stdin().lock(), io::stdout().lock())
        .with_name(&args.name)
        .with_format(format)
        .with_color(color);

    match menu.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(target: "circulation", error = %e, "Terminal session failed");
            ExitCode::FAILURE
        }
    }
}
