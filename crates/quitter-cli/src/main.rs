use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "quitter", version, about = "Quitter streak tracker CLI")]
struct Cli {
    /// User whose streak to operate on (defaults to `user.id` from config)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current streak, metrics and badge
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reconcile the streak with today and print the record
    Check,
    /// Record a relapse and restart the streak
    Reset {
        /// Confirm the relapse
        #[arg(long)]
        yes: bool,
    },
    /// Push the current record to the remote store
    Sync,
    /// Print the live elapsed timer
    Watch {
        /// Number of ticks to print
        #[arg(long, default_value = "10")]
        seconds: u32,
    },
    /// Achievement badges
    Badges {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("QUITTER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let user = cli.user.as_deref();
    let result = match cli.command {
        Commands::Status { json } => commands::streak::status(user, json),
        Commands::Check => commands::streak::check(user),
        Commands::Reset { yes } => commands::streak::reset(user, yes),
        Commands::Sync => commands::streak::sync(user),
        Commands::Watch { seconds } => commands::streak::watch(user, seconds),
        Commands::Badges { json } => commands::badges::run(user, json),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
