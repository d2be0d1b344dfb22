//! parley CLI - conversation-session lifecycle manager.

use clap::{Parser, Subcommand};
use parley::cli;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

/// Get the version string.
///
/// - Release builds (on a git tag): "0.1.0"
/// - Development builds: "0.1.0-dev (abc1234)"
/// - Dirty working directory: "0.1.0-dev (abc1234-dirty)"
fn version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("PARLEY_GIT_HASH");
    const IS_RELEASE: &str = env!("PARLEY_IS_RELEASE");

    // Use a static to avoid repeated allocations
    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" {
            VERSION.to_string()
        } else {
            format!("{VERSION}-dev ({GIT_HASH})")
        }
    })
}

#[derive(Parser)]
#[command(name = "parley")]
#[command(author, version = version(), about = "Conversation-session lifecycle manager", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message in the current conversation.
    Send {
        /// The message text.
        text: String,
    },

    /// Archive the current conversation and start a fresh one.
    New,

    /// List archived conversations.
    List {
        /// Maximum number of conversations to show. Defaults to 20.
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print a conversation transcript.
    Show {
        /// Session ID.
        session_id: String,
    },

    /// Make an archived conversation current again.
    Switch {
        /// Session ID.
        session_id: String,
    },

    /// Remove a conversation from history.
    Delete {
        /// Session ID.
        session_id: String,
    },
}

fn main() -> ExitCode {
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Send { text } => cli::send::run(&text),
        Commands::New => cli::new::run(),
        Commands::List { limit } => cli::list::run(limit),
        Commands::Show { session_id } => cli::show::run(&session_id),
        Commands::Switch { session_id } => cli::switch::run(&session_id),
        Commands::Delete { session_id } => cli::delete::run(&session_id),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("parley: error: {e}");
            ExitCode::FAILURE
        }
    }
}
