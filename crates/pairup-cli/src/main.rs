use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

use commands::{
    CommunityAction, Context, NotificationAction, ProgressAction, SessionAction, UserAction,
};

#[derive(Parser)]
#[command(name = "pairup")]
#[command(about = "PairUp - pair-programming sessions for Driver, Navigator and Profesor", long_about = None)]
pub struct Cli {
    /// Act as this user id instead of the one remembered in the config
    #[arg(long = "as", global = true, value_name = "UID")]
    pub acting_uid: Option<String>,

    /// Path to pairup.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use a throwaway in-memory store
    #[arg(long, global = true)]
    pub memory: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register and edit your profile
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Create, join and work inside sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Testimonials, members and partner search
    Community {
        #[command(subcommand)]
        action: CommunityAction,
    },
    /// Your notification inbox
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },
    /// Sessions completed and level reached
    Progress {
        #[command(subcommand)]
        action: ProgressAction,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let ctx = match Context::load(&cli) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("error: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::User { action } => commands::user::run(&ctx, action).await,
        Commands::Session { action } => commands::session::run(&ctx, action).await,
        Commands::Community { action } => commands::community::run(&ctx, action).await,
        Commands::Notifications { action } => commands::notifications::run(&ctx, action).await,
        Commands::Progress { action } => commands::progress::run(&ctx, action).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            commands::report(&err);
            ExitCode::FAILURE
        }
    }
}
