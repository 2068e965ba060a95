//! modctl - command-line moderation tool
//!
//! Usage:
//!   modctl rank <ROLE>...                               - Show rank of a role set
//!   modctl check --actor <ROLES> --target <ROLES>       - Can actor moderate target?
//!   modctl --store FILE --as UID ban <TARGET>           - Ban a user
//!   modctl --store FILE --as UID timeout <TARGET> -m N  - Time a user out
//!   modctl --store FILE --as UID unban <TARGET>         - Lift ban and timeout
//!   modctl --store FILE --as UID roles <TARGET> <ROLE>... - Replace roles
//!   modctl --store FILE status <UID>                    - Show moderation state
//!   modctl --store FILE --as UID friend request <UID>   - Friend requests

use clap::{Parser, Subcommand};
use cli::commands::{
    BanCommand, CheckCommand, FriendCommand, RankCommand, RolesCommand, StatusCommand,
    TimeoutCommand, UnbanCommand,
};
use cli::context::Context;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "modctl")]
#[command(about = "Role ranking and moderation actions for chat profiles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Profile store file
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    /// Uid of the acting user
    #[arg(long = "as", value_name = "UID", global = true)]
    acting_as: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective role and rank of a role set
    Rank(RankCommand),
    /// Check whether one role set may moderate another
    Check(CheckCommand),
    /// Ban a user
    Ban(BanCommand),
    /// Lift a user's ban and timeout
    Unban(UnbanCommand),
    /// Time a user out
    Timeout(TimeoutCommand),
    /// Replace a user's roles
    Roles(RolesCommand),
    /// Show a user's moderation state
    Status(StatusCommand),
    /// Manage friend requests
    Friend(FriendCommand),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = Context::resolve(cli.config.as_deref(), cli.store, cli.acting_as.as_deref(), cli.json)?;

    match cli.command {
        Commands::Rank(cmd) => cmd.run(&ctx),
        Commands::Check(cmd) => cmd.run(&ctx),
        Commands::Ban(cmd) => cmd.run(&ctx),
        Commands::Unban(cmd) => cmd.run(&ctx),
        Commands::Timeout(cmd) => cmd.run(&ctx),
        Commands::Roles(cmd) => cmd.run(&ctx),
        Commands::Status(cmd) => cmd.run(&ctx),
        Commands::Friend(cmd) => cmd.run(&ctx),
    }
}
