//! Stockroom CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run admin database migrations
//! stockroom-cli migrate
//!
//! # Create admin user (password read from STOCKROOM_ADMIN_PASSWORD)
//! stockroom-cli admin create -u priya -n "Priya Raman" -r super_admin -b Main
//!
//! # Seed branches, categories and suppliers
//! stockroom-cli seed --actor priya
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create admin users
//! - `seed` - Seed reference data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "stockroom-cli")]
#[command(author, version, about = "Stockroom CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed branches, categories and suppliers
    Seed {
        /// Username recorded as the creator of seeded records
        #[arg(short, long)]
        actor: String,

        /// YAML file to load instead of the bundled defaults
        #[arg(short, long)]
        file: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin role (`super_admin`, `admin`, `viewer`)
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// Branch the admin belongs to (created if missing)
        #[arg(short, long, default_value = "Main")]
        branch: String,

        /// Environment variable holding the password
        #[arg(long, default_value = "STOCKROOM_ADMIN_PASSWORD")]
        password_env: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                name,
                role,
                branch,
                password_env,
            } => {
                commands::admin::create_user(&commands::admin::CreateAdmin {
                    username: &username,
                    name: &name,
                    role: &role,
                    branch: &branch,
                    password_env: &password_env,
                })
                .await?;
            }
        },
        Commands::Seed { actor, file } => {
            commands::seed::run(&actor, file.as_deref()).await?;
        }
    }
    Ok(())
}
