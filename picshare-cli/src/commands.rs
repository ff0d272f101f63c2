/// Command-line interface definition and handlers
///
/// `migrate` and `db` manage the schema; `user` exposes the repository
/// operations for administration and support work.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use picshare_shared::db::migrations::{
    drop_database, ensure_database_exists, get_migration_status, latest_embedded_version,
    revert_last_migration, revert_migrations, run_migrations,
};
use picshare_shared::db::pool::{close_pool, create_pool};
use picshare_shared::models::user::{CreateUser, User};
use picshare_shared::repository::users;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "picshare-cli", version, about = "PicShare database administration")]
pub struct Cli {
    /// Configuration file (optional; environment variables override it)
    #[arg(long, global = true, default_value = "picshare.toml")]
    pub config: String,

    /// Emit log lines as JSON objects instead of plain text
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply, revert or inspect schema migrations
    #[command(subcommand)]
    Migrate(MigrateCommand),

    /// Create or drop the database itself
    #[command(subcommand)]
    Db(DbCommand),

    /// Inspect and update user accounts
    #[command(subcommand)]
    User(UserCommand),
}

#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Apply all pending migrations
    Up,

    /// Revert migrations (the most recent one unless --target is given)
    Down {
        /// Revert everything newer than this version; 0 reverts all
        #[arg(long)]
        target: Option<i64>,
    },

    /// Show applied migrations
    Status,
}

#[derive(Debug, Subcommand)]
pub enum DbCommand {
    /// Create the database if it doesn't exist
    Create,

    /// Drop the database and all of its data
    Drop {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register a user (the first one becomes admin)
    Create {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        /// Password hash produced by the auth service
        #[arg(long)]
        password_hash: String,
    },

    /// Print a user by email or username
    Show(UserKey),

    /// Mark a user's email as confirmed
    Confirm { email: String },

    /// Revoke a user's access token and mark them logged out
    Logout { email: String },

    /// Set or clear a user's avatar URL
    Avatar {
        email: String,

        /// New avatar URL; omit to clear it
        #[arg(long)]
        url: Option<String>,
    },

    /// Clear a user's refresh token
    RevokeRefresh { email: String },

    /// Recount a user's pictures
    Recount { email: String },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct UserKey {
    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub username: Option<String>,
}

/// Runs the parsed command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(&cli.config)?;

    match cli.command {
        Command::Db(cmd) => db(&config, cmd).await,
        Command::Migrate(cmd) => {
            let pool = create_pool(config.database.clone()).await?;
            let result = migrate(&pool, cmd).await;
            close_pool(pool).await;
            result
        }
        Command::User(cmd) => {
            let pool = create_pool(config.database.clone()).await?;
            let result = user(&pool, &config, cmd).await;
            close_pool(pool).await;
            result
        }
    }
}

async fn db(config: &Config, cmd: DbCommand) -> anyhow::Result<()> {
    match cmd {
        DbCommand::Create => ensure_database_exists(&config.database.url).await?,
        DbCommand::Drop { yes } => {
            if !yes {
                anyhow::bail!("refusing to drop the database without --yes");
            }
            drop_database(&config.database.url).await?;
        }
    }

    Ok(())
}

async fn migrate(pool: &PgPool, cmd: MigrateCommand) -> anyhow::Result<()> {
    match cmd {
        MigrateCommand::Up => run_migrations(pool).await?,
        MigrateCommand::Down { target: Some(target) } => revert_migrations(pool, target).await?,
        MigrateCommand::Down { target: None } => match revert_last_migration(pool).await? {
            Some(version) => info!(version, "Reverted migration"),
            None => warn!("No applied migrations to revert"),
        },
        MigrateCommand::Status => {
            let status = get_migration_status(pool).await?;
            println!("applied:   {}", status.applied_migrations);
            println!(
                "current:   {}",
                status.latest_version.map_or("none".to_string(), |v| v.to_string())
            );
            println!(
                "latest:    {}",
                latest_embedded_version().map_or("none".to_string(), |v| v.to_string())
            );
            println!("up to date: {}", status.is_up_to_date);
        }
    }

    Ok(())
}

async fn user(pool: &PgPool, config: &Config, cmd: UserCommand) -> anyhow::Result<()> {
    match cmd {
        UserCommand::Create {
            username,
            email,
            password_hash,
        } => {
            let avatars = config.avatar.provider();
            let body = CreateUser {
                username,
                email,
                password: password_hash,
            };
            let user = users::create_user(pool, &*avatars, body).await?;
            print_user(&user)?;
        }
        UserCommand::Show(UserKey { email, username }) => {
            let found = match (email, username) {
                (Some(email), _) => users::get_user_by_email(pool, &email).await?,
                (None, Some(username)) => users::get_user_by_username(pool, &username).await?,
                (None, None) => None,
            };
            let user = found.context("no such user")?;
            print_user(&user)?;
        }
        UserCommand::Confirm { email } => users::confirmed_email(pool, &email).await?,
        UserCommand::Logout { email } => users::delete_access_token(pool, &email).await?,
        UserCommand::Avatar { email, url } => {
            let user = users::update_avatar_url(pool, &email, url.as_deref()).await?;
            print_user(&user)?;
        }
        UserCommand::RevokeRefresh { email } => {
            let mut user = find_by_email(pool, &email).await?;
            users::update_token(pool, &mut user, None).await?;
        }
        UserCommand::Recount { email } => {
            let mut user = find_by_email(pool, &email).await?;
            let count = users::get_picture_count(pool, &mut user).await?;
            println!("{count}");
        }
    }

    Ok(())
}

async fn find_by_email(pool: &PgPool, email: &str) -> anyhow::Result<User> {
    users::get_user_by_email(pool, email)
        .await?
        .with_context(|| format!("no user with email {email}"))
}

fn print_user(user: &User) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(user)?);
    Ok(())
}
