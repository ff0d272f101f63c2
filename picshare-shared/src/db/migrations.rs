/// Database migration runner
///
/// This module applies and reverts the schema migrations embedded from the
/// crate's `migrations/` directory using sqlx's migration system.
///
/// # Migration Files
///
/// Every migration is reversible and consists of two files:
/// - `{timestamp}_{name}.up.sql` - The "up" migration
/// - `{timestamp}_{name}.down.sql` - The "down" migration (rollback)
///
/// Current migrations:
///
/// | version          | name                 |
/// |------------------|----------------------|
/// | `20240101000000` | `initial_schema`     |
/// | `20240223173254` | `image_tag_comment`  |
/// | `20240224101509` | `user_picture_count` |
///
/// # Example
///
/// ```no_run
/// use picshare_shared::db::pool::{create_pool, DatabaseConfig};
/// use picshare_shared::db::migrations::{run_migrations, get_migration_status};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///
///     // Run all pending migrations
///     run_migrations(&pool).await?;
///
///     // Check status
///     let status = get_migration_status(&pool).await?;
///     println!("Applied {} migrations", status.applied_migrations);
///
///     Ok(())
/// }
/// ```

use sqlx::{
    migrate::{MigrateDatabase, MigrateError, Migrator},
    postgres::PgPool,
    Postgres,
};
use tracing::{debug, info, warn};

/// Migrations embedded at compile time from `migrations/`
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Number of migrations that have been applied
    pub applied_migrations: usize,

    /// Latest applied migration version (timestamp)
    pub latest_version: Option<i64>,

    /// Whether the latest applied version matches the newest embedded migration
    pub is_up_to_date: bool,
}

/// Returns the version of the newest embedded migration
pub fn latest_embedded_version() -> Option<i64> {
    MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| m.version)
        .max()
}

/// Runs all pending database migrations
///
/// Creates the `_sqlx_migrations` bookkeeping table when needed and applies
/// every embedded migration that has not been applied yet. Each migration
/// runs in its own transaction.
///
/// # Errors
///
/// Returns an error if:
/// - A migration fails to execute
/// - A previously applied migration was modified (checksum mismatch)
/// - Database connection is lost during migration
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    info!("Starting database migrations");

    match MIGRATOR.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Reverts every applied migration newer than `target_version`
///
/// Down migrations run newest first. Pass `0` to revert everything.
///
/// # Example
///
/// ```no_run
/// use picshare_shared::db::migrations::revert_migrations;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
/// // Back to the base schema, without `comment_id` and `picture_count`
/// revert_migrations(&pool, 20240101000000).await?;
/// # Ok(())
/// # }
/// ```
pub async fn revert_migrations(pool: &PgPool, target_version: i64) -> Result<(), MigrateError> {
    info!(target_version, "Reverting database migrations");

    match MIGRATOR.undo(pool, target_version).await {
        Ok(()) => {
            info!(target_version, "Database migrations reverted");
            Ok(())
        }
        Err(e) => {
            warn!("Migration revert failed: {}", e);
            Err(e)
        }
    }
}

/// Reverts only the most recently applied migration
///
/// Returns the reverted version, or `None` if nothing was applied.
pub async fn revert_last_migration(pool: &PgPool) -> Result<Option<i64>, MigrateError> {
    let versions = applied_versions(pool).await?;

    let Some(&latest) = versions.first() else {
        debug!("No applied migrations to revert");
        return Ok(None);
    };
    let target = versions.get(1).copied().unwrap_or(0);

    revert_migrations(pool, target).await?;
    Ok(Some(latest))
}

/// Gets the current migration status
///
/// # Errors
///
/// Returns an error if:
/// - Cannot query the migrations table
/// - Database connection fails
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    debug!("Checking migration status");

    if !migrations_table_exists(pool).await? {
        debug!("Migrations table does not exist yet");
        return Ok(MigrationStatus {
            applied_migrations: 0,
            latest_version: None,
            is_up_to_date: false,
        });
    }

    let (count, latest_version): (i64, Option<i64>) = sqlx::query_as(
        "SELECT
            COUNT(*) as count,
            MAX(version) as latest_version
         FROM _sqlx_migrations
         WHERE success = true",
    )
    .fetch_one(pool)
    .await?;

    debug!(
        applied_migrations = count,
        latest_version = ?latest_version,
        "Migration status retrieved"
    );

    Ok(MigrationStatus {
        applied_migrations: count as usize,
        latest_version,
        is_up_to_date: latest_version.is_some() && latest_version == latest_embedded_version(),
    })
}

/// Creates the database if it doesn't exist
///
/// Useful for development and testing. In production, the database
/// should already exist.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    info!("Checking if database exists");

    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
        info!("Database created successfully");
    } else {
        debug!("Database already exists");
    }

    Ok(())
}

/// Drops the database (USE WITH CAUTION!)
///
/// Deletes the entire database and all its data. Development and test
/// environments only.
pub async fn drop_database(database_url: &str) -> Result<(), sqlx::Error> {
    warn!("Dropping database");

    if Postgres::database_exists(database_url).await? {
        Postgres::drop_database(database_url).await?;
        info!("Database dropped successfully");
    } else {
        debug!("Database does not exist, nothing to drop");
    }

    Ok(())
}

async fn migrations_table_exists(pool: &PgPool) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await
}

/// Applied versions, newest first
async fn applied_versions(pool: &PgPool) -> Result<Vec<i64>, sqlx::Error> {
    if !migrations_table_exists(pool).await? {
        return Ok(Vec::new());
    }

    sqlx::query_scalar(
        "SELECT version FROM _sqlx_migrations WHERE success = true ORDER BY version DESC",
    )
    .fetch_all(pool)
    .await
}
