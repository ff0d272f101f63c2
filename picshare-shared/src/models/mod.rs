/// Database models for PicShare
///
/// Row types and the single-statement queries that read and write them.
///
/// # Models
///
/// - `user`: User accounts, roles, tokens
/// - `image`: Uploaded pictures, owned by a user
///
/// # Example
///
/// ```no_run
/// use picshare_shared::models::user::User;
/// use picshare_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::find_by_email(&pool, "user@example.com").await?;
/// # Ok(())
/// # }
/// ```

pub mod image;
pub mod user;
