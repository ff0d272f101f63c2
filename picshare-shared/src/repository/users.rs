/// User repository
///
/// The operations the auth and profile handlers call: lookups, registration,
/// token rotation, email confirmation, logout, avatar change and picture
/// count refresh. Each call borrows a pool for its duration and touches at
/// most one `users` row.
///
/// Operations keyed by email or ID return [`RepositoryError::UserNotFound`]
/// when no row matches.
///
/// # Example
///
/// ```no_run
/// use picshare_shared::avatar::GravatarProvider;
/// use picshare_shared::models::user::CreateUser;
/// use picshare_shared::repository::users;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let user = users::create_user(
///     &pool,
///     &GravatarProvider::default(),
///     CreateUser {
///         username: "alice".to_string(),
///         email: "alice@example.com".to_string(),
///         password: "$argon2id$...".to_string(),
///     },
/// )
/// .await?;
///
/// users::confirmed_email(&pool, &user.email).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::avatar::AvatarProvider;
use crate::error::{RepositoryError, RepositoryResult};
use crate::models::user::{CreateUser, Role, User};

/// Finds a user by email, None if not registered
pub async fn get_user_by_email(pool: &PgPool, email: &str) -> RepositoryResult<Option<User>> {
    Ok(User::find_by_email(pool, email).await?)
}

/// Finds a user by username, None if not registered
pub async fn get_user_by_username(
    pool: &PgPool,
    username: &str,
) -> RepositoryResult<Option<User>> {
    Ok(User::find_by_username(pool, username).await?)
}

/// Registers a new user
///
/// The first account created in an empty `users` table becomes
/// [`Role::Admin`] and skips the avatar lookup. Every later account is a
/// [`Role::User`] with whatever avatar the provider returns; provider errors
/// are logged and the account is stored without an avatar.
///
/// # Errors
///
/// - [`RepositoryError::Validation`] if the body is malformed
/// - [`RepositoryError::Database`] on duplicate email/username or connection failure
pub async fn create_user(
    pool: &PgPool,
    avatars: &dyn AvatarProvider,
    body: CreateUser,
) -> RepositoryResult<User> {
    body.validate()?;

    let existing = User::count(pool).await?;

    let (role, avatar) = if existing == 0 {
        debug!("Users table is empty, registering first user as admin");
        (Role::Admin, None)
    } else {
        let avatar = match avatars.avatar_url(&body.email) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, "Avatar lookup failed, registering without avatar");
                None
            }
        };
        (Role::User, avatar)
    };

    let user = User::insert(pool, &body, role, avatar.as_deref()).await?;

    info!(
        user_id = user.id,
        role = user.role.as_str(),
        has_avatar = user.avatar.is_some(),
        "User registered"
    );
    Ok(user)
}

/// Sets the user's refresh token, or clears it with `None`
///
/// `user` is updated in place to match the stored row.
pub async fn update_token(
    pool: &PgPool,
    user: &mut User,
    token: Option<&str>,
) -> RepositoryResult<()> {
    if !User::set_refresh_token(pool, user.id, token).await? {
        return Err(RepositoryError::UserNotFound(format!("id {}", user.id)));
    }

    user.refresh_token = token.map(str::to_string);
    debug!(user_id = user.id, cleared = token.is_none(), "Refresh token updated");
    Ok(())
}

/// Marks the user's email address as confirmed
pub async fn confirmed_email(pool: &PgPool, email: &str) -> RepositoryResult<()> {
    if !User::confirm_email(pool, email).await? {
        return Err(not_found(email));
    }

    info!("Email confirmed");
    Ok(())
}

/// Logs the user out: clears the access token and sets `status` to false
pub async fn delete_access_token(pool: &PgPool, email: &str) -> RepositoryResult<()> {
    if !User::revoke_access_token(pool, email).await? {
        return Err(not_found(email));
    }

    debug!("Access token revoked");
    Ok(())
}

/// Sets or clears the avatar URL and returns the updated user
pub async fn update_avatar_url(
    pool: &PgPool,
    email: &str,
    url: Option<&str>,
) -> RepositoryResult<User> {
    let user = User::set_avatar(pool, email, url)
        .await?
        .ok_or_else(|| not_found(email))?;

    debug!(user_id = user.id, "Avatar updated");
    Ok(user)
}

/// Recounts the user's images, stores the count and returns it
///
/// `user` is refreshed from the updated row.
pub async fn get_picture_count(pool: &PgPool, user: &mut User) -> RepositoryResult<i32> {
    let refreshed = User::refresh_picture_count(pool, user.id)
        .await?
        .ok_or_else(|| RepositoryError::UserNotFound(format!("id {}", user.id)))?;

    let count = refreshed.picture_count.unwrap_or(0);
    *user = refreshed;

    debug!(user_id = user.id, picture_count = count, "Picture count refreshed");
    Ok(count)
}

fn not_found(email: &str) -> RepositoryError {
    RepositoryError::UserNotFound(format!("email {}", email))
}
