/// User model and database operations
///
/// Single-statement queries over the `users` table. Business rules (first
/// user becomes admin, avatar assignment, not-found handling) live in
/// [`crate::repository::users`].
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'moderator', 'user');
///
/// CREATE TABLE users (
///     id SERIAL PRIMARY KEY,
///     username VARCHAR(50) NOT NULL UNIQUE,
///     email VARCHAR(150) NOT NULL UNIQUE,
///     password VARCHAR(255) NOT NULL,
///     avatar VARCHAR(255),
///     refresh_token VARCHAR(255),
///     access_token VARCHAR(255),
///     role user_role NOT NULL DEFAULT 'user',
///     confirmed BOOLEAN NOT NULL DEFAULT FALSE,
///     status BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     picture_count INTEGER
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

/// Access roles for user accounts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full control; granted to the first registered account
    Admin,

    /// Can moderate other users' images and comments
    Moderator,

    /// Regular account
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Admins and moderators may edit or remove content they don't own
    pub fn can_moderate(&self) -> bool {
        matches!(self, Role::Admin | Role::Moderator)
    }
}

/// User account row
///
/// Credentials and tokens are never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,

    pub username: String,

    /// Unique email address, the lookup key for most operations
    pub email: String,

    /// Password hash, produced by the auth layer
    #[serde(skip_serializing)]
    pub password: String,

    /// Avatar URL, None if no avatar could be assigned
    pub avatar: Option<String>,

    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,

    #[serde(skip_serializing)]
    pub access_token: Option<String>,

    pub role: Role,

    /// Whether the email address has been confirmed
    pub confirmed: bool,

    /// False once the user has logged out or been deactivated
    pub status: bool,

    /// Cached number of images owned by the user, None until first counted
    pub picture_count: Option<i32>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Registration body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 50))]
    pub username: String,

    #[validate(email)]
    #[validate(length(max = 150))]
    pub email: String,

    /// Already-hashed password
    #[validate(length(min = 6, max = 255))]
    pub password: String,
}

impl User {
    /// Inserts a new user with an explicit role and avatar
    ///
    /// # Errors
    ///
    /// Returns an error if the email or username already exists (unique
    /// constraint violation) or the database connection fails.
    pub async fn insert(
        pool: &PgPool,
        data: &CreateUser,
        role: Role,
        avatar: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password, avatar, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, password, avatar, refresh_token, access_token,
                      role, confirmed, status, picture_count, created_at, updated_at
            "#,
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password)
        .bind(avatar)
        .bind(role)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, avatar, refresh_token, access_token,
                   role, confirmed, status, picture_count, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by exact email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, avatar, refresh_token, access_token,
                   role, confirmed, status, picture_count, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by exact username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, avatar, refresh_token, access_token,
                   role, confirmed, status, picture_count, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Counts total number of users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Sets or clears the refresh token
    ///
    /// Returns false if no user has this ID.
    pub async fn set_refresh_token(
        pool: &PgPool,
        id: i32,
        token: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET refresh_token = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stores the access token issued at login and marks the user active
    pub async fn set_access_token(
        pool: &PgPool,
        email: &str,
        token: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET access_token = $2, status = TRUE, updated_at = NOW()
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(token)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clears the access token and marks the user inactive
    pub async fn revoke_access_token(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET access_token = NULL, status = FALSE, updated_at = NOW()
            WHERE email = $1
            "#,
        )
        .bind(email)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks the email address as confirmed
    pub async fn confirm_email(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET confirmed = TRUE, updated_at = NOW()
            WHERE email = $1
            "#,
        )
        .bind(email)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Sets or clears the avatar URL, returning the updated row
    pub async fn set_avatar(
        pool: &PgPool,
        email: &str,
        url: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET avatar = $2, updated_at = NOW()
            WHERE email = $1
            RETURNING id, username, email, password, avatar, refresh_token, access_token,
                      role, confirmed, status, picture_count, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(url)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Recounts the user's images and caches the result in `picture_count`
    ///
    /// Count and update happen in one statement so the stored value always
    /// matches the `images` table at the time of the call.
    pub async fn refresh_picture_count(
        pool: &PgPool,
        id: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET picture_count = (SELECT COUNT(*)::INTEGER FROM images WHERE user_id = $1),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, password, avatar, refresh_token, access_token,
                      role, confirmed, status, picture_count, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "$argon2id$hash".to_string(),
            avatar: None,
            refresh_token: Some("refresh".to_string()),
            access_token: Some("access".to_string()),
            role: Role::Admin,
            confirmed: false,
            status: true,
            picture_count: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_default_is_user() {
        assert_eq!(Role::default(), Role::User);
        assert_eq!(Role::default().as_str(), "user");
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.is_admin());
        assert!(Role::Admin.can_moderate());
        assert!(!Role::Moderator.is_admin());
        assert!(Role::Moderator.can_moderate());
        assert!(!Role::User.can_moderate());
    }

    #[test]
    fn test_user_serialization_hides_credentials() {
        let json = serde_json::to_value(sample_user()).unwrap();

        assert_eq!(json["email"], "alice@example.com");
        assert_eq!(json["role"], "admin");
        assert!(json.get("password").is_none());
        assert!(json.get("refresh_token").is_none());
        assert!(json.get("access_token").is_none());
    }

    #[test]
    fn test_create_user_validation() {
        let valid = CreateUser {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret-hash".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = CreateUser {
            email: "not-an-email".to_string(),
            ..valid.clone()
        };
        let errors = bad_email.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));

        let short_name = CreateUser {
            username: "al".to_string(),
            ..valid
        };
        let errors = short_name.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }
}
