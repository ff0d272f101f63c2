/// Image model and database operations
///
/// Images belong to a single user. The repository layer only needs them to
/// derive a user's picture count, so the surface here is small.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE images (
///     id SERIAL PRIMARY KEY,
///     url VARCHAR(255) NOT NULL,
///     description TEXT,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Image {
    pub id: i32,

    /// Public URL of the stored picture
    pub url: String,

    pub description: Option<String>,

    /// Owner
    pub user_id: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for uploading a new image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateImage {
    pub url: String,
    pub description: Option<String>,
    pub user_id: i32,
}

impl Image {
    /// Creates a new image owned by `data.user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the owner doesn't exist (foreign key violation)
    /// or the database connection fails.
    pub async fn create(pool: &PgPool, data: CreateImage) -> Result<Self, sqlx::Error> {
        let image = sqlx::query_as::<_, Image>(
            r#"
            INSERT INTO images (url, description, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, url, description, user_id, created_at, updated_at
            "#,
        )
        .bind(data.url)
        .bind(data.description)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        Ok(image)
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let image = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, url, description, user_id, created_at, updated_at
            FROM images
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(image)
    }

    /// Lists a user's images, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: i32) -> Result<Vec<Self>, sqlx::Error> {
        let images = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, url, description, user_id, created_at, updated_at
            FROM images
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(images)
    }

    /// Counts the images owned by a user
    pub async fn count_by_user(pool: &PgPool, user_id: i32) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM images WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Deletes an image, returning false if it didn't exist
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
