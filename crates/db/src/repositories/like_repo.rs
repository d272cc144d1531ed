//! Repository for the like ledger (`project_likes` + `project_like_counts`).
//!
//! Membership and counters are always written in the same transaction, so
//! a project's count equals the number of users currently liking it.

use std::collections::HashMap;

use chrono::Utc;
use showcase_core::types::DbId;
use sqlx::SqliteConnection;

use crate::models::like::LikeToggle;
use crate::Db;

/// Provides toggle and read access to likes.
pub struct LikeRepo;

impl LikeRepo {
    /// Flip `user_key`'s like on a project.
    ///
    /// Returns the new membership state and the project's resulting count,
    /// or `None` if the project does not exist. Toggling twice restores the
    /// original state.
    pub async fn toggle(
        db: &Db,
        project_id: DbId,
        user_key: &str,
    ) -> Result<Option<LikeToggle>, sqlx::Error> {
        let _guard = db.write_lock().await;
        let mut tx = db.pool().begin().await?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE id = $1")
            .bind(project_id)
            .fetch_one(&mut *tx)
            .await?;
        if exists == 0 {
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM project_likes WHERE project_id = $1 AND user_key = $2")
            .bind(project_id)
            .bind(user_key)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let (liked, delta) = if removed > 0 {
            (false, -1_i64)
        } else {
            sqlx::query(
                "INSERT INTO project_likes (project_id, user_key, created_at) VALUES ($1, $2, $3)",
            )
            .bind(project_id)
            .bind(user_key)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
            (true, 1_i64)
        };

        let count = sqlx::query_scalar::<_, i64>(
            "INSERT INTO project_like_counts (project_id, count) VALUES ($1, MAX($2, 0))
             ON CONFLICT (project_id) DO UPDATE SET count = MAX(count + $2, 0)
             RETURNING count",
        )
        .bind(project_id)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(LikeToggle { liked, count }))
    }

    /// Current like count for a project; zero when nobody has liked it.
    pub async fn count_for(db: &Db, project_id: DbId) -> Result<i64, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT count FROM project_like_counts WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_optional(db.pool())
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Whether `user_key` currently likes the project.
    pub async fn has_liked(db: &Db, project_id: DbId, user_key: &str) -> Result<bool, sqlx::Error> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS (SELECT 1 FROM project_likes WHERE project_id = $1 AND user_key = $2)",
        )
        .bind(project_id)
        .bind(user_key)
        .fetch_one(db.pool())
        .await?;
        Ok(found != 0)
    }

    /// All non-zero like counts keyed by project id.
    pub async fn counts(db: &Db) -> Result<HashMap<DbId, i64>, sqlx::Error> {
        let mut conn = db.pool().acquire().await?;
        fetch_counts(&mut conn).await
    }

    /// Ids of the projects `user_key` currently likes, in project id order.
    pub async fn liked_by_user(db: &Db, user_key: &str) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT project_id FROM project_likes WHERE user_key = $1 ORDER BY project_id ASC",
        )
        .bind(user_key)
        .fetch_all(db.pool())
        .await
    }
}

// ---------------------------------------------------------------------------
// Connection-level helpers (usable inside a transaction)
// ---------------------------------------------------------------------------

pub(crate) async fn fetch_counts(
    conn: &mut SqliteConnection,
) -> Result<HashMap<DbId, i64>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (DbId, i64)>(
        "SELECT project_id, count FROM project_like_counts WHERE count > 0",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().collect())
}

/// Every `(user_key, project_id)` membership row, ordered by user then project.
pub(crate) async fn fetch_memberships(
    conn: &mut SqliteConnection,
) -> Result<Vec<(String, DbId)>, sqlx::Error> {
    sqlx::query_as::<_, (String, DbId)>(
        "SELECT user_key, project_id FROM project_likes ORDER BY user_key ASC, project_id ASC",
    )
    .fetch_all(&mut *conn)
    .await
}
