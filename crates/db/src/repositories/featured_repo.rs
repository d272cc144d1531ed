//! Repository for manual featured pins.

use std::collections::HashSet;

use showcase_core::types::DbId;
use sqlx::SqliteConnection;

use crate::models::featured::FeaturedInputs;
use crate::repositories::{like_repo, project_repo};
use crate::Db;

/// Provides access to the pin list and to featured selection inputs.
pub struct FeaturedRepo;

impl FeaturedRepo {
    /// Pinned project ids in display order.
    pub async fn list_pins(db: &Db) -> Result<Vec<DbId>, sqlx::Error> {
        let mut conn = db.pool().acquire().await?;
        fetch_pins(&mut conn).await
    }

    /// Replace the whole pin list.
    ///
    /// Duplicates keep their first position. Ids that do not name an existing
    /// project are skipped; the stored list is returned.
    pub async fn replace_pins(db: &Db, pins: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        let _guard = db.write_lock().await;
        let mut tx = db.pool().begin().await?;
        write_pins(&mut tx, pins).await?;
        let stored = fetch_pins(&mut tx).await?;
        tx.commit().await?;
        Ok(stored)
    }

    /// Read projects, like counts, and pins in one read transaction.
    pub async fn load_inputs(db: &Db) -> Result<FeaturedInputs, sqlx::Error> {
        let mut tx = db.pool().begin().await?;
        let projects = project_repo::fetch_all(&mut tx).await?;
        let like_counts = like_repo::fetch_counts(&mut tx).await?;
        let pins = fetch_pins(&mut tx).await?;
        tx.commit().await?;

        Ok(FeaturedInputs {
            projects,
            like_counts,
            pins,
        })
    }
}

// ---------------------------------------------------------------------------
// Connection-level helpers (usable inside a transaction)
// ---------------------------------------------------------------------------

pub(crate) async fn fetch_pins(conn: &mut SqliteConnection) -> Result<Vec<DbId>, sqlx::Error> {
    sqlx::query_scalar::<_, DbId>("SELECT project_id FROM featured_pins ORDER BY position ASC")
        .fetch_all(&mut *conn)
        .await
}

/// Clear the pin table and insert `pins` in order, skipping duplicates and
/// ids with no matching project.
pub(crate) async fn write_pins(
    conn: &mut SqliteConnection,
    pins: &[DbId],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM featured_pins")
        .execute(&mut *conn)
        .await?;

    let mut seen = HashSet::new();
    let mut position: i64 = 0;
    for &id in pins {
        if !seen.insert(id) {
            continue;
        }
        let inserted = sqlx::query(
            "INSERT INTO featured_pins (project_id, position)
             SELECT $1, $2 WHERE EXISTS (SELECT 1 FROM projects WHERE id = $1)",
        )
        .bind(id)
        .bind(position)
        .execute(&mut *conn)
        .await?
        .rows_affected();
        if inserted > 0 {
            position += 1;
        }
    }
    Ok(())
}
