//! Whole-catalog export and import.

use std::collections::BTreeMap;

use chrono::Utc;
use showcase_core::snapshot::{CatalogSnapshot, LikesSnapshot, SNAPSHOT_VERSION};
use showcase_core::types::DbId;

use crate::repositories::{featured_repo, like_repo, project_repo};
use crate::Db;

/// Moves the catalog in and out of [`CatalogSnapshot`] form.
pub struct SnapshotRepo;

impl SnapshotRepo {
    /// Capture projects, both ledger maps, and pins from one read transaction.
    pub async fn export(db: &Db) -> Result<CatalogSnapshot, sqlx::Error> {
        let mut tx = db.pool().begin().await?;
        let projects = project_repo::fetch_all(&mut tx).await?;
        let counts = like_repo::fetch_counts(&mut tx).await?;
        let memberships = like_repo::fetch_memberships(&mut tx).await?;
        let featured_pins = featured_repo::fetch_pins(&mut tx).await?;
        tx.commit().await?;

        let mut user_likes: BTreeMap<String, Vec<DbId>> = BTreeMap::new();
        for (user_key, project_id) in memberships {
            user_likes.entry(user_key).or_default().push(project_id);
        }

        Ok(CatalogSnapshot {
            version: SNAPSHOT_VERSION,
            exported_at: Some(Utc::now()),
            projects,
            likes: LikesSnapshot {
                counts: counts.into_iter().collect(),
                user_likes,
            },
            featured_pins,
        })
    }

    /// Replace the entire catalog with `snapshot`.
    ///
    /// Project ids are kept as given. Like counts are rebuilt from the
    /// membership map so the ledger stays consistent whatever `counts` says.
    /// Either everything is imported or nothing changes.
    pub async fn import(db: &Db, snapshot: &CatalogSnapshot) -> Result<(), sqlx::Error> {
        let _guard = db.write_lock().await;
        let mut tx = db.pool().begin().await?;

        // Children first, though the cascade would handle it.
        for table in [
            "featured_pins",
            "project_like_counts",
            "project_likes",
            "projects",
        ] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }

        for (position, project) in (1..).zip(&snapshot.projects) {
            project_repo::insert_verbatim(&mut tx, project, position).await?;
        }

        let now = Utc::now();
        for (user_key, ids) in &snapshot.likes.user_likes {
            for id in ids {
                sqlx::query(
                    "INSERT OR IGNORE INTO project_likes (project_id, user_key, created_at)
                     SELECT $1, $2, $3 WHERE EXISTS (SELECT 1 FROM projects WHERE id = $1)",
                )
                .bind(id)
                .bind(user_key)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }
        }

        sqlx::query(
            "INSERT INTO project_like_counts (project_id, count)
             SELECT project_id, COUNT(*) FROM project_likes GROUP BY project_id",
        )
        .execute(&mut *tx)
        .await?;

        featured_repo::write_pins(&mut tx, &snapshot.featured_pins).await?;

        tx.commit().await?;
        tracing::info!(
            projects = snapshot.projects.len(),
            users = snapshot.likes.user_likes.len(),
            pins = snapshot.featured_pins.len(),
            "Catalog snapshot imported"
        );
        Ok(())
    }
}
