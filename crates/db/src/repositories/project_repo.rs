//! Repository for the `projects` table.

use std::collections::HashSet;

use chrono::Utc;
use showcase_core::project::{Author, Project, ProjectDraft, ProjectPatch, ProjectStatus};
use showcase_core::types::DbId;
use sqlx::types::Json;
use sqlx::SqliteConnection;

use crate::models::project::{rows_to_projects, ProjectRow};
use crate::Db;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, summary, description, creation_date, project_url, video_url, \
     code_url, professor_name, members, thumbnail, screenshots, tags, status, author_id, \
     author_name, course, shift, semester, class_name, submitted_at, published_at";

/// Provides CRUD and status operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new submission, returning the created project.
    ///
    /// The id is fresh (ids are never reused, even after deletes), the status
    /// is always `InReview`, and `submitted_at` is stamped here. The project
    /// goes to the end of the catalog order. The draft is
    /// expected to be normalized and validated by the caller; the table's
    /// CHECK constraints still reject blank titles and summaries.
    pub async fn create(
        db: &Db,
        draft: &ProjectDraft,
        author: &Author,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (title, summary, description, creation_date, project_url,
                video_url, code_url, professor_name, members, thumbnail, screenshots, tags,
                status, author_id, author_name, course, shift, semester, class_name, submitted_at,
                position)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19, $20,
                (SELECT COALESCE(MAX(position), 0) + 1 FROM projects))
             RETURNING {COLUMNS}"
        );

        let _guard = db.write_lock().await;
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(&draft.title)
            .bind(&draft.summary)
            .bind(&draft.description)
            .bind(&draft.creation_date)
            .bind(&draft.project_url)
            .bind(&draft.video_url)
            .bind(&draft.code_url)
            .bind(&draft.professor_name)
            .bind(Json(&draft.members))
            .bind(&draft.media.thumbnail)
            .bind(Json(&draft.media.screenshots))
            .bind(Json(&draft.tags))
            .bind(ProjectStatus::InReview.as_str())
            .bind(&author.id)
            .bind(&author.name)
            .bind(&draft.course)
            .bind(&draft.shift)
            .bind(&draft.semester)
            .bind(&draft.class_name)
            .bind(Utc::now())
            .fetch_one(db.pool())
            .await?;
        Project::try_from(row)
    }

    /// Find a project by id. Absence is `Ok(None)`.
    pub async fn find_by_id(db: &Db, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let mut conn = db.pool().acquire().await?;
        fetch_by_id(&mut conn, id).await
    }

    /// List every project in catalog order.
    pub async fn list(db: &Db) -> Result<Vec<Project>, sqlx::Error> {
        let mut conn = db.pool().acquire().await?;
        fetch_all(&mut conn).await
    }

    /// Number of projects in the catalog.
    pub async fn count(db: &Db) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects")
            .fetch_one(db.pool())
            .await
    }

    /// Return the ids from `ids` that do not name an existing project, in the
    /// order given.
    pub async fn find_missing(db: &Db, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        let existing: HashSet<DbId> = sqlx::query_scalar::<_, DbId>("SELECT id FROM projects")
            .fetch_all(db.pool())
            .await?
            .into_iter()
            .collect();
        Ok(ids
            .iter()
            .copied()
            .filter(|id| !existing.contains(id))
            .collect())
    }

    /// Set a project's status.
    ///
    /// `published_at` is stamped only when the project enters `Published` for
    /// the first time; it is never cleared or overwritten afterwards. Setting
    /// the current status again changes nothing. Returns `None` if no row
    /// with the given `id` exists.
    pub async fn update_status(
        db: &Db,
        id: DbId,
        status: ProjectStatus,
    ) -> Result<Option<Project>, sqlx::Error> {
        let _guard = db.write_lock().await;
        let mut tx = db.pool().begin().await?;

        let Some(mut project) = fetch_by_id(&mut tx, id).await? else {
            return Ok(None);
        };
        if project.apply_status(status, Utc::now()) {
            tracing::info!(project_id = id, "Project published for the first time");
        }

        sqlx::query("UPDATE projects SET status = $2, published_at = $3 WHERE id = $1")
            .bind(id)
            .bind(project.status.as_str())
            .bind(project.published_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(project))
    }

    /// Shallow-merge `patch` into a project. Only present fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        db: &Db,
        id: DbId,
        patch: &ProjectPatch,
    ) -> Result<Option<Project>, sqlx::Error> {
        let _guard = db.write_lock().await;
        let mut tx = db.pool().begin().await?;

        let Some(mut project) = fetch_by_id(&mut tx, id).await? else {
            return Ok(None);
        };
        project.apply_patch(patch);

        let query = format!(
            "UPDATE projects SET
                title = $2, summary = $3, description = $4, creation_date = $5,
                project_url = $6, video_url = $7, code_url = $8, professor_name = $9,
                members = $10, thumbnail = $11, screenshots = $12, tags = $13,
                course = $14, shift = $15, semester = $16, class_name = $17
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .bind(&project.title)
            .bind(&project.summary)
            .bind(&project.description)
            .bind(&project.creation_date)
            .bind(&project.project_url)
            .bind(&project.video_url)
            .bind(&project.code_url)
            .bind(&project.professor_name)
            .bind(Json(&project.members))
            .bind(&project.media.thumbnail)
            .bind(Json(&project.media.screenshots))
            .bind(Json(&project.tags))
            .bind(&project.course)
            .bind(&project.shift)
            .bind(&project.semester)
            .bind(&project.class_name)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Project::try_from(row).map(Some)
    }

    /// Permanently delete a project, its likes, and its pin.
    /// Returns `true` if a row was removed.
    pub async fn delete(db: &Db, id: DbId) -> Result<bool, sqlx::Error> {
        let _guard = db.write_lock().await;
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Connection-level helpers (usable inside a transaction)
// ---------------------------------------------------------------------------

pub(crate) async fn fetch_by_id(
    conn: &mut SqliteConnection,
    id: DbId,
) -> Result<Option<Project>, sqlx::Error> {
    let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
    let row = sqlx::query_as::<_, ProjectRow>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.map(Project::try_from).transpose()
}

pub(crate) async fn fetch_all(conn: &mut SqliteConnection) -> Result<Vec<Project>, sqlx::Error> {
    let query = format!("SELECT {COLUMNS} FROM projects ORDER BY position ASC");
    let rows = sqlx::query_as::<_, ProjectRow>(&query)
        .fetch_all(&mut *conn)
        .await?;
    rows_to_projects(rows)
}

/// Insert a project keeping its id and timestamps verbatim (snapshot import)
/// at the given catalog `position`.
pub(crate) async fn insert_verbatim(
    conn: &mut SqliteConnection,
    project: &Project,
    position: i64,
) -> Result<(), sqlx::Error> {
    let query = format!(
        "INSERT INTO projects ({COLUMNS}, position) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
         $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)"
    );
    sqlx::query(&query)
        .bind(project.id)
        .bind(&project.title)
        .bind(&project.summary)
        .bind(&project.description)
        .bind(&project.creation_date)
        .bind(&project.project_url)
        .bind(&project.video_url)
        .bind(&project.code_url)
        .bind(&project.professor_name)
        .bind(Json(&project.members))
        .bind(&project.media.thumbnail)
        .bind(Json(&project.media.screenshots))
        .bind(Json(&project.tags))
        .bind(project.status.as_str())
        .bind(&project.author_id)
        .bind(&project.author_name)
        .bind(&project.course)
        .bind(&project.shift)
        .bind(&project.semester)
        .bind(&project.class_name)
        .bind(project.submitted_at)
        .bind(project.published_at)
        .bind(position)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
