//! Storage encoding of a project row.

use showcase_core::project::{Project, ProjectMedia, ProjectStatus};
use showcase_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub title: String,
    pub summary: String,
    pub description: String,
    pub creation_date: String,
    pub project_url: Option<String>,
    pub video_url: Option<String>,
    pub code_url: Option<String>,
    pub professor_name: String,
    pub members: Json<Vec<String>>,
    pub thumbnail: String,
    pub screenshots: Json<Vec<String>>,
    pub tags: Json<Vec<String>>,
    pub status: String,
    pub author_id: String,
    pub author_name: String,
    pub course: String,
    pub shift: String,
    pub semester: String,
    pub class_name: String,
    pub submitted_at: Timestamp,
    pub published_at: Option<Timestamp>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = sqlx::Error;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ProjectStatus>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Project {
            id: row.id,
            title: row.title,
            summary: row.summary,
            description: row.description,
            creation_date: row.creation_date,
            project_url: row.project_url,
            video_url: row.video_url,
            code_url: row.code_url,
            professor_name: row.professor_name,
            members: row.members.0,
            media: ProjectMedia {
                thumbnail: row.thumbnail,
                screenshots: row.screenshots.0,
            },
            tags: row.tags.0,
            status,
            author_id: row.author_id,
            author_name: row.author_name,
            course: row.course,
            shift: row.shift,
            semester: row.semester,
            class_name: row.class_name,
            submitted_at: row.submitted_at,
            published_at: row.published_at,
        })
    }
}

/// Convert a batch of rows, failing on the first undecodable one.
pub fn rows_to_projects(rows: Vec<ProjectRow>) -> Result<Vec<Project>, sqlx::Error> {
    rows.into_iter().map(Project::try_from).collect()
}
