//! Shared query parameter types for API handlers.

use serde::Deserialize;
use showcase_core::error::CoreError;
use showcase_core::project::ProjectStatus;
use showcase_core::search::ProjectFilter;

/// Catalog listing parameters (`?q=&course=&status=&...&page=&page_size=`).
///
/// Page values are clamped in the core layer via `paginate`; `status`
/// accepts any spelling `ProjectStatus::from_str` does.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListParams {
    pub q: Option<String>,
    pub course: Option<String>,
    pub status: Option<String>,
    pub shift: Option<String>,
    pub semester: Option<String>,
    pub professor: Option<String>,
    pub class_name: Option<String>,
    /// Restrict to the caller's own submissions.
    #[serde(default)]
    pub mine: bool,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl ProjectListParams {
    /// Build the search criteria. `author_id` is only ever set from the
    /// verified identity, never from the query string.
    pub fn to_filter(&self, author_id: Option<&str>) -> Result<ProjectFilter, CoreError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<ProjectStatus>()?),
        };

        Ok(ProjectFilter {
            text: self.q.clone(),
            course: self.course.clone(),
            status,
            shift: self.shift.clone(),
            semester: self.semester.clone(),
            professor: self.professor.clone(),
            class_name: self.class_name.clone(),
            author_id: author_id.map(str::to_string),
        })
    }
}

/// Featured listing parameters (`?k=`).
#[derive(Debug, Default, Deserialize)]
pub struct FeaturedParams {
    pub k: Option<i64>,
}
