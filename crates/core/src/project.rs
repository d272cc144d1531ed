//! Project entity, lifecycle status, and submission validation.
//!
//! [`Project`] is the single canonical shape used by every layer. Drafts and
//! patches are validated here before the repository layer writes anything.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum length of a project title, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum length of a project summary, in characters.
pub const MAX_SUMMARY_LEN: usize = 1_000;

/// Maximum number of tags kept on a project.
pub const MAX_TAGS: usize = 20;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Editorial status of a project.
///
/// Any status may move to any other; the only rule attached to transitions
/// is the first-publication stamp (see [`Project::apply_status`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    InReview,
    InProgress,
    Published,
}

impl ProjectStatus {
    /// The literal persisted in storage and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::InReview => "InReview",
            ProjectStatus::InProgress => "InProgress",
            ProjectStatus::Published => "Published",
        }
    }

    /// Whether projects in this status are visible to anonymous visitors.
    pub fn is_public(self) -> bool {
        !matches!(self, ProjectStatus::InReview)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = CoreError;

    /// Accepts the canonical literals plus their snake/kebab/spaced spellings,
    /// case-insensitively (`"in_review"`, `"In Review"`, `"published"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "inreview" => Ok(ProjectStatus::InReview),
            "inprogress" => Ok(ProjectStatus::InProgress),
            "published" => Ok(ProjectStatus::Published),
            _ => Err(CoreError::Validation(format!(
                "Invalid status '{s}'. Must be one of: InReview, InProgress, Published"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// Image references attached to a project. Values are opaque upload handles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMedia {
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub screenshots: Vec<String>,
}

/// A submitted academic project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub summary: String,
    /// Rich text, stored and returned verbatim.
    #[serde(default)]
    pub description: String,
    /// Author-declared creation date; free-form text.
    #[serde(default)]
    pub creation_date: String,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub code_url: Option<String>,
    #[serde(default)]
    pub professor_name: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub media: ProjectMedia,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub shift: String,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub class_name: String,
    pub submitted_at: Timestamp,
    #[serde(default)]
    pub published_at: Option<Timestamp>,
}

impl Project {
    /// Move to `next`, stamping `published_at` on the first entry into
    /// [`ProjectStatus::Published`]. Returns `true` when the stamp was set.
    ///
    /// A stamp, once set, is never cleared or replaced.
    pub fn apply_status(&mut self, next: ProjectStatus, now: Timestamp) -> bool {
        self.status = next;
        if next == ProjectStatus::Published && self.published_at.is_none() {
            self.published_at = Some(now);
            return true;
        }
        false
    }

    /// Shallow-merge the fields present in `patch`.
    ///
    /// An empty string for a link field clears it.
    pub fn apply_patch(&mut self, patch: &ProjectPatch) {
        let patch = patch.clone().cleaned();
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.summary {
            self.summary = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.creation_date {
            self.creation_date = v;
        }
        if let Some(v) = patch.project_url {
            self.project_url = non_empty(v);
        }
        if let Some(v) = patch.video_url {
            self.video_url = non_empty(v);
        }
        if let Some(v) = patch.code_url {
            self.code_url = non_empty(v);
        }
        if let Some(v) = patch.professor_name {
            self.professor_name = v;
        }
        if let Some(v) = patch.members {
            self.members = v;
        }
        if let Some(v) = patch.thumbnail {
            self.media.thumbnail = v;
        }
        if let Some(v) = patch.screenshots {
            self.media.screenshots = v;
        }
        if let Some(v) = patch.tags {
            self.tags = v;
        }
        if let Some(v) = patch.course {
            self.course = v;
        }
        if let Some(v) = patch.shift {
            self.shift = v;
        }
        if let Some(v) = patch.semester {
            self.semester = v;
        }
        if let Some(v) = patch.class_name {
            self.class_name = v;
        }
    }

    /// Whether a viewer may see this project.
    ///
    /// Public statuses are visible to everyone; projects still in review are
    /// visible only to admins and to their own author.
    pub fn is_visible_to(&self, viewer_id: Option<&str>, is_admin: bool) -> bool {
        is_admin
            || self.status.is_public()
            || viewer_id.is_some_and(|id| !id.is_empty() && id == self.author_id)
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// The identity a submission is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub course: Option<String>,
}

/// DTO for submitting a new project. Status and timestamps are never taken
/// from the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectDraft {
    pub title: String,
    pub summary: String,
    pub description: String,
    pub creation_date: String,
    pub project_url: Option<String>,
    pub video_url: Option<String>,
    pub code_url: Option<String>,
    pub professor_name: String,
    pub members: Vec<String>,
    pub media: ProjectMedia,
    pub tags: Vec<String>,
    pub course: String,
    pub shift: String,
    pub semester: String,
    pub class_name: String,
}

impl ProjectDraft {
    /// Trim text fields, drop blank list entries and empty links, and fill
    /// `course` from the author when the draft leaves it blank.
    pub fn normalized(mut self, author: &Author) -> Self {
        self.title = self.title.trim().to_string();
        self.summary = self.summary.trim().to_string();
        self.creation_date = self.creation_date.trim().to_string();
        self.professor_name = self.professor_name.trim().to_string();
        self.project_url = self.project_url.and_then(non_empty);
        self.video_url = self.video_url.and_then(non_empty);
        self.code_url = self.code_url.and_then(non_empty);
        self.members = clean_list(self.members);
        self.tags = clean_tags(self.tags);
        self.media.thumbnail = self.media.thumbnail.trim().to_string();
        self.media.screenshots = clean_list(self.media.screenshots);
        self.course = self.course.trim().to_string();
        if self.course.is_empty() {
            self.course = author.course.clone().unwrap_or_default();
        }
        self.shift = self.shift.trim().to_string();
        self.semester = self.semester.trim().to_string();
        self.class_name = self.class_name.trim().to_string();
        self
    }
}

/// Validate a draft before it is written.
pub fn validate_draft(draft: &ProjectDraft) -> Result<(), CoreError> {
    validate_title(&draft.title)?;
    validate_summary(&draft.summary)?;
    validate_tag_count(draft.tags.len())
}

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// DTO for editing a project. Absent fields are left untouched.
///
/// `id`, `status`, `author_id`, `submitted_at` and `published_at` are not
/// patchable; status moves through its own operation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub creation_date: Option<String>,
    pub project_url: Option<String>,
    pub video_url: Option<String>,
    pub code_url: Option<String>,
    pub professor_name: Option<String>,
    pub members: Option<Vec<String>>,
    pub thumbnail: Option<String>,
    pub screenshots: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub course: Option<String>,
    pub shift: Option<String>,
    pub semester: Option<String>,
    pub class_name: Option<String>,
}

impl ProjectPatch {
    /// Same trimming rules as [`ProjectDraft::normalized`]. Links are trimmed
    /// but kept as `Some("")` so they still clear the stored value.
    pub fn cleaned(mut self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        self.title = trim(self.title);
        self.summary = trim(self.summary);
        self.creation_date = trim(self.creation_date);
        self.project_url = trim(self.project_url);
        self.video_url = trim(self.video_url);
        self.code_url = trim(self.code_url);
        self.professor_name = trim(self.professor_name);
        self.members = self.members.map(clean_list);
        self.thumbnail = trim(self.thumbnail);
        self.screenshots = self.screenshots.map(clean_list);
        self.tags = self.tags.map(clean_tags);
        self.course = trim(self.course);
        self.shift = trim(self.shift);
        self.semester = trim(self.semester);
        self.class_name = trim(self.class_name);
        self
    }
}

/// Validate a patch. Only the fields present are checked.
pub fn validate_patch(patch: &ProjectPatch) -> Result<(), CoreError> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(summary) = &patch.summary {
        validate_summary(summary)?;
    }
    if let Some(tags) = &patch.tags {
        validate_tag_count(tags.len())?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_summary(summary: &str) -> Result<(), CoreError> {
    if summary.trim().is_empty() {
        return Err(CoreError::Validation("Summary must not be empty".into()));
    }
    if summary.chars().count() > MAX_SUMMARY_LEN {
        return Err(CoreError::Validation(format!(
            "Summary must be at most {MAX_SUMMARY_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_tag_count(count: usize) -> Result<(), CoreError> {
    if count > MAX_TAGS {
        return Err(CoreError::Validation(format!(
            "A project may carry at most {MAX_TAGS} tags"
        )));
    }
    Ok(())
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trim entries and drop the blank ones, keeping order.
pub fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// [`clean_list`] plus removal of repeated tags (first occurrence wins).
pub fn clean_tags(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in clean_list(values) {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
