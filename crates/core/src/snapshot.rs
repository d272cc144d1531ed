//! Portable JSON snapshot of the whole catalog.
//!
//! A snapshot carries the project collection, both halves of the like ledger,
//! and the manual pin list. Exports are written in canonical form; imports go
//! through [`parse_snapshot`], which also accepts older documents (camelCase
//! keys, image aliases, bare project arrays, string ids) and normalizes every
//! record exactly once via [`normalize_record`].

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::project::{clean_list, clean_tags, Project, ProjectMedia, ProjectStatus};
use crate::types::{DbId, Timestamp};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Characters of description used when a record has no summary.
pub const SUMMARY_FALLBACK_CHARS: usize = 160;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshot could not be read: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot has an unexpected shape: {0}")]
    Shape(String),
}

// ---------------------------------------------------------------------------
// Canonical document
// ---------------------------------------------------------------------------

/// Both ledger maps. `counts` is derived from `user_likes` on import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikesSnapshot {
    #[serde(default)]
    pub counts: BTreeMap<DbId, i64>,
    #[serde(default)]
    pub user_likes: BTreeMap<String, Vec<DbId>>,
}

impl LikesSnapshot {
    /// Count map implied by the membership map.
    pub fn derived_counts(&self) -> BTreeMap<DbId, i64> {
        let mut counts: BTreeMap<DbId, i64> = BTreeMap::new();
        for ids in self.user_likes.values() {
            for id in ids {
                *counts.entry(*id).or_insert(0) += 1;
            }
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub version: u32,
    pub exported_at: Option<Timestamp>,
    pub projects: Vec<Project>,
    pub likes: LikesSnapshot,
    pub featured_pins: Vec<DbId>,
}

/// Result of parsing a snapshot: the normalized document plus a note for
/// every record or like that had to be dropped or repaired.
#[derive(Debug, Clone)]
pub struct SnapshotLoad {
    pub snapshot: CatalogSnapshot,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Loose input shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LooseId {
    Number(i64),
    Text(String),
}

impl LooseId {
    fn as_id(&self) -> Option<DbId> {
        match self {
            LooseId::Number(n) if *n > 0 => Some(*n),
            LooseId::Number(_) => None,
            LooseId::Text(s) => s.trim().parse::<DbId>().ok().filter(|n| *n > 0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LooseList {
    Items(Vec<String>),
    Joined(String),
}

impl LooseList {
    fn into_vec(self) -> Vec<String> {
        match self {
            LooseList::Items(items) => items,
            LooseList::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LooseTime {
    Rfc3339(Timestamp),
    EpochMillis(i64),
    Other(Value),
}

impl LooseTime {
    fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            LooseTime::Rfc3339(ts) => Some(*ts),
            LooseTime::EpochMillis(ms) => chrono::DateTime::from_timestamp_millis(*ms),
            LooseTime::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawMedia {
    thumbnail: Option<String>,
    screenshots: Option<LooseList>,
}

/// A project record as it may appear in any snapshot generation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawRecord {
    id: Option<LooseId>,
    title: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    #[serde(alias = "creationDate")]
    creation_date: Option<String>,
    #[serde(alias = "projectUrl", alias = "projectLink")]
    project_url: Option<String>,
    #[serde(alias = "videoUrl", alias = "videoLink")]
    video_url: Option<String>,
    #[serde(alias = "codeUrl", alias = "repositoryUrl")]
    code_url: Option<String>,
    #[serde(alias = "professorName", alias = "professor")]
    professor_name: Option<String>,
    members: Option<LooseList>,
    media: Option<RawMedia>,
    thumbnail: Option<String>,
    image: Option<String>,
    #[serde(alias = "imageUrl")]
    image_url: Option<String>,
    screenshots: Option<LooseList>,
    tags: Option<LooseList>,
    status: Option<String>,
    #[serde(alias = "authorId")]
    author_id: Option<String>,
    #[serde(alias = "authorName")]
    author_name: Option<String>,
    course: Option<String>,
    shift: Option<String>,
    semester: Option<String>,
    #[serde(alias = "className", alias = "class")]
    class_name: Option<String>,
    #[serde(alias = "submittedAt")]
    submitted_at: Option<LooseTime>,
    #[serde(alias = "publishedAt")]
    published_at: Option<LooseTime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawLikes {
    counts: BTreeMap<String, Value>,
    #[serde(alias = "userLikes")]
    user_likes: BTreeMap<String, Vec<LooseId>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawDocument {
    version: Option<u32>,
    #[serde(alias = "exportedAt")]
    exported_at: Option<LooseTime>,
    projects: Vec<Value>,
    likes: RawLikes,
    #[serde(alias = "featuredPins", alias = "featured")]
    featured_pins: Vec<LooseId>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Turn one raw record into a canonical [`Project`].
///
/// Returns the record's own id (if it carried a usable one) alongside the
/// project, whose `id` is left at 0 for the caller to assign. Records with
/// no title are rejected.
fn normalize_record(raw: RawRecord, now: Timestamp) -> Result<(Option<DbId>, Project), String> {
    let text = |v: Option<String>| v.map(|s| s.trim().to_string()).unwrap_or_default();
    let list = |v: Option<LooseList>| clean_list(v.map(LooseList::into_vec).unwrap_or_default());
    let link = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    let own_id = raw.id.as_ref().and_then(LooseId::as_id);

    let title = text(raw.title);
    if title.is_empty() {
        return Err(format!("record {own_id:?} has no title"));
    }

    let description = raw.description.unwrap_or_default();
    let mut summary = text(raw.summary);
    if summary.is_empty() {
        summary = description
            .trim()
            .chars()
            .take(SUMMARY_FALLBACK_CHARS)
            .collect::<String>()
            .trim()
            .to_string();
    }
    if summary.is_empty() {
        summary = title.clone();
    }

    let media = raw.media.unwrap_or_default();
    let thumbnail = [media.thumbnail, raw.thumbnail, raw.image, raw.image_url]
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_default();
    let mut screenshots = list(media.screenshots);
    if screenshots.is_empty() {
        screenshots = list(raw.screenshots);
    }

    let status = raw
        .status
        .as_deref()
        .and_then(|s| s.parse::<ProjectStatus>().ok())
        .unwrap_or_default();

    let submitted_at = raw
        .submitted_at
        .as_ref()
        .and_then(LooseTime::as_timestamp)
        .unwrap_or(now);
    let mut published_at = raw.published_at.as_ref().and_then(LooseTime::as_timestamp);
    if status == ProjectStatus::Published && published_at.is_none() {
        published_at = Some(submitted_at);
    }

    let project = Project {
        id: 0,
        title,
        summary,
        description,
        creation_date: text(raw.creation_date),
        project_url: link(raw.project_url),
        video_url: link(raw.video_url),
        code_url: link(raw.code_url),
        professor_name: text(raw.professor_name),
        members: list(raw.members),
        media: ProjectMedia {
            thumbnail,
            screenshots,
        },
        tags: clean_tags(raw.tags.map(LooseList::into_vec).unwrap_or_default()),
        status,
        author_id: text(raw.author_id),
        author_name: text(raw.author_name),
        course: text(raw.course),
        shift: text(raw.shift),
        semester: text(raw.semester),
        class_name: text(raw.class_name),
        submitted_at,
        published_at,
    };
    Ok((own_id, project))
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse and normalize a snapshot document.
///
/// Accepts either a snapshot object or a bare array of project records.
/// Individual malformed records and dangling likes or pins are dropped with
/// a warning; only a document that is not JSON at all, or is neither an
/// object nor an array, is an error.
pub fn parse_snapshot(input: &str, now: Timestamp) -> Result<SnapshotLoad, SnapshotError> {
    let value: Value = serde_json::from_str(input)?;
    let document: RawDocument = match value {
        Value::Array(projects) => RawDocument {
            projects,
            ..Default::default()
        },
        Value::Object(_) => serde_json::from_value(value)?,
        other => {
            return Err(SnapshotError::Shape(format!(
                "expected an object or an array, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut warnings: Vec<String> = Vec::new();

    // Records, in document order.
    let mut normalized: Vec<(Option<DbId>, Project)> = Vec::with_capacity(document.projects.len());
    for (index, value) in document.projects.into_iter().enumerate() {
        let record = match serde_json::from_value::<RawRecord>(value) {
            Ok(record) => record,
            Err(e) => {
                warnings.push(format!("project #{index} skipped: {e}"));
                continue;
            }
        };
        match normalize_record(record, now) {
            Ok(entry) => normalized.push(entry),
            Err(reason) => warnings.push(format!("project #{index} skipped: {reason}")),
        }
    }

    // Keep the first record for each id; records without one get fresh ids
    // after the highest id in the document.
    let mut taken: HashSet<DbId> = HashSet::new();
    let mut next_id = normalized
        .iter()
        .filter_map(|(id, _)| *id)
        .max()
        .unwrap_or(0);
    let mut projects: Vec<Project> = Vec::with_capacity(normalized.len());
    for (own_id, mut project) in normalized {
        let id = match own_id {
            Some(id) if taken.contains(&id) => {
                warnings.push(format!("project {id} skipped: duplicate id"));
                continue;
            }
            Some(id) => id,
            None => match next_id.checked_add(1) {
                Some(id) => {
                    next_id = id;
                    id
                }
                None => {
                    warnings.push(format!(
                        "project '{}' skipped: no id left to assign",
                        project.title
                    ));
                    continue;
                }
            },
        };
        taken.insert(id);
        project.id = id;
        projects.push(project);
    }

    // Membership map, restricted to known projects. Counts are re-derived.
    let mut user_likes: BTreeMap<String, Vec<DbId>> = BTreeMap::new();
    for (user, ids) in document.likes.user_likes {
        let user = user.trim().to_string();
        if user.is_empty() {
            warnings.push("likes for a blank user key dropped".to_string());
            continue;
        }
        let mut kept: BTreeSet<DbId> = BTreeSet::new();
        for raw in ids {
            match raw.as_id() {
                Some(id) if taken.contains(&id) => {
                    kept.insert(id);
                }
                _ => warnings.push(format!("like by '{user}' on unknown project {raw:?} dropped")),
            }
        }
        if !kept.is_empty() {
            user_likes.entry(user).or_default().extend(kept);
        }
    }
    for ids in user_likes.values_mut() {
        ids.sort_unstable();
        ids.dedup();
    }
    let mut likes = LikesSnapshot {
        counts: BTreeMap::new(),
        user_likes,
    };
    likes.counts = likes.derived_counts();
    for (key, recorded) in &document.likes.counts {
        let derived = key
            .trim()
            .parse::<DbId>()
            .ok()
            .and_then(|id| likes.counts.get(&id).copied())
            .unwrap_or(0);
        if recorded.as_i64() != Some(derived) {
            warnings.push(format!(
                "like count for project {key} recorded as {recorded}, recomputed as {derived}"
            ));
        }
    }

    let mut featured_pins: Vec<DbId> = Vec::new();
    for raw in document.featured_pins {
        match raw.as_id() {
            Some(id) if taken.contains(&id) => {
                if !featured_pins.contains(&id) {
                    featured_pins.push(id);
                }
            }
            _ => warnings.push(format!("featured pin {raw:?} dropped: unknown project")),
        }
    }

    Ok(SnapshotLoad {
        snapshot: CatalogSnapshot {
            version: document.version.unwrap_or(SNAPSHOT_VERSION),
            exported_at: document.exported_at.as_ref().and_then(LooseTime::as_timestamp),
            projects,
            likes,
            featured_pins,
        },
        warnings,
    })
}

/// Read and parse a snapshot file.
pub fn load_snapshot_file(path: &Path, now: Timestamp) -> Result<SnapshotLoad, SnapshotError> {
    let text = std::fs::read_to_string(path)?;
    parse_snapshot(&text, now)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn parse(value: Value) -> SnapshotLoad {
        parse_snapshot(&value.to_string(), Utc::now()).expect("snapshot should parse")
    }

    #[test]
    fn canonical_export_round_trips() {
        let now = Utc::now();
        let doc = CatalogSnapshot {
            version: SNAPSHOT_VERSION,
            exported_at: Some(now),
            projects: vec![Project {
                id: 3,
                title: "Weather Station".into(),
                summary: "ESP32 sensors".into(),
                description: "<p>rich</p>".into(),
                creation_date: "2024-03-02".into(),
                project_url: Some("https://demo.example".into()),
                video_url: None,
                code_url: None,
                professor_name: "Dr. Reis".into(),
                members: vec!["Lia".into()],
                media: ProjectMedia {
                    thumbnail: "blob:thumb".into(),
                    screenshots: vec!["blob:s1".into()],
                },
                tags: vec!["iot".into()],
                status: ProjectStatus::Published,
                author_id: "lia@example.edu".into(),
                author_name: "Lia".into(),
                course: "Engineering".into(),
                shift: "Morning".into(),
                semester: "2024.1".into(),
                class_name: "2A".into(),
                submitted_at: now,
                published_at: Some(now),
            }],
            likes: LikesSnapshot {
                counts: BTreeMap::from([(3, 1)]),
                user_likes: BTreeMap::from([("bob".to_string(), vec![3])]),
            },
            featured_pins: vec![3],
        };

        let text = serde_json::to_string(&doc).unwrap();
        let load = parse_snapshot(&text, Utc::now()).unwrap();
        assert_eq!(load.snapshot, doc);
        assert!(load.warnings.is_empty(), "{:?}", load.warnings);
    }

    #[test]
    fn legacy_aliases_are_normalized_once() {
        let load = parse(json!([{
            "id": "12",
            "title": "  Smart Bin ",
            "description": "A bin that sorts recyclables automatically.",
            "imageUrl": "blob:legacy",
            "professorName": "Dr. Melo",
            "members": "Ana, Beto ,",
            "status": "published",
            "submittedAt": 1_700_000_000_000_i64
        }]));

        let p = &load.snapshot.projects[0];
        assert_eq!(p.id, 12);
        assert_eq!(p.title, "Smart Bin");
        assert_eq!(p.summary, "A bin that sorts recyclables automatically.");
        assert_eq!(p.media.thumbnail, "blob:legacy");
        assert_eq!(p.professor_name, "Dr. Melo");
        assert_eq!(p.members, vec!["Ana", "Beto"]);
        assert_eq!(p.status, ProjectStatus::Published);
        assert_eq!(p.published_at, Some(p.submitted_at));
        assert_eq!(p.tags, Vec::<String>::new());
    }

    #[test]
    fn media_thumbnail_wins_over_flat_aliases() {
        let load = parse(json!([{
            "title": "t", "summary": "s",
            "media": { "thumbnail": "blob:a" },
            "image": "blob:b"
        }]));
        assert_eq!(load.snapshot.projects[0].media.thumbnail, "blob:a");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let load = parse(json!({ "projects": [{ "id": 1, "title": "Only title" }] }));
        let p = &load.snapshot.projects[0];
        assert_eq!(p.summary, "Only title");
        assert_eq!(p.description, "");
        assert!(p.members.is_empty());
        assert_eq!(p.status, ProjectStatus::InReview);
        assert_eq!(p.project_url, None);
    }

    #[test]
    fn untitled_and_duplicate_records_are_skipped() {
        let load = parse(json!([
            { "id": 1, "title": "First" },
            { "id": 1, "title": "Clash" },
            { "id": 2, "title": "   " },
            { "title": "No id" },
            42
        ]));
        let ids: Vec<DbId> = load.snapshot.projects.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(load.snapshot.projects[1].title, "No id");
        assert_eq!(load.warnings.len(), 3);
    }

    #[test]
    fn record_without_id_is_skipped_when_ids_run_out() {
        let load = parse(json!([
            { "id": i64::MAX, "title": "Last" },
            { "title": "No room" }
        ]));
        let ids: Vec<DbId> = load.snapshot.projects.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![i64::MAX]);
        assert!(load.warnings.iter().any(|w| w.contains("No room")));
    }

    #[test]
    fn ledger_counts_are_recomputed_from_membership() {
        let load = parse(json!({
            "projects": [{ "id": 1, "title": "A" }, { "id": 2, "title": "B" }],
            "likes": {
                "counts": { "1": 7, "2": 1 },
                "userLikes": { "u1": [1, "2", 99], "u2": [1, 1] }
            },
            "featuredPins": [2, 2, 404]
        }));
        let likes = &load.snapshot.likes;
        assert_eq!(likes.counts, BTreeMap::from([(1, 2), (2, 1)]));
        assert_eq!(likes.user_likes["u1"], vec![1, 2]);
        assert_eq!(likes.user_likes["u2"], vec![1]);
        assert_eq!(load.snapshot.featured_pins, vec![2]);
        assert!(load.warnings.iter().any(|w| w.contains("recomputed")));
        assert!(load.warnings.iter().any(|w| w.contains("404")));
    }

    #[test]
    fn corrupt_json_is_an_error() {
        assert_matches!(
            parse_snapshot("{ not json", Utc::now()),
            Err(SnapshotError::Json(_))
        );
    }

    #[test]
    fn scalar_document_is_a_shape_error() {
        assert_matches!(parse_snapshot("17", Utc::now()), Err(SnapshotError::Shape(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("showcase-snapshot-that-does-not-exist.json");
        assert_matches!(load_snapshot_file(&path, Utc::now()), Err(SnapshotError::Io(_)));
    }

    #[test]
    fn snapshot_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": 5, "title": "From disk", "summary": "s"}}]"#).unwrap();
        let load = load_snapshot_file(file.path(), Utc::now()).unwrap();
        assert_eq!(load.snapshot.projects[0].id, 5);
    }
}
