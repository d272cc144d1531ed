//! Catalog search, faceted filtering and pagination.
//!
//! Everything here is a pure function over a snapshot slice handed in by the
//! caller, so results never depend on how or when the snapshot was loaded.

use serde::{Deserialize, Serialize};

use crate::project::{Project, ProjectStatus};

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of projects per catalog page.
pub const DEFAULT_PAGE_SIZE: i64 = 12;

/// Maximum number of projects per catalog page.
pub const MAX_PAGE_SIZE: i64 = 100;

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Search criteria. Every present criterion must match (logical AND).
///
/// `text` is a case-insensitive substring match; facets are exact matches.
/// Blank strings are treated as absent so empty form fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectFilter {
    pub text: Option<String>,
    pub course: Option<String>,
    pub status: Option<ProjectStatus>,
    pub shift: Option<String>,
    pub semester: Option<String>,
    pub professor: Option<String>,
    pub class_name: Option<String>,
    pub author_id: Option<String>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        if let Some(needle) = present(&self.text) {
            if !text_matches(project, &needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if project.status != status {
                return false;
            }
        }
        facet_matches(&self.course, &project.course)
            && facet_matches(&self.shift, &project.shift)
            && facet_matches(&self.semester, &project.semester)
            && facet_matches(&self.professor, &project.professor_name)
            && facet_matches(&self.class_name, &project.class_name)
            && facet_matches(&self.author_id, &project.author_id)
    }
}

/// Return the projects in `snapshot` matching `criteria`, in snapshot order.
pub fn filter_projects<'a>(snapshot: &'a [Project], criteria: &ProjectFilter) -> Vec<&'a Project> {
    snapshot.iter().filter(|p| criteria.matches(p)).collect()
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn facet_matches(criterion: &Option<String>, value: &str) -> bool {
    present(criterion).map_or(true, |wanted| wanted == value)
}

/// `needle` must already be lowercase.
fn text_matches(project: &Project, needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);

    contains(&project.title)
        || contains(&project.summary)
        || contains(&project.description)
        || contains(&project.author_name)
        || contains(&project.course)
        || contains(&project.professor_name)
        || project.tags.iter().any(|t| contains(t))
        || project.members.iter().any(|m| contains(m))
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    /// Transform the items while keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// Slice `items` into page `page` of `page_size` entries.
///
/// `page` and `page_size` below 1 clamp to 1. Pages past the end are empty. `total_pages` is
/// `ceil(total / page_size)`, so an empty list has zero pages.
pub fn paginate<T>(items: Vec<T>, page: i64, page_size: i64) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = items.len() as i64;
    let total_pages = if total == 0 {
        0
    } else {
        (total - 1) / page_size + 1
    };

    let start = usize::try_from((page - 1).saturating_mul(page_size)).unwrap_or(usize::MAX);
    let items: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(usize::try_from(page_size).unwrap_or(usize::MAX))
        .collect();

    Page {
        items,
        page,
        page_size,
        total,
        total_pages,
    }
}

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided page number to at least 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::project::ProjectMedia;

    fn project(id: i64, title: &str, course: &str, status: ProjectStatus) -> Project {
        Project {
            id,
            title: title.into(),
            summary: format!("summary of {title}"),
            description: String::new(),
            creation_date: String::new(),
            project_url: None,
            video_url: None,
            code_url: None,
            professor_name: "Dr. Souza".into(),
            members: vec!["Bruno Alves".into()],
            media: ProjectMedia::default(),
            tags: vec!["robotics".into()],
            status,
            author_id: format!("user{id}"),
            author_name: format!("Author {id}"),
            course: course.into(),
            shift: "Night".into(),
            semester: "2024.1".into(),
            class_name: "3B".into(),
            submitted_at: Utc::now(),
            published_at: None,
        }
    }

    fn snapshot() -> Vec<Project> {
        vec![
            project(1, "Line Follower", "Engineering", ProjectStatus::Published),
            project(2, "Budget App", "Computing", ProjectStatus::InProgress),
            project(3, "Drone Mapper", "Engineering", ProjectStatus::InReview),
            project(4, "Chat Bot", "Computing", ProjectStatus::Published),
        ]
    }

    fn ids(found: &[&Project]) -> Vec<i64> {
        found.iter().map(|p| p.id).collect()
    }

    // -- filter_projects -----------------------------------------------------

    #[test]
    fn empty_filter_returns_everything_in_order() {
        let snap = snapshot();
        assert_eq!(ids(&filter_projects(&snap, &ProjectFilter::default())), vec![1, 2, 3, 4]);
    }

    #[test]
    fn text_matches_case_insensitively_across_fields() {
        let mut snap = snapshot();
        snap[1].members.push("Carla Mendes".into());
        snap[3].tags.push("NLP".into());

        let by_title = ProjectFilter { text: Some("drone".into()), ..Default::default() };
        assert_eq!(ids(&filter_projects(&snap, &by_title)), vec![3]);

        let by_member = ProjectFilter { text: Some("CARLA".into()), ..Default::default() };
        assert_eq!(ids(&filter_projects(&snap, &by_member)), vec![2]);

        let by_tag = ProjectFilter { text: Some("nlp".into()), ..Default::default() };
        assert_eq!(ids(&filter_projects(&snap, &by_tag)), vec![4]);

        let by_professor = ProjectFilter { text: Some("souza".into()), ..Default::default() };
        assert_eq!(filter_projects(&snap, &by_professor).len(), 4);
    }

    #[test]
    fn facets_are_exact_and_anded() {
        let snap = snapshot();
        let filter = ProjectFilter {
            course: Some("Computing".into()),
            status: Some(ProjectStatus::Published),
            ..Default::default()
        };
        assert_eq!(ids(&filter_projects(&snap, &filter)), vec![4]);

        let partial = ProjectFilter { course: Some("Comp".into()), ..Default::default() };
        assert!(filter_projects(&snap, &partial).is_empty());
    }

    #[test]
    fn blank_criteria_do_not_filter() {
        let snap = snapshot();
        let filter = ProjectFilter {
            text: Some("  ".into()),
            course: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter_projects(&snap, &filter).len(), 4);
    }

    #[test]
    fn remaining_facets_match_their_fields() {
        let mut snap = snapshot();
        snap[0].shift = "Morning".into();
        snap[2].semester = "2023.2".into();
        snap[3].class_name = "1A".into();

        let shift = ProjectFilter { shift: Some("Morning".into()), ..Default::default() };
        assert_eq!(ids(&filter_projects(&snap, &shift)), vec![1]);
        let semester = ProjectFilter { semester: Some("2023.2".into()), ..Default::default() };
        assert_eq!(ids(&filter_projects(&snap, &semester)), vec![3]);
        let class = ProjectFilter { class_name: Some("1A".into()), ..Default::default() };
        assert_eq!(ids(&filter_projects(&snap, &class)), vec![4]);
        let professor = ProjectFilter { professor: Some("Dr. Souza".into()), ..Default::default() };
        assert_eq!(filter_projects(&snap, &professor).len(), 4);
        let author = ProjectFilter { author_id: Some("user2".into()), ..Default::default() };
        assert_eq!(ids(&filter_projects(&snap, &author)), vec![2]);
    }

    #[test]
    fn adding_published_status_narrows_results() {
        let snap = snapshot();
        let extras = [
            ProjectFilter::default(),
            ProjectFilter { course: Some("Engineering".into()), ..Default::default() },
            ProjectFilter { text: Some("o".into()), ..Default::default() },
        ];
        for extra in extras {
            let base = ids(&filter_projects(&snap, &extra));
            let narrowed = ProjectFilter { status: Some(ProjectStatus::Published), ..extra };
            for id in ids(&filter_projects(&snap, &narrowed)) {
                assert!(base.contains(&id));
            }
        }
    }

    // -- paginate ------------------------------------------------------------

    #[test]
    fn pages_slice_in_order() {
        let page = paginate((1..=10).collect::<Vec<i32>>(), 2, 3);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total, 10);
        assert_eq!(page.total_pages, 4);
    }

    #[test]
    fn non_positive_page_clamps_to_first() {
        assert_eq!(paginate(vec![1, 2, 3], 0, 2).items, vec![1, 2]);
        assert_eq!(paginate(vec![1, 2, 3], -4, 2).page, 1);
    }

    #[test]
    fn non_positive_page_size_clamps_to_one() {
        let page = paginate(vec!['a', 'b'], 1, 0);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.items, vec!['a']);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn page_size_above_the_request_cap_is_honoured() {
        let list: Vec<i64> = (0..150).collect();
        let page = paginate(list.clone(), 1, 120);
        assert_eq!(page.page_size, 120);
        assert_eq!(page.items, list[..120].to_vec());
        assert_eq!(page.total_pages, 2);

        let whole = paginate(list, 1, i64::MAX);
        assert_eq!(whole.items.len(), 150);
        assert_eq!(whole.total_pages, 1);
    }

    #[test]
    fn empty_list_has_zero_pages() {
        let page = paginate(Vec::<i32>::new(), 1, 12);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn page_past_end_is_empty() {
        let page = paginate(vec![1, 2, 3], 9, 2);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn concatenated_pages_reproduce_the_list() {
        for len in 0..15 {
            let list: Vec<usize> = (0..len).collect();
            for size in 1..6 {
                let first = paginate(list.clone(), 1, size);
                let mut joined = Vec::new();
                for page in 1..=first.total_pages {
                    joined.extend(paginate(list.clone(), page, size).items);
                }
                assert_eq!(joined, list, "len={len} size={size}");
            }
        }
    }

    #[test]
    fn page_map_keeps_metadata() {
        let page = paginate(vec![1, 2, 3], 1, 2).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total, 3);
    }

    // -- clamp helpers -------------------------------------------------------

    #[test]
    fn clamp_limit_uses_default_when_none() {
        assert_eq!(clamp_limit(None, 12, 100), 12);
    }

    #[test]
    fn clamp_limit_respects_bounds() {
        assert_eq!(clamp_limit(Some(500), 12, 100), 100);
        assert_eq!(clamp_limit(Some(0), 12, 100), 1);
    }

    #[test]
    fn clamp_page_floors_at_one() {
        assert_eq!(clamp_page(None), 1);
        assert_eq!(clamp_page(Some(-2)), 1);
        assert_eq!(clamp_page(Some(3)), 3);
    }
}
