#![allow(dead_code)]

use showcase_core::project::{Author, ProjectDraft};
use showcase_db::Db;

/// Fresh, migrated in-memory database.
pub async fn test_db() -> Db {
    let pool = showcase_db::create_memory_pool()
        .await
        .expect("in-memory pool");
    showcase_db::run_migrations(&pool)
        .await
        .expect("migrations apply");
    Db::new(pool)
}

pub fn author(id: &str) -> Author {
    Author {
        id: id.to_string(),
        name: format!("Student {id}"),
        course: Some("Computer Science".to_string()),
    }
}

pub fn draft(title: &str) -> ProjectDraft {
    ProjectDraft {
        title: title.to_string(),
        summary: format!("{title} summary"),
        description: format!("All about {title}."),
        professor_name: "Dr. Ada".to_string(),
        members: vec!["Ana".to_string(), "Bruno".to_string()],
        tags: vec!["rust".to_string()],
        shift: "Night".to_string(),
        semester: "2026.2".to_string(),
        ..Default::default()
    }
}
