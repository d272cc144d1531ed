//! Handlers for the `/projects` resource.

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use showcase_core::error::CoreError;
use showcase_core::featured::LikeCounts;
use showcase_core::project::{
    validate_draft, validate_patch, Project, ProjectDraft, ProjectPatch, ProjectStatus,
};
use showcase_core::search::{
    clamp_limit, clamp_page, filter_projects, paginate, Page, MAX_PAGE_SIZE,
};
use showcase_core::types::DbId;
use showcase_db::repositories::{LikeRepo, ProjectRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, Viewer};
use crate::middleware::rbac::RequireAdmin;
use crate::query::ProjectListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// A project as served to clients: the record plus its like state.
#[derive(Debug, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub likes: i64,
    pub liked_by_me: bool,
}

impl ProjectView {
    pub fn new(project: Project, counts: &impl LikeCounts, liked: &HashSet<DbId>) -> Self {
        let likes = counts.likes_for(project.id);
        let liked_by_me = liked.contains(&project.id);
        ProjectView {
            project,
            likes,
            liked_by_me,
        }
    }
}

/// Request body for `PUT /projects/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// Build the view of a single project for `viewer`.
pub(crate) async fn view_for(
    state: &AppState,
    project: Project,
    viewer_id: Option<&str>,
) -> AppResult<ProjectView> {
    let likes = LikeRepo::count_for(&state.db, project.id).await?;
    let liked_by_me = match viewer_id {
        Some(user_key) => LikeRepo::has_liked(&state.db, project.id, user_key).await?,
        None => false,
    };
    Ok(ProjectView {
        project,
        likes,
        liked_by_me,
    })
}

/// Ids the viewer currently likes; empty for anonymous visitors.
pub(crate) async fn liked_set(
    state: &AppState,
    viewer_id: Option<&str>,
) -> AppResult<HashSet<DbId>> {
    Ok(match viewer_id {
        Some(user_key) => LikeRepo::liked_by_user(&state.db, user_key)
            .await?
            .into_iter()
            .collect(),
        None => HashSet::new(),
    })
}

/// Load a project the viewer is allowed to see. Hidden projects are reported
/// as missing so their existence is not leaked.
pub(crate) async fn find_visible(
    state: &AppState,
    id: DbId,
    viewer: &Viewer,
) -> AppResult<Project> {
    ProjectRepo::find_by_id(&state.db, id)
        .await?
        .filter(|p| p.is_visible_to(viewer.user_id(), viewer.is_admin()))
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}

/// GET /api/v1/projects
///
/// Filters and paginates the catalog. Anonymous visitors and students see
/// only public statuses; `mine=true` lists the caller's own submissions in
/// every status.
pub async fn list(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(params): Query<ProjectListParams>,
) -> AppResult<Json<DataResponse<Page<ProjectView>>>> {
    let own_id = if params.mine {
        let user_id = viewer.user_id().ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Sign in to list your own projects".into(),
            ))
        })?;
        Some(user_id.to_string())
    } else {
        None
    };
    let criteria = params.to_filter(own_id.as_deref())?;
    let is_admin = viewer.is_admin();

    let snapshot = ProjectRepo::list(&state.db).await?;
    let counts = LikeRepo::counts(&state.db).await?;
    let liked = liked_set(&state, viewer.user_id()).await?;

    let matching: Vec<Project> = filter_projects(&snapshot, &criteria)
        .into_iter()
        .filter(|p| is_admin || own_id.is_some() || p.status.is_public())
        .cloned()
        .collect();

    let page_size = clamp_limit(
        params.page_size,
        state.config.default_page_size,
        MAX_PAGE_SIZE,
    );
    let page = paginate(matching, clamp_page(params.page), page_size)
        .map(|p| ProjectView::new(p, &counts, &liked));

    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectView>>> {
    let project = find_visible(&state, id, &viewer).await?;
    let view = view_for(&state, project, viewer.user_id()).await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/projects
///
/// New submissions always start `InReview`, attributed to the caller.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<ProjectDraft>,
) -> AppResult<(StatusCode, Json<DataResponse<ProjectView>>)> {
    let author = user.author();
    let draft = input.normalized(&author);
    validate_draft(&draft)?;

    let project = ProjectRepo::create(&state.db, &draft, &author).await?;

    tracing::info!(
        project_id = project.id,
        author_id = %author.id,
        title = %project.title,
        "Project submitted"
    );

    let view = ProjectView {
        project,
        likes: 0,
        liked_by_me: false,
    };
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// PATCH /api/v1/projects/{id}
///
/// Shallow merge of the present fields. Allowed for admins and the author.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ProjectPatch>,
) -> AppResult<Json<DataResponse<ProjectView>>> {
    let existing = ProjectRepo::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    if !user.is_admin() && existing.author_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the author or an admin may edit this project".into(),
        )));
    }

    let patch = input.cleaned();
    validate_patch(&patch)?;

    let project = ProjectRepo::update(&state.db, id, &patch)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    tracing::info!(project_id = id, user_id = %user.user_id, "Project updated");

    let view = view_for(&state, project, Some(&user.user_id)).await?;
    Ok(Json(DataResponse { data: view }))
}

/// PUT /api/v1/projects/{id}/status
///
/// The first move into `Published` stamps `published_at`; later moves keep it.
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<SetStatusRequest>,
) -> AppResult<Json<DataResponse<ProjectView>>> {
    let status: ProjectStatus = input.status.parse()?;

    let project = ProjectRepo::update_status(&state.db, id, status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    tracing::info!(
        project_id = id,
        status = %project.status,
        published_at = ?project.published_at,
        admin_id = %admin.user_id,
        "Project status changed"
    );

    let view = view_for(&state, project, Some(&admin.user_id)).await?;
    Ok(Json(DataResponse { data: view }))
}

/// DELETE /api/v1/projects/{id}
///
/// Removes the project together with its likes and pin.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = ProjectRepo::delete(&state.db, id).await?;
    if deleted {
        tracing::info!(project_id = id, admin_id = %admin.user_id, "Project deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
    }
}
