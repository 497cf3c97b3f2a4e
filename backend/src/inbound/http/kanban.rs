//! Personal kanban board endpoints.
//!
//! The board is private: every route acts on the session user's own tasks,
//! and tasks owned by anyone else are reported as missing.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::KanbanRepositoryError;
use crate::domain::{ApiResult, Column, Error, KanbanTask, KanbanValidationError};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_uuid;

/// Wire form of one task card.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schema(value_type = String, example = "todo")]
    pub column: Column,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<KanbanTask> for TaskResponse {
    fn from(task: KanbanTask) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_owned(),
            description: task.description().map(ToOwned::to_owned),
            column: task.column(),
            position: task.position(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// Board grouped by column, each column ordered by position then age.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    pub todo: Vec<TaskResponse>,
    pub in_progress: Vec<TaskResponse>,
    pub done: Vec<TaskResponse>,
}

impl BoardResponse {
    fn group(mut tasks: Vec<KanbanTask>) -> Self {
        tasks.sort_by(|a, b| {
            a.position()
                .cmp(&b.position())
                .then(a.created_at().cmp(&b.created_at()))
        });
        let mut board = Self {
            todo: Vec::new(),
            in_progress: Vec::new(),
            done: Vec::new(),
        };
        for task in tasks {
            let lane = match task.column() {
                Column::Todo => &mut board.todo,
                Column::InProgress => &mut board.in_progress,
                Column::Done => &mut board.done,
            };
            lane.push(task.into());
        }
        board
    }
}

/// New task body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Position within the `todo` column; defaults to the end of the lane.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

/// Partial task update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `Some(None)` is not expressible over the wire; send an empty string to
    /// clear the description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = String, example = "in_progress")]
    pub column: Option<Column>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

fn map_repository_error(err: KanbanRepositoryError) -> Error {
    match err {
        KanbanRepositoryError::Connection { .. } => {
            Error::service_unavailable("task board is unavailable")
        }
        KanbanRepositoryError::Query { .. } => Error::internal("task query failed"),
    }
}

fn map_validation_error(err: KanbanValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

/// Load a task and confirm the session user owns it. Foreign tasks look
/// exactly like missing ones.
async fn load_owned_task(
    state: &HttpState,
    session: &SessionContext,
    raw_id: &str,
) -> ApiResult<KanbanTask> {
    let actor = session.require_user_id()?;
    let task_id = parse_uuid("taskId", raw_id)?;
    let task = state
        .kanban
        .find_by_id(&task_id)
        .await
        .map_err(map_repository_error)?;
    match task {
        Some(task) if task.owner_id() == &actor => Ok(task),
        _ => Err(Error::not_found("task not found")),
    }
}

/// Fetch the session user's board.
#[utoipa::path(
    get,
    path = "/api/v1/kanban",
    responses((status = 200, description = "Board grouped by column", body = BoardResponse)),
    tag = "kanban"
)]
pub async fn get_board(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let tasks = state
        .kanban
        .list_for_user(&actor)
        .await
        .map_err(map_repository_error)?;
    Ok(HttpResponse::Ok().json(BoardResponse::group(tasks)))
}

/// Create a task in the `todo` column.
#[utoipa::path(
    post,
    path = "/api/v1/kanban/tasks",
    request_body = CreateTaskBody,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Validation failed"),
    ),
    tag = "kanban"
)]
pub async fn create_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Json<CreateTaskBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let body = body.into_inner();
    let position = match body.position {
        Some(position) => position,
        None => {
            let existing = state
                .kanban
                .list_for_user(&actor)
                .await
                .map_err(map_repository_error)?;
            existing
                .iter()
                .filter(|task| task.column() == Column::Todo)
                .map(|task| task.position() + 1)
                .max()
                .unwrap_or(0)
        }
    };
    let task = KanbanTask::create(actor, body.title, body.description, position, Utc::now())
        .map_err(map_validation_error)?;
    state
        .kanban
        .insert(&task)
        .await
        .map_err(map_repository_error)?;
    Ok(HttpResponse::Created().json(TaskResponse::from(task)))
}

/// Patch a task's title, description, column, or position.
#[utoipa::path(
    patch,
    path = "/api/v1/kanban/tasks/{id}",
    params(("id" = String, Path, description = "Task id")),
    request_body = UpdateTaskBody,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 404, description = "Unknown task"),
    ),
    tag = "kanban"
)]
pub async fn update_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Json<UpdateTaskBody>,
) -> ApiResult<HttpResponse> {
    let mut task = load_owned_task(&state, &session, &path.into_inner()).await?;
    let body = body.into_inner();
    let now = Utc::now();
    if let Some(title) = body.title {
        task.set_title(title, now).map_err(map_validation_error)?;
    }
    if let Some(description) = body.description {
        let description = if description.is_empty() {
            None
        } else {
            Some(description)
        };
        task.set_description(description, now);
    }
    if body.column.is_some() || body.position.is_some() {
        let column = body.column.unwrap_or_else(|| task.column());
        let position = body.position.unwrap_or_else(|| task.position());
        task.move_to(column, position, now)
            .map_err(map_validation_error)?;
    }
    state
        .kanban
        .update(&task)
        .await
        .map_err(map_repository_error)?;
    Ok(HttpResponse::Ok().json(TaskResponse::from(task)))
}

/// Delete a task.
#[utoipa::path(
    delete,
    path = "/api/v1/kanban/tasks/{id}",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Unknown task"),
    ),
    tag = "kanban"
)]
pub async fn delete_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let task = load_owned_task(&state, &session, &path.into_inner()).await?;
    let removed = state
        .kanban
        .delete(&task.id())
        .await
        .map_err(map_repository_error)?;
    if removed {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(Error::not_found("task not found"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse as Resp, test, web};
    use async_trait::async_trait;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::domain::UserId;
    use crate::domain::ports::KanbanRepository;
    use crate::inbound::http::test_utils::test_session_middleware;

    #[derive(Default)]
    struct InMemoryBoard {
        tasks: Mutex<HashMap<Uuid, KanbanTask>>,
    }

    #[async_trait]
    impl KanbanRepository for InMemoryBoard {
        async fn list_for_user(
            &self,
            user_id: &UserId,
        ) -> Result<Vec<KanbanTask>, KanbanRepositoryError> {
            let tasks = self.tasks.lock().expect("board lock");
            Ok(tasks
                .values()
                .filter(|task| task.owner_id() == user_id)
                .cloned()
                .collect())
        }

        async fn find_by_id(
            &self,
            task_id: &Uuid,
        ) -> Result<Option<KanbanTask>, KanbanRepositoryError> {
            Ok(self.tasks.lock().expect("board lock").get(task_id).cloned())
        }

        async fn insert(&self, task: &KanbanTask) -> Result<(), KanbanRepositoryError> {
            self.tasks
                .lock()
                .expect("board lock")
                .insert(task.id(), task.clone());
            Ok(())
        }

        async fn update(&self, task: &KanbanTask) -> Result<(), KanbanRepositoryError> {
            self.tasks
                .lock()
                .expect("board lock")
                .insert(task.id(), task.clone());
            Ok(())
        }

        async fn delete(&self, task_id: &Uuid) -> Result<bool, KanbanRepositoryError> {
            Ok(self
                .tasks
                .lock()
                .expect("board lock")
                .remove(task_id)
                .is_some())
        }
    }

    fn board_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .app_data(web::Data::new(state))
            .route(
                "/login-as/{id}",
                web::get().to(
                    |session: SessionContext, path: web::Path<String>| async move {
                        let id = UserId::new(path.into_inner()).expect("valid test id");
                        session.persist_user(&id)?;
                        Ok::<_, Error>(Resp::Ok().finish())
                    },
                ),
            )
            .route("/api/v1/kanban", web::get().to(get_board))
            .route("/api/v1/kanban/tasks", web::post().to(create_task))
            .route("/api/v1/kanban/tasks/{id}", web::patch().to(update_task))
            .route("/api/v1/kanban/tasks/{id}", web::delete().to(delete_task))
    }

    async fn login_cookie(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        user: &UserId,
    ) -> actix_web::cookie::Cookie<'static> {
        let res = test::call_service(
            app,
            test::TestRequest::get()
                .uri(&format!("/login-as/{user}"))
                .to_request(),
        )
        .await;
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    fn board_state() -> HttpState {
        let mut state = HttpState::fixture();
        state.kanban = Arc::new(InMemoryBoard::default());
        state
    }

    #[actix_web::test]
    async fn board_requires_a_session() {
        let app = test::init_service(board_app(board_state())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/kanban").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn created_tasks_land_in_todo() {
        let app = test::init_service(board_app(board_state())).await;
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/kanban/tasks")
                .cookie(cookie.clone())
                .set_json(json!({ "title": "Write docs" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let task: TaskResponse = test::read_body_json(res).await;
        assert_eq!(task.column, Column::Todo);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/kanban")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let board: BoardResponse = test::read_body_json(res).await;
        assert_eq!(board.todo.len(), 1);
        assert!(board.in_progress.is_empty());
        assert!(board.done.is_empty());
    }

    #[actix_web::test]
    async fn empty_title_is_rejected() {
        let app = test::init_service(board_app(board_state())).await;
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/kanban/tasks")
                .cookie(cookie)
                .set_json(json!({ "title": "  " }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn patch_moves_a_task_across_columns() {
        let app = test::init_service(board_app(board_state())).await;
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/kanban/tasks")
                .cookie(cookie.clone())
                .set_json(json!({ "title": "Ship release" }))
                .to_request(),
        )
        .await;
        let task: TaskResponse = test::read_body_json(res).await;

        let res = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/kanban/tasks/{}", task.id))
                .cookie(cookie)
                .set_json(json!({ "column": "done", "position": 2 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let moved: TaskResponse = test::read_body_json(res).await;
        assert_eq!(moved.column, Column::Done);
        assert_eq!(moved.position, 2);
    }

    #[actix_web::test]
    async fn foreign_tasks_are_reported_missing() {
        let state = board_state();
        let app = test::init_service(board_app(state.clone())).await;
        let owner = UserId::random();
        let owner_cookie = login_cookie(&app, &owner).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/kanban/tasks")
                .cookie(owner_cookie)
                .set_json(json!({ "title": "Private card" }))
                .to_request(),
        )
        .await;
        let task: TaskResponse = test::read_body_json(res).await;

        let intruder_cookie = login_cookie(&app, &UserId::random()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/v1/kanban/tasks/{}", task.id))
                .cookie(intruder_cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn delete_removes_the_task() {
        let app = test::init_service(board_app(board_state())).await;
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/kanban/tasks")
                .cookie(cookie.clone())
                .set_json(json!({ "title": "Temporary" }))
                .to_request(),
        )
        .await;
        let task: TaskResponse = test::read_body_json(res).await;

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/v1/kanban/tasks/{}", task.id))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/v1/kanban/tasks/{}", task.id))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
