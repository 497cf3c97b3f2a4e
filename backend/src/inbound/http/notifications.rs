//! Notification inbox endpoints.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::NotificationRepositoryError;
use crate::domain::{ApiResult, Error, Notification, NotificationKind};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_uuid;

/// Wire form of one inbox entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String, example = "booking_confirmed")]
    pub kind: NotificationKind,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub booking_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id(),
            kind: notification.kind(),
            body: notification.body().to_owned(),
            booking_id: notification.booking_id(),
            read: notification.is_read(),
            created_at: notification.created_at(),
        }
    }
}

fn map_repository_error(err: NotificationRepositoryError) -> Error {
    match err {
        NotificationRepositoryError::Connection { .. } => {
            Error::service_unavailable("notification storage is unavailable")
        }
        NotificationRepositoryError::Query { .. } => Error::internal("notification query failed"),
    }
}

/// List the session user's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses((status = 200, description = "Inbox entries", body = [NotificationResponse])),
    tag = "notifications"
)]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let inbox = state
        .notifications
        .list_for_user(&actor)
        .await
        .map_err(map_repository_error)?;
    let inbox: Vec<NotificationResponse> = inbox.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(inbox))
}

/// Mark one of the session user's notifications as read.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 204, description = "Notification marked read"),
        (status = 404, description = "Unknown notification"),
    ),
    tag = "notifications"
)]
pub async fn mark_read(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let notification_id = parse_uuid("id", &path.into_inner())?;
    let touched = state
        .notifications
        .mark_read(&notification_id, &actor)
        .await
        .map_err(map_repository_error)?;
    if touched {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(Error::not_found("notification not found"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse as Resp, test, web};
    use chrono::Utc;

    use super::*;
    use crate::domain::UserId;
    use crate::domain::ports::MockNotificationRepository;
    use crate::inbound::http::test_utils::test_session_middleware;

    fn notifications_app(
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
            .route("/api/v1/notifications", web::get().to(list_notifications))
            .route("/api/v1/notifications/{id}/read", web::post().to(mark_read))
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

    #[actix_web::test]
    async fn inbox_requires_a_session() {
        let app = test::init_service(notifications_app(HttpState::fixture())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/notifications")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn inbox_lists_stored_notifications() {
        let user = UserId::random();
        let notification = Notification::new(
            user.clone(),
            NotificationKind::BookingConfirmed,
            "Your session was confirmed",
            Some(Uuid::new_v4()),
            Utc::now(),
        );
        let mut repo = MockNotificationRepository::new();
        let stored = notification.clone();
        repo.expect_list_for_user()
            .returning(move |_| Ok(vec![stored.clone()]));
        let mut state = HttpState::fixture();
        state.notifications = Arc::new(repo);
        let app = test::init_service(notifications_app(state)).await;
        let cookie = login_cookie(&app, &user).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/notifications")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let inbox: Vec<NotificationResponse> = test::read_body_json(res).await;
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, NotificationKind::BookingConfirmed);
        assert!(!inbox[0].read);
    }

    #[actix_web::test]
    async fn marking_unknown_notification_is_not_found() {
        let app = test::init_service(notifications_app(HttpState::fixture())).await;
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/notifications/{}/read", Uuid::new_v4()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn marking_own_notification_returns_no_content() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_mark_read().returning(|_, _| Ok(true));
        let mut state = HttpState::fixture();
        state.notifications = Arc::new(repo);
        let app = test::init_service(notifications_app(state)).await;
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/notifications/{}/read", Uuid::new_v4()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
