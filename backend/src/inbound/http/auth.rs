//! Account registration and session authentication endpoints.

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::UserRepositoryError;
use crate::domain::{
    ApiResult, DisplayName, EmailAddress, Error, LoginCredentials, LoginValidationError,
    MentorProfile, PasswordHash, Role, User, UserId,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Public view of an account; never carries credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Stable account identifier.
    #[schema(value_type = String)]
    pub id: UserId,
    /// Display name shown to other users.
    pub display_name: String,
    /// Login email address.
    pub email: String,
    /// Account role: `user` or `mentor`.
    #[schema(value_type = String, example = "user")]
    pub role: Role,
    /// Directory profile, present for mentor accounts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentor_profile: Option<MentorProfile>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id().clone(),
            display_name: user.display_name().to_string(),
            email: user.email().to_string(),
            role: user.role(),
            mentor_profile: user.mentor_profile().cloned(),
        }
    }
}

/// Registration request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub display_name: String,
    pub email: String,
    pub password: String,
    /// `user` (default) or `mentor`.
    #[serde(default)]
    pub role: Option<String>,
    /// Required for mentor registrations.
    #[serde(default)]
    pub mentor_profile: Option<MentorProfile>,
}

/// Login request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response carrying the authenticated account id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[schema(value_type = String)]
    pub id: UserId,
}

pub(crate) fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { .. } => {
            Error::service_unavailable("user storage is unavailable")
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user query failed: {message}"))
        }
        UserRepositoryError::DuplicateEmail { email } => {
            Error::conflict(format!("an account already exists for {email}"))
        }
    }
}

fn build_account(request: RegisterRequest) -> Result<User, Error> {
    let display_name = DisplayName::new(request.display_name)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let email =
        EmailAddress::new(request.email).map_err(|err| Error::invalid_request(err.to_string()))?;
    let password_hash = PasswordHash::derive(&request.password)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let role = match request.role.as_deref() {
        None => Role::User,
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|err| Error::invalid_request(err.to_string()))?,
    };
    if role == Role::Mentor && request.mentor_profile.is_none() {
        return Err(Error::invalid_request(
            "mentor registrations need a mentor profile",
        ));
    }

    Ok(User::new(
        UserId::random(),
        display_name,
        email,
        role,
        password_hash,
        request.mentor_profile,
    ))
}

/// Create an account and start a session for it.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 409, description = "Email already registered", body = Error),
    ),
    tag = "auth"
)]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let user = build_account(body.into_inner())?;
    state
        .users
        .create(&user)
        .await
        .map_err(map_user_repository_error)?;
    session.persist_user(user.id())?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Authenticate credentials and start a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session started", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = Error),
    ),
    tag = "auth"
)]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(body.email, body.password).map_err(|err| match err {
            LoginValidationError::InvalidEmail | LoginValidationError::EmptyPassword => {
                Error::invalid_request(err.to_string())
            }
        })?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().json(LoginResponse { id: user_id }))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session ended")),
    tag = "auth"
)]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}

/// Return the authenticated account's profile.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current profile", body = UserResponse),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Account no longer exists", body = Error),
    ),
    tag = "auth"
)]
pub async fn me(state: web::Data<HttpState>, session: SessionContext) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let user = state
        .users
        .find_by_id(&user_id)
        .await
        .map_err(map_user_repository_error)?
        .ok_or_else(|| Error::not_found("account no longer exists"))?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::domain::ports::{LoginService, UserRepository};
    use crate::inbound::http::test_utils::test_session_middleware;

    #[derive(Default)]
    struct InMemoryUsers {
        rows: Mutex<HashMap<UserId, User>>,
    }

    #[async_trait]
    impl UserRepository for InMemoryUsers {
        async fn create(&self, user: &User) -> Result<(), UserRepositoryError> {
            let mut rows = self.rows.lock().expect("users lock");
            if rows.values().any(|u| u.email() == user.email()) {
                return Err(UserRepositoryError::duplicate_email(
                    user.email().to_string(),
                ));
            }
            rows.insert(user.id().clone(), user.clone());
            Ok(())
        }

        async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, UserRepositoryError> {
            Ok(self.rows.lock().expect("users lock").get(user_id).cloned())
        }

        async fn find_by_email(
            &self,
            email: &EmailAddress,
        ) -> Result<Option<User>, UserRepositoryError> {
            Ok(self
                .rows
                .lock()
                .expect("users lock")
                .values()
                .find(|u| u.email() == email)
                .cloned())
        }

        async fn list_mentors(&self) -> Result<Vec<User>, UserRepositoryError> {
            Ok(self
                .rows
                .lock()
                .expect("users lock")
                .values()
                .filter(|u| u.role() == Role::Mentor)
                .cloned()
                .collect())
        }
    }

    struct RepoBackedLogin {
        users: Arc<InMemoryUsers>,
    }

    #[async_trait]
    impl LoginService for RepoBackedLogin {
        async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
            let user = self
                .users
                .find_by_email(credentials.email())
                .await
                .map_err(map_user_repository_error)?
                .ok_or_else(|| Error::unauthorized("invalid credentials"))?;
            if user.password_hash().verify(credentials.password()) {
                Ok(user.id().clone())
            } else {
                Err(Error::unauthorized("invalid credentials"))
            }
        }
    }

    fn test_state() -> (HttpState, Arc<InMemoryUsers>) {
        let users = Arc::new(InMemoryUsers::default());
        let mut state = HttpState::fixture();
        state.users = Arc::clone(&users) as Arc<dyn UserRepository>;
        state.login = Arc::new(RepoBackedLogin {
            users: Arc::clone(&users),
        });
        (state, users)
    }

    fn auth_app(
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
            .route("/api/v1/auth/register", web::post().to(register))
            .route("/api/v1/auth/login", web::post().to(login))
            .route("/api/v1/auth/logout", web::post().to(logout))
            .route("/api/v1/auth/me", web::get().to(me))
    }

    #[actix_web::test]
    async fn register_login_me_round_trip() {
        let (state, _) = test_state();
        let app = test::init_service(auth_app(state)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(json!({
                    "displayName": "Ada Lovelace",
                    "email": "ada@example.com",
                    "password": "longenough",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let login_res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({
                    "email": "ada@example.com",
                    "password": "longenough",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(login_res.status(), StatusCode::OK);
        let cookie = login_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned();

        let me_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/auth/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(me_res.status(), StatusCode::OK);
        let profile: UserResponse = test::read_body_json(me_res).await;
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.role, Role::User);
    }

    #[actix_web::test]
    async fn duplicate_email_conflicts() {
        let (state, _) = test_state();
        let app = test::init_service(auth_app(state)).await;

        let payload = json!({
            "displayName": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "longenough",
        });
        let first = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(&payload)
                .to_request(),
        )
        .await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(&payload)
                .to_request(),
        )
        .await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn mentor_registration_requires_profile() {
        let (state, _) = test_state();
        let app = test::init_service(auth_app(state)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(json!({
                    "displayName": "Grace Hopper",
                    "email": "grace@example.com",
                    "password": "longenough",
                    "role": "mentor",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorised() {
        let (state, _) = test_state();
        let app = test::init_service(auth_app(state)).await;

        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(json!({
                    "displayName": "Ada Lovelace",
                    "email": "ada@example.com",
                    "password": "longenough",
                }))
                .to_request(),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({
                    "email": "ada@example.com",
                    "password": "wrong password",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn me_without_session_is_unauthorised() {
        let (state, _) = test_state();
        let app = test::init_service(auth_app(state)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/auth/me").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
