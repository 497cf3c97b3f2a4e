//! Public mentor directory endpoint.

use actix_web::{HttpResponse, web};

use crate::domain::ApiResult;
use crate::inbound::http::auth::{UserResponse, map_user_repository_error};
use crate::inbound::http::state::HttpState;

/// List mentor profiles.
#[utoipa::path(
    get,
    path = "/api/v1/mentors",
    responses(
        (status = 200, description = "Mentor directory", body = [UserResponse]),
    ),
    tag = "mentors"
)]
pub async fn list_mentors(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let mentors = state
        .users
        .list_mentors()
        .await
        .map_err(map_user_repository_error)?;
    let directory: Vec<UserResponse> = mentors.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(directory))
}
