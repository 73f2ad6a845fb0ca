use actix_web::{web, HttpRequest, HttpResponse, Result};

use crate::auth::jwt::Claims;
use crate::middleware::auth::optional_claims;
use crate::models::common::ApiResponse;
use crate::models::user::{RegistrationRequest, UserResponse};
use crate::services::UserService;

/// Where the caller stands: signed out, signed in but unregistered, or registered
#[tracing::instrument(name = "Session status", skip(req, users))]
pub async fn session_status(
    req: HttpRequest,
    users: web::Data<UserService>,
) -> Result<HttpResponse> {
    let claims = optional_claims(&req);
    let status = users.session_status(claims.as_ref()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Session status retrieved", status)))
}

#[tracing::instrument(
    name = "Register user",
    skip(request, users, claims),
    fields(
        auth_id = %claims.sub,
        username = %request.username
    )
)]
pub async fn register_user(
    request: web::Json<RegistrationRequest>,
    users: web::Data<UserService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let user = users.register(&claims, &request).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        "User registered successfully",
        UserResponse::from(&user),
    )))
}

#[tracing::instrument(
    name = "Get current user",
    skip(users, claims),
    fields(auth_id = %claims.sub)
)]
pub async fn get_current_user(
    users: web::Data<UserService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let user = users.require_registered(&claims).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "User retrieved successfully",
        UserResponse::from(&user),
    )))
}
