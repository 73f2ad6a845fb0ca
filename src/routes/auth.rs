// src/routes/auth.rs
use actix_web::{get, post, web, HttpRequest, HttpResponse, Result};

use crate::auth::jwt::Claims;
use crate::handlers::auth_handler::{get_current_user, register_user, session_status};
use crate::models::user::RegistrationRequest;
use crate::services::UserService;

/// Session status, also answered for anonymous callers
#[get("/api/auth/session")]
async fn session(
    req: HttpRequest,
    users: web::Data<UserService>,
) -> Result<HttpResponse> {
    session_status(req, users).await
}

#[post("/register")]
async fn register(
    request: web::Json<RegistrationRequest>,
    users: web::Data<UserService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    register_user(request, users, claims).await
}

#[get("/me")]
async fn me(
    users: web::Data<UserService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    get_current_user(users, claims).await
}
