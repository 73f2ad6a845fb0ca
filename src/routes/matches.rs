// src/routes/matches.rs
use actix_web::{get, post, web, HttpResponse, Result};
use uuid::Uuid;

use crate::auth::jwt::Claims;
use crate::handlers::match_handler;
use crate::models::football_match::{AddPlayerRequest, CreateMatchRequest};
use crate::models::leaderboard::YearQuery;
use crate::services::{MatchService, UserService};

#[post("/create")]
async fn create_match(
    request: web::Json<CreateMatchRequest>,
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match_handler::create_match(request, users, matches, claims).await
}

/// Matches the caller created or plays in
#[get("/my-matches")]
async fn my_matches(
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match_handler::my_matches(users, matches, claims).await
}

#[get("/pending-validation")]
async fn pending_validation(
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match_handler::pending_validation(users, matches, claims).await
}

#[get("/stats")]
async fn user_stats(
    query: web::Query<YearQuery>,
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match_handler::user_stats(query, users, matches, claims).await
}

#[get("/leaderboard")]
async fn leaderboard(
    query: web::Query<YearQuery>,
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match_handler::leaderboard(query, users, matches, claims).await
}

#[post("/{match_id}/players")]
async fn add_player(
    path: web::Path<Uuid>,
    request: web::Json<AddPlayerRequest>,
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let match_id = path.into_inner();
    match_handler::add_player(match_id, request, users, matches, claims).await
}

#[post("/{match_id}/validate")]
async fn validate_match(
    path: web::Path<Uuid>,
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let match_id = path.into_inner();
    match_handler::validate_match(match_id, users, matches, claims).await
}

#[post("/{match_id}/skip-validation")]
async fn skip_validation(
    path: web::Path<Uuid>,
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let match_id = path.into_inner();
    match_handler::skip_match_validation(match_id, users, matches, claims).await
}

#[get("/{match_id}")]
async fn get_match(
    path: web::Path<Uuid>,
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let match_id = path.into_inner();
    match_handler::get_match(match_id, users, matches, claims).await
}
