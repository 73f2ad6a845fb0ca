use actix_web::{web, HttpResponse, Result};
use uuid::Uuid;

use crate::auth::jwt::Claims;
use crate::models::common::ApiResponse;
use crate::models::football_match::{AddPlayerRequest, CreateMatchRequest};
use crate::models::leaderboard::YearQuery;
use crate::services::{MatchService, UserService};

#[tracing::instrument(
    name = "Create match",
    skip(request, users, matches, claims),
    fields(
        auth_id = %claims.sub,
        format = %request.details.format,
        players = request.players.len()
    )
)]
pub async fn create_match(
    request: web::Json<CreateMatchRequest>,
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let caller = users.require_registered(&claims).await?;
    let created = matches.create_match(&caller, request.into_inner()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success("Match created successfully", created)))
}

#[tracing::instrument(
    name = "Add player to match",
    skip(request, users, matches, claims),
    fields(
        auth_id = %claims.sub,
        match_id = %match_id
    )
)]
pub async fn add_player(
    match_id: Uuid,
    request: web::Json<AddPlayerRequest>,
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let caller = users.require_registered(&claims).await?;
    let updated = matches.add_player(&caller, match_id, request.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Player added successfully", updated)))
}

#[tracing::instrument(
    name = "Validate match",
    skip(users, matches, claims),
    fields(
        auth_id = %claims.sub,
        match_id = %match_id
    )
)]
pub async fn validate_match(
    match_id: Uuid,
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let caller = users.require_registered(&claims).await?;
    let updated = matches.validate(&caller, match_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Match validated successfully", updated)))
}

#[tracing::instrument(
    name = "Skip match validation",
    skip(users, matches, claims),
    fields(
        auth_id = %claims.sub,
        match_id = %match_id
    )
)]
pub async fn skip_match_validation(
    match_id: Uuid,
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let caller = users.require_registered(&claims).await?;
    let updated = matches.skip_validation(&caller, match_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Match validation skipped", updated)))
}

#[tracing::instrument(
    name = "Get match",
    skip(users, matches, claims),
    fields(
        auth_id = %claims.sub,
        match_id = %match_id
    )
)]
pub async fn get_match(
    match_id: Uuid,
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    users.require_registered(&claims).await?;
    let found = matches.get_match(match_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Match retrieved", found)))
}

#[tracing::instrument(name = "Get my matches", skip(users, matches, claims), fields(auth_id = %claims.sub))]
pub async fn my_matches(
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let caller = users.require_registered(&claims).await?;
    let list = matches.my_matches(&caller).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        format!("Found {} matches", list.len()),
        list,
    )))
}

#[tracing::instrument(name = "Get matches pending validation", skip(users, matches, claims), fields(auth_id = %claims.sub))]
pub async fn pending_validation(
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let caller = users.require_registered(&claims).await?;
    let list = matches.pending_validation(&caller).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        format!("{} matches pending validation", list.len()),
        list,
    )))
}

#[tracing::instrument(
    name = "Get user stats",
    skip(query, users, matches, claims),
    fields(
        auth_id = %claims.sub,
        year = ?query.year
    )
)]
pub async fn user_stats(
    query: web::Query<YearQuery>,
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let caller = users.require_registered(&claims).await?;
    let stats = matches.user_stats(&caller, query.year).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Stats retrieved", stats)))
}

#[tracing::instrument(
    name = "Get leaderboard",
    skip(query, users, matches, claims),
    fields(
        auth_id = %claims.sub,
        year = ?query.year
    )
)]
pub async fn leaderboard(
    query: web::Query<YearQuery>,
    users: web::Data<UserService>,
    matches: web::Data<MatchService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let caller = users.require_registered(&claims).await?;
    let entries = matches.leaderboard(&caller, query.year).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Leaderboard retrieved", entries)))
}
