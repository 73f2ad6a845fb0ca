use actix_web::{web, HttpResponse, Result};

use crate::auth::jwt::Claims;
use crate::models::common::ApiResponse;
use crate::models::user::{FriendRequest, SearchQuery};
use crate::services::{FriendService, UserService};

#[tracing::instrument(
    name = "Send friend request",
    skip(request, users, friends, claims),
    fields(
        auth_id = %claims.sub,
        target = %request.user_id
    )
)]
pub async fn send_friend_request(
    request: web::Json<FriendRequest>,
    users: web::Data<UserService>,
    friends: web::Data<FriendService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let caller = users.require_registered(&claims).await?;
    friends.send_request(&caller, &request.user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_message("Friend request sent")))
}

#[tracing::instrument(
    name = "Accept friend request",
    skip(request, users, friends, claims),
    fields(
        auth_id = %claims.sub,
        sender = %request.user_id
    )
)]
pub async fn accept_friend_request(
    request: web::Json<FriendRequest>,
    users: web::Data<UserService>,
    friends: web::Data<FriendService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let caller = users.require_registered(&claims).await?;
    friends.accept_request(&caller, &request.user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_message("Friend request accepted")))
}

#[tracing::instrument(name = "List friends", skip(users, friends, claims), fields(auth_id = %claims.sub))]
pub async fn list_friends(
    users: web::Data<UserService>,
    friends: web::Data<FriendService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let caller = users.require_registered(&claims).await?;
    let list = friends.list_friends(&caller).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Friends retrieved", list)))
}

#[tracing::instrument(name = "Received friend requests", skip(users, friends, claims), fields(auth_id = %claims.sub))]
pub async fn received_requests(
    users: web::Data<UserService>,
    friends: web::Data<FriendService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let caller = users.require_registered(&claims).await?;
    let list = friends.received_requests(&caller).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Received requests retrieved", list)))
}

#[tracing::instrument(name = "Sent friend requests", skip(users, friends, claims), fields(auth_id = %claims.sub))]
pub async fn sent_requests(
    users: web::Data<UserService>,
    friends: web::Data<FriendService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let caller = users.require_registered(&claims).await?;
    let list = friends.sent_requests(&caller).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Sent requests retrieved", list)))
}

#[tracing::instrument(
    name = "Search users",
    skip(query, users, friends, claims),
    fields(
        auth_id = %claims.sub,
        query = %query.query
    )
)]
pub async fn search_users(
    query: web::Query<SearchQuery>,
    users: web::Data<UserService>,
    friends: web::Data<FriendService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let caller = users.require_registered(&claims).await?;
    let found = friends.search(&caller, &query.query).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        format!("Found {} users", found.len()),
        found,
    )))
}

#[tracing::instrument(
    name = "Remove friend",
    skip(users, friends, claims),
    fields(auth_id = %claims.sub)
)]
pub async fn remove_friend(
    friend_id: String,
    users: web::Data<UserService>,
    friends: web::Data<FriendService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let caller = users.require_registered(&claims).await?;
    friends.remove_friend(&caller, &friend_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_message("Friend removed")))
}
