// src/routes/friends.rs
use actix_web::{delete, get, post, web, HttpResponse, Result};

use crate::auth::jwt::Claims;
use crate::handlers::friend_handler;
use crate::models::user::{FriendRequest, SearchQuery};
use crate::services::{FriendService, UserService};

#[post("/request")]
async fn send_request(
    request: web::Json<FriendRequest>,
    users: web::Data<UserService>,
    friends: web::Data<FriendService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    friend_handler::send_friend_request(request, users, friends, claims).await
}

#[post("/accept")]
async fn accept_request(
    request: web::Json<FriendRequest>,
    users: web::Data<UserService>,
    friends: web::Data<FriendService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    friend_handler::accept_friend_request(request, users, friends, claims).await
}

#[get("/list")]
async fn list(
    users: web::Data<UserService>,
    friends: web::Data<FriendService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    friend_handler::list_friends(users, friends, claims).await
}

/// Requests other users sent to the caller
#[get("/requests/received")]
async fn received(
    users: web::Data<UserService>,
    friends: web::Data<FriendService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    friend_handler::received_requests(users, friends, claims).await
}

#[get("/requests/sent")]
async fn sent(
    users: web::Data<UserService>,
    friends: web::Data<FriendService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    friend_handler::sent_requests(users, friends, claims).await
}

#[get("/search")]
async fn search(
    query: web::Query<SearchQuery>,
    users: web::Data<UserService>,
    friends: web::Data<FriendService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    friend_handler::search_users(query, users, friends, claims).await
}

#[delete("/remove/{friend_id}")]
async fn remove(
    path: web::Path<String>,
    users: web::Data<UserService>,
    friends: web::Data<FriendService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let friend_id = path.into_inner();
    friend_handler::remove_friend(friend_id, users, friends, claims).await
}
