use actix_web::{http, web, App, HttpServer};
use actix_web::dev::Server;
use tracing_actix_web::TracingLogger;
use std::net::TcpListener;
use actix_cors::Cors;

pub mod auth;
pub mod config;
pub mod db;
mod handlers;
pub mod matches;
mod middleware;
pub mod models;
mod routes;
pub mod services;
pub mod telemetry;

use crate::config::jwt::JwtSettings;
use crate::db::Repositories;
use crate::routes::init_routes;
use crate::services::{FriendService, MatchService, UserService};

pub fn run(
    listener: TcpListener,
    repositories: Repositories,
    jwt_settings: JwtSettings,
    allowed_origins: Vec<String>,
) -> Result<Server, std::io::Error> {
    // Wrap using web::Data, which boils down to an Arc smart pointer
    let user_service = web::Data::new(UserService::new(repositories.users.clone()));
    let friend_service = web::Data::new(FriendService::new(
        repositories.friends.clone(),
        repositories.users.clone(),
    ));
    let match_service = web::Data::new(MatchService::new(
        repositories.matches.clone(),
        repositories.users.clone(),
        repositories.friends.clone(),
    ));
    let jwt_settings = web::Data::new(jwt_settings);

    let server = HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH"])
            .allowed_headers(vec![
                http::header::AUTHORIZATION,
                http::header::ACCEPT,
                http::header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(user_service.clone())
            .app_data(friend_service.clone())
            .app_data(match_service.clone())
            .app_data(jwt_settings.clone())
            .configure(init_routes)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
