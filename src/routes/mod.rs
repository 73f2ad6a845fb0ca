use actix_web::web;

pub mod auth;
pub mod backend_health;
pub mod friends;
pub mod matches;

use crate::middleware::auth::AuthMiddleware;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Open to anonymous callers; must be registered ahead of the /api/auth scope
    cfg.service(backend_health::backend_health)
        .service(auth::session);

    cfg.service(
        web::scope("/api/auth")
            .wrap(AuthMiddleware)
            .service(auth::register)
            .service(auth::me)
    );
    cfg.service(
        web::scope("/api/friends")
            .wrap(AuthMiddleware)
            .service(friends::send_request)
            .service(friends::accept_request)
            .service(friends::list)
            .service(friends::received)
            .service(friends::sent)
            .service(friends::search)
            .service(friends::remove)
    );
    // Static paths go before /{match_id}
    cfg.service(
        web::scope("/api/matches")
            .wrap(AuthMiddleware)
            .service(matches::create_match)
            .service(matches::my_matches)
            .service(matches::pending_validation)
            .service(matches::user_stats)
            .service(matches::leaderboard)
            .service(matches::add_player)
            .service(matches::validate_match)
            .service(matches::skip_validation)
            .service(matches::get_match)
    );
}
