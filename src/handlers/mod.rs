pub mod auth_handler;
pub mod backend_health_handler;
pub mod friend_handler;
pub mod match_handler;
