pub mod common;
pub mod football_match;
pub mod leaderboard;
pub mod user;
