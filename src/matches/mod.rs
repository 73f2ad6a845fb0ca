//! Match lifecycle rules and leaderboard scoring. Plain functions over the
//! model records, with no persistence or HTTP concerns.

pub mod error;
pub mod leaderboard;
pub mod stats;
pub mod validation;

pub use error::MatchError;
pub use leaderboard::{build_leaderboard, match_points, rank};
pub use stats::aggregate;
pub use validation::{add_player_stats, is_fully_validated, record_validation, skip_validation};
