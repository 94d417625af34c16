mod activity;
mod leaderboard;
mod timeperiod;

pub use activity::*;
pub use leaderboard::*;
pub use timeperiod::*;
