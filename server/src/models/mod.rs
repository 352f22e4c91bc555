pub mod leaderboard;
pub mod test_result;
