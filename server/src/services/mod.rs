pub mod ingest;
pub mod leaderboard;
pub mod store;
