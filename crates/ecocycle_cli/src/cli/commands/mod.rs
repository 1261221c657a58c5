pub mod db;
pub mod leaderboard;
pub mod route;
pub mod sellers;
