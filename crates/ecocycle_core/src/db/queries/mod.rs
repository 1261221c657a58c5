pub mod chat;
pub mod listings;
pub mod sessions;
pub mod stats;
pub mod users;
