pub mod auth;
pub mod db;
pub mod model;
pub mod normalize;
pub mod routing;
