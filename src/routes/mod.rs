pub mod admin;
pub mod health;
pub mod laws;
pub mod sessions;
pub mod videos;
