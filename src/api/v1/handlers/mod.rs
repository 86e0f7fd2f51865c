pub mod admin;
pub mod health;
pub mod sessions;
pub mod users;
