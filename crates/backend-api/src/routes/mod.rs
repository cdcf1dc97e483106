pub mod auth;
pub mod health;
pub mod listings;
pub mod messages;
pub mod models;
pub mod wardrobes;
