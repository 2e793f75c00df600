pub mod analysis;
pub mod analytics;
pub mod chat;
pub mod client;
pub mod conversation;
pub mod errors;
pub mod models;
pub mod overflow;
pub mod settings;
pub mod stream;
