pub mod analyze;
pub mod ask;
pub mod chat;
pub mod session;
pub mod version;
