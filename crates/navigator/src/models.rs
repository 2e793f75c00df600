//! These models represent the objects exchanged with the career chat API
//!
//! There are a few related formats we need to interact with:
//! - chat requests, sent from the client to the API (`request`)
//! - streamed NDJSON events, sent from the API while an answer is generated (`event`)
//! - complete answers, either assembled from the stream or returned directly (`response`)
//! - server feature flags, fetched once at startup (`server_config`)
//!
//! Wire field names are part of the contract with the backend, so the structs
//! here keep them exactly even where they read oddly in Rust.
pub mod event;
pub mod message;
pub mod request;
pub mod response;
pub mod role;
pub mod server_config;
pub mod turn;
