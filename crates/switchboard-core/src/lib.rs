//! Client-side state for the operations console (session, slots, navigation, config).

pub mod app;
pub mod auth;
pub mod config;
pub mod navigation;
pub mod request_id;
pub mod session;
pub mod slots;
pub mod storage;
pub mod store;
