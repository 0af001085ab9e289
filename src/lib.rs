// Library exports for the Kittygram client
// The binary and the integration tests drive the pages through these modules

pub mod api;
pub mod config;
pub mod csrf;
pub mod error;
pub mod forms;
pub mod models;
pub mod notify;
pub mod pages;
pub mod render;
pub mod session;
pub mod store;
