pub mod api;
pub mod auth;
pub mod config;
pub mod controller;
pub mod errors;
pub mod logging;
pub mod router;
pub mod session;
pub mod ui;
pub mod validate;
