pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod nutrition;
pub mod profiles;
pub mod state;
