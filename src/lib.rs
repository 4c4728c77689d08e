pub mod app;
pub mod config;
pub mod error;
pub mod favorites;
pub mod notify;
pub mod omdb;
pub mod session;
