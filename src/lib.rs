//! Multi-user blog list REST service.

pub mod app;
pub mod auth;
pub mod blogs;
pub mod config;
pub mod error;
pub mod extract;
pub mod state;
pub mod store;
pub mod testing;
pub mod users;
