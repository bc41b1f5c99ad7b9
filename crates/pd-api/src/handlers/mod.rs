//! API request handlers

pub mod auth;
pub mod dashboard;
pub mod projects;
pub mod tasks;
pub mod users;
