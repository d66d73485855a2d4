//! HTTP request handlers

pub mod avatar;
pub mod health;
