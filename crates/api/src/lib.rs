//! HTTP API: the request pipeline customizations and their axum wiring.

pub mod app;
pub mod context;
pub mod middleware;
pub mod mvc;
pub mod settings;
