// src/notifications/mod.rs

pub mod handlers;
pub mod models;
pub mod routes;
pub mod service;

#[cfg(test)]
mod tests;

pub use routes::notifications_routes;
