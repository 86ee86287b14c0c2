//! Filtering and sorting engine for browsing movie and TV catalog results,
//! served over HTTP to the presentation layer.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
