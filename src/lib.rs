pub mod app_state;
pub mod config;
pub mod converter;
pub mod documents;
pub mod error;
pub mod fetcher;
pub mod health;
pub mod listing;
pub mod packager;
pub mod pipeline;
pub mod routes;
