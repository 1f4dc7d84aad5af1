pub mod aliases;
pub mod api;
pub mod app_error;
pub mod app_state;
pub mod bootstrap;
pub mod checkout;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod schema;
pub mod swagger;
