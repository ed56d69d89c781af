pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod handlers;
pub mod registry;
pub mod router;
