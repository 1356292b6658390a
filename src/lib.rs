pub mod config;
pub mod errors;
pub mod feeds;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod trading;
pub mod types;
