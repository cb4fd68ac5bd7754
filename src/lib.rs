pub mod checks;
pub mod cli;
pub mod config;
pub mod errors;
pub mod inventory;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod reporting;
