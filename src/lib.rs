pub mod command;
pub mod config;
pub mod engine;
pub mod executor;
pub mod init;
pub mod registry;
pub mod stats;
