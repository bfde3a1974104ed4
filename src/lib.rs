pub mod cancel;
pub mod checkers;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod logging;
pub mod manifest;
pub mod models;
pub mod output;
pub mod report;
pub mod runner;
