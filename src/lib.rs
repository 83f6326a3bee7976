pub mod audit;
pub mod cli;
pub mod config;
pub mod core;
pub mod exit;
pub mod fsutil;
pub mod hooks;
pub mod platform;
pub mod session;
pub mod ui;
pub mod validate;
