pub mod ai;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod grouping;
pub mod handlers;
pub mod middleware;
pub mod realtime;
pub mod services;
pub mod sms;
