pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod console;
pub mod output;
pub mod screens;
pub mod session;
pub mod table;
pub mod utils;

#[cfg(test)]
mod tests;
