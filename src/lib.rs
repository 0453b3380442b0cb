pub mod auth;
pub mod catalog;
pub mod completion;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod paths;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;

#[cfg(test)]
pub mod testing;
