pub mod ads;
pub mod app;
pub mod auth;
pub mod comments;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod extract;
pub mod images;
pub mod state;
pub mod storage;
pub mod users;

#[cfg(test)]
mod test_support;
